// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Bill model.
//!
//! A [`Bill`] is the single source of truth for monetary inputs. Totals are
//! derived on every read and never stored, so they cannot drift from the
//! subtotal, rates and line items they come from.
//!
//! # Example
//!
//! ```
//! use bill_split::{Basis, Bill, ParticipantId};
//! use rust_decimal_macros::dec;
//!
//! let mut bill = Bill::new();
//! bill.set_subtotal("$100.00");
//! assert_eq!(bill.subtotal(), dec!(100.00));
//! assert_eq!(bill.grand_total(Basis::Subtotal), dec!(127.50));
//! ```

use crate::base::{ItemId, ParticipantId, Step};
use crate::config::SplitConfig;
use crate::error::SplitError;
use crate::money::{HUNDRED, clamp, clamp_amount, parse_amount, sanitize_numeric_input};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which amount tax and tip are applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    /// The independently entered subtotal (even split).
    Subtotal,
    /// The sum of line item extended prices.
    Items,
}

/// A line on the bill, shared by zero or more participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    /// Always at least 1.
    pub quantity: u32,
    /// Unit price, never negative.
    pub price: Decimal,
    /// Participants sharing the item, in the order they were added.
    pub shared_by: Vec<ParticipantId>,
}

impl LineItem {
    /// Unit price times quantity.
    pub fn extended_price(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    pub fn is_shared_by(&self, participant: &ParticipantId) -> bool {
        self.shared_by.contains(participant)
    }
}

/// Partial update of a line item. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Bill {
    subtotal_text: String,
    tax_rate: Decimal,
    tip_rate: Decimal,
    tax_step: Decimal,
    tip_step: Decimal,
    max_rate: Decimal,
    items: Vec<LineItem>,
}

impl Bill {
    /// Creates an empty bill with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&SplitConfig::default())
    }

    pub fn with_config(config: &SplitConfig) -> Self {
        Self {
            subtotal_text: sanitize_numeric_input(&config.subtotal),
            tax_rate: clamp(config.tax_rate, Decimal::ZERO, config.max_rate),
            tip_rate: clamp(config.tip_rate, Decimal::ZERO, config.max_rate),
            tax_step: config.tax_step,
            tip_step: config.tip_step,
            max_rate: config.max_rate,
            items: Vec::new(),
        }
    }

    // === Subtotal and rates ===

    /// The sanitized subtotal text, as the user sees it.
    pub fn subtotal_text(&self) -> &str {
        &self.subtotal_text
    }

    /// Replaces the subtotal text. Invalid characters are stripped and only
    /// the first decimal point is kept.
    pub fn set_subtotal(&mut self, text: &str) {
        self.subtotal_text = sanitize_numeric_input(text);
    }

    /// The independently entered subtotal; zero when the text is empty.
    pub fn subtotal(&self) -> Decimal {
        parse_amount(&self.subtotal_text)
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn tip_rate(&self) -> Decimal {
        self.tip_rate
    }

    /// Moves the tax rate by one tax step, clamped to `[0, max_rate]`.
    pub fn adjust_tax_rate(&mut self, step: Step) {
        self.tax_rate = clamp(
            step.apply(self.tax_rate, self.tax_step),
            Decimal::ZERO,
            self.max_rate,
        );
    }

    /// Moves the tip rate by one tip step, clamped to `[0, max_rate]`.
    pub fn adjust_tip_rate(&mut self, step: Step) {
        self.tip_rate = clamp(
            step.apply(self.tip_rate, self.tip_step),
            Decimal::ZERO,
            self.max_rate,
        );
    }

    // === Line items ===

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut LineItem, SplitError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(SplitError::ItemNotFound(id))
    }

    fn next_item_id(&self) -> ItemId {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(ItemId(1), ItemId::next)
    }

    /// Appends a blank item (no name, quantity 1, price 0) shared by `sharers`.
    pub fn add_item(&mut self, sharers: &[ParticipantId]) -> ItemId {
        self.add_item_with(String::new(), 1, Decimal::ZERO, sharers)
    }

    /// Appends a fully described item. Quantity and price are clamped like
    /// any other edit.
    pub fn add_item_with(
        &mut self,
        name: impl Into<String>,
        quantity: u32,
        price: Decimal,
        sharers: &[ParticipantId],
    ) -> ItemId {
        let id = self.next_item_id();
        let mut shared_by: Vec<ParticipantId> = Vec::new();
        for participant in sharers {
            if !shared_by.contains(participant) {
                shared_by.push(participant.clone());
            }
        }
        self.items.push(LineItem {
            id,
            name: name.into(),
            quantity: quantity.max(1),
            price: clamp_amount(price),
            shared_by,
        });
        debug!(item = %id, "added line item");
        id
    }

    /// Deletes an item. Confirmation is the caller's concern.
    pub fn remove_item(&mut self, id: ItemId) -> Result<LineItem, SplitError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(SplitError::ItemNotFound(id))?;
        debug!(item = %id, "removed line item");
        Ok(self.items.remove(index))
    }

    /// Appends a copy of an item under a fresh id, with `" (Copy)"` added to
    /// its name.
    pub fn duplicate_item(&mut self, id: ItemId) -> Result<ItemId, SplitError> {
        let source = self.item(id).ok_or(SplitError::ItemNotFound(id))?;
        let copy = LineItem {
            id: self.next_item_id(),
            name: format!("{} (Copy)", source.name),
            ..source.clone()
        };
        let new_id = copy.id;
        self.items.push(copy);
        debug!(item = %id, copy = %new_id, "duplicated line item");
        Ok(new_id)
    }

    /// Applies a partial update. Prices are clamped to `[0, MAX_AMOUNT]` and
    /// quantities below one become one.
    pub fn update_item(&mut self, id: ItemId, patch: ItemPatch) -> Result<(), SplitError> {
        let item = self.item_mut(id)?;
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(price) = patch.price {
            item.price = clamp_amount(price);
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity.max(1);
        }
        Ok(())
    }

    /// Sets the unit price from user-entered text.
    pub fn set_item_price_text(&mut self, id: ItemId, text: &str) -> Result<(), SplitError> {
        self.item_mut(id)?.price = parse_amount(text);
        Ok(())
    }

    /// Adds or removes one unit. Quantity never drops below one.
    pub fn adjust_item_quantity(&mut self, id: ItemId, step: Step) -> Result<(), SplitError> {
        let item = self.item_mut(id)?;
        item.quantity = step.apply_count(item.quantity, 1);
        Ok(())
    }

    /// Adds the participant to the item's sharers, or removes them if present.
    pub fn toggle_sharer(
        &mut self,
        id: ItemId,
        participant: &ParticipantId,
    ) -> Result<(), SplitError> {
        let item = self.item_mut(id)?;
        if let Some(index) = item.shared_by.iter().position(|p| p == participant) {
            item.shared_by.remove(index);
        } else {
            item.shared_by.push(participant.clone());
        }
        Ok(())
    }

    /// Shares the item among exactly `participants`.
    pub fn assign_all(
        &mut self,
        id: ItemId,
        participants: &[ParticipantId],
    ) -> Result<(), SplitError> {
        let item = self.item_mut(id)?;
        item.shared_by.clear();
        for participant in participants {
            if !item.shared_by.contains(participant) {
                item.shared_by.push(participant.clone());
            }
        }
        Ok(())
    }

    /// Leaves the item unassigned.
    pub fn assign_none(&mut self, id: ItemId) -> Result<(), SplitError> {
        self.item_mut(id)?.shared_by.clear();
        Ok(())
    }

    /// Strips a participant from every item's sharers.
    pub(crate) fn remove_sharer(&mut self, participant: &ParticipantId) {
        for item in &mut self.items {
            item.shared_by.retain(|p| p != participant);
        }
    }

    // === Derived totals ===

    /// Sum of price times quantity over all items.
    pub fn items_subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::extended_price)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// The amount tax and tip apply to.
    pub fn base(&self, basis: Basis) -> Decimal {
        match basis {
            Basis::Subtotal => self.subtotal(),
            Basis::Items => self.items_subtotal(),
        }
    }

    pub fn tax_amount(&self, basis: Basis) -> Decimal {
        self.base(basis).saturating_mul(self.tax_rate / HUNDRED)
    }

    pub fn tip_amount(&self, basis: Basis) -> Decimal {
        self.base(basis).saturating_mul(self.tip_rate / HUNDRED)
    }

    /// `1 + taxRate/100 + tipRate/100`.
    pub fn rate_multiplier(&self) -> Decimal {
        Decimal::ONE + self.tax_rate / HUNDRED + self.tip_rate / HUNDRED
    }

    /// `base × (1 + taxRate/100 + tipRate/100)`, saturating at `Decimal::MAX`.
    pub fn grand_total(&self, basis: Basis) -> Decimal {
        self.base(basis).saturating_mul(self.rate_multiplier())
    }
}

impl Default for Bill {
    fn default() -> Self {
        Self::new()
    }
}
