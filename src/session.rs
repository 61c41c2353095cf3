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

//! Bill editing session.
//!
//! The [`Session`] owns everything one bill editor works on: the [`Bill`],
//! the [`ParticipantPool`], the active [`SplitMethod`] and [`EditMode`]. All
//! mutations go through it so that cascades (a participant leaving every
//! item they shared) happen in one place.
//!
//! # Edit Processing
//!
//! - **Bill edits**: subtotal text, tax and tip steps, line item changes.
//! - **Participant edits**: joining, leaving, nudging and typing shares.
//! - **Mode edits**: the allocation strategy and the share editing rule.
//!
//! Numeric input is sanitized or clamped and never rejected. Only references
//! to unknown items or participants, and duplicate participants, fail.

use crate::base::{ItemId, ParticipantId, Step};
use crate::bill::{Bill, ItemPatch};
use crate::config::SplitConfig;
use crate::edit::Edit;
use crate::error::SplitError;
use crate::format::{DisplayMode, format_chart_label, format_participant};
use crate::participant::Participant;
use crate::redistribution::{EditMode, ParticipantPool};
use crate::strategy::{Allocation, SplitMethod};
use rust_decimal::Decimal;
use tracing::debug;

/// One bill editing session.
///
/// # Example
///
/// ```
/// use bill_split::{Participant, Session, SplitMethod};
/// use rust_decimal_macros::dec;
///
/// let mut session = Session::new();
/// session.add_participant(Participant::new("kw", "Kevin")).unwrap();
/// session.add_participant(Participant::new("mp", "Matt")).unwrap();
/// session.set_subtotal("40.00");
///
/// let allocation = session.allocation();
/// assert_eq!(allocation.amount(&"kw".into()), dec!(25.50));
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    config: SplitConfig,
    bill: Bill,
    pool: ParticipantPool,
    method: SplitMethod,
    edit_mode: EditMode,
}

impl Session {
    /// Creates an empty session with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SplitConfig::default())
    }

    pub fn with_config(config: SplitConfig) -> Self {
        Session {
            bill: Bill::with_config(&config),
            pool: ParticipantPool::with_step(config.percentage_step),
            method: SplitMethod::default(),
            edit_mode: EditMode::default(),
            config,
        }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn pool(&self) -> &ParticipantPool {
        &self.pool
    }

    pub fn participants(&self) -> &[Participant] {
        self.pool.participants()
    }

    pub fn method(&self) -> SplitMethod {
        self.method
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    fn participant_ids(&self) -> Vec<ParticipantId> {
        self.pool.ids().cloned().collect()
    }

    fn require_participant(&self, id: &ParticipantId) -> Result<(), SplitError> {
        if self.pool.contains(id) {
            Ok(())
        } else {
            Err(SplitError::ParticipantNotFound(id.clone()))
        }
    }

    // === Bill ===

    pub fn set_subtotal(&mut self, text: &str) {
        self.bill.set_subtotal(text);
    }

    pub fn adjust_tax_rate(&mut self, step: Step) {
        self.bill.adjust_tax_rate(step);
    }

    pub fn adjust_tip_rate(&mut self, step: Step) {
        self.bill.adjust_tip_rate(step);
    }

    /// Adds a blank item shared by every current participant.
    pub fn add_item(&mut self) -> ItemId {
        let everyone = self.participant_ids();
        self.bill.add_item(&everyone)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<(), SplitError> {
        self.bill.remove_item(id).map(|_| ())
    }

    pub fn duplicate_item(&mut self, id: ItemId) -> Result<ItemId, SplitError> {
        self.bill.duplicate_item(id)
    }

    pub fn update_item(&mut self, id: ItemId, patch: ItemPatch) -> Result<(), SplitError> {
        self.bill.update_item(id, patch)
    }

    pub fn set_item_price(&mut self, id: ItemId, text: &str) -> Result<(), SplitError> {
        self.bill.set_item_price_text(id, text)
    }

    pub fn adjust_item_quantity(&mut self, id: ItemId, step: Step) -> Result<(), SplitError> {
        self.bill.adjust_item_quantity(id, step)
    }

    /// Adds or removes a participant from an item's sharers.
    ///
    /// # Errors
    ///
    /// - [`SplitError::ParticipantNotFound`] - The participant is not on the bill.
    /// - [`SplitError::ItemNotFound`] - The item does not exist.
    pub fn toggle_sharer(
        &mut self,
        id: ItemId,
        participant: &ParticipantId,
    ) -> Result<(), SplitError> {
        self.require_participant(participant)?;
        self.bill.toggle_sharer(id, participant)
    }

    /// Shares an item among every current participant.
    pub fn assign_all(&mut self, id: ItemId) -> Result<(), SplitError> {
        let everyone = self.participant_ids();
        self.bill.assign_all(id, &everyone)
    }

    pub fn assign_none(&mut self, id: ItemId) -> Result<(), SplitError> {
        self.bill.assign_none(id)
    }

    // === Participants ===

    /// Adds a participant to the percentage pool. Existing items are not
    /// assigned to them.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), SplitError> {
        self.pool.add(participant, self.edit_mode)
    }

    /// Removes a participant, strips them from every item and renormalizes
    /// the remaining percentages. Confirmation is the caller's concern.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Result<Participant, SplitError> {
        let removed = self.pool.remove(id)?;
        self.bill.remove_sharer(id);
        Ok(removed)
    }

    // === Modes ===

    pub fn set_split_method(&mut self, method: SplitMethod) {
        debug!(?method, "split method changed");
        self.method = method;
    }

    /// Selects the share editing rule. Entering share mode re-derives every
    /// percentage from share counts.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        debug!(?mode, "edit mode changed");
        self.edit_mode = mode;
        if mode == EditMode::ShareNudge {
            self.pool.derive_from_shares();
        }
    }

    /// Nudges a participant's share under the current edit mode.
    pub fn nudge(&mut self, id: &ParticipantId, step: Step) -> Result<(), SplitError> {
        self.pool.nudge(id, step, self.edit_mode)
    }

    /// Sets a typed percentage, capped by the headroom others leave. Ignored
    /// in share mode, where percentages follow share counts.
    pub fn enter_percentage(&mut self, id: &ParticipantId, value: Decimal) -> Result<(), SplitError> {
        self.pool.enter(id, value, self.edit_mode)
    }

    // === Results ===

    /// Grand total under the active split method's basis.
    pub fn grand_total(&self) -> Decimal {
        self.bill.grand_total(self.method.basis())
    }

    /// Runs the active strategy over the current state.
    pub fn allocation(&self) -> Allocation {
        self.method
            .allocate(&self.bill, self.pool.participants(), self.config.itemized_tax_tip)
    }

    /// Formats one participant's portion for the participant list.
    pub fn display(&self, id: &ParticipantId, mode: DisplayMode) -> Result<String, SplitError> {
        let participant = self
            .pool
            .get(id)
            .ok_or_else(|| SplitError::ParticipantNotFound(id.clone()))?;
        Ok(format_participant(
            &self.allocation(),
            participant,
            self.pool.total_shares(),
            mode,
        ))
    }

    /// Formats one participant's pie-chart label.
    pub fn chart_label(&self, id: &ParticipantId, mode: DisplayMode) -> Result<String, SplitError> {
        let participant = self
            .pool
            .get(id)
            .ok_or_else(|| SplitError::ParticipantNotFound(id.clone()))?;
        Ok(format_chart_label(
            &self.allocation(),
            participant,
            self.pool.normalized_percentage(id)?,
            self.pool.total_shares(),
            mode,
        ))
    }

    /// Applies one edit event.
    ///
    /// # Errors
    ///
    /// - [`SplitError::ItemNotFound`] - The edit names an unknown item.
    /// - [`SplitError::ParticipantNotFound`] - The edit names an unknown participant.
    /// - [`SplitError::DuplicateParticipant`] - The joining participant's ID is taken.
    pub fn apply(&mut self, edit: Edit) -> Result<(), SplitError> {
        match edit {
            Edit::SetSubtotal { text } => self.set_subtotal(&text),
            Edit::AdjustTaxRate { step } => self.adjust_tax_rate(step),
            Edit::AdjustTipRate { step } => self.adjust_tip_rate(step),
            Edit::AddItem => {
                self.add_item();
            }
            Edit::RemoveItem { item } => self.remove_item(item)?,
            Edit::DuplicateItem { item } => {
                self.duplicate_item(item)?;
            }
            Edit::UpdateItem { item, patch } => self.update_item(item, patch)?,
            Edit::SetItemPrice { item, text } => self.set_item_price(item, &text)?,
            Edit::AdjustItemQuantity { item, step } => self.adjust_item_quantity(item, step)?,
            Edit::ToggleSharer { item, participant } => self.toggle_sharer(item, &participant)?,
            Edit::AssignAll { item } => self.assign_all(item)?,
            Edit::AssignNone { item } => self.assign_none(item)?,
            Edit::AddParticipant { participant, name } => {
                self.add_participant(Participant::new(participant, name))?
            }
            Edit::RemoveParticipant { participant } => {
                self.remove_participant(&participant)?;
            }
            Edit::SetSplitMethod { method } => self.set_split_method(method),
            Edit::SetEditMode { mode } => self.set_edit_mode(mode),
            Edit::Nudge { participant, step } => self.nudge(&participant, step)?,
            Edit::EnterPercentage { participant, value } => {
                self.enter_percentage(&participant, value)?
            }
        }
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
