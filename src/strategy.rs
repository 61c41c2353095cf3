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

//! Allocation strategies.
//!
//! Each strategy maps a [`Bill`] and its participants to an [`Allocation`]:
//! what every participant owes. Strategies are pure functions of their
//! inputs; the caller picks one through [`SplitMethod`].

use crate::base::ParticipantId;
use crate::bill::{Basis, Bill};
use crate::money::HUNDRED;
use crate::participant::{Participant, normalize_percentages};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Owed amount per participant, in participant order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Allocation {
    amounts: Vec<(ParticipantId, Decimal)>,
}

impl Allocation {
    /// Every participant owing nothing.
    pub fn zeroed(participants: &[Participant]) -> Self {
        participants
            .iter()
            .map(|p| (p.id().clone(), Decimal::ZERO))
            .collect()
    }

    pub fn get(&self, id: &ParticipantId) -> Option<Decimal> {
        self.amounts
            .iter()
            .find(|(owner, _)| owner == id)
            .map(|(_, amount)| *amount)
    }

    /// The participant's amount, or zero if they are not allocated.
    pub fn amount(&self, id: &ParticipantId) -> Decimal {
        self.get(id).unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Decimal {
        self.amounts
            .iter()
            .map(|(_, amount)| *amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, Decimal)> {
        self.amounts.iter().map(|(id, amount)| (id, *amount))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    fn credit(&mut self, id: &ParticipantId, amount: Decimal) {
        if let Some((_, owed)) = self.amounts.iter_mut().find(|(owner, _)| owner == id) {
            *owed = owed.saturating_add(amount);
        }
    }
}

impl FromIterator<(ParticipantId, Decimal)> for Allocation {
    fn from_iter<T: IntoIterator<Item = (ParticipantId, Decimal)>>(iter: T) -> Self {
        Self {
            amounts: iter.into_iter().collect(),
        }
    }
}

/// Maps a bill and its participants to owed amounts.
pub trait AllocationStrategy {
    /// The amount tax and tip are computed against.
    fn basis(&self) -> Basis;

    fn allocate(&self, bill: &Bill, participants: &[Participant]) -> Allocation;
}

/// Everyone owes `grandTotal / n`, computed on the independent subtotal.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenSplit;

impl AllocationStrategy for EvenSplit {
    fn basis(&self) -> Basis {
        Basis::Subtotal
    }

    fn allocate(&self, bill: &Bill, participants: &[Participant]) -> Allocation {
        if participants.is_empty() {
            return Allocation::default();
        }
        let each = bill.grand_total(self.basis()) / Decimal::from(participants.len());
        participants.iter().map(|p| (p.id().clone(), each)).collect()
    }
}

/// Everyone owes `grandTotal × percentage / 100`, after rescaling the
/// percentages to sum to 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageSplit;

impl AllocationStrategy for PercentageSplit {
    fn basis(&self) -> Basis {
        Basis::Items
    }

    fn allocate(&self, bill: &Bill, participants: &[Participant]) -> Allocation {
        let total = bill.grand_total(self.basis());
        let raw: Vec<Decimal> = participants.iter().map(Participant::percentage).collect();
        participants
            .iter()
            .zip(normalize_percentages(&raw))
            .map(|(p, percentage)| (p.id().clone(), share_of(total, percentage)))
            .collect()
    }
}

/// `total × percentage / 100`. Totals too large to multiply first are scaled
/// by the fraction instead.
fn share_of(total: Decimal, percentage: Decimal) -> Decimal {
    match total.checked_mul(percentage) {
        Some(product) => product / HUNDRED,
        None => total.saturating_mul(percentage / HUNDRED),
    }
}

/// How an itemized split treats tax and tip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxTipPolicy {
    /// Participants owe their item shares only; tax and tip stay unallocated.
    #[default]
    Exclude,
    /// Each item share is grossed up by `1 + tax/100 + tip/100`.
    Proportional,
}

/// Each item's extended price is divided evenly among its sharers.
///
/// Items nobody shares contribute nothing, so the allocation may total less
/// than the bill.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemizedSplit {
    pub tax_tip: TaxTipPolicy,
}

impl AllocationStrategy for ItemizedSplit {
    fn basis(&self) -> Basis {
        Basis::Items
    }

    fn allocate(&self, bill: &Bill, participants: &[Participant]) -> Allocation {
        let mut allocation = Allocation::zeroed(participants);
        let factor = match self.tax_tip {
            TaxTipPolicy::Exclude => Decimal::ONE,
            TaxTipPolicy::Proportional => bill.rate_multiplier(),
        };

        for item in bill.items().iter().filter(|item| !item.shared_by.is_empty()) {
            let portion = (item.extended_price() / Decimal::from(item.shared_by.len()))
                .saturating_mul(factor);
            for sharer in &item.shared_by {
                allocation.credit(sharer, portion);
            }
        }
        allocation
    }
}

/// The allocation strategy selected for an editing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    #[default]
    Even,
    Percentage,
    Itemized,
}

impl SplitMethod {
    pub fn basis(self) -> Basis {
        match self {
            SplitMethod::Even => Basis::Subtotal,
            SplitMethod::Percentage | SplitMethod::Itemized => Basis::Items,
        }
    }

    /// Runs the selected strategy.
    pub fn allocate(
        self,
        bill: &Bill,
        participants: &[Participant],
        tax_tip: TaxTipPolicy,
    ) -> Allocation {
        match self {
            SplitMethod::Even => EvenSplit.allocate(bill, participants),
            SplitMethod::Percentage => PercentageSplit.allocate(bill, participants),
            SplitMethod::Itemized => ItemizedSplit { tax_tip }.allocate(bill, participants),
        }
    }
}

impl std::str::FromStr for SplitMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "even" => Ok(SplitMethod::Even),
            "percentage" => Ok(SplitMethod::Percentage),
            "itemized" | "items" => Ok(SplitMethod::Itemized),
            other => Err(format!("unknown split method: {other}")),
        }
    }
}
