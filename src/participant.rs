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

//! Bill participants.

use crate::base::ParticipantId;
use crate::money::HUNDRED;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Someone sharing the bill.
///
/// The percentage and share count are owned by the
/// [`ParticipantPool`](crate::ParticipantPool) the participant belongs to;
/// values given before joining a pool are replaced when it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub(crate) id: ParticipantId,
    pub(crate) name: String,
    pub(crate) initials: String,
    pub(crate) percentage: Decimal,
    pub(crate) shares: u32,
}

impl Participant {
    /// Creates a participant holding one share. Initials are derived from
    /// the name.
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            initials: initials_from_name(&name),
            name,
            percentage: Decimal::ZERO,
            shares: 1,
        }
    }

    pub fn with_initials(mut self, initials: impl Into<String>) -> Self {
        self.initials = initials.into();
        self
    }

    /// Sets the share count, floored at one.
    pub fn with_shares(mut self, shares: u32) -> Self {
        self.shares = shares.max(1);
        self
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// Share of a percentage split, `0..=100`.
    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    /// Relative weight in share editing mode, at least 1.
    pub fn shares(&self) -> u32 {
        self.shares
    }
}

/// First letter of the first and last words, upper-cased.
/// `"Kevin Wu"` → `"KW"`, `"Matt"` → `"M"`.
pub fn initials_from_name(name: &str) -> String {
    let mut words = name.split_whitespace();
    let first = words.next().and_then(|w| w.chars().next());
    let last = words.last().and_then(|w| w.chars().next());
    first
        .into_iter()
        .chain(last)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Rescales `percentages` so they sum to 100.
///
/// A set summing to zero is split evenly; a set already summing to exactly
/// 100 is returned unchanged.
pub fn normalize_percentages(percentages: &[Decimal]) -> Vec<Decimal> {
    if percentages.is_empty() {
        return Vec::new();
    }
    let total: Decimal = percentages.iter().copied().sum();
    if total.is_zero() {
        let even = HUNDRED / Decimal::from(percentages.len());
        return vec![even; percentages.len()];
    }
    if total == HUNDRED {
        return percentages.to_vec();
    }
    percentages.iter().map(|p| p * HUNDRED / total).collect()
}
