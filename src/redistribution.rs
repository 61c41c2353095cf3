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

//! Interactive redistribution of percentage shares.
//!
//! The [`ParticipantPool`] keeps every participant's percentage summing to
//! 100 while the user nudges one share at a time. Which rule a nudge follows
//! is chosen by [`EditMode`]:
//!
//! | Mode | Rule |
//! |------|------|
//! | `PercentageNudge` | P moves one point; the others absorb the change in proportion to their shares |
//! | `ShareNudge` | P's share count moves by one; every percentage becomes `shares / Σshares × 100` |
//! | `DirectEntry` | P takes the typed value, capped by the headroom the others leave |
//!
//! # Example
//!
//! ```
//! use bill_split::{ParticipantPool, Participant, EditMode, Step};
//! use rust_decimal_macros::dec;
//!
//! let mut pool = ParticipantPool::new();
//! for (id, name) in [("kw", "Kevin"), ("mp", "Matt")] {
//!     pool.add(Participant::new(id, name), EditMode::PercentageNudge).unwrap();
//! }
//! pool.nudge_percentage(&"kw".into(), Step::Up).unwrap();
//! assert_eq!(pool.get(&"kw".into()).unwrap().percentage(), dec!(51));
//! assert_eq!(pool.get(&"mp".into()).unwrap().percentage(), dec!(49));
//! ```

use crate::base::{ParticipantId, Step};
use crate::error::SplitError;
use crate::money::{HUNDRED, PERCENT_TOLERANCE, approx_eq, clamp_percentage};
use crate::participant::{Participant, normalize_percentages};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Recomputation rule applied when a participant's share is edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    PercentageNudge,
    ShareNudge,
    DirectEntry,
}

/// Participants of one bill and their percentage shares.
///
/// # Invariants
///
/// - Every percentage lies in `[0, 100]` and every share count is at least 1.
/// - After any mutation other than [`enter_percentage`](Self::enter_percentage)
///   the percentages sum to 100 within [`PERCENT_TOLERANCE`]. Direct entry
///   may leave unassigned headroom, which the next nudge redistributes.
#[derive(Debug, Clone)]
pub struct ParticipantPool {
    participants: Vec<Participant>,
    /// Points moved by one percentage nudge.
    step: Decimal,
}

impl ParticipantPool {
    const DEFAULT_STEP: Decimal = dec!(1);

    pub fn new() -> Self {
        Self::with_step(Self::DEFAULT_STEP)
    }

    pub fn with_step(step: Decimal) -> Self {
        Self {
            participants: Vec::new(),
            step,
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.iter().map(|p| &p.id)
    }

    pub fn total_percentage(&self) -> Decimal {
        self.participants.iter().map(|p| p.percentage).sum()
    }

    pub fn total_shares(&self) -> u32 {
        self.participants.iter().map(|p| p.shares).sum()
    }

    /// The participant's percentage after rescaling the pool to 100, as the
    /// percentage split sees it.
    pub fn normalized_percentage(&self, id: &ParticipantId) -> Result<Decimal, SplitError> {
        let index = self.index_of(id)?;
        let current: Vec<Decimal> = self.participants.iter().map(|p| p.percentage).collect();
        Ok(normalize_percentages(&current)
            .get(index)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    fn index_of(&self, id: &ParticipantId) -> Result<usize, SplitError> {
        self.participants
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| SplitError::ParticipantNotFound(id.clone()))
    }

    fn assert_invariants(&self) {
        for p in &self.participants {
            debug_assert!(
                p.percentage >= Decimal::ZERO && p.percentage <= HUNDRED,
                "Invariant violated: percentage of {} out of range: {}",
                p.id,
                p.percentage
            );
            debug_assert!(
                p.shares >= 1,
                "Invariant violated: {} holds no shares",
                p.id
            );
        }
        debug_assert!(
            self.total_percentage() <= HUNDRED + PERCENT_TOLERANCE,
            "Invariant violated: percentages exceed 100: {}",
            self.total_percentage()
        );
    }

    fn assert_balanced(&self) {
        self.assert_invariants();
        debug_assert!(
            self.is_empty() || approx_eq(self.total_percentage(), HUNDRED),
            "Invariant violated: percentages sum to {}",
            self.total_percentage()
        );
    }

    // === Membership ===

    /// Adds a participant with their share count.
    ///
    /// In [`EditMode::ShareNudge`] every percentage is re-derived from share
    /// counts. Otherwise the newcomer receives `100 / (n + 1)` and everyone
    /// else is scaled down proportionally.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::DuplicateParticipant`] if the ID is taken.
    pub fn add(&mut self, mut participant: Participant, mode: EditMode) -> Result<(), SplitError> {
        if self.contains(&participant.id) {
            return Err(SplitError::DuplicateParticipant(participant.id));
        }
        participant.shares = participant.shares.max(1);

        let count = Decimal::from(self.participants.len());
        let joined = count + Decimal::ONE;
        for p in &mut self.participants {
            p.percentage = p.percentage * count / joined;
        }
        participant.percentage = HUNDRED / joined;
        debug!(participant = %participant.id, "participant joined");
        self.participants.push(participant);

        match mode {
            EditMode::ShareNudge => self.derive_from_shares(),
            EditMode::PercentageNudge | EditMode::DirectEntry => self.renormalize(),
        }
        self.assert_balanced();
        Ok(())
    }

    /// Removes a participant and renormalizes the rest to 100.
    pub fn remove(&mut self, id: &ParticipantId) -> Result<Participant, SplitError> {
        let index = self.index_of(id)?;
        let removed = self.participants.remove(index);
        self.renormalize();
        debug!(participant = %id, "participant left");
        self.assert_balanced();
        Ok(removed)
    }

    // === Rebalancing ===

    /// Rescales percentages to sum to 100; an all-zero pool is split evenly.
    pub fn renormalize(&mut self) {
        let current: Vec<Decimal> = self.participants.iter().map(|p| p.percentage).collect();
        for (p, normalized) in self
            .participants
            .iter_mut()
            .zip(normalize_percentages(&current))
        {
            p.percentage = clamp_percentage(normalized);
        }
    }

    /// Sets every percentage to `shares / Σshares × 100`.
    pub fn derive_from_shares(&mut self) {
        let total = Decimal::from(self.total_shares());
        if total.is_zero() {
            return;
        }
        for p in &mut self.participants {
            p.percentage = Decimal::from(p.shares) * HUNDRED / total;
        }
    }

    // === Editing ===

    /// Applies one nudge under `mode`. Direct entry has no nudge of its own
    /// and follows the percentage rule.
    pub fn nudge(
        &mut self,
        id: &ParticipantId,
        step: Step,
        mode: EditMode,
    ) -> Result<(), SplitError> {
        match mode {
            EditMode::ShareNudge => self.nudge_shares(id, step),
            EditMode::PercentageNudge | EditMode::DirectEntry => self.nudge_percentage(id, step),
        }
    }

    /// Moves one participant by one step within `[0, 100]`; the others absorb
    /// the opposite change in proportion to their current shares, or evenly
    /// when they hold nothing.
    pub fn nudge_percentage(&mut self, id: &ParticipantId, step: Step) -> Result<(), SplitError> {
        let index = self.index_of(id)?;
        self.renormalize();

        let current = self.participants[index].percentage;
        let target = clamp_percentage(step.apply(current, self.step));
        let change = target - current;
        if change.is_zero() {
            return Ok(());
        }

        let others = self.participants.len() - 1;
        let others_total = self.total_percentage() - current;
        for (i, p) in self.participants.iter_mut().enumerate() {
            if i == index {
                p.percentage = target;
                continue;
            }
            let delta = if others_total > Decimal::ZERO {
                -change * p.percentage / others_total
            } else {
                -change / Decimal::from(others)
            };
            p.percentage = clamp_percentage(p.percentage + delta);
        }
        self.renormalize();
        trace!(participant = %id, ?step, percentage = %self.participants[index].percentage, "percentage nudged");
        self.assert_balanced();
        Ok(())
    }

    /// Moves one participant's share count by one (never below 1) and
    /// re-derives every percentage from the new share total.
    pub fn nudge_shares(&mut self, id: &ParticipantId, step: Step) -> Result<(), SplitError> {
        let index = self.index_of(id)?;
        let participant = &mut self.participants[index];
        participant.shares = step.apply_count(participant.shares, 1);
        self.derive_from_shares();
        trace!(participant = %id, ?step, shares = self.participants[index].shares, "shares nudged");
        self.assert_balanced();
        Ok(())
    }

    /// Applies a typed percentage under `mode`. In share mode percentages
    /// follow share counts, so the entry is dropped and the share ratios are
    /// re-applied.
    pub fn enter(
        &mut self,
        id: &ParticipantId,
        value: Decimal,
        mode: EditMode,
    ) -> Result<(), SplitError> {
        match mode {
            EditMode::ShareNudge => {
                self.index_of(id)?;
                self.derive_from_shares();
                debug!(participant = %id, %value, "direct entry ignored in share mode");
                self.assert_balanced();
                Ok(())
            }
            EditMode::PercentageNudge | EditMode::DirectEntry => self.enter_percentage(id, value),
        }
    }

    /// Sets a typed percentage. The value is clamped to `[0, 100]` and then
    /// to whatever the other participants leave free; they are not adjusted.
    pub fn enter_percentage(&mut self, id: &ParticipantId, value: Decimal) -> Result<(), SplitError> {
        let index = self.index_of(id)?;
        let others: Decimal = self
            .participants
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.percentage)
            .sum();
        let headroom = (HUNDRED - others).max(Decimal::ZERO);
        let entered = clamp_percentage(value).min(headroom);
        self.participants[index].percentage = entered;
        trace!(participant = %id, %entered, "percentage entered");
        self.assert_invariants();
        Ok(())
    }
}

impl Default for ParticipantPool {
    fn default() -> Self {
        Self::new()
    }
}
