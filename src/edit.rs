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

//! Edit events.
//!
//! Every input the bill editor produces (text edits, step buttons, toggles,
//! adding and removing things) is one [`Edit`]. A
//! [`Session`](crate::Session) applies them one at a time, in order.

use crate::base::{ItemId, ParticipantId, Step};
use crate::bill::ItemPatch;
use crate::redistribution::EditMode;
use crate::strategy::SplitMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Edit {
    SetSubtotal {
        text: String,
    },
    AdjustTaxRate {
        step: Step,
    },
    AdjustTipRate {
        step: Step,
    },
    AddItem,
    RemoveItem {
        item: ItemId,
    },
    DuplicateItem {
        item: ItemId,
    },
    UpdateItem {
        item: ItemId,
        patch: ItemPatch,
    },
    SetItemPrice {
        item: ItemId,
        text: String,
    },
    AdjustItemQuantity {
        item: ItemId,
        step: Step,
    },
    ToggleSharer {
        item: ItemId,
        participant: ParticipantId,
    },
    AssignAll {
        item: ItemId,
    },
    AssignNone {
        item: ItemId,
    },
    AddParticipant {
        participant: ParticipantId,
        name: String,
    },
    RemoveParticipant {
        participant: ParticipantId,
    },
    SetSplitMethod {
        method: SplitMethod,
    },
    SetEditMode {
        mode: EditMode,
    },
    Nudge {
        participant: ParticipantId,
        step: Step,
    },
    EnterPercentage {
        participant: ParticipantId,
        value: Decimal,
    },
}

impl Edit {
    /// The line item this edit targets, if any.
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::RemoveItem { item }
            | Self::DuplicateItem { item }
            | Self::UpdateItem { item, .. }
            | Self::SetItemPrice { item, .. }
            | Self::AdjustItemQuantity { item, .. }
            | Self::ToggleSharer { item, .. }
            | Self::AssignAll { item }
            | Self::AssignNone { item } => Some(*item),
            _ => None,
        }
    }

    /// The participant this edit targets, if any.
    pub fn participant(&self) -> Option<&ParticipantId> {
        match self {
            Self::ToggleSharer { participant, .. }
            | Self::AddParticipant { participant, .. }
            | Self::RemoveParticipant { participant }
            | Self::Nudge { participant, .. }
            | Self::EnterPercentage { participant, .. } => Some(participant),
            _ => None,
        }
    }

    /// Edits the UI confirms with the user before sending.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::RemoveItem { .. } | Self::RemoveParticipant { .. })
    }
}
