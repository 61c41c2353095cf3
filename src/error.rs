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

//! Error types for bill editing.
//!
//! Numeric inputs never produce errors: they are sanitized or clamped at the
//! mutation boundary. Errors are reserved for references to things that do
//! not exist and for unreadable configuration.

use crate::base::{ItemId, ParticipantId};
use thiserror::Error;

/// Bill editing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// Referenced line item does not exist
    #[error("line item {0} not found")]
    ItemNotFound(ItemId),

    /// Referenced participant does not exist
    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    /// A participant with the same ID is already on the bill
    #[error("participant {0} already on this bill")]
    DuplicateParticipant(ParticipantId),

    /// Configuration could not be read or parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
