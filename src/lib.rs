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

//! # Bill Split
//!
//! This library provides the allocation engine behind a bill-splitting
//! editor: given a bill (subtotal, tax and tip rates, line items) and the
//! people sharing it, it works out what everyone owes.
//!
//! ## Core Components
//!
//! - [`Session`]: Editing session owning the bill, participants and modes
//! - [`Bill`]: Subtotal, rates and line items with derived totals
//! - [`ParticipantPool`]: Percentage shares kept summing to 100 while nudged
//! - [`SplitMethod`]: Even, percentage and itemized allocation strategies
//! - [`Edit`]: Every input event the editor can produce
//! - [`SplitError`]: Error types for references to unknown items or people
//!
//! ## Example
//!
//! ```
//! use bill_split::{DisplayMode, Participant, Session, SplitMethod, Step};
//! use rust_decimal_macros::dec;
//!
//! let mut session = Session::new();
//! for (id, name) in [("kw", "Kevin"), ("mp", "Matt"), ("sy", "Shen"), ("dh", "Danny")] {
//!     session.add_participant(Participant::new(id, name)).unwrap();
//! }
//!
//! // Every new item is shared by everyone.
//! let roll = session.add_item();
//! session.set_item_price(roll, "16.00").unwrap();
//!
//! session.set_split_method(SplitMethod::Itemized);
//! assert_eq!(session.allocation().amount(&"kw".into()), dec!(4.00));
//!
//! // Kevin takes one more point of a percentage split.
//! session.set_split_method(SplitMethod::Percentage);
//! session.nudge(&"kw".into(), Step::Up).unwrap();
//! assert_eq!(
//!     session.display(&"kw".into(), DisplayMode::Percentage).unwrap(),
//!     "26%"
//! );
//! ```
//!
//! ## Concurrency
//!
//! A session is a plain owned value. Edits are applied one at a time through
//! `&mut self`; there are no locks and no background work.

mod base;
pub mod bill;
pub mod config;
pub mod edit;
pub mod error;
pub mod format;
pub mod money;
pub mod participant;
pub mod redistribution;
mod session;
pub mod strategy;

pub use base::{ItemId, ParticipantId, Step};
pub use bill::{Basis, Bill, ItemPatch, LineItem};
pub use config::SplitConfig;
pub use edit::Edit;
pub use error::SplitError;
pub use format::{
    DisplayMode, format_chart_label, format_dollars, format_participant, format_percentage,
    format_shares, invitation_message,
};
pub use participant::{Participant, initials_from_name, normalize_percentages};
pub use redistribution::{EditMode, ParticipantPool};
pub use session::Session;
pub use strategy::{
    Allocation, AllocationStrategy, EvenSplit, ItemizedSplit, PercentageSplit, SplitMethod,
    TaxTipPolicy,
};
