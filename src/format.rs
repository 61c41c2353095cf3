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

//! Display strings for allocations.
//!
//! These are the only values handed to the UI layer. All functions are pure.
//!
//! # Example
//!
//! ```
//! use bill_split::{Allocation, DisplayMode, Participant, ParticipantId, format_participant};
//! use rust_decimal_macros::dec;
//!
//! let kevin = Participant::new("kw", "Kevin");
//! let allocation: Allocation = [(ParticipantId::from("kw"), dec!(32))].into_iter().collect();
//! assert_eq!(format_participant(&allocation, &kevin, 4, DisplayMode::Dollar), "$32.00");
//! assert_eq!(format_participant(&allocation, &kevin, 4, DisplayMode::Share), "1/4");
//! ```

use crate::money::{MONEY_DP, round_money, round_percentage, round_whole};
use crate::participant::Participant;
use crate::strategy::Allocation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base URL of shareable split sessions.
pub const JOIN_URL: &str = "https://split-app.com/join";

/// How a participant's portion is shown. Only affects formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Dollar,
    Share,
    #[default]
    Percentage,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dollar" => Ok(DisplayMode::Dollar),
            "share" => Ok(DisplayMode::Share),
            "percentage" => Ok(DisplayMode::Percentage),
            other => Err(format!("unknown display mode: {other}")),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayMode::Dollar => "dollar",
            DisplayMode::Share => "share",
            DisplayMode::Percentage => "percentage",
        };
        f.write_str(name)
    }
}

fn with_scale(mut value: Decimal, scale: u32) -> Decimal {
    value.rescale(scale);
    value
}

/// `"$12.34"`.
pub fn format_dollars(amount: Decimal) -> String {
    format!("${}", with_scale(round_money(amount), MONEY_DP))
}

/// `"25%"`.
pub fn format_percentage(percentage: Decimal) -> String {
    format!("{}%", with_scale(round_percentage(percentage), 0))
}

/// `"2/5"`.
pub fn format_shares(shares: u32, total_shares: u32) -> String {
    format!("{shares}/{total_shares}")
}

/// Formats one participant's portion for the participant list.
pub fn format_participant(
    allocation: &Allocation,
    participant: &Participant,
    total_shares: u32,
    mode: DisplayMode,
) -> String {
    match mode {
        DisplayMode::Dollar => format_dollars(allocation.amount(participant.id())),
        DisplayMode::Share => format_shares(participant.shares(), total_shares),
        DisplayMode::Percentage => format_percentage(participant.percentage()),
    }
}

/// Shorter label for a pie-chart slice: dollars are shown without cents.
/// `slice_percentage` is the normalized percentage the slice is drawn with.
pub fn format_chart_label(
    allocation: &Allocation,
    participant: &Participant,
    slice_percentage: Decimal,
    total_shares: u32,
    mode: DisplayMode,
) -> String {
    match mode {
        DisplayMode::Dollar => format!(
            "${}",
            with_scale(round_whole(allocation.amount(participant.id())), 0)
        ),
        DisplayMode::Share => format_shares(participant.shares(), total_shares),
        DisplayMode::Percentage => format_percentage(slice_percentage),
    }
}

/// Message handed to the share sheet to invite others into a split session.
pub fn invitation_message(bill_name: &str, receipt_id: &str) -> String {
    format!("Join \"{bill_name}\" bill splitting session: {JOIN_URL}/{receipt_id}")
}
