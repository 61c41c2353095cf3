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

//! Money and percentage primitives.
//!
//! Every amount and percentage in the crate is a [`Decimal`]. Base amounts
//! multiplied by rate factors are exact; only non-terminating divisions
//! (a third of a bill, say) introduce drift, and [`PERCENT_TOLERANCE`] bounds it.
//!
//! # Example
//!
//! ```
//! use bill_split::money::{parse_amount, sanitize_numeric_input};
//! use rust_decimal_macros::dec;
//!
//! assert_eq!(sanitize_numeric_input("$1a2.3.4"), "12.34");
//! assert_eq!(parse_amount("12."), dec!(12));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// One hundred percent.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Allowed drift when checking that percentages sum to [`HUNDRED`] or that
/// amounts sum to a grand total.
pub const PERCENT_TOLERANCE: Decimal = dec!(0.000001);

/// Decimal places shown for dollar amounts.
pub const MONEY_DP: u32 = 2;

/// Largest amount a user can enter. Parsed prices and subtotals are capped
/// here so that quantities and rate multipliers stay within `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Keeps ASCII digits and the first decimal point; drops everything else.
pub fn sanitize_numeric_input(text: &str) -> String {
    let mut seen_point = false;
    text.chars()
        .filter(|c| match c {
            '0'..='9' => true,
            '.' if !seen_point => {
                seen_point = true;
                true
            }
            _ => false,
        })
        .collect()
}

/// Parses user-entered numeric text into an amount.
///
/// The text is sanitized first. Text with no digits parses as zero and
/// anything above [`MAX_AMOUNT`] (including text too long to represent) is
/// capped at it. A leading or trailing point is accepted (`".5"`, `"12."`).
pub fn parse_amount(text: &str) -> Decimal {
    let sanitized = sanitize_numeric_input(text);
    let trimmed = sanitized.strip_suffix('.').unwrap_or(&sanitized);
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let normalized = if trimmed.starts_with('.') {
        format!("0{trimmed}")
    } else {
        trimmed.to_owned()
    };
    match normalized.parse::<Decimal>() {
        Ok(amount) => clamp_amount(amount),
        Err(_) => {
            let whole = normalized.split('.').next().unwrap_or_default();
            if whole.trim_start_matches('0').is_empty() {
                Decimal::ZERO
            } else {
                MAX_AMOUNT
            }
        }
    }
}

/// Restricts `value` to `[min, max]`.
pub fn clamp(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    value.max(min).min(max)
}

/// Restricts an amount to `[0, MAX_AMOUNT]`.
pub fn clamp_amount(value: Decimal) -> Decimal {
    clamp(value, Decimal::ZERO, MAX_AMOUNT)
}

/// Restricts a percentage to `[0, 100]`.
pub fn clamp_percentage(value: Decimal) -> Decimal {
    clamp(value, Decimal::ZERO, HUNDRED)
}

/// Rounds to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to whole dollars, half away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to a whole number for display.
pub fn round_percentage(value: Decimal) -> Decimal {
    round_whole(value)
}

/// Returns `true` when `a` and `b` differ by at most [`PERCENT_TOLERANCE`].
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= PERCENT_TOLERANCE
}
