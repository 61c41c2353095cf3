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

use bill_split::{
    DisplayMode, Edit, EditMode, ItemId, ItemPatch, Session, SplitConfig, SplitMethod, Step,
    format_participant, money,
};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Bill Split - Replay bill edits and print what everyone owes
///
/// Reads a CSV log of editor events, applies them to a fresh session and
/// writes each participant's allocation to stdout.
#[derive(Parser, Debug)]
#[command(name = "bill-split")]
#[command(about = "Splits a bill from a CSV log of edits", long_about = None)]
struct Args {
    /// Path to CSV file with edit events
    ///
    /// Expected format: event,target,value
    /// Example: cargo run -- edits.csv > allocation.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// How the display column is formatted
    #[arg(short, long, default_value = "dollar", value_parser = parse_display_mode)]
    display: DisplayMode,

    /// TOML file overriding rates, steps and the itemized tax/tip policy
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_display_mode(s: &str) -> Result<DisplayMode, String> {
    s.parse()
}

fn main() {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => match SplitConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                process::exit(1);
            }
        },
        None => SplitConfig::default(),
    };

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let session = match process_edits(BufReader::new(file), Session::with_config(config)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error processing edits: {}", e);
            process::exit(1);
        }
    };
    info!(
        method = ?session.method(),
        grand_total = %money::round_money(session.grand_total()),
        "edits applied"
    );

    if let Err(e) = write_allocation(&session, args.display, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `event, target, value`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    event: String,
    target: Option<String>,
    value: Option<String>,
}

fn parse_step(text: &str) -> Option<Step> {
    match text.to_ascii_lowercase().as_str() {
        "up" | "+" => Some(Step::Up),
        "down" | "-" => Some(Step::Down),
        _ => None,
    }
}

fn parse_edit_mode(text: &str) -> Option<EditMode> {
    match text.to_ascii_lowercase().as_str() {
        "percentage" => Some(EditMode::PercentageNudge),
        "share" => Some(EditMode::ShareNudge),
        "direct" => Some(EditMode::DirectEntry),
        _ => None,
    }
}

impl CsvRecord {
    fn item(&self) -> Option<ItemId> {
        self.target.as_deref()?.parse().ok().map(ItemId)
    }

    fn step(&self) -> Option<Step> {
        parse_step(self.value.as_deref()?)
    }

    /// Converts a CSV record to an edit.
    ///
    /// Returns `None` for unknown events or missing required fields.
    fn into_edit(self) -> Option<Edit> {
        let edit = match self.event.to_lowercase().as_str() {
            "subtotal" => Edit::SetSubtotal {
                text: self.value.unwrap_or_default(),
            },
            "tax" => Edit::AdjustTaxRate { step: self.step()? },
            "tip" => Edit::AdjustTipRate { step: self.step()? },
            "add_item" => Edit::AddItem,
            "remove_item" => Edit::RemoveItem { item: self.item()? },
            "duplicate_item" => Edit::DuplicateItem { item: self.item()? },
            "item_name" => Edit::UpdateItem {
                item: self.item()?,
                patch: ItemPatch {
                    name: Some(self.value.unwrap_or_default()),
                    ..ItemPatch::default()
                },
            },
            "item_price" => Edit::SetItemPrice {
                item: self.item()?,
                text: self.value.unwrap_or_default(),
            },
            "item_quantity" => Edit::AdjustItemQuantity {
                item: self.item()?,
                step: self.step()?,
            },
            "toggle_sharer" => Edit::ToggleSharer {
                item: self.item()?,
                participant: self.value?.into(),
            },
            "assign_all" => Edit::AssignAll { item: self.item()? },
            "assign_none" => Edit::AssignNone { item: self.item()? },
            "add_participant" => {
                let participant = self.target?;
                Edit::AddParticipant {
                    name: self.value.unwrap_or_else(|| participant.clone()),
                    participant: participant.into(),
                }
            }
            "remove_participant" => Edit::RemoveParticipant {
                participant: self.target?.into(),
            },
            "method" => Edit::SetSplitMethod {
                method: self.value?.parse::<SplitMethod>().ok()?,
            },
            "edit_mode" => Edit::SetEditMode {
                mode: parse_edit_mode(self.value.as_deref()?)?,
            },
            "nudge" => Edit::Nudge {
                step: self.step()?,
                participant: self.target?.into(),
            },
            "set_percentage" => Edit::EnterPercentage {
                value: self.value?.parse::<Decimal>().ok()?,
                participant: self.target?.into(),
            },
            _ => return None,
        };
        Some(edit)
    }
}

/// Applies edits from a CSV reader to `session`.
///
/// Malformed rows, unknown events and edits the session rejects are logged
/// and skipped.
///
/// # CSV Format
///
/// Expected columns: `event, target, value`
/// - `event`: what happened (`subtotal`, `tax`, `add_item`, `nudge`, ...)
/// - `target`: item ID or participant ID, when the event has one
/// - `value`: text, `up`/`down`, a method name or a percentage
///
/// # Example
///
/// ```csv
/// event,target,value
/// add_participant,kw,Kevin
/// add_participant,mp,Matt
/// subtotal,,40.00
/// tax,,up
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_edits<R: Read>(reader: R, mut session: Session) -> Result<Session, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!(line, "skipping malformed row: {}", e);
                continue;
            }
        };

        let event = record.event.clone();
        let Some(edit) = record.into_edit() else {
            warn!(line, %event, "skipping invalid edit record");
            continue;
        };

        if let Err(e) = session.apply(edit) {
            warn!(line, %event, "skipping edit: {}", e);
        }
    }

    Ok(session)
}

/// One output row per participant.
#[derive(Debug, Serialize)]
struct AllocationRow<'a> {
    participant: &'a str,
    name: &'a str,
    amount: Decimal,
    percentage: Decimal,
    shares: u32,
    display: String,
}

/// Writes the session's allocation as CSV.
///
/// # CSV Format
///
/// Columns: `participant, name, amount, percentage, shares, display`
///
/// # Example
///
/// ```csv
/// participant,name,amount,percentage,shares,display
/// kw,Kevin,25.50,50.0000,1,$25.50
/// mp,Matt,25.50,50.0000,1,$25.50
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_allocation<W: Write>(
    session: &Session,
    mode: DisplayMode,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    let allocation = session.allocation();
    let total_shares = session.pool().total_shares();

    for participant in session.participants() {
        let mut amount = money::round_money(allocation.amount(participant.id()));
        amount.rescale(money::MONEY_DP);
        let mut percentage = participant.percentage().round_dp(4);
        percentage.rescale(4);
        wtr.serialize(AllocationRow {
            participant: participant.id().as_str(),
            name: participant.name(),
            amount,
            percentage,
            shares: participant.shares(),
            display: format_participant(&allocation, participant, total_shares, mode),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
