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

//! Session public API integration tests.

use bill_split::money::{HUNDRED, approx_eq};
use bill_split::{
    Basis, DisplayMode, Edit, EditMode, ItemId, ItemPatch, Participant, ParticipantId, Session,
    SplitConfig, SplitError, SplitMethod, Step, TaxTipPolicy,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// === Helper Functions ===

fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}

fn make_join(id: &str, name: &str) -> Edit {
    Edit::AddParticipant {
        participant: pid(id),
        name: name.to_owned(),
    }
}

fn make_price(item: u32, text: &str) -> Edit {
    Edit::SetItemPrice {
        item: ItemId(item),
        text: text.to_owned(),
    }
}

fn make_nudge(id: &str, step: Step) -> Edit {
    Edit::Nudge {
        participant: pid(id),
        step,
    }
}

/// Kevin, Matt, Shen and Danny, with the four-item sushi order shared by all.
fn sushi_night() -> Session {
    let mut session = Session::new();
    for (id, name) in [("kw", "Kevin"), ("mp", "Matt"), ("sy", "Shen"), ("dh", "Danny")] {
        session.apply(make_join(id, name)).unwrap();
    }
    for (item, price) in [(1, "16.00"), (2, "12.00"), (3, "50.00"), (4, "50.00")] {
        session.apply(Edit::AddItem).unwrap();
        session.apply(make_price(item, price)).unwrap();
    }
    session
}

fn percentage(session: &Session, id: &str) -> Decimal {
    session.pool().get(&pid(id)).unwrap().percentage()
}

// === Even Split ===

#[test]
fn even_split_uses_independent_subtotal() {
    let mut session = sushi_night();
    session.set_subtotal("78.00");

    assert_eq!(session.method(), SplitMethod::Even);
    assert_eq!(session.grand_total(), dec!(99.45));
    let allocation = session.allocation();
    assert_eq!(allocation.amount(&pid("kw")), dec!(24.8625));
    assert!(approx_eq(allocation.total(), session.grand_total()));
}

#[test]
fn even_split_follows_rate_steps() {
    let mut session = sushi_night();
    session.set_subtotal("100");
    session.apply(Edit::AdjustTaxRate { step: Step::Down }).unwrap();
    session.apply(Edit::AdjustTipRate { step: Step::Up }).unwrap();

    // 7% tax, 21% tip
    assert_eq!(session.grand_total(), dec!(128));
    assert_eq!(session.allocation().amount(&pid("dh")), dec!(32));
}

#[test]
fn even_split_without_participants_is_empty() {
    let mut session = Session::new();
    session.set_subtotal("50");
    assert!(session.allocation().is_empty());
}

// === Itemized Split ===

#[test]
fn itemized_split_shares_all_items_equally() {
    let mut session = sushi_night();
    session.apply(Edit::SetSplitMethod { method: SplitMethod::Itemized }).unwrap();

    assert_eq!(session.bill().items_subtotal(), dec!(128.00));
    for participant in session.participants() {
        assert_eq!(session.allocation().amount(participant.id()), dec!(32.00));
    }
}

#[test]
fn itemized_split_follows_toggles() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Itemized);
    // Only Kevin and Matt drink the sake
    for item in [3, 4] {
        session.toggle_sharer(ItemId(item), &pid("sy")).unwrap();
        session.toggle_sharer(ItemId(item), &pid("dh")).unwrap();
    }

    let allocation = session.allocation();
    assert_eq!(allocation.amount(&pid("kw")), dec!(57.00));
    assert_eq!(allocation.amount(&pid("sy")), dec!(7.00));
    assert_eq!(allocation.total(), dec!(128.00));
}

#[test]
fn itemized_unassigned_item_is_not_allocated() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Itemized);
    session.assign_none(ItemId(3)).unwrap();

    let allocation = session.allocation();
    assert_eq!(allocation.amount(&pid("mp")), dec!(19.50));
    assert_eq!(allocation.total(), dec!(78.00));
}

#[test]
fn itemized_quantity_counts() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Itemized);
    session.adjust_item_quantity(ItemId(1), Step::Up).unwrap();

    assert_eq!(session.allocation().amount(&pid("kw")), dec!(36.00));
}

#[test]
fn itemized_proportional_tax_tip_allocates_grand_total() {
    let config = SplitConfig {
        itemized_tax_tip: TaxTipPolicy::Proportional,
        ..SplitConfig::default()
    };
    let mut session = Session::with_config(config);
    session.add_participant(Participant::new("kw", "Kevin")).unwrap();
    session.add_participant(Participant::new("mp", "Matt")).unwrap();
    let item = session.add_item();
    session.set_item_price(item, "40").unwrap();
    session.set_split_method(SplitMethod::Itemized);

    assert_eq!(session.allocation().amount(&pid("kw")), dec!(25.50));
    assert_eq!(session.allocation().total(), session.grand_total());
}

// === Percentage Split ===

#[test]
fn percentage_nudge_redistributes_proportionally() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    session.apply(make_nudge("kw", Step::Up)).unwrap();

    assert!(approx_eq(percentage(&session, "kw"), dec!(26)));
    for id in ["mp", "sy", "dh"] {
        assert!(approx_eq(percentage(&session, id), dec!(24.666666667)));
    }
    assert!(approx_eq(session.pool().total_percentage(), HUNDRED));
    assert!(approx_eq(session.allocation().total(), session.grand_total()));
}

#[test]
fn percentage_display_modes() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    session.nudge(&pid("kw"), Step::Up).unwrap();

    assert_eq!(session.display(&pid("kw"), DisplayMode::Percentage).unwrap(), "26%");
    assert_eq!(session.display(&pid("mp"), DisplayMode::Percentage).unwrap(), "25%");
    // 163.20 × 26%
    assert_eq!(session.display(&pid("kw"), DisplayMode::Dollar).unwrap(), "$42.43");
    assert_eq!(session.chart_label(&pid("kw"), DisplayMode::Dollar).unwrap(), "$42");
    assert_eq!(session.display(&pid("kw"), DisplayMode::Share).unwrap(), "1/4");
}

#[test]
fn share_mode_rederives_percentages() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    session.set_edit_mode(EditMode::ShareNudge);
    session.nudge(&pid("sy"), Step::Up).unwrap();
    session.nudge(&pid("sy"), Step::Up).unwrap();

    assert_eq!(percentage(&session, "sy"), dec!(50));
    assert_eq!(percentage(&session, "kw"), dec!(50) / dec!(3));
    assert_eq!(session.display(&pid("sy"), DisplayMode::Share).unwrap(), "3/6");
    assert!(approx_eq(session.allocation().amount(&pid("sy")), dec!(81.60)));
}

#[test]
fn share_mode_newcomer_takes_one_share() {
    let mut session = sushi_night();
    session.set_edit_mode(EditMode::ShareNudge);
    session.nudge(&pid("kw"), Step::Up).unwrap();
    session.apply(make_join("jo", "Jo")).unwrap();

    assert_eq!(session.pool().total_shares(), 6);
    assert_eq!(percentage(&session, "kw"), dec!(100) / dec!(3));
}

#[test]
fn direct_entry_leaves_others_alone() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    session.set_edit_mode(EditMode::DirectEntry);
    session
        .apply(Edit::EnterPercentage {
            participant: pid("kw"),
            value: dec!(10),
        })
        .unwrap();

    assert_eq!(percentage(&session, "kw"), dec!(10));
    assert!(approx_eq(percentage(&session, "mp"), dec!(25)));
    // Allocation still covers the whole bill
    assert!(approx_eq(session.allocation().total(), session.grand_total()));
}

#[test]
fn chart_label_follows_normalized_slice() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    session.set_edit_mode(EditMode::DirectEntry);
    session.enter_percentage(&pid("kw"), dec!(10)).unwrap();

    // 10 of the 85 points assigned
    assert_eq!(session.display(&pid("kw"), DisplayMode::Percentage).unwrap(), "10%");
    assert_eq!(session.chart_label(&pid("kw"), DisplayMode::Percentage).unwrap(), "12%");
    assert_eq!(session.chart_label(&pid("mp"), DisplayMode::Percentage).unwrap(), "29%");
}

#[test]
fn share_mode_ignores_typed_percentage() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    session.set_edit_mode(EditMode::ShareNudge);
    session
        .apply(Edit::EnterPercentage {
            participant: pid("kw"),
            value: dec!(5),
        })
        .unwrap();

    assert_eq!(percentage(&session, "kw"), dec!(25));
    assert_eq!(session.display(&pid("kw"), DisplayMode::Share).unwrap(), "1/4");
    assert_eq!(session.display(&pid("kw"), DisplayMode::Percentage).unwrap(), "25%");
    assert_eq!(session.display(&pid("kw"), DisplayMode::Dollar).unwrap(), "$40.80");
}

// === Participants ===

#[test]
fn removing_participant_renormalizes() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    let removed = session.remove_participant(&pid("dh")).unwrap();

    assert_eq!(removed.name(), "Danny");
    for id in ["kw", "mp", "sy"] {
        assert!(approx_eq(percentage(&session, id), dec!(33.333333333)));
    }
    assert!(approx_eq(session.pool().total_percentage(), HUNDRED));
}

#[test]
fn removing_participant_strips_items() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Itemized);
    session
        .apply(Edit::RemoveParticipant { participant: pid("dh") })
        .unwrap();

    for item in session.bill().items() {
        assert!(!item.is_shared_by(&pid("dh")));
        assert_eq!(item.shared_by.len(), 3);
    }
    assert!(approx_eq(
        session.allocation().amount(&pid("kw")),
        dec!(128) / dec!(3)
    ));
}

#[test]
fn duplicate_participant_returns_error() {
    let mut session = sushi_night();
    let result = session.apply(make_join("kw", "Kevin"));
    assert_eq!(result, Err(SplitError::DuplicateParticipant(pid("kw"))));
    assert_eq!(session.participants().len(), 4);
}

#[test]
fn toggling_unknown_participant_returns_error() {
    let mut session = sushi_night();
    let result = session.toggle_sharer(ItemId(1), &pid("zz"));
    assert_eq!(result, Err(SplitError::ParticipantNotFound(pid("zz"))));
    assert_eq!(session.bill().item(ItemId(1)).unwrap().shared_by.len(), 4);
}

#[test]
fn late_joiner_is_not_on_existing_items() {
    let mut session = sushi_night();
    session.apply(make_join("jo", "Jo")).unwrap();
    assert!(!session.bill().item(ItemId(1)).unwrap().is_shared_by(&pid("jo")));

    session.assign_all(ItemId(1)).unwrap();
    assert!(session.bill().item(ItemId(1)).unwrap().is_shared_by(&pid("jo")));
}

// === Items ===

#[test]
fn item_lifecycle() {
    let mut session = sushi_night();
    session
        .apply(Edit::UpdateItem {
            item: ItemId(1),
            patch: ItemPatch {
                name: Some("Rainbow Roll".into()),
                ..ItemPatch::default()
            },
        })
        .unwrap();
    session.apply(Edit::DuplicateItem { item: ItemId(1) }).unwrap();
    assert_eq!(session.bill().item(ItemId(5)).unwrap().name, "Rainbow Roll (Copy)");
    assert_eq!(session.bill().items_subtotal(), dec!(144.00));

    session.apply(Edit::RemoveItem { item: ItemId(5) }).unwrap();
    assert_eq!(session.bill().items_subtotal(), dec!(128.00));
}

#[test]
fn unknown_item_returns_error() {
    let mut session = sushi_night();
    assert_eq!(
        session.apply(Edit::AssignAll { item: ItemId(42) }),
        Err(SplitError::ItemNotFound(ItemId(42)))
    );
    assert_eq!(
        session.apply(make_price(42, "1.00")),
        Err(SplitError::ItemNotFound(ItemId(42)))
    );
}

#[test]
fn grand_total_recomputed_on_every_read() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Percentage);
    let before = session.grand_total();

    session.apply(make_price(1, "26.00")).unwrap();
    let after = session.grand_total();

    assert_eq!(after - before, dec!(10) * session.bill().rate_multiplier());
    let bill = session.bill();
    let multiplier = Decimal::ONE + bill.tax_rate() / HUNDRED + bill.tip_rate() / HUNDRED;
    assert_eq!(after, bill.base(Basis::Items) * multiplier);
}

#[test]
fn oversized_amounts_do_not_overflow() {
    let mut session = sushi_night();
    session.set_split_method(SplitMethod::Itemized);
    session.apply(make_price(1, "70000000000000000000000000000")).unwrap();
    session.adjust_item_quantity(ItemId(1), Step::Up).unwrap();

    let allocation = session.allocation();
    assert_eq!(allocation.len(), 4);
    assert!(allocation.amount(&pid("kw")) > dec!(500000000000000));

    session.set_split_method(SplitMethod::Percentage);
    assert!(approx_eq(session.allocation().total(), session.grand_total()));

    session.set_split_method(SplitMethod::Even);
    session.set_subtotal("70000000000000000000000000000");
    assert_eq!(session.grand_total(), dec!(1275000000000000));
}

#[test]
fn edits_round_trip_through_json() {
    let edits = vec![
        make_join("kw", "Kevin"),
        Edit::AddItem,
        make_price(1, "16.00"),
        Edit::SetSplitMethod { method: SplitMethod::Itemized },
        Edit::SetEditMode { mode: EditMode::ShareNudge },
        Edit::EnterPercentage {
            participant: pid("kw"),
            value: dec!(12.5),
        },
    ];
    let json = serde_json::to_string(&edits).unwrap();
    let parsed: Vec<Edit> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, edits);

    let mut session = Session::new();
    for edit in parsed {
        session.apply(edit).unwrap();
    }
    assert_eq!(session.allocation().amount(&pid("kw")), dec!(16.00));
}
