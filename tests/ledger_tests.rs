// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chairbook::models::{AppointmentStatus, Direction, MAX_AMOUNT_CENTS, PaymentMethod};
use chairbook::notify::RecordingNotifier;
use chairbook::store::{EntityStore, SqliteStore};
use chairbook::time::{FixedClock, TimeRange};
use chairbook::{EngineError, Ledger, Scheduler};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

const SHOP: &str = "shop-a";

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Store with one booked appointment; returns its id.
fn setup() -> (SqliteStore, i64) {
    let store = SqliteStore::open_in_memory().unwrap();
    let client = store.insert_client(SHOP, "Ana", None).unwrap().id;
    let pro = store.insert_professional(SHOP, "Bruno", None).unwrap().id;
    let svc = store
        .insert_service(SHOP, "Haircut", 5000, Some(30), Decimal::from(20))
        .unwrap()
        .id;
    let notifier = RecordingNotifier::default();
    let appt = Scheduler::new(&store, &notifier)
        .book(SHOP, client, pro, svc, at("2025-04-01 10:00"))
        .unwrap();
    (store, appt.id)
}

#[test]
fn balance_is_in_minus_out() {
    let (store, _) = setup();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let ledger = Ledger::new(&store, &clock);
    ledger
        .record_payment(SHOP, 3000, PaymentMethod::Cash, Direction::In, None)
        .unwrap();
    ledger
        .record_payment(SHOP, 1000, PaymentMethod::Pix, Direction::Out, None)
        .unwrap();
    let today = TimeRange::day_of(day("2025-04-01"));
    assert_eq!(ledger.balance(SHOP, &today).unwrap(), 2000);

    let sheet = ledger.day_sheet(SHOP, day("2025-04-01")).unwrap();
    assert_eq!(sheet.balance_cents, 2000);
    assert_eq!(sheet.entries.len(), 2);
    // newest first
    assert!(sheet.entries[0].id > sheet.entries[1].id);

    assert_eq!(
        ledger
            .balance(SHOP, &TimeRange::day_of(day("2025-04-02")))
            .unwrap(),
        0
    );
}

#[test]
fn balance_is_additive_over_adjacent_periods() {
    let (store, _) = setup();
    for (when, cents, dir) in [
        ("2025-04-01 09:00", 1500, Direction::In),
        ("2025-04-01 23:59", 700, Direction::Out),
        ("2025-04-02 00:00", 2500, Direction::In),
        ("2025-04-03 18:30", 400, Direction::In),
    ] {
        let clock = FixedClock(at(when));
        Ledger::new(&store, &clock)
            .record_payment(SHOP, cents, PaymentMethod::Card, dir, None)
            .unwrap();
    }
    let clock = FixedClock(at("2025-04-04 00:00"));
    let ledger = Ledger::new(&store, &clock);
    let split = at("2025-04-02 00:00");
    let a = TimeRange::new(at("2025-04-01 00:00"), split).unwrap();
    let b = TimeRange::new(split, at("2025-04-04 00:00")).unwrap();
    let whole = TimeRange::new(a.start, b.end).unwrap();
    let (ba, bb) = (
        ledger.balance(SHOP, &a).unwrap(),
        ledger.balance(SHOP, &b).unwrap(),
    );
    assert_eq!(ba, 800);
    assert_eq!(bb, 2900);
    assert_eq!(ledger.balance(SHOP, &whole).unwrap(), ba + bb);
}

#[test]
fn non_positive_amounts_are_rejected() {
    let (store, _) = setup();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let ledger = Ledger::new(&store, &clock);
    for bad in [0, -100, MAX_AMOUNT_CENTS + 1, i64::MAX / 2 + 1] {
        assert!(matches!(
            ledger.record_payment(SHOP, bad, PaymentMethod::Cash, Direction::In, None),
            Err(EngineError::InvalidAmount(v)) if v == bad
        ));
    }
    assert!(
        ledger
            .entries(SHOP, &TimeRange::everything())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn payments_need_a_confirmed_or_completed_appointment() {
    let (store, appt) = setup();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let ledger = Ledger::new(&store, &clock);
    let notifier = RecordingNotifier::default();
    let scheduler = Scheduler::new(&store, &notifier);

    assert!(matches!(
        ledger.record_payment(SHOP, 5000, PaymentMethod::Cash, Direction::In, Some(appt)),
        Err(EngineError::IneligibleAppointment {
            status: Some(AppointmentStatus::Scheduled),
            ..
        })
    ));
    assert!(matches!(
        ledger.record_payment(SHOP, 5000, PaymentMethod::Cash, Direction::In, Some(777)),
        Err(EngineError::IneligibleAppointment { status: None, .. })
    ));

    scheduler.confirm(SHOP, appt).unwrap();
    ledger
        .record_payment(SHOP, 2500, PaymentMethod::Pix, Direction::In, Some(appt))
        .unwrap();
    scheduler.complete(SHOP, appt).unwrap();
    let e = ledger
        .record_payment(SHOP, 2500, PaymentMethod::Card, Direction::In, Some(appt))
        .unwrap();
    assert_eq!(e.appointment_id, Some(appt));
}

#[test]
fn cancelled_appointment_takes_no_payment() {
    let (store, appt) = setup();
    let notifier = RecordingNotifier::default();
    Scheduler::new(&store, &notifier).cancel(SHOP, appt).unwrap();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let err = Ledger::new(&store, &clock)
        .record_payment(SHOP, 5000, PaymentMethod::Cash, Direction::In, Some(appt))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::IneligibleAppointment {
            status: Some(AppointmentStatus::Cancelled),
            ..
        }
    ));
}

#[test]
fn reversal_adds_an_opposite_entry() {
    let (store, appt) = setup();
    let notifier = RecordingNotifier::default();
    let scheduler = Scheduler::new(&store, &notifier);
    scheduler.confirm(SHOP, appt).unwrap();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let ledger = Ledger::new(&store, &clock);
    let paid = ledger
        .record_payment(SHOP, 5000, PaymentMethod::Card, Direction::In, Some(appt))
        .unwrap();

    let rev = ledger.reverse(SHOP, paid.id).unwrap();
    assert_ne!(rev.id, paid.id);
    assert_eq!(rev.direction, Direction::Out);
    assert_eq!(rev.amount_cents, 5000);
    assert_eq!(rev.method, PaymentMethod::Card);
    assert_eq!(rev.appointment_id, Some(appt));
    assert_eq!(rev.reverses, Some(paid.id));
    assert_eq!(
        ledger.balance(SHOP, &TimeRange::everything()).unwrap(),
        0
    );
    // the original is untouched
    assert_eq!(store.get_ledger_entry(SHOP, paid.id).unwrap(), Some(paid.clone()));

    // once cancelled the reversal no longer points at the appointment
    scheduler.cancel(SHOP, appt).unwrap();
    let again = ledger.reverse(SHOP, rev.id).unwrap();
    assert_eq!(again.direction, Direction::In);
    assert_eq!(again.appointment_id, None);
    assert_eq!(again.reverses, Some(rev.id));

    assert!(matches!(
        ledger.reverse(SHOP, 9999),
        Err(EngineError::NotFound { .. })
    ));
}

#[test]
fn ledger_rows_cannot_be_edited_or_removed() {
    let (store, _) = setup();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let entry = Ledger::new(&store, &clock)
        .record_payment(SHOP, 1000, PaymentMethod::Cash, Direction::In, None)
        .unwrap();
    let conn = store.connection();
    assert!(
        conn.execute(
            "UPDATE ledger_entries SET amount_cents=1 WHERE id=?1",
            [entry.id]
        )
        .is_err()
    );
    assert!(
        conn.execute("DELETE FROM ledger_entries WHERE id=?1", [entry.id])
            .is_err()
    );
    assert_eq!(store.get_ledger_entry(SHOP, entry.id).unwrap(), Some(entry));
}

#[test]
fn an_entry_is_reversed_at_most_once() {
    let (store, _) = setup();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let ledger = Ledger::new(&store, &clock);
    let paid = ledger
        .record_payment(SHOP, 1500, PaymentMethod::Cash, Direction::In, None)
        .unwrap();
    let rev = ledger.reverse(SHOP, paid.id).unwrap();

    match ledger.reverse(SHOP, paid.id).unwrap_err() {
        EngineError::AlreadyReversed { entry_id, by } => {
            assert_eq!(entry_id, paid.id);
            assert_eq!(by, rev.id);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        ledger.entries(SHOP, &TimeRange::everything()).unwrap().len(),
        2
    );
    assert_eq!(
        ledger.balance(SHOP, &TimeRange::everything()).unwrap(),
        0
    );
}

#[test]
fn largest_amounts_still_sum_without_overflow() {
    let (store, _) = setup();
    let clock = FixedClock(at("2025-04-01 12:00"));
    let ledger = Ledger::new(&store, &clock);
    for _ in 0..3 {
        ledger
            .record_payment(SHOP, MAX_AMOUNT_CENTS, PaymentMethod::Card, Direction::In, None)
            .unwrap();
    }
    assert_eq!(
        ledger.balance(SHOP, &TimeRange::everything()).unwrap(),
        3 * MAX_AMOUNT_CENTS
    );
    assert!(matches!(
        ledger.record_payment(SHOP, i64::MAX / 2 + 1, PaymentMethod::Card, Direction::In, None),
        Err(EngineError::InvalidAmount(_))
    ));
}
