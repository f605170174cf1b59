// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chairbook::models::{Direction, PaymentMethod};
use chairbook::notify::RecordingNotifier;
use chairbook::reports::{
    Snapshot, daily_overview, hourly_histogram, professional_ranking, revenue_rollup,
    service_popularity,
};
use chairbook::store::SqliteStore;
use chairbook::time::{FixedClock, TimeRange};
use chairbook::{Ledger, Scheduler};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

const SHOP: &str = "shop-a";

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn ranking_and_popularity_from_the_store() {
    let store = SqliteStore::open_in_memory().unwrap();
    let client = store.insert_client(SHOP, "Ana", None).unwrap().id;
    let bruno = store.insert_professional(SHOP, "Bruno", None).unwrap().id;
    let caio = store.insert_professional(SHOP, "Caio", None).unwrap().id;
    let cut = store
        .insert_service(SHOP, "Haircut", 5000, Some(30), Decimal::from(20))
        .unwrap()
        .id;
    let beard = store
        .insert_service(SHOP, "Beard", 3000, Some(20), Decimal::from(50))
        .unwrap()
        .id;
    // another shop's data must not leak in
    let other_pro = store.insert_professional("shop-b", "Dani", None).unwrap().id;
    let other_client = store.insert_client("shop-b", "Eva", None).unwrap().id;
    let other_svc = store
        .insert_service("shop-b", "Haircut", 9900, Some(30), Decimal::ZERO)
        .unwrap()
        .id;

    let notifier = RecordingNotifier::default();
    let s = Scheduler::new(&store, &notifier);
    let a1 = s
        .book(SHOP, client, caio, cut, at("2025-04-01 09:15"))
        .unwrap();
    s.book(SHOP, client, bruno, cut, at("2025-04-01 09:50"))
        .unwrap();
    s.book(SHOP, client, bruno, beard, at("2025-04-01 14:00"))
        .unwrap();
    s.book("shop-b", other_client, other_pro, other_svc, at("2025-04-01 14:00"))
        .unwrap();
    s.cancel(SHOP, a1.id).unwrap();

    let snap = Snapshot::load(&store, SHOP, None).unwrap();
    assert_eq!(snap.appointments.len(), 3);

    let ranking = professional_ranking(&snap.appointments, &snap.services, &snap.professionals);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].professional_id, caio);
    assert_eq!(ranking[0].gross_cents, 5000);
    assert_eq!(ranking[0].commission_cents, Decimal::from(1000));
    assert_eq!(ranking[1].professional_id, bruno);
    assert_eq!(ranking[1].appointments, 2);
    assert_eq!(ranking[1].gross_cents, 8000);
    assert_eq!(ranking[1].commission_cents, Decimal::from(2500));

    let active = snap.clone().without_cancelled();
    let ranking = professional_ranking(&active.appointments, &active.services, &active.professionals);
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].professional_id, bruno);

    let popular = service_popularity(&snap.appointments, &snap.services);
    assert_eq!(popular[0].name, "Haircut");
    assert_eq!(popular[0].count, 2);
    assert_eq!(popular[1].name, "Beard");
    assert_eq!(popular[1].count, 1);

    let hist = hourly_histogram(&snap.appointments);
    assert_eq!(hist.get("09:00"), Some(&2));
    assert_eq!(hist.get("14:00"), Some(&1));
    assert_eq!(hist.len(), 2);

    let april_2 = Snapshot::load(&store, SHOP, Some(TimeRange::day_of(day("2025-04-02")))).unwrap();
    assert!(april_2.appointments.is_empty());
}

#[test]
fn rollup_and_overview_from_the_store() {
    let store = SqliteStore::open_in_memory().unwrap();
    let client = store.insert_client(SHOP, "Ana", None).unwrap().id;
    let pro = store.insert_professional(SHOP, "Bruno", None).unwrap().id;
    let cut = store
        .insert_service(SHOP, "Haircut", 5000, Some(30), Decimal::ZERO)
        .unwrap()
        .id;
    let notifier = RecordingNotifier::default();
    let s = Scheduler::new(&store, &notifier);
    let a = s.book(SHOP, client, pro, cut, at("2025-04-02 10:00")).unwrap();
    s.book(SHOP, client, pro, cut, at("2025-04-02 11:00")).unwrap();
    s.confirm(SHOP, a.id).unwrap();

    // 2025-04-02 is a Wednesday; the week starts Sunday 03-30
    for (when, cents, dir) in [
        ("2025-03-30 10:00", 1000, Direction::In),
        ("2025-04-01 10:00", 2000, Direction::In),
        ("2025-04-02 10:30", 5000, Direction::In),
        ("2025-04-02 12:00", 500, Direction::Out),
    ] {
        let clock = FixedClock(at(when));
        Ledger::new(&store, &clock)
            .record_payment(SHOP, cents, PaymentMethod::Cash, dir, None)
            .unwrap();
    }

    let snap = Snapshot::load(&store, SHOP, None).unwrap();
    let rollup = revenue_rollup(&snap.ledger, day("2025-04-02"));
    assert_eq!(rollup.today.balance_cents, 4500);
    assert_eq!(rollup.today.in_total_cents, 5000);
    assert_eq!(rollup.week.balance_cents, 7500);
    assert_eq!(rollup.month.balance_cents, 6500);
    assert_eq!(rollup.month.in_count, 2);
    assert_eq!(rollup.ticket_average_cents, Decimal::from(3500));

    let view = daily_overview(&snap.appointments, &snap.ledger, day("2025-04-02"), None);
    assert_eq!(view.confirmed.len(), 1);
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.collected_cents, 5000);
}
