// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chairbook::models::AppointmentStatus;
use chairbook::store::{AppointmentFilter, EntityStore, SqliteStore};
use chairbook::{cli, commands, config};
use rust_decimal::Decimal;

const SHOP: &str = "shop-a";

fn run(store: &SqliteStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["chairbook"];
    argv.extend_from_slice(args);
    let m = cli::build_cli().try_get_matches_from(argv)?;
    match m.subcommand() {
        Some(("client", sub)) => commands::clients::handle(store, SHOP, sub),
        Some(("pro", sub)) => commands::professionals::handle(store, SHOP, sub),
        Some(("service", sub)) => commands::services::handle(store, SHOP, sub),
        Some(("appt", sub)) => commands::appointments::handle(store, SHOP, sub),
        Some(("cash", sub)) => commands::cash::handle(store, SHOP, sub),
        Some(("report", sub)) => commands::reports::handle(store, SHOP, sub),
        Some(("export", sub)) => commands::exporter::handle(store, SHOP, sub),
        Some(("doctor", _)) => commands::doctor::handle(store, SHOP),
        Some(("config", sub)) => {
            commands::settings::handle(store, ":memory:".into(), None, sub)
        }
        _ => Ok(()),
    }
}

#[test]
fn roster_and_booking_through_the_cli() {
    let store = SqliteStore::open_in_memory().unwrap();
    run(&store, &["client", "add", "--name", "Ana", "--phone", "11 98765-4321"]).unwrap();
    run(&store, &["pro", "add", "--name", "Bruno"]).unwrap();
    run(
        &store,
        &[
            "service", "add", "--name", "Haircut", "--price", "50", "--duration", "30",
            "--commission", "20",
        ],
    )
    .unwrap();

    let svc = store.list_services(SHOP).unwrap().remove(0);
    assert_eq!(svc.price_cents, 5000);
    assert_eq!(svc.commission_percent, Decimal::from(20));
    assert_eq!(svc.duration_minutes, Some(30));

    let ids = |s: i64| s.to_string();
    let client = store.list_clients(SHOP).unwrap()[0].id;
    let pro = store.list_professionals(SHOP).unwrap()[0].id;
    let book = |when: &str| {
        run(
            &store,
            &[
                "appt",
                "book",
                "--client",
                &ids(client),
                "--pro",
                &ids(pro),
                "--service",
                &ids(svc.id),
                "--at",
                when,
            ],
        )
    };
    book("2025-04-01 10:00").unwrap();
    assert!(book("2025-04-01 10:10").is_err());

    let appt = store
        .list_appointments(SHOP, &AppointmentFilter::default())
        .unwrap()
        .remove(0);
    run(&store, &["appt", "confirm", &ids(appt.id)]).unwrap();
    run(
        &store,
        &["cash", "record", "--amount", "50.00", "--method", "pix", "--appointment", &ids(appt.id)],
    )
    .unwrap();
    assert!(run(&store, &["cash", "record", "--amount", "1.005"]).is_err());
    assert!(run(&store, &["cash", "record", "--amount", "5", "--method", "cheque"]).is_err());
    run(&store, &["appt", "complete", &ids(appt.id)]).unwrap();
    assert_eq!(
        store.get_appointment(SHOP, appt.id).unwrap().unwrap().status,
        AppointmentStatus::Completed
    );

    run(&store, &["appt", "list", "--day", "2025-04-01", "--status", "completed", "--json"])
        .unwrap();
    run(&store, &["report", "ranking", "--json"]).unwrap();
    run(&store, &["report", "revenue", "--at", "2025-04-01"]).unwrap();
    run(&store, &["report", "hours", "--from", "2025-04-01", "--to", "2025-04-01"]).unwrap();
    run(&store, &["report", "overview", "--day", "2025-04-01"]).unwrap();
    run(&store, &["doctor"]).unwrap();
}

#[test]
fn exports_write_files() {
    let store = SqliteStore::open_in_memory().unwrap();
    run(&store, &["client", "add", "--name", "Ana"]).unwrap();
    run(&store, &["pro", "add", "--name", "Bruno"]).unwrap();
    run(&store, &["service", "add", "--name", "Haircut", "--price", "50"]).unwrap();
    run(&store, &["cash", "record", "--amount", "12.50", "--direction", "out"]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("ledger.csv");
    let csv_out = csv_path.to_str().unwrap();
    run(&store, &["export", "ledger", "--out", csv_out]).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,occurred_at,direction,amount_cents,method,appointment_id,reverses")
    );
    assert!(lines.next().unwrap().contains(",out,1250,cash,"));

    let json_path = dir.path().join("appointments.json");
    let json_out = json_path.to_str().unwrap();
    run(&store, &["export", "appointments", "--format", "json", "--out", json_out]).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v.as_array().map(Vec::len), Some(0));
}

#[test]
fn config_commands_persist_settings() {
    let store = SqliteStore::open_in_memory().unwrap();
    run(&store, &["config", "set-shop", "downtown"]).unwrap();
    run(&store, &["config", "set-country-code", "+351"]).unwrap();
    assert!(run(&store, &["config", "set-country-code", "abc"]).is_err());
    let conn = store.connection();
    assert_eq!(
        config::resolve_shop(conn, Some("flagged")).unwrap().as_deref(),
        Some("flagged")
    );
    assert_eq!(config::get_default_shop(conn).unwrap().as_deref(), Some("downtown"));
    assert_eq!(config::get_country_code(conn).unwrap(), "351");
}

#[test]
fn bad_arguments_are_rejected_by_the_parser() {
    let parse = |args: &[&str]| {
        let mut argv = vec!["chairbook"];
        argv.extend_from_slice(args);
        cli::build_cli().try_get_matches_from(argv)
    };
    assert!(parse(&["appt", "confirm", "abc"]).is_err());
    assert!(parse(&["service", "add", "--name", "X", "--price", "1", "--duration", "0"]).is_err());
    assert!(parse(&["export", "ledger", "--format", "xml", "--out", "x"]).is_err());
    assert!(parse(&["appt", "list", "--day", "2025-04-01", "--today"]).is_err());
    assert!(parse(&["report", "services", "--json"]).is_ok());
}
