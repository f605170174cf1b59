// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Directory;
use super::appointments::agenda_rows;
use crate::reports::{
    Snapshot, daily_overview, hourly_histogram, professional_ranking, revenue_rollup,
    service_popularity,
};
use crate::store::{EntityStore, SqliteStore};
use crate::time::{Clock, SystemClock, TimeRange};
use crate::utils::{
    date_window, fmt_cents, fmt_decimal_cents, maybe_print_json, parse_date, pretty_table,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;

pub fn handle(store: &SqliteStore, shop: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("revenue", sub)) => revenue(store, shop, sub)?,
        Some(("ranking", sub)) => ranking(store, shop, sub)?,
        Some(("services", sub)) => services(store, shop, sub)?,
        Some(("hours", sub)) => hours(store, shop, sub)?,
        Some(("overview", sub)) => overview(store, shop, sub)?,
        _ => {}
    }
    Ok(())
}

fn day_or_today(sub: &clap::ArgMatches, id: &str) -> Result<NaiveDate> {
    match sub.get_one::<String>(id) {
        Some(d) => parse_date(d),
        None => Ok(SystemClock.now().date()),
    }
}

fn revenue(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let day = day_or_today(sub, "at")?;
    let week = TimeRange::week_of(day);
    let month = TimeRange::month_of(day);
    // A week can straddle two months, so read the union of both windows.
    let span = TimeRange::new(week.start.min(month.start), week.end.max(month.end))
        .context("Invalid reporting window")?;
    let entries = store.list_ledger_entries(shop, &span)?;
    let rollup = revenue_rollup(&entries, day);

    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rollup)? {
        let rows = [
            ("Today", &rollup.today),
            ("Week", &rollup.week),
            ("Month", &rollup.month),
        ]
        .into_iter()
        .map(|(label, w)| {
            vec![
                label.to_string(),
                fmt_cents(w.balance_cents),
                fmt_cents(w.in_total_cents),
                w.in_count.to_string(),
            ]
        })
        .collect();
        println!(
            "{}",
            pretty_table(&["Window", "Balance", "Taken in", "Payments"], rows)
        );
        println!(
            "Average ticket this month: {}",
            fmt_decimal_cents(rollup.ticket_average_cents)
        );
    }
    Ok(())
}

fn load_window(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<Snapshot> {
    let window = date_window(sub.get_one::<String>("from"), sub.get_one::<String>("to"))?;
    Ok(Snapshot::load(store, shop, window)?)
}

fn ranking(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let mut snap = load_window(store, shop, sub)?;
    if sub.get_flag("exclude-cancelled") {
        snap = snap.without_cancelled();
    }
    let ranking = professional_ranking(&snap.appointments, &snap.services, &snap.professionals);
    let dir = Directory::load(store, shop)?;
    let data: Vec<_> = ranking
        .iter()
        .map(|r| {
            json!({
                "professional_id": r.professional_id,
                "professional": dir.professional(r.professional_id),
                "appointments": r.appointments,
                "gross_cents": r.gross_cents,
                "commission_cents": r.commission_cents,
            })
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = ranking
            .iter()
            .map(|r| {
                vec![
                    dir.professional(r.professional_id),
                    r.appointments.to_string(),
                    fmt_cents(r.gross_cents),
                    fmt_decimal_cents(r.commission_cents),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Professional", "Appointments", "Gross", "Commission"], rows)
        );
    }
    Ok(())
}

fn services(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let snap = load_window(store, shop, sub)?;
    let counts = service_popularity(&snap.appointments, &snap.services);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &counts)? {
        let rows = counts
            .into_iter()
            .map(|c| vec![c.name, c.count.to_string()])
            .collect();
        println!("{}", pretty_table(&["Service", "Appointments"], rows));
    }
    Ok(())
}

fn hours(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let snap = load_window(store, shop, sub)?;
    let hist = hourly_histogram(&snap.appointments);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &hist)? {
        let rows = hist
            .into_iter()
            .map(|(hour, n)| vec![hour, n.to_string()])
            .collect();
        println!("{}", pretty_table(&["Hour", "Appointments"], rows));
    }
    Ok(())
}

fn overview(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let day = day_or_today(sub, "day")?;
    let pro = sub.get_one::<i64>("pro").copied();
    let snap = Snapshot::load(store, shop, Some(TimeRange::day_of(day)))?;
    let view = daily_overview(&snap.appointments, &snap.ledger, day, pro);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        let dir = Directory::load(store, shop)?;
        for (title, appts) in [("To confirm", &view.pending), ("Confirmed", &view.confirmed)] {
            let rows = agenda_rows(&dir, appts)
                .into_iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.start_time,
                        r.client,
                        r.professional,
                        r.service,
                    ]
                })
                .collect();
            println!("{} ({})", title, appts.len());
            println!(
                "{}",
                pretty_table(&["ID", "When", "Client", "Professional", "Service"], rows)
            );
        }
        println!(
            "Collected on {}: {}",
            view.day,
            fmt_cents(view.collected_cents)
        );
    }
    Ok(())
}
