// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Directory;
use crate::store::{AppointmentFilter, EntityStore, SqliteStore};
use crate::time::{TimeRange, format_instant};
use anyhow::{Result, bail};
use serde_json::json;

pub fn handle(store: &SqliteStore, shop: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => export_ledger(store, shop, sub),
        Some(("appointments", sub)) => export_appointments(store, shop, sub),
        _ => Ok(()),
    }
}

fn write_out(
    fmt: &str,
    out: &str,
    header: &[&str],
    records: Vec<Vec<String>>,
    items: Vec<serde_json::Value>,
) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(header)?;
            for rec in records {
                wtr.write_record(rec)?;
            }
            wtr.flush()?;
        }
        "json" => std::fs::write(out, serde_json::to_string_pretty(&items)?)?,
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(())
}

fn export_ledger(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let entries = store.list_ledger_entries(shop, &TimeRange::everything())?;

    let mut records = Vec::new();
    let mut items = Vec::new();
    for e in &entries {
        records.push(vec![
            e.id.to_string(),
            format_instant(e.occurred_at),
            e.direction.to_string(),
            e.amount_cents.to_string(),
            e.method.to_string(),
            e.appointment_id.map(|a| a.to_string()).unwrap_or_default(),
            e.reverses.map(|r| r.to_string()).unwrap_or_default(),
        ]);
        items.push(json!({
            "id": e.id, "occurred_at": format_instant(e.occurred_at), "direction": e.direction,
            "amount_cents": e.amount_cents, "method": e.method, "appointment_id": e.appointment_id,
            "reverses": e.reverses
        }));
    }
    write_out(
        &fmt,
        out,
        &[
            "id",
            "occurred_at",
            "direction",
            "amount_cents",
            "method",
            "appointment_id",
            "reverses",
        ],
        records,
        items,
    )?;
    println!("Exported {} ledger entries to {}", entries.len(), out);
    Ok(())
}

fn export_appointments(store: &SqliteStore, shop: &str, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let appts = store.list_appointments(shop, &AppointmentFilter::default())?;
    let dir = Directory::load(store, shop)?;

    let mut records = Vec::new();
    let mut items = Vec::new();
    for a in &appts {
        let (client, pro, service) = (
            dir.client(a.client_id),
            dir.professional(a.professional_id),
            dir.service(a.service_id),
        );
        records.push(vec![
            a.id.to_string(),
            format_instant(a.start_time),
            a.status.to_string(),
            client.clone(),
            pro.clone(),
            service.clone(),
        ]);
        items.push(json!({
            "id": a.id, "start_time": format_instant(a.start_time), "status": a.status,
            "client": client, "professional": pro, "service": service
        }));
    }
    write_out(
        &fmt,
        out,
        &["id", "start_time", "status", "client", "professional", "service"],
        records,
        items,
    )?;
    println!("Exported {} appointments to {}", appts.len(), out);
    Ok(())
}
