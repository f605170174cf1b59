// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{Direction, LedgerEntry, PaymentMethod};
use crate::store::SqliteStore;
use crate::time::{Clock, SystemClock, TimeRange};
use crate::utils::{
    date_window, fmt_cents, maybe_print_json, parse_date, parse_money, pretty_table,
};
use anyhow::{Result, anyhow, bail};
use serde_json::json;

pub fn handle(store: &SqliteStore, shop: &str, m: &clap::ArgMatches) -> Result<()> {
    let ledger = Ledger::new(store, &SystemClock);
    match m.subcommand() {
        Some(("record", sub)) => {
            let amount = parse_money(sub.get_one::<String>("amount").unwrap())?;
            let method: PaymentMethod = sub
                .get_one::<String>("method")
                .unwrap()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let direction: Direction = sub
                .get_one::<String>("direction")
                .unwrap()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let appt = sub.get_one::<i64>("appointment").copied();
            let entry = ledger.record_payment(shop, amount, method, direction, appt)?;
            println!(
                "Recorded entry #{}: {} {} via {}",
                entry.id,
                entry.direction,
                fmt_cents(entry.amount_cents),
                entry.method
            );
        }
        Some(("reverse", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let entry = ledger.reverse(shop, id)?;
            println!(
                "Reversed entry #{} with #{} ({} {})",
                id,
                entry.id,
                entry.direction,
                fmt_cents(entry.amount_cents)
            );
        }
        Some(("list", sub)) => {
            let day = match sub.get_one::<String>("day") {
                Some(d) => parse_date(d)?,
                None => SystemClock.now().date(),
            };
            let sheet = ledger.day_sheet(shop, day)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &sheet.entries)? {
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Time", "Dir", "Amount", "Method", "Appt"],
                        entry_rows(&sheet.entries)
                    )
                );
                println!(
                    "Balance for {}: {}",
                    sheet.day,
                    fmt_cents(sheet.balance_cents)
                );
            }
        }
        Some(("balance", sub)) => {
            let range = balance_range(sub)?;
            let balance = ledger.balance(shop, &range)?;
            let payload = json!({
                "from": range.start,
                "to": range.end,
                "balance_cents": balance,
            });
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payload)? {
                println!("{}", fmt_cents(balance));
            }
        }
        _ => {}
    }
    Ok(())
}

fn balance_range(sub: &clap::ArgMatches) -> Result<TimeRange> {
    let day = sub.get_one::<String>("day");
    let window = date_window(sub.get_one::<String>("from"), sub.get_one::<String>("to"))?;
    match (day, window) {
        (Some(_), Some(_)) => bail!("Use either --day or --from/--to, not both"),
        (Some(d), None) => Ok(TimeRange::day_of(parse_date(d)?)),
        (None, Some(w)) => Ok(w),
        (None, None) => Ok(TimeRange::day_of(SystemClock.now().date())),
    }
}

fn entry_rows(entries: &[LedgerEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.occurred_at.format("%H:%M:%S").to_string(),
                e.direction.to_string(),
                fmt_cents(e.amount_cents),
                e.method.to_string(),
                e.appointment_id.map(|a| a.to_string()).unwrap_or_default(),
            ]
        })
        .collect()
}
