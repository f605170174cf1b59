// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{EntityStore, SqliteStore};
use crate::utils::{fmt_cents, maybe_print_json, parse_money, parse_percent, pretty_table};
use anyhow::{Result, bail};

pub fn handle(store: &SqliteStore, shop: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                bail!("Service name cannot be empty");
            }
            let price = parse_money(sub.get_one::<String>("price").unwrap())?;
            if price < 0 {
                bail!("Service price cannot be negative");
            }
            let duration = sub.get_one::<u32>("duration").copied();
            let commission = parse_percent(sub.get_one::<String>("commission").unwrap())?;
            let svc = store.insert_service(shop, name, price, duration, commission)?;
            println!(
                "Added service #{} '{}' at {} ({}% commission)",
                svc.id,
                svc.name,
                fmt_cents(svc.price_cents),
                svc.commission_percent
            );
        }
        Some(("list", sub)) => {
            let services = store.list_services(shop)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &services)? {
                let rows = services
                    .into_iter()
                    .map(|s| {
                        vec![
                            s.id.to_string(),
                            s.name,
                            fmt_cents(s.price_cents),
                            s.duration_minutes
                                .map(|d| format!("{} min", d))
                                .unwrap_or_else(|| "-".into()),
                            format!("{}%", s.commission_percent),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Name", "Price", "Duration", "Commission"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
