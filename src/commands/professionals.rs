// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{EntityStore, SqliteStore};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};

pub fn handle(store: &SqliteStore, shop: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                bail!("Professional name cannot be empty");
            }
            let phone = sub
                .get_one::<String>("phone")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty());
            let pro = store.insert_professional(shop, name, phone)?;
            println!("Added professional #{} '{}'", pro.id, pro.name);
        }
        Some(("list", sub)) => {
            let pros = store.list_professionals(shop)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &pros)? {
                let rows = pros
                    .into_iter()
                    .map(|p| vec![p.id.to_string(), p.name, p.phone.unwrap_or_default()])
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Phone"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
