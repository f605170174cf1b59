// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, set_country_code, set_default_shop};
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(
    store: &SqliteStore,
    db_path: String,
    shop_flag: Option<&str>,
    m: &clap::ArgMatches,
) -> Result<()> {
    let conn = store.connection();
    match m.subcommand() {
        Some(("show", sub)) => {
            let settings = config::load(conn, db_path, shop_flag)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &settings)? {
                let rows = vec![
                    vec!["db_path".to_string(), settings.db_path],
                    vec!["shop".to_string(), settings.shop.unwrap_or_default()],
                    vec![
                        "phone_country_code".to_string(),
                        settings.phone_country_code,
                    ],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set-shop", sub)) => {
            let shop = sub.get_one::<String>("shop_id").unwrap();
            set_default_shop(conn, shop)?;
            println!("Default shop set to {}", shop.trim());
        }
        Some(("set-country-code", sub)) => {
            let code = sub.get_one::<String>("code").unwrap();
            set_country_code(conn, code)?;
            println!("Phone country code set to {}", code.trim().trim_start_matches('+'));
        }
        _ => {}
    }
    Ok(())
}
