// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use chairbook::{cli, commands, config, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_flag = cli::global_value(&matches, "db");
    let shop_flag = cli::global_value(&matches, "shop");
    let store = db::open_or_init(db_flag.as_deref())?;
    let shop = || config::require_shop(store.connection(), shop_flag.as_deref());

    match matches.subcommand() {
        Some(("init", _)) => {
            println!(
                "Database initialized at {}",
                db::db_path(db_flag.as_deref())?.display()
            );
        }
        Some(("config", sub)) => {
            let path = db::db_path(db_flag.as_deref())?.display().to_string();
            commands::settings::handle(&store, path, shop_flag.as_deref(), sub)?
        }
        Some(("client", sub)) => commands::clients::handle(&store, &shop()?, sub)?,
        Some(("pro", sub)) => commands::professionals::handle(&store, &shop()?, sub)?,
        Some(("service", sub)) => commands::services::handle(&store, &shop()?, sub)?,
        Some(("appt", sub)) => commands::appointments::handle(&store, &shop()?, sub)?,
        Some(("cash", sub)) => commands::cash::handle(&store, &shop()?, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, &shop()?, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&store, &shop()?, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store, &shop()?)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
