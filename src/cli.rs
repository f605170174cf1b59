// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgMatches, Command, crate_version, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn range_flags(cmd: Command) -> Command {
    cmd.arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
        .arg(
            Arg::new("to")
                .long("to")
                .value_name("YYYY-MM-DD")
                .help("Inclusive end day"),
        )
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn roster_cmd(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("phone").long("phone")),
        )
        .subcommand(json_flags(Command::new("list")))
}

pub fn build_cli() -> Command {
    Command::new("chairbook")
        .version(crate_version!())
        .about("Appointments, cash ledger and revenue reports for a barbershop")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("SQLite database file (default: platform data dir or CHAIRBOOK_DB)"),
        )
        .arg(
            Arg::new("shop")
                .long("shop")
                .global(true)
                .value_name("ID")
                .help("Shop (tenant) id (default: CHAIRBOOK_SHOP or stored default)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand_required(true)
                .subcommand(json_flags(Command::new("show")))
                .subcommand(Command::new("set-shop").arg(Arg::new("shop_id").required(true)))
                .subcommand(
                    Command::new("set-country-code").arg(Arg::new("code").required(true)),
                ),
        )
        .subcommand(roster_cmd("client", "Manage clients"))
        .subcommand(roster_cmd("pro", "Manage professionals"))
        .subcommand(
            Command::new("service")
                .about("Manage services")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("price")
                                .long("price")
                                .required(true)
                                .help("Price, e.g. 45.00"),
                        )
                        .arg(
                            Arg::new("duration")
                                .long("duration")
                                .value_parser(value_parser!(u32).range(1..))
                                .help("Duration in minutes"),
                        )
                        .arg(
                            Arg::new("commission")
                                .long("commission")
                                .default_value("0")
                                .help("Commission percent, 0-100"),
                        ),
                )
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("appt")
                .about("Book and move appointments through their lifecycle")
                .subcommand_required(true)
                .subcommand(
                    Command::new("book")
                        .arg(
                            Arg::new("client")
                                .long("client")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("pro")
                                .long("pro")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("service")
                                .long("service")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("at")
                                .long("at")
                                .required(true)
                                .value_name("YYYY-MM-DD HH:MM"),
                        ),
                )
                .subcommand(Command::new("confirm").arg(id_arg("Appointment id")))
                .subcommand(Command::new("complete").arg(id_arg("Appointment id")))
                .subcommand(Command::new("cancel").arg(id_arg("Appointment id")))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("day").long("day").value_name("YYYY-MM-DD"))
                        .arg(
                            Arg::new("today")
                                .long("today")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("day"),
                        )
                        .arg(Arg::new("pro").long("pro").value_parser(value_parser!(i64)))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .action(ArgAction::Append)
                                .help("scheduled|confirmed|completed|cancelled (repeatable)"),
                        ),
                )),
        )
        .subcommand(
            Command::new("cash")
                .about("Cash drawer: record and inspect ledger entries")
                .subcommand_required(true)
                .subcommand(
                    Command::new("record")
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("method").long("method").default_value("cash"))
                        .arg(Arg::new("direction").long("direction").default_value("in"))
                        .arg(
                            Arg::new("appointment")
                                .long("appointment")
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(Command::new("reverse").arg(id_arg("Ledger entry id")))
                .subcommand(json_flags(
                    Command::new("list").arg(Arg::new("day").long("day").value_name("YYYY-MM-DD")),
                ))
                .subcommand(json_flags(range_flags(
                    Command::new("balance")
                        .arg(Arg::new("day").long("day").value_name("YYYY-MM-DD")),
                ))),
        )
        .subcommand(
            Command::new("report")
                .about("Revenue, commission and activity reports")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("revenue").arg(
                        Arg::new("at")
                            .long("at")
                            .value_name("YYYY-MM-DD")
                            .help("Reference day (default: today)"),
                    ),
                ))
                .subcommand(json_flags(range_flags(
                    Command::new("ranking").arg(
                        Arg::new("exclude-cancelled")
                            .long("exclude-cancelled")
                            .action(ArgAction::SetTrue),
                    ),
                )))
                .subcommand(json_flags(range_flags(Command::new("services"))))
                .subcommand(json_flags(range_flags(Command::new("hours"))))
                .subcommand(json_flags(
                    Command::new("overview")
                        .arg(Arg::new("day").long("day").value_name("YYYY-MM-DD"))
                        .arg(Arg::new("pro").long("pro").value_parser(value_parser!(i64))),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export shop data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("ledger")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )
                .subcommand(
                    Command::new("appointments")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the store for integrity problems"))
}

/// Value of a global argument, wherever on the command line it was given.
pub fn global_value(m: &ArgMatches, id: &str) -> Option<String> {
    let mut found = m.try_get_one::<String>(id).ok().flatten().cloned();
    let mut cur = m;
    while let Some((_, sub)) = cur.subcommand() {
        if let Some(v) = sub.try_get_one::<String>(id).ok().flatten() {
            found = Some(v.clone());
        }
        cur = sub;
    }
    found
}
