// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Directory;
use crate::config::get_country_code;
use crate::models::{Appointment, AppointmentStatus};
use crate::notify::LogNotifier;
use crate::scheduling::Scheduler;
use crate::store::{AppointmentFilter, SqliteStore};
use crate::time::{Clock, SystemClock, TimeRange};
use crate::utils::{maybe_print_json, parse_date, parse_datetime, pretty_table};
use anyhow::{Context, Result, anyhow};
use serde::Serialize;

pub fn handle(store: &SqliteStore, shop: &str, m: &clap::ArgMatches) -> Result<()> {
    let notifier = LogNotifier {
        country_code: get_country_code(store.connection())?,
    };
    let scheduler = Scheduler::new(store, &notifier);
    match m.subcommand() {
        Some(("book", sub)) => {
            let client = *sub.get_one::<i64>("client").unwrap();
            let pro = *sub.get_one::<i64>("pro").unwrap();
            let service = *sub.get_one::<i64>("service").unwrap();
            let at = parse_datetime(sub.get_one::<String>("at").unwrap())?;
            let appt = scheduler
                .book(shop, client, pro, service, at)
                .context("Booking failed")?;
            println!("Booked appointment #{} at {}", appt.id, appt.start_time);
        }
        Some(("confirm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let appt = scheduler.confirm(shop, id)?;
            println!("Appointment #{} is now {}", appt.id, appt.status);
        }
        Some(("complete", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let appt = scheduler.complete(shop, id)?;
            println!("Appointment #{} is now {}", appt.id, appt.status);
        }
        Some(("cancel", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let appt = scheduler.cancel(shop, id)?;
            println!("Appointment #{} is now {}", appt.id, appt.status);
        }
        Some(("list", sub)) => list(store, shop, &scheduler, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct AgendaRow {
    pub id: i64,
    pub start_time: String,
    pub client: String,
    pub professional: String,
    pub service: String,
    pub status: AppointmentStatus,
}

fn list(
    store: &SqliteStore,
    shop: &str,
    scheduler: &Scheduler<'_, SqliteStore, LogNotifier>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let filter = filter_from(sub)?;
    let appts = scheduler.agenda(shop, &filter)?;
    let dir = Directory::load(store, shop)?;
    let data = agenda_rows(&dir, &appts);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.start_time,
                    r.client,
                    r.professional,
                    r.service,
                    r.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "When", "Client", "Professional", "Service", "Status"],
                rows
            )
        );
    }
    Ok(())
}

pub fn filter_from(sub: &clap::ArgMatches) -> Result<AppointmentFilter> {
    let mut filter = AppointmentFilter::default();
    if let Some(day) = sub.get_one::<String>("day") {
        filter = filter.within(TimeRange::day_of(parse_date(day)?));
    } else if sub.get_flag("today") {
        filter = filter.within(TimeRange::day_of(SystemClock.now().date()));
    }
    if let Some(pro) = sub.get_one::<i64>("pro") {
        filter = filter.for_professional(*pro);
    }
    if let Some(statuses) = sub.get_many::<String>("status") {
        let parsed = statuses
            .map(|s| s.parse::<AppointmentStatus>().map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;
        filter = filter.with_statuses(&parsed);
    }
    Ok(filter)
}

pub(crate) fn agenda_rows(dir: &Directory, appts: &[Appointment]) -> Vec<AgendaRow> {
    appts
        .iter()
        .map(|a| AgendaRow {
            id: a.id,
            start_time: a.start_time.format("%Y-%m-%d %H:%M").to_string(),
            client: dir.client(a.client_id),
            professional: dir.professional(a.professional_id),
            service: dir.service(a.service_id),
            status: a.status,
        })
        .collect()
}
