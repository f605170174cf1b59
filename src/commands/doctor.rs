// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{AppointmentStatus, Service};
use crate::store::{AppointmentFilter, EntityStore, SqliteStore};
use crate::time::Slot;
use crate::utils::pretty_table;

pub const OVERLAPPING_APPOINTMENTS: &str = "overlapping_appointments";
pub const PAYMENT_ON_UNPAYABLE_APPOINTMENT: &str = "payment_on_unpayable_appointment";
pub const DANGLING_REFERENCE: &str = "dangling_reference";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

impl Issue {
    fn new(kind: &'static str, detail: String) -> Self {
        Issue { kind, detail }
    }
}

pub fn handle(store: &SqliteStore, shop: &str) -> Result<()> {
    let issues = find_issues(store, shop)?;
    tracing::debug!(issues = issues.len(), "doctor finished");
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Runs every integrity check for `shop` and returns what it found.
pub fn find_issues(store: &SqliteStore, shop: &str) -> Result<Vec<Issue>> {
    let mut issues = overlapping_appointments(store, shop)?;
    issues.extend(payments_on_unpayable(store, shop)?);
    issues.extend(dangling_references(store, shop)?);
    Ok(issues)
}

/// Active appointments of one professional whose slots overlap.
fn overlapping_appointments(store: &SqliteStore, shop: &str) -> Result<Vec<Issue>> {
    let services: HashMap<i64, Service> = store
        .list_services(shop)?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let active = store.list_appointments(
        shop,
        &AppointmentFilter::default().with_statuses(&AppointmentStatus::ACTIVE),
    )?;
    let slot_of = |start: NaiveDateTime, service_id: i64| {
        Slot::from_start(
            start,
            services.get(&service_id).and_then(|s| s.duration_minutes),
        )
    };
    let mut issues = Vec::new();
    for (i, a) in active.iter().enumerate() {
        let sa = slot_of(a.start_time, a.service_id);
        for b in active[i + 1..]
            .iter()
            .filter(|b| b.professional_id == a.professional_id)
        {
            if sa.overlaps(&slot_of(b.start_time, b.service_id)) {
                issues.push(Issue::new(
                    OVERLAPPING_APPOINTMENTS,
                    format!("#{} and #{}", a.id, b.id),
                ));
            }
        }
    }
    Ok(issues)
}

/// Money recorded against appointments that were never or are no longer payable.
fn payments_on_unpayable(store: &SqliteStore, shop: &str) -> Result<Vec<Issue>> {
    let mut stmt = store.connection().prepare(
        "SELECT l.id, a.id, a.status FROM ledger_entries l
         JOIN appointments a ON a.id = l.appointment_id
         WHERE l.shop_id=?1 AND a.status IN ('scheduled', 'cancelled')
         ORDER BY l.id",
    )?;
    let mut cur = stmt.query([shop])?;
    let mut issues = Vec::new();
    while let Some(r) = cur.next()? {
        let (entry, appt, status): (i64, i64, String) = (r.get(0)?, r.get(1)?, r.get(2)?);
        issues.push(Issue::new(
            PAYMENT_ON_UNPAYABLE_APPOINTMENT,
            format!("entry #{} -> appointment #{} ({})", entry, appt, status),
        ));
    }
    Ok(issues)
}

/// References that resolve outside the shop.
fn dangling_references(store: &SqliteStore, shop: &str) -> Result<Vec<Issue>> {
    let mut stmt = store.connection().prepare(
        "SELECT a.id, 'client' FROM appointments a
           LEFT JOIN clients c ON c.id=a.client_id AND c.shop_id=a.shop_id
           WHERE a.shop_id=?1 AND c.id IS NULL
         UNION ALL
         SELECT a.id, 'professional' FROM appointments a
           LEFT JOIN professionals p ON p.id=a.professional_id AND p.shop_id=a.shop_id
           WHERE a.shop_id=?1 AND p.id IS NULL
         UNION ALL
         SELECT a.id, 'service' FROM appointments a
           LEFT JOIN services s ON s.id=a.service_id AND s.shop_id=a.shop_id
           WHERE a.shop_id=?1 AND s.id IS NULL
         UNION ALL
         SELECT l.id, 'ledger appointment' FROM ledger_entries l
           LEFT JOIN appointments a ON a.id=l.appointment_id AND a.shop_id=l.shop_id
           WHERE l.shop_id=?1 AND l.appointment_id IS NOT NULL AND a.id IS NULL",
    )?;
    let mut cur = stmt.query([shop])?;
    let mut issues = Vec::new();
    while let Some(r) = cur.next()? {
        let (id, kind): (i64, String) = (r.get(0)?, r.get(1)?);
        issues.push(Issue::new(DANGLING_REFERENCE, format!("#{} {}", id, kind)));
    }
    Ok(issues)
}
