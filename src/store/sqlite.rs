// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{
    Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params,
    params_from_iter,
};
use rust_decimal::Decimal;

use super::{AppointmentFilter, EntityStore};
use crate::db::init_schema;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Appointment, AppointmentStatus, Client, Direction, LedgerEntry, MAX_AMOUNT_CENTS,
    NewAppointment, NewLedgerEntry, PaymentMethod, Professional, RecordId, Service,
};
use crate::time::{Slot, TimeRange, format_instant, parse_instant};

const BUSY_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// [`EntityStore`] backed by a single SQLite connection.
///
/// Writers that must be atomic (booking, guarded ledger inserts) open a
/// `BEGIN IMMEDIATE` transaction, so separate connections to the same file
/// serialise on the database write lock.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_schema(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::new(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_client(
        &self,
        shop_id: &str,
        name: &str,
        phone: Option<&str>,
    ) -> StoreResult<Client> {
        self.conn.execute(
            "INSERT INTO clients(shop_id, name, phone) VALUES (?1, ?2, ?3)",
            params![shop_id, name, phone],
        )?;
        Ok(Client {
            id: self.conn.last_insert_rowid(),
            shop_id: shop_id.to_string(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
        })
    }

    pub fn insert_professional(
        &self,
        shop_id: &str,
        name: &str,
        phone: Option<&str>,
    ) -> StoreResult<Professional> {
        self.conn.execute(
            "INSERT INTO professionals(shop_id, name, phone) VALUES (?1, ?2, ?3)",
            params![shop_id, name, phone],
        )?;
        Ok(Professional {
            id: self.conn.last_insert_rowid(),
            shop_id: shop_id.to_string(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
        })
    }

    pub fn insert_service(
        &self,
        shop_id: &str,
        name: &str,
        price_cents: i64,
        duration_minutes: Option<u32>,
        commission_percent: Decimal,
    ) -> StoreResult<Service> {
        if !(0..=MAX_AMOUNT_CENTS).contains(&price_cents) {
            return Err(StoreError::Invalid(format!(
                "price {} cents outside 0..={} for service '{}'",
                price_cents, MAX_AMOUNT_CENTS, name
            )));
        }
        if commission_percent < Decimal::ZERO || commission_percent > Decimal::ONE_HUNDRED {
            return Err(StoreError::Invalid(format!(
                "commission {} outside 0..=100 for service '{}'",
                commission_percent, name
            )));
        }
        self.conn.execute(
            "INSERT INTO services(shop_id, name, price_cents, duration_minutes, commission_percent)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                shop_id,
                name,
                price_cents,
                duration_minutes,
                commission_percent.to_string()
            ],
        )?;
        Ok(Service {
            id: self.conn.last_insert_rowid(),
            shop_id: shop_id.to_string(),
            name: name.to_string(),
            price_cents,
            duration_minutes,
            commission_percent,
        })
    }

    pub fn list_clients(&self, shop_id: &str) -> StoreResult<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, shop_id, name, phone FROM clients WHERE shop_id=?1 ORDER BY name")?;
        let rows = stmt.query_map(params![shop_id], |r| {
            Ok(Client {
                id: r.get(0)?,
                shop_id: r.get(1)?,
                name: r.get(2)?,
                phone: r.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn longest_duration(tx: &Transaction<'_>, shop_id: &str) -> StoreResult<i64> {
        let max: Option<i64> = tx.query_row(
            "SELECT MAX(duration_minutes) FROM services WHERE shop_id=?1",
            params![shop_id],
            |r| r.get(0),
        )?;
        Ok(max.unwrap_or(0))
    }
}

struct RawAppointment {
    id: i64,
    shop_id: String,
    client_id: i64,
    professional_id: i64,
    service_id: i64,
    start_time: String,
    status: String,
}

const APPOINTMENT_COLUMNS: &str =
    "id, shop_id, client_id, professional_id, service_id, start_time, status";

impl RawAppointment {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawAppointment {
            id: r.get(0)?,
            shop_id: r.get(1)?,
            client_id: r.get(2)?,
            professional_id: r.get(3)?,
            service_id: r.get(4)?,
            start_time: r.get(5)?,
            status: r.get(6)?,
        })
    }

    fn decode(self) -> StoreResult<Appointment> {
        Ok(Appointment {
            start_time: decode_instant(&self.start_time, "appointment", self.id)?,
            status: self
                .status
                .parse::<AppointmentStatus>()
                .map_err(|e| StoreError::Corrupt(format!("appointment {}: {}", self.id, e)))?,
            id: self.id,
            shop_id: self.shop_id,
            client_id: self.client_id,
            professional_id: self.professional_id,
            service_id: self.service_id,
        })
    }
}

struct RawLedgerEntry {
    id: i64,
    shop_id: String,
    amount_cents: i64,
    direction: String,
    method: String,
    occurred_at: String,
    appointment_id: Option<i64>,
    reverses: Option<i64>,
}

const LEDGER_COLUMNS: &str =
    "id, shop_id, amount_cents, direction, method, occurred_at, appointment_id, reverses_entry_id";

impl RawLedgerEntry {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawLedgerEntry {
            id: r.get(0)?,
            shop_id: r.get(1)?,
            amount_cents: r.get(2)?,
            direction: r.get(3)?,
            method: r.get(4)?,
            occurred_at: r.get(5)?,
            appointment_id: r.get(6)?,
            reverses: r.get(7)?,
        })
    }

    fn decode(self) -> StoreResult<LedgerEntry> {
        let corrupt = |e: String| StoreError::Corrupt(format!("ledger entry {}: {}", self.id, e));
        Ok(LedgerEntry {
            direction: self.direction.parse::<Direction>().map_err(corrupt)?,
            method: self.method.parse::<PaymentMethod>().map_err(corrupt)?,
            occurred_at: decode_instant(&self.occurred_at, "ledger entry", self.id)?,
            id: self.id,
            shop_id: self.shop_id,
            amount_cents: self.amount_cents,
            appointment_id: self.appointment_id,
            reverses: self.reverses,
        })
    }
}

fn decode_instant(s: &str, kind: &str, id: RecordId) -> StoreResult<NaiveDateTime> {
    parse_instant(s)
        .ok_or_else(|| StoreError::Corrupt(format!("{} {}: bad timestamp '{}'", kind, id, s)))
}

fn decode_service(
    id: i64,
    shop_id: String,
    name: String,
    price_cents: i64,
    duration: Option<i64>,
    commission: String,
) -> StoreResult<Service> {
    let commission_percent = commission.parse::<Decimal>().map_err(|_| {
        StoreError::Corrupt(format!("service {}: bad commission '{}'", id, commission))
    })?;
    let duration_minutes = match duration {
        Some(d) => Some(u32::try_from(d).map_err(|_| {
            StoreError::Corrupt(format!("service {}: bad duration {}", id, d))
        })?),
        None => None,
    };
    Ok(Service {
        id,
        shop_id,
        name,
        price_cents,
        duration_minutes,
        commission_percent,
    })
}

type RawService = (i64, String, String, i64, Option<i64>, String);

fn raw_service(r: &Row<'_>) -> rusqlite::Result<RawService> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

const SERVICE_COLUMNS: &str =
    "id, shop_id, name, price_cents, duration_minutes, commission_percent";

impl EntityStore for SqliteStore {
    fn get_client(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Client>> {
        let client = self
            .conn
            .query_row(
                "SELECT id, shop_id, name, phone FROM clients WHERE id=?1 AND shop_id=?2",
                params![id, shop_id],
                |r| {
                    Ok(Client {
                        id: r.get(0)?,
                        shop_id: r.get(1)?,
                        name: r.get(2)?,
                        phone: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(client)
    }

    fn get_professional(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Professional>> {
        let pro = self
            .conn
            .query_row(
                "SELECT id, shop_id, name, phone FROM professionals WHERE id=?1 AND shop_id=?2",
                params![id, shop_id],
                |r| {
                    Ok(Professional {
                        id: r.get(0)?,
                        shop_id: r.get(1)?,
                        name: r.get(2)?,
                        phone: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(pro)
    }

    fn get_service(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Service>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id=?1 AND shop_id=?2"),
                params![id, shop_id],
                raw_service,
            )
            .optional()?;
        raw.map(|(id, shop, name, price, dur, comm)| {
            decode_service(id, shop, name, price, dur, comm)
        })
        .transpose()
    }

    fn get_appointment(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Appointment>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id=?1 AND shop_id=?2"
                ),
                params![id, shop_id],
                RawAppointment::from_row,
            )
            .optional()?;
        raw.map(RawAppointment::decode).transpose()
    }

    fn list_professionals(&self, shop_id: &str) -> StoreResult<Vec<Professional>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, shop_id, name, phone FROM professionals WHERE shop_id=?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![shop_id], |r| {
            Ok(Professional {
                id: r.get(0)?,
                shop_id: r.get(1)?,
                name: r.get(2)?,
                phone: r.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn list_services(&self, shop_id: &str) -> StoreResult<Vec<Service>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE shop_id=?1 ORDER BY name"
        ))?;
        let rows = stmt.query_map(params![shop_id], raw_service)?;
        let mut out = Vec::new();
        for row in rows {
            let (id, shop, name, price, dur, comm) = row?;
            out.push(decode_service(id, shop, name, price, dur, comm)?);
        }
        Ok(out)
    }

    fn list_appointments(
        &self,
        shop_id: &str,
        filter: &AppointmentFilter,
    ) -> StoreResult<Vec<Appointment>> {
        let mut sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE shop_id=?");
        let mut params_vec: Vec<Value> = vec![Value::Text(shop_id.to_string())];

        if let Some(pro) = filter.professional_id {
            sql.push_str(" AND professional_id=?");
            params_vec.push(Value::Integer(pro));
        }
        if let Some(statuses) = filter.status_in.as_ref() {
            if statuses.is_empty() {
                return Ok(Vec::new());
            }
            let marks = vec!["?"; statuses.len()].join(",");
            sql.push_str(&format!(" AND status IN ({})", marks));
            params_vec.extend(statuses.iter().map(|s| Value::Text(s.as_str().to_string())));
        }
        if let Some(range) = filter.time_range.as_ref() {
            sql.push_str(" AND start_time >= ? AND start_time < ?");
            params_vec.push(Value::Text(format_instant(range.start)));
            params_vec.push(Value::Text(format_instant(range.end)));
        }
        sql.push_str(" ORDER BY start_time, id");
        tracing::debug!(%sql, "list appointments");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params_vec.iter()), RawAppointment::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.decode()?);
        }
        Ok(out)
    }

    fn insert_appointment(&self, new: &NewAppointment, slot: Slot) -> StoreResult<Appointment> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let lookback = Duration::minutes(Self::longest_duration(&tx, &new.shop_id)?);
        let candidates: Vec<(i64, String, Option<i64>)> = {
            let mut stmt = tx.prepare_cached(
                "SELECT a.id, a.start_time, s.duration_minutes
                 FROM appointments a LEFT JOIN services s ON s.id=a.service_id
                 WHERE a.shop_id=?1 AND a.professional_id=?2
                   AND a.status IN ('scheduled','confirmed')
                   AND a.start_time >= ?3 AND a.start_time <= ?4
                 ORDER BY a.start_time",
            )?;
            let rows = stmt.query_map(
                params![
                    new.shop_id,
                    new.professional_id,
                    format_instant(slot.start - lookback),
                    format_instant(slot.end),
                ],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        for (existing, start, duration) in candidates {
            let start = decode_instant(&start, "appointment", existing)?;
            let duration = duration.and_then(|d| u32::try_from(d).ok());
            if Slot::from_start(start, duration).overlaps(&slot) {
                // dropping `tx` rolls back
                return Err(StoreError::SlotTaken { existing });
            }
        }

        tx.execute(
            "INSERT INTO appointments(shop_id, client_id, professional_id, service_id, start_time, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.shop_id,
                new.client_id,
                new.professional_id,
                new.service_id,
                format_instant(new.start_time),
                AppointmentStatus::Scheduled.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Appointment {
            id,
            shop_id: new.shop_id.clone(),
            client_id: new.client_id,
            professional_id: new.professional_id,
            service_id: new.service_id,
            start_time: new.start_time,
            status: AppointmentStatus::Scheduled,
        })
    }

    fn update_appointment_status(
        &self,
        shop_id: &str,
        id: RecordId,
        expected: AppointmentStatus,
        new: AppointmentStatus,
    ) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE appointments SET status=?1 WHERE id=?2 AND shop_id=?3 AND status=?4",
            params![new.as_str(), id, shop_id, expected.as_str()],
        )?;
        Ok(changed == 1)
    }

    fn insert_ledger_entry(&self, entry: &NewLedgerEntry) -> StoreResult<LedgerEntry> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        if let Some(appointment_id) = entry.appointment_id {
            let status: Option<String> = tx
                .query_row(
                    "SELECT status FROM appointments WHERE id=?1 AND shop_id=?2",
                    params![appointment_id, entry.shop_id],
                    |r| r.get(0),
                )
                .optional()?;
            let payable = status
                .and_then(|s| s.parse::<AppointmentStatus>().ok())
                .is_some_and(|s| s.accepts_payment());
            if !payable {
                return Err(StoreError::NotPayable { appointment_id });
            }
        }
        if let Some(entry_id) = entry.reverses {
            let by: Option<i64> = tx
                .query_row(
                    "SELECT id FROM ledger_entries WHERE reverses_entry_id=?1",
                    params![entry_id],
                    |r| r.get(0),
                )
                .optional()?;
            if let Some(by) = by {
                return Err(StoreError::AlreadyReversed { entry_id, by });
            }
        }

        tx.execute(
            "INSERT INTO ledger_entries(shop_id, amount_cents, direction, method, occurred_at, appointment_id, reverses_entry_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.shop_id,
                entry.amount_cents,
                entry.direction.as_str(),
                entry.method.as_str(),
                format_instant(entry.occurred_at),
                entry.appointment_id,
                entry.reverses,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(LedgerEntry {
            id,
            shop_id: entry.shop_id.clone(),
            amount_cents: entry.amount_cents,
            direction: entry.direction,
            method: entry.method,
            occurred_at: entry.occurred_at,
            appointment_id: entry.appointment_id,
            reverses: entry.reverses,
        })
    }

    fn get_ledger_entry(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<LedgerEntry>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE id=?1 AND shop_id=?2"),
                params![id, shop_id],
                RawLedgerEntry::from_row,
            )
            .optional()?;
        raw.map(RawLedgerEntry::decode).transpose()
    }

    fn list_ledger_entries(
        &self,
        shop_id: &str,
        range: &TimeRange,
    ) -> StoreResult<Vec<LedgerEntry>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries
             WHERE shop_id=?1 AND occurred_at >= ?2 AND occurred_at < ?3
             ORDER BY occurred_at, id"
        ))?;
        let rows = stmt.query_map(
            params![
                shop_id,
                format_instant(range.start),
                format_instant(range.end)
            ],
            RawLedgerEntry::from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.decode()?);
        }
        Ok(out)
    }
}
