// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

use crate::store::SqliteStore;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Chairbook", "chairbook"));

pub const DB_ENV: &str = "CHAIRBOOK_DB";

/// Resolves the database file: explicit path, then `CHAIRBOOK_DB`, then the
/// platform data dir.
pub fn db_path(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("chairbook.sqlite"))
}

pub fn open_or_init(explicit: Option<&str>) -> Result<SqliteStore> {
    let path = db_path(explicit)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Create directory {}", parent.display()))?;
    }
    let store =
        SqliteStore::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(store)
}

pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS clients(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shop_id TEXT NOT NULL,
        name TEXT NOT NULL,
        phone TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_clients_shop ON clients(shop_id);

    CREATE TABLE IF NOT EXISTS professionals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shop_id TEXT NOT NULL,
        name TEXT NOT NULL,
        phone TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_professionals_shop ON professionals(shop_id);

    CREATE TABLE IF NOT EXISTS services(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shop_id TEXT NOT NULL,
        name TEXT NOT NULL,
        price_cents INTEGER NOT NULL CHECK(price_cents BETWEEN 0 AND 100000000000),
        duration_minutes INTEGER CHECK(duration_minutes IS NULL OR duration_minutes > 0),
        commission_percent TEXT NOT NULL DEFAULT '0', -- decimal 0..100
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_services_shop ON services(shop_id);

    -- start_time is shop-local wall time, 'YYYY-MM-DD HH:MM:SS'
    CREATE TABLE IF NOT EXISTS appointments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shop_id TEXT NOT NULL,
        client_id INTEGER NOT NULL,
        professional_id INTEGER NOT NULL,
        service_id INTEGER NOT NULL,
        start_time TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'scheduled'
            CHECK(status IN ('scheduled','confirmed','completed','cancelled')),
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(client_id) REFERENCES clients(id),
        FOREIGN KEY(professional_id) REFERENCES professionals(id),
        FOREIGN KEY(service_id) REFERENCES services(id)
    );
    CREATE INDEX IF NOT EXISTS idx_appointments_pro_start
        ON appointments(shop_id, professional_id, start_time);
    CREATE INDEX IF NOT EXISTS idx_appointments_start ON appointments(shop_id, start_time);

    CREATE TRIGGER IF NOT EXISTS appointments_no_delete
    BEFORE DELETE ON appointments
    BEGIN
        SELECT RAISE(ABORT, 'appointments are never deleted; cancel instead');
    END;

    CREATE TABLE IF NOT EXISTS ledger_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        shop_id TEXT NOT NULL,
        amount_cents INTEGER NOT NULL CHECK(amount_cents > 0 AND amount_cents <= 100000000000),
        direction TEXT NOT NULL CHECK(direction IN ('in','out')),
        method TEXT NOT NULL CHECK(method IN ('cash','card','pix','other')),
        occurred_at TEXT NOT NULL,
        appointment_id INTEGER,
        reverses_entry_id INTEGER UNIQUE, -- at most one reversal per entry
        FOREIGN KEY(appointment_id) REFERENCES appointments(id),
        FOREIGN KEY(reverses_entry_id) REFERENCES ledger_entries(id)
    );
    CREATE INDEX IF NOT EXISTS idx_ledger_shop_time ON ledger_entries(shop_id, occurred_at);

    CREATE TRIGGER IF NOT EXISTS ledger_entries_no_update
    BEFORE UPDATE ON ledger_entries
    BEGIN
        SELECT RAISE(ABORT, 'ledger entries are append-only');
    END;

    CREATE TRIGGER IF NOT EXISTS ledger_entries_no_delete
    BEFORE DELETE ON ledger_entries
    BEGIN
        SELECT RAISE(ABORT, 'ledger entries are append-only');
    END;
    "#,
    )
}
