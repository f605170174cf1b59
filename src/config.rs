// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::notify::DEFAULT_COUNTRY_CODE;

pub const SHOP_ENV: &str = "CHAIRBOOK_SHOP";
const DEFAULT_SHOP_KEY: &str = "default_shop";
const COUNTRY_CODE_KEY: &str = "phone_country_code";

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_default_shop(conn: &Connection) -> Result<Option<String>> {
    get_setting(conn, DEFAULT_SHOP_KEY)
}

pub fn set_default_shop(conn: &Connection, shop: &str) -> Result<()> {
    let shop = shop.trim();
    if shop.is_empty() {
        bail!("Shop id cannot be empty");
    }
    set_setting(conn, DEFAULT_SHOP_KEY, shop)
}

pub fn get_country_code(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, COUNTRY_CODE_KEY)?.unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()))
}

pub fn set_country_code(conn: &Connection, code: &str) -> Result<()> {
    let code = code.trim().trim_start_matches('+');
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid country code '{}', expected digits like 55", code);
    }
    set_setting(conn, COUNTRY_CODE_KEY, code)
}

/// Effective settings after applying flag and environment overrides.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub db_path: String,
    pub shop: Option<String>,
    pub phone_country_code: String,
}

/// Shop precedence: `--shop` flag, `CHAIRBOOK_SHOP`, stored default.
pub fn resolve_shop(conn: &Connection, flag: Option<&str>) -> Result<Option<String>> {
    if let Some(s) = flag.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(Some(s.to_string()));
    }
    if let Ok(s) = std::env::var(SHOP_ENV) {
        if !s.trim().is_empty() {
            return Ok(Some(s.trim().to_string()));
        }
    }
    get_default_shop(conn)
}

pub fn require_shop(conn: &Connection, flag: Option<&str>) -> Result<String> {
    match resolve_shop(conn, flag)? {
        Some(s) => Ok(s),
        None => bail!(
            "No shop selected: pass --shop, set {} or run `chairbook config set-shop <id>`",
            SHOP_ENV
        ),
    }
}

pub fn load(conn: &Connection, db_path: String, shop_flag: Option<&str>) -> Result<Settings> {
    Ok(Settings {
        db_path,
        shop: resolve_shop(conn, shop_flag)?,
        phone_country_code: get_country_code(conn)?,
    })
}
