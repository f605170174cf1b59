// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::MAX_AMOUNT_CENTS;
use crate::time::TimeRange;

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber once. Logs go to stderr so stdout stays
/// clean for tables and JSON.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("chairbook=info"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM` and either with seconds.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    bail!("Invalid date/time '{}', expected YYYY-MM-DD HH:MM", s)
}

/// Parses a currency amount such as `50` or `49.90` into cents, up to
/// [`MAX_AMOUNT_CENTS`].
pub fn parse_money(s: &str) -> Result<i64> {
    let d = s
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s))?;
    if d.normalize().scale() > 2 {
        bail!("Amount '{}' has more than two decimal places", s);
    }
    let cents = (d * Decimal::ONE_HUNDRED)
        .to_i64()
        .filter(|c| c.abs() <= MAX_AMOUNT_CENTS)
        .with_context(|| format!("Amount '{}' is out of range", s))?;
    Ok(cents)
}

pub fn parse_percent(s: &str) -> Result<Decimal> {
    let d = s
        .trim()
        .trim_end_matches('%')
        .parse::<Decimal>()
        .with_context(|| format!("Invalid percentage '{}'", s))?;
    if d < Decimal::ZERO || d > Decimal::ONE_HUNDRED {
        bail!("Percentage '{}' must be between 0 and 100", s);
    }
    Ok(d)
}

pub fn fmt_cents(cents: i64) -> String {
    Decimal::new(cents, 2).to_string()
}

/// Fractional cents rendered as currency with two decimals.
pub fn fmt_decimal_cents(cents: Decimal) -> String {
    format!("{:.2}", (cents / Decimal::ONE_HUNDRED).round_dp(2))
}

/// Builds a window from optional `--from`/`--to` dates; `--to` is inclusive.
pub fn date_window(from: Option<&String>, to: Option<&String>) -> Result<Option<TimeRange>> {
    match (from, to) {
        (None, None) => Ok(None),
        (from, to) => {
            let start = match from {
                Some(f) => TimeRange::day_of(parse_date(f)?).start,
                None => TimeRange::everything().start,
            };
            let end = match to {
                Some(t) => TimeRange::day_of(parse_date(t)?).end,
                None => TimeRange::everything().end,
            };
            TimeRange::new(start, end)
                .map(Some)
                .context("--from must not be after --to")
        }
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
