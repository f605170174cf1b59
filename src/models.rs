// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ShopId = String;
pub type RecordId = i64;

/// Largest amount a single price or ledger entry may carry: one billion
/// currency units. Keeps every sum over a shop's ledger inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub shop_id: ShopId,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    pub id: RecordId,
    pub shop_id: ShopId,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: RecordId,
    pub shop_id: ShopId,
    pub name: String,
    pub price_cents: i64,
    pub duration_minutes: Option<u32>,
    pub commission_percent: Decimal, // 0..=100
}

impl Service {
    /// Commission owed for one appointment of this service, in (fractional) cents.
    pub fn commission_cents(&self) -> Decimal {
        Decimal::from(self.price_cents) * self.commission_percent / Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ACTIVE: [AppointmentStatus; 2] =
        [AppointmentStatus::Scheduled, AppointmentStatus::Confirmed];
    pub const PAYABLE: [AppointmentStatus; 2] =
        [AppointmentStatus::Confirmed, AppointmentStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    pub fn accepts_payment(&self) -> bool {
        Self::PAYABLE.contains(self)
    }

    /// Applies `event` to this status, returning the next one if the
    /// transition exists.
    pub fn apply(self, event: AppointmentEvent) -> Option<AppointmentStatus> {
        use AppointmentEvent as E;
        use AppointmentStatus as S;
        match (self, event) {
            (S::Scheduled, E::Confirm) => Some(S::Confirmed),
            (S::Confirmed, E::Complete) => Some(S::Completed),
            (S::Scheduled | S::Confirmed, E::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentEvent {
    Confirm,
    Complete,
    Cancel,
}

impl fmt::Display for AppointmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppointmentEvent::Confirm => "confirm",
            AppointmentEvent::Complete => "complete",
            AppointmentEvent::Cancel => "cancel",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: RecordId,
    pub shop_id: ShopId,
    pub client_id: RecordId,
    pub professional_id: RecordId,
    pub service_id: RecordId,
    pub start_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

/// A booking request that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub shop_id: ShopId,
    pub client_id: RecordId,
    pub professional_id: RecordId,
    pub service_id: RecordId,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Direction::In),
            "out" => Ok(Direction::Out),
            other => Err(format!("unknown direction '{}', expected in|out", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Pix => "pix",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "pix" => Ok(PaymentMethod::Pix),
            "other" => Ok(PaymentMethod::Other),
            other => Err(format!(
                "unknown payment method '{}', expected cash|card|pix|other",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: RecordId,
    pub shop_id: ShopId,
    pub amount_cents: i64,
    pub direction: Direction,
    pub method: PaymentMethod,
    pub occurred_at: NaiveDateTime,
    pub appointment_id: Option<RecordId>,
    /// Set on a compensating entry: the entry it offsets.
    pub reverses: Option<RecordId>,
}

impl LedgerEntry {
    /// In counts positive, Out negative.
    pub fn signed_cents(&self) -> i64 {
        match self.direction {
            Direction::In => self.amount_cents,
            Direction::Out => -self.amount_cents,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
    pub shop_id: ShopId,
    pub amount_cents: i64,
    pub direction: Direction,
    pub method: PaymentMethod,
    pub occurred_at: NaiveDateTime,
    pub appointment_id: Option<RecordId>,
    pub reverses: Option<RecordId>,
}
