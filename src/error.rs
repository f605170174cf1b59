// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AppointmentEvent, AppointmentStatus, MAX_AMOUNT_CENTS, RecordId};
use thiserror::Error;

/// Failures raised by an [`EntityStore`](crate::store::EntityStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("slot already taken by appointment {existing}")]
    SlotTaken { existing: RecordId },
    #[error("appointment {appointment_id} does not accept payments")]
    NotPayable { appointment_id: RecordId },
    #[error("ledger entry {entry_id} was already reversed by entry {by}")]
    AlreadyReversed { entry_id: RecordId, by: RecordId },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by the scheduling engine and the ledger.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: RecordId },
    #[error("unknown {kind} {id}")]
    UnknownReference { kind: &'static str, id: RecordId },
    #[error("cannot {event} an appointment that is {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        event: AppointmentEvent,
    },
    #[error("professional {professional_id} is already booked by appointment {existing}")]
    SchedulingConflict {
        professional_id: RecordId,
        existing: RecordId,
    },
    #[error("appointment {appointment_id} cannot take payments{}", status_suffix(.status))]
    IneligibleAppointment {
        appointment_id: RecordId,
        status: Option<AppointmentStatus>,
    },
    #[error("amount must be between 1 and {max} cents, got {0}", max = MAX_AMOUNT_CENTS)]
    InvalidAmount(i64),
    #[error("ledger entry {entry_id} was already reversed by entry {by}")]
    AlreadyReversed { entry_id: RecordId, by: RecordId },
    #[error(transparent)]
    Store(StoreError),
}

fn status_suffix(status: &Option<AppointmentStatus>) -> String {
    match status {
        Some(s) => format!(" while {}", s),
        None => String::new(),
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Raised by a notification gateway. Never propagated out of the scheduler.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no usable phone number in '{0}'")]
    InvalidPhone(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}
