// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Append-only cash ledger.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{EngineError, EngineResult, StoreError};
use crate::models::{
    Direction, LedgerEntry, MAX_AMOUNT_CENTS, NewLedgerEntry, PaymentMethod, RecordId,
};
use crate::store::EntityStore;
use crate::time::{Clock, TimeRange};

pub struct Ledger<'a, S: ?Sized, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySheet {
    pub day: NaiveDate,
    pub entries: Vec<LedgerEntry>, // newest first
    pub balance_cents: i64,
}

/// Signed total of `entries`: In adds, Out subtracts.
pub fn signed_total<'e, I>(entries: I) -> i64
where
    I: IntoIterator<Item = &'e LedgerEntry>,
{
    entries.into_iter().map(LedgerEntry::signed_cents).sum()
}

impl<'a, S, C> Ledger<'a, S, C>
where
    S: EntityStore + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Ledger { store, clock }
    }

    /// Appends a cash movement stamped with the current time. An entry tied to
    /// an appointment requires the appointment to be confirmed or completed.
    /// Amounts must lie in `1..=MAX_AMOUNT_CENTS`.
    pub fn record_payment(
        &self,
        shop_id: &str,
        amount_cents: i64,
        method: PaymentMethod,
        direction: Direction,
        appointment_id: Option<RecordId>,
    ) -> EngineResult<LedgerEntry> {
        self.append(shop_id, amount_cents, method, direction, appointment_id, None)
    }

    /// Records the compensating entry for `entry_id`: same amount and method,
    /// opposite direction. The original entry is left untouched. The
    /// appointment reference is carried over only while that appointment
    /// still accepts payments. Each entry can be reversed once.
    pub fn reverse(&self, shop_id: &str, entry_id: RecordId) -> EngineResult<LedgerEntry> {
        let original =
            self.store
                .get_ledger_entry(shop_id, entry_id)?
                .ok_or(EngineError::NotFound {
                    kind: "ledger entry",
                    id: entry_id,
                })?;
        let appointment_id = match original.appointment_id {
            Some(id) => self
                .store
                .get_appointment(shop_id, id)?
                .filter(|a| a.status.accepts_payment())
                .map(|a| a.id),
            None => None,
        };
        tracing::info!(shop = shop_id, entry = entry_id, "reversing ledger entry");
        self.append(
            shop_id,
            original.amount_cents,
            original.method,
            original.direction.opposite(),
            appointment_id,
            Some(entry_id),
        )
    }

    fn append(
        &self,
        shop_id: &str,
        amount_cents: i64,
        method: PaymentMethod,
        direction: Direction,
        appointment_id: Option<RecordId>,
        reverses: Option<RecordId>,
    ) -> EngineResult<LedgerEntry> {
        if !(1..=MAX_AMOUNT_CENTS).contains(&amount_cents) {
            return Err(EngineError::InvalidAmount(amount_cents));
        }
        if let Some(id) = appointment_id {
            let status = self.store.get_appointment(shop_id, id)?.map(|a| a.status);
            if !status.is_some_and(|s| s.accepts_payment()) {
                return Err(EngineError::IneligibleAppointment {
                    appointment_id: id,
                    status,
                });
            }
        }

        let entry = NewLedgerEntry {
            shop_id: shop_id.to_string(),
            amount_cents,
            direction,
            method,
            occurred_at: self.clock.now(),
            appointment_id,
            reverses,
        };
        let saved = match self.store.insert_ledger_entry(&entry) {
            Ok(saved) => saved,
            // status moved between our check and the guarded insert
            Err(StoreError::NotPayable { appointment_id }) => {
                let status = self
                    .store
                    .get_appointment(shop_id, appointment_id)?
                    .map(|a| a.status);
                return Err(EngineError::IneligibleAppointment {
                    appointment_id,
                    status,
                });
            }
            Err(StoreError::AlreadyReversed { entry_id, by }) => {
                tracing::warn!(shop = shop_id, entry = entry_id, by, "entry already reversed");
                return Err(EngineError::AlreadyReversed { entry_id, by });
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            shop = shop_id,
            entry = saved.id,
            amount_cents,
            direction = %direction,
            method = %method,
            appointment = ?appointment_id,
            reverses = ?reverses,
            "ledger entry recorded"
        );
        Ok(saved)
    }

    /// Signed sum of entries with `occurred_at` in `[range.start, range.end)`.
    pub fn balance(&self, shop_id: &str, range: &TimeRange) -> EngineResult<i64> {
        let entries = self.store.list_ledger_entries(shop_id, range)?;
        Ok(signed_total(&entries))
    }

    /// Entries in `range`, newest first.
    pub fn entries(&self, shop_id: &str, range: &TimeRange) -> EngineResult<Vec<LedgerEntry>> {
        let mut entries = self.store.list_ledger_entries(shop_id, range)?;
        entries.reverse();
        Ok(entries)
    }

    pub fn day_sheet(&self, shop_id: &str, day: NaiveDate) -> EngineResult<DaySheet> {
        let entries = self.entries(shop_id, &TimeRange::day_of(day))?;
        let balance_cents = signed_total(&entries);
        Ok(DaySheet {
            day,
            entries,
            balance_cents,
        })
    }
}
