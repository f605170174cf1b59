// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Data-access seam between the engine and durable storage.

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreResult;
use crate::models::{
    Appointment, AppointmentStatus, Client, LedgerEntry, NewAppointment, NewLedgerEntry,
    Professional, RecordId, Service,
};
use crate::time::{Slot, TimeRange};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub professional_id: Option<RecordId>,
    pub status_in: Option<Vec<AppointmentStatus>>,
    pub time_range: Option<TimeRange>,
}

impl AppointmentFilter {
    pub fn for_professional(mut self, id: RecordId) -> Self {
        self.professional_id = Some(id);
        self
    }

    pub fn with_statuses(mut self, statuses: &[AppointmentStatus]) -> Self {
        self.status_in = Some(statuses.to_vec());
        self
    }

    pub fn within(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn matches(&self, a: &Appointment) -> bool {
        self.professional_id.is_none_or(|p| a.professional_id == p)
            && self
                .status_in
                .as_ref()
                .is_none_or(|s| s.contains(&a.status))
            && self.time_range.is_none_or(|r| r.contains(a.start_time))
    }
}

/// Tenant-scoped storage for every record the engine reads or writes.
///
/// Every lookup takes the `shop_id`; a record belonging to another tenant is
/// reported as absent.
pub trait EntityStore {
    fn get_client(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Client>>;
    fn get_professional(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Professional>>;
    fn get_service(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Service>>;
    fn get_appointment(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<Appointment>>;

    fn list_professionals(&self, shop_id: &str) -> StoreResult<Vec<Professional>>;
    fn list_services(&self, shop_id: &str) -> StoreResult<Vec<Service>>;

    /// Appointments ordered by start time.
    fn list_appointments(
        &self,
        shop_id: &str,
        filter: &AppointmentFilter,
    ) -> StoreResult<Vec<Appointment>>;

    /// Inserts the appointment unless `slot` overlaps an active (scheduled or
    /// confirmed) appointment of the same professional. The overlap check and
    /// the insert happen as one atomic step; on overlap nothing is written and
    /// [`StoreError::SlotTaken`](crate::error::StoreError::SlotTaken) is returned.
    fn insert_appointment(&self, new: &NewAppointment, slot: Slot) -> StoreResult<Appointment>;

    /// Compare-and-swap on the status column. Returns `false` when the stored
    /// status no longer equals `expected`.
    fn update_appointment_status(
        &self,
        shop_id: &str,
        id: RecordId,
        expected: AppointmentStatus,
        new: AppointmentStatus,
    ) -> StoreResult<bool>;

    /// Appends an entry. When it references an appointment, the appointment's
    /// payability is checked in the same atomic step; a failed check writes
    /// nothing and yields [`StoreError::NotPayable`](crate::error::StoreError::NotPayable).
    fn insert_ledger_entry(&self, entry: &NewLedgerEntry) -> StoreResult<LedgerEntry>;

    fn get_ledger_entry(&self, shop_id: &str, id: RecordId) -> StoreResult<Option<LedgerEntry>>;

    /// Entries with `occurred_at` in `range`, oldest first.
    fn list_ledger_entries(&self, shop_id: &str, range: &TimeRange)
    -> StoreResult<Vec<LedgerEntry>>;
}
