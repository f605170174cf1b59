// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Appointment lifecycle: booking with conflict detection and the
//! scheduled → confirmed → completed / cancelled state machine.

use chrono::NaiveDateTime;

use crate::error::{EngineError, EngineResult, StoreError};
use crate::models::{Appointment, AppointmentEvent, NewAppointment, RecordId};
use crate::notify::{NotificationGateway, confirmation_message};
use crate::store::{AppointmentFilter, EntityStore};
use crate::time::Slot;

pub struct Scheduler<'a, S: ?Sized, N: ?Sized> {
    store: &'a S,
    notifier: &'a N,
}

impl<'a, S, N> Scheduler<'a, S, N>
where
    S: EntityStore + ?Sized,
    N: NotificationGateway + ?Sized,
{
    pub fn new(store: &'a S, notifier: &'a N) -> Self {
        Scheduler { store, notifier }
    }

    /// Books a new appointment in `Scheduled` status.
    ///
    /// Fails with `UnknownReference` if any referenced record is missing from
    /// the shop, and with `SchedulingConflict` if the professional already has
    /// an active appointment overlapping the service's slot. A failed booking
    /// writes nothing.
    pub fn book(
        &self,
        shop_id: &str,
        client_id: RecordId,
        professional_id: RecordId,
        service_id: RecordId,
        start_time: NaiveDateTime,
    ) -> EngineResult<Appointment> {
        if self.store.get_client(shop_id, client_id)?.is_none() {
            return Err(EngineError::UnknownReference {
                kind: "client",
                id: client_id,
            });
        }
        if self
            .store
            .get_professional(shop_id, professional_id)?
            .is_none()
        {
            return Err(EngineError::UnknownReference {
                kind: "professional",
                id: professional_id,
            });
        }
        let service = self.store.get_service(shop_id, service_id)?.ok_or(
            EngineError::UnknownReference {
                kind: "service",
                id: service_id,
            },
        )?;

        let slot = Slot::from_start(start_time, service.duration_minutes);
        let new = NewAppointment {
            shop_id: shop_id.to_string(),
            client_id,
            professional_id,
            service_id,
            start_time,
        };
        match self.store.insert_appointment(&new, slot) {
            Ok(appt) => {
                tracing::info!(
                    shop = shop_id,
                    appointment = appt.id,
                    professional = professional_id,
                    start = %start_time,
                    "appointment booked"
                );
                Ok(appt)
            }
            Err(StoreError::SlotTaken { existing }) => {
                tracing::warn!(
                    shop = shop_id,
                    professional = professional_id,
                    start = %start_time,
                    existing,
                    "booking rejected: slot taken"
                );
                Err(EngineError::SchedulingConflict {
                    professional_id,
                    existing,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Confirms a scheduled appointment and asks the gateway to tell the
    /// client. Notification problems are logged and never fail the call.
    pub fn confirm(&self, shop_id: &str, id: RecordId) -> EngineResult<Appointment> {
        let appt = self.transition(shop_id, id, AppointmentEvent::Confirm)?;
        self.notify_client(&appt);
        Ok(appt)
    }

    pub fn complete(&self, shop_id: &str, id: RecordId) -> EngineResult<Appointment> {
        self.transition(shop_id, id, AppointmentEvent::Complete)
    }

    pub fn cancel(&self, shop_id: &str, id: RecordId) -> EngineResult<Appointment> {
        self.transition(shop_id, id, AppointmentEvent::Cancel)
    }

    pub fn agenda(
        &self,
        shop_id: &str,
        filter: &AppointmentFilter,
    ) -> EngineResult<Vec<Appointment>> {
        Ok(self.store.list_appointments(shop_id, filter)?)
    }

    fn transition(
        &self,
        shop_id: &str,
        id: RecordId,
        event: AppointmentEvent,
    ) -> EngineResult<Appointment> {
        // Statuses only move forward, so a lost swap is retried at most once
        // per remaining state.
        loop {
            let current = self
                .store
                .get_appointment(shop_id, id)?
                .ok_or(EngineError::NotFound {
                    kind: "appointment",
                    id,
                })?;
            let next = current
                .status
                .apply(event)
                .ok_or(EngineError::InvalidTransition {
                    from: current.status,
                    event,
                })?;
            if self
                .store
                .update_appointment_status(shop_id, id, current.status, next)?
            {
                tracing::info!(
                    shop = shop_id,
                    appointment = id,
                    from = %current.status,
                    to = %next,
                    "appointment status changed"
                );
                return Ok(Appointment {
                    status: next,
                    ..current
                });
            }
            tracing::debug!(appointment = id, "status changed concurrently, re-reading");
        }
    }

    fn notify_client(&self, appt: &Appointment) {
        let client = match self.store.get_client(&appt.shop_id, appt.client_id) {
            Ok(Some(c)) => c,
            Ok(None) => {
                tracing::warn!(appointment = appt.id, "client vanished, no notification sent");
                return;
            }
            Err(e) => {
                tracing::warn!(appointment = appt.id, error = %e, "client lookup failed, no notification sent");
                return;
            }
        };
        let Some(phone) = client.phone.as_deref().filter(|p| !p.trim().is_empty()) else {
            tracing::debug!(appointment = appt.id, "client has no phone, skipping notification");
            return;
        };
        let message = confirmation_message(&client.name, appt.start_time);
        if let Err(e) = self.notifier.notify(phone, &message) {
            tracing::warn!(appointment = appt.id, error = %e, "confirmation notification failed");
        }
    }
}
