// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only aggregations over a point-in-time snapshot of a shop.
//!
//! Nothing here touches the clock: every time window is derived from an
//! explicit reference day or range supplied by the caller.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::StoreResult;
use crate::ledger::signed_total;
use crate::models::{
    Appointment, AppointmentStatus, Direction, LedgerEntry, Professional, RecordId, Service,
};
use crate::store::{AppointmentFilter, EntityStore};
use crate::time::{TimeRange, hour_label};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub appointments: Vec<Appointment>,
    pub ledger: Vec<LedgerEntry>,
    pub services: Vec<Service>,
    /// Used to decide which professionals are resolvable for the ranking.
    pub professionals: Vec<Professional>,
}

impl Snapshot {
    /// Reads everything a report needs for `shop_id`, optionally limited to
    /// appointments starting and entries occurring inside `range`.
    pub fn load<S>(
        store: &S,
        shop_id: &str,
        range: Option<TimeRange>,
    ) -> StoreResult<Self>
    where
        S: EntityStore + ?Sized,
    {
        let filter = AppointmentFilter {
            time_range: range,
            ..AppointmentFilter::default()
        };
        let ledger_range = range.unwrap_or_else(TimeRange::everything);
        Ok(Snapshot {
            appointments: store.list_appointments(shop_id, &filter)?,
            ledger: store.list_ledger_entries(shop_id, &ledger_range)?,
            services: store.list_services(shop_id)?,
            professionals: store.list_professionals(shop_id)?,
        })
    }

    pub fn without_cancelled(mut self) -> Self {
        self.appointments
            .retain(|a| a.status != AppointmentStatus::Cancelled);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowTotals {
    pub range: TimeRange,
    pub balance_cents: i64,
    pub in_total_cents: i64,
    pub in_count: usize,
}

impl WindowTotals {
    pub fn over(entries: &[LedgerEntry], range: TimeRange) -> Self {
        let inside: Vec<&LedgerEntry> = entries
            .iter()
            .filter(|e| range.contains(e.occurred_at))
            .collect();
        let incoming = inside.iter().filter(|e| e.direction == Direction::In);
        WindowTotals {
            range,
            balance_cents: signed_total(inside.iter().copied()),
            in_total_cents: incoming.clone().map(|e| e.amount_cents).sum(),
            in_count: incoming.count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRollup {
    pub reference_day: NaiveDate,
    pub today: WindowTotals,
    pub week: WindowTotals,
    pub month: WindowTotals,
    /// Month In-total divided by the month's In-entry count, in cents.
    pub ticket_average_cents: Decimal,
}

pub fn revenue_rollup(entries: &[LedgerEntry], reference_day: NaiveDate) -> RevenueRollup {
    let month = WindowTotals::over(entries, TimeRange::month_of(reference_day));
    let ticket_average_cents = if month.in_count == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(month.in_total_cents) / Decimal::from(month.in_count as u64)
    };
    RevenueRollup {
        reference_day,
        today: WindowTotals::over(entries, TimeRange::day_of(reference_day)),
        week: WindowTotals::over(entries, TimeRange::week_of(reference_day)),
        month,
        ticket_average_cents,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfessionalRevenue {
    pub professional_id: RecordId,
    pub appointments: usize,
    /// Sum of service list prices; not money actually collected.
    pub gross_cents: i64,
    pub commission_cents: Decimal,
}

/// Gross attributed revenue and commission owed per professional, in order
/// of first appearance. Appointments whose professional is not among
/// `professionals` are left out; an unresolvable service contributes nothing
/// but still counts as an appointment.
pub fn professional_ranking(
    appointments: &[Appointment],
    services: &[Service],
    professionals: &[Professional],
) -> Vec<ProfessionalRevenue> {
    let services = index_services(services);
    let known: HashSet<RecordId> = professionals.iter().map(|p| p.id).collect();
    let mut order: HashMap<RecordId, usize> = HashMap::new();
    let mut out: Vec<ProfessionalRevenue> = Vec::new();

    for appt in appointments {
        if !known.contains(&appt.professional_id) {
            continue;
        }
        let idx = *order.entry(appt.professional_id).or_insert_with(|| {
            out.push(ProfessionalRevenue {
                professional_id: appt.professional_id,
                appointments: 0,
                gross_cents: 0,
                commission_cents: Decimal::ZERO,
            });
            out.len() - 1
        });
        let row = &mut out[idx];
        row.appointments += 1;
        if let Some(svc) = services.get(&appt.service_id) {
            row.gross_cents += svc.price_cents;
            row.commission_cents += svc.commission_cents();
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub name: String,
    pub count: usize,
}

/// Appointment count per service name, in order of first appearance.
pub fn service_popularity(appointments: &[Appointment], services: &[Service]) -> Vec<ServiceCount> {
    let services = index_services(services);
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<ServiceCount> = Vec::new();
    for appt in appointments {
        let Some(svc) = services.get(&appt.service_id) else {
            continue;
        };
        let idx = *order.entry(svc.name.as_str()).or_insert_with(|| {
            out.push(ServiceCount {
                name: svc.name.clone(),
                count: 0,
            });
            out.len() - 1
        });
        out[idx].count += 1;
    }
    out
}

/// Appointment count per hour of day, keyed `"HH:00"`.
pub fn hourly_histogram(appointments: &[Appointment]) -> BTreeMap<String, usize> {
    let mut hist = BTreeMap::new();
    for appt in appointments {
        *hist.entry(hour_label(appt.start_time)).or_insert(0) += 1;
    }
    hist
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOverview {
    pub day: NaiveDate,
    pub pending: Vec<Appointment>,
    pub confirmed: Vec<Appointment>,
    pub collected_cents: i64,
}

/// The front-desk view of one day: what still needs confirming, what is
/// confirmed, and the money taken in so far.
pub fn daily_overview(
    appointments: &[Appointment],
    entries: &[LedgerEntry],
    day: NaiveDate,
    professional: Option<RecordId>,
) -> DailyOverview {
    let range = TimeRange::day_of(day);
    let mut todays: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| range.contains(a.start_time))
        .filter(|a| professional.is_none_or(|p| a.professional_id == p))
        .collect();
    todays.sort_by_key(|a| (a.start_time, a.id));
    let pick = |status: AppointmentStatus| -> Vec<Appointment> {
        todays
            .iter()
            .filter(|a| a.status == status)
            .map(|a| (*a).clone())
            .collect()
    };
    DailyOverview {
        day,
        pending: pick(AppointmentStatus::Scheduled),
        confirmed: pick(AppointmentStatus::Confirmed),
        collected_cents: WindowTotals::over(entries, range).in_total_cents,
    }
}

fn index_services(services: &[Service]) -> HashMap<RecordId, &Service> {
    services.iter().map(|s| (s.id, s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        crate::time::parse_instant(s).unwrap()
    }

    fn appt(id: i64, pro: i64, svc: i64, start: &str, status: AppointmentStatus) -> Appointment {
        Appointment {
            id,
            shop_id: "s".into(),
            client_id: 1,
            professional_id: pro,
            service_id: svc,
            start_time: at(start),
            status,
        }
    }

    fn entry(id: i64, cents: i64, dir: Direction, when: &str) -> LedgerEntry {
        LedgerEntry {
            id,
            shop_id: "s".into(),
            amount_cents: cents,
            direction: dir,
            method: PaymentMethod::Cash,
            occurred_at: at(when),
            appointment_id: None,
            reverses: None,
        }
    }

    fn service(id: i64, name: &str, price: i64, pct: i64) -> Service {
        Service {
            id,
            shop_id: "s".into(),
            name: name.into(),
            price_cents: price,
            duration_minutes: Some(30),
            commission_percent: Decimal::from(pct),
        }
    }

    fn pro(id: i64) -> Professional {
        Professional {
            id,
            shop_id: "s".into(),
            name: format!("Pro {id}"),
            phone: None,
        }
    }

    #[test]
    fn histogram_buckets_by_hour() {
        use AppointmentStatus::Scheduled;
        let appts = vec![
            appt(1, 1, 1, "2025-05-02 09:15:00", Scheduled),
            appt(2, 1, 1, "2025-05-02 09:50:00", Scheduled),
            appt(3, 2, 1, "2025-05-02 14:00:00", Scheduled),
        ];
        let hist = hourly_histogram(&appts);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist["09:00"], 2);
        assert_eq!(hist["14:00"], 1);
    }

    #[test]
    fn ranking_scenario_commission() {
        let appts = vec![appt(
            1,
            7,
            1,
            "2025-05-02 10:00:00",
            AppointmentStatus::Completed,
        )];
        let ranking = professional_ranking(&appts, &[service(1, "Corte", 5000, 20)], &[pro(7)]);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].professional_id, 7);
        assert_eq!(ranking[0].gross_cents, 5000);
        assert_eq!(ranking[0].commission_cents, Decimal::from(1000));
    }

    #[test]
    fn ranking_skips_unknown_professionals() {
        use AppointmentStatus::Confirmed;
        let appts = vec![
            appt(1, 1, 1, "2025-05-02 10:00:00", Confirmed),
            appt(2, 99, 1, "2025-05-02 11:00:00", Confirmed),
        ];
        let ranking = professional_ranking(&appts, &[service(1, "Corte", 5000, 20)], &[pro(1)]);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].professional_id, 1);
    }

    #[test]
    fn aggregation_ignores_input_order() {
        use AppointmentStatus::*;
        let services = vec![
            service(1, "Corte", 4000, 10),
            service(2, "Barba", 2500, 35),
            service(3, "Sobrancelha", 1500, 50),
        ];
        let pros = vec![pro(1), pro(2), pro(3)];
        let mut appts = vec![
            appt(1, 1, 1, "2025-05-02 09:00:00", Completed),
            appt(2, 2, 2, "2025-05-02 09:30:00", Confirmed),
            appt(3, 1, 3, "2025-05-02 10:00:00", Scheduled),
            appt(4, 3, 1, "2025-05-02 11:00:00", Completed),
            appt(5, 2, 1, "2025-05-02 11:30:00", Cancelled),
            appt(6, 1, 2, "2025-05-03 15:00:00", Completed),
        ];

        let sorted_ranking = |a: &[Appointment]| {
            let mut r = professional_ranking(a, &services, &pros);
            r.sort_by_key(|p| p.professional_id);
            r
        };
        let sorted_popularity = |a: &[Appointment]| {
            let mut p = service_popularity(a, &services);
            p.sort_by(|x, y| x.name.cmp(&y.name));
            p
        };

        let ranking = sorted_ranking(&appts);
        let popularity = sorted_popularity(&appts);
        let hist = hourly_histogram(&appts);

        appts.reverse();
        appts.swap(0, 3);
        assert_eq!(sorted_ranking(&appts), ranking);
        assert_eq!(sorted_popularity(&appts), popularity);
        assert_eq!(hourly_histogram(&appts), hist);

        let corte = popularity.iter().find(|s| s.name == "Corte").unwrap();
        assert_eq!(corte.count, 3);
    }

    #[test]
    fn rollup_windows_and_ticket_average() {
        use Direction::*;
        // 2025-05-14 is a Wednesday; its week starts Sunday 2025-05-11
        let entries = vec![
            entry(1, 3000, In, "2025-05-14 09:00:00"),
            entry(2, 1000, Out, "2025-05-14 10:00:00"),
            entry(3, 2000, In, "2025-05-11 12:00:00"),
            entry(4, 4000, In, "2025-05-02 12:00:00"),
            entry(5, 9999, In, "2025-04-30 12:00:00"),
        ];
        let r = revenue_rollup(&entries, NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        assert_eq!(r.today.balance_cents, 2000);
        assert_eq!(r.today.in_total_cents, 3000);
        assert_eq!(r.week.balance_cents, 4000);
        assert_eq!(r.month.balance_cents, 8000);
        assert_eq!(r.month.in_total_cents, 9000);
        assert_eq!(r.month.in_count, 3);
        assert_eq!(r.ticket_average_cents, Decimal::from(3000));
    }

    #[test]
    fn ticket_average_is_zero_without_income() {
        let r = revenue_rollup(&[], NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        assert_eq!(r.ticket_average_cents, Decimal::ZERO);
        assert_eq!(r.month.balance_cents, 0);
    }

    #[test]
    fn overview_splits_pending_and_confirmed() {
        use AppointmentStatus::*;
        let appts = vec![
            appt(1, 1, 1, "2025-05-14 15:00:00", Scheduled),
            appt(2, 2, 1, "2025-05-14 09:00:00", Scheduled),
            appt(3, 1, 1, "2025-05-14 10:00:00", Confirmed),
            appt(4, 1, 1, "2025-05-14 11:00:00", Completed),
            appt(5, 1, 1, "2025-05-15 09:00:00", Scheduled),
        ];
        let entries = vec![
            entry(1, 3000, Direction::In, "2025-05-14 10:40:00"),
            entry(2, 500, Direction::Out, "2025-05-14 12:00:00"),
        ];
        let day = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();

        let all = daily_overview(&appts, &entries, day, None);
        let pending: Vec<i64> = all.pending.iter().map(|a| a.id).collect();
        assert_eq!(pending, vec![2, 1]);
        assert_eq!(all.confirmed.len(), 1);
        assert_eq!(all.collected_cents, 3000);

        let only_one = daily_overview(&appts, &entries, day, Some(1));
        let pending: Vec<i64> = only_one.pending.iter().map(|a| a.id).collect();
        assert_eq!(pending, vec![1]);
    }
}
