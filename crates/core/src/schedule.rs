//! Missed-control ("mangkir") detection.

use crate::visit::VisitSummary;
use anc_types::ClinicalDate;
use serde::Serialize;

/// Schedule state shown in the register's status column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    /// Not postpartum and not missed (includes patients with no visit yet).
    OnTime,
    /// Next control date has passed.
    Mangkir,
    /// Postpartum; pregnancy control schedule no longer applies.
    Nifas,
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::OnTime => "ON_TIME",
            ScheduleStatus::Mangkir => "MANGKIR",
            ScheduleStatus::Nifas => "NIFAS",
        }
    }
}

/// Whether a pregnant patient has missed her next scheduled control.
///
/// Returns `false` when the patient is postpartum, has no visit, or the next visit date is
/// unknown. Otherwise the visit is missed iff its next visit date is strictly before `today`.
pub fn is_visit_missed(
    is_postpartum: bool,
    latest_visit: Option<&VisitSummary>,
    today: ClinicalDate,
) -> bool {
    days_overdue(is_postpartum, latest_visit, today).is_some()
}

/// Days since the missed control date, or `None` when the visit is not missed.
pub fn days_overdue(
    is_postpartum: bool,
    latest_visit: Option<&VisitSummary>,
    today: ClinicalDate,
) -> Option<i64> {
    if is_postpartum {
        return None;
    }
    let visit = latest_visit?;
    let Some(next) = visit.next_visit_date else {
        tracing::debug!(visit = %visit.id, "no readable next visit date, not flagging");
        return None;
    };
    let overdue = next.days_until(today);
    (overdue > 0).then_some(overdue)
}

/// Combined schedule status for the register.
pub fn schedule_status(
    is_postpartum: bool,
    latest_visit: Option<&VisitSummary>,
    today: ClinicalDate,
) -> ScheduleStatus {
    if is_postpartum {
        ScheduleStatus::Nifas
    } else if is_visit_missed(false, latest_visit, today) {
        ScheduleStatus::Mangkir
    } else {
        ScheduleStatus::OnTime
    }
}
