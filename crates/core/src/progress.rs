//! Pregnancy progress from the last menstrual period (HPHT).
//!
//! - gestational weeks: whole weeks elapsed since HPHT,
//! - HPL (estimated due date): HPHT + 280 days (Naegele's rule),
//! - percentage: weeks out of 40, rounded half up and clamped to 100.
//!
//! Missing, unreadable or future HPHT yields [`PregnancyProgress::unknown`].

use crate::constants::{
    DAYS_PER_WEEK, FIRST_TRIMESTER_END_WEEK, FULL_TERM_WEEKS, GESTATION_DAYS,
    SECOND_TRIMESTER_END_WEEK,
};
use anc_types::ClinicalDate;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trimester {
    First,
    Second,
    Third,
}

impl Trimester {
    pub fn from_weeks(weeks: u32) -> Self {
        if weeks < FIRST_TRIMESTER_END_WEEK {
            Trimester::First
        } else if weeks < SECOND_TRIMESTER_END_WEEK {
            Trimester::Second
        } else {
            Trimester::Third
        }
    }
}

/// Derived progress for one pregnancy. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PregnancyProgress {
    pub weeks: u32,
    pub hpl: Option<ClinicalDate>,
    /// 0..=100
    pub percentage: u32,
    pub trimester: Option<Trimester>,
}

impl PregnancyProgress {
    pub fn unknown() -> Self {
        Self {
            weeks: 0,
            hpl: None,
            percentage: 0,
            trimester: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.hpl.is_some()
    }
}

/// Progress as of `today` for a raw HPHT string.
pub fn calculate_progress(hpht: Option<&str>, today: ClinicalDate) -> PregnancyProgress {
    let Some(raw) = hpht else {
        return PregnancyProgress::unknown();
    };
    match ClinicalDate::parse(raw) {
        Ok(date) => progress_from_date(date, today),
        Err(err) => {
            tracing::debug!("HPHT not usable: {err}");
            PregnancyProgress::unknown()
        }
    }
}

/// Progress as of `today` for an already parsed HPHT.
pub fn progress_from_date(hpht: ClinicalDate, today: ClinicalDate) -> PregnancyProgress {
    let elapsed = hpht.days_until(today);
    if elapsed < 0 {
        return PregnancyProgress::unknown();
    }
    let Some(hpl) = hpht.add_days(GESTATION_DAYS) else {
        return PregnancyProgress::unknown();
    };

    let weeks = u32::try_from(elapsed / DAYS_PER_WEEK).unwrap_or(u32::MAX);
    let percentage = percentage_of_term(weeks);

    PregnancyProgress {
        weeks,
        hpl: Some(hpl),
        percentage,
        trimester: Some(Trimester::from_weeks(weeks)),
    }
}

/// `min(100, round(weeks / 40 * 100))` in integer arithmetic.
fn percentage_of_term(weeks: u32) -> u32 {
    let weeks = u64::from(weeks);
    let term = u64::from(FULL_TERM_WEEKS);
    let rounded = (weeks * 100 + term / 2) / term;
    rounded.min(100) as u32
}
