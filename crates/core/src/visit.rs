//! ANC visit records and latest-visit selection.
//!
//! A [`VisitSummary`] carries the readings taken at one antenatal control. Dates are parsed at
//! the boundary into [`ClinicalDate`]; a date that could not be read is stored as `None` and
//! treated as unknown by every consumer.

use anc_types::{ClinicalDate, PatientId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a visit as recorded by staff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    #[default]
    Completed,
    Missed,
    Scheduled,
}

/// One antenatal control visit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisitSummary {
    pub id: String,
    pub patient_id: PatientId,
    pub visit_date: Option<ClinicalDate>,
    pub scheduled_date: Option<ClinicalDate>,
    /// Next scheduled control date.
    pub next_visit_date: Option<ClinicalDate>,
    /// Body weight in kg.
    pub weight: Option<f64>,
    /// Blood pressure as written on the card, e.g. `"120/80"`.
    pub blood_pressure: String,
    /// Fundal height (TFU) in cm.
    pub tfu: Option<f64>,
    /// Fetal heart rate (DJJ) in beats/min.
    pub djj: Option<u32>,
    /// Hemoglobin in g/dL.
    pub hb: Option<f64>,
    pub complaints: String,
    pub danger_signs: Vec<String>,
    pub edema: bool,
    pub fetal_movement: String,
    pub follow_up: String,
    pub nakes_notes: String,
    pub nakes_id: String,
    pub status: VisitStatus,
}

impl VisitSummary {
    /// Creates an empty completed visit for `patient_id`; readings default to "not measured".
    pub fn new(id: impl Into<String>, patient_id: PatientId) -> Self {
        Self {
            id: id.into(),
            patient_id,
            visit_date: None,
            scheduled_date: None,
            next_visit_date: None,
            weight: None,
            blood_pressure: String::new(),
            tfu: None,
            djj: None,
            hb: None,
            complaints: String::new(),
            danger_signs: Vec::new(),
            edema: false,
            fetal_movement: String::new(),
            follow_up: String::new(),
            nakes_notes: String::new(),
            nakes_id: String::new(),
            status: VisitStatus::Completed,
        }
    }

    /// Parsed blood pressure, if the recorded text is readable.
    pub fn parsed_blood_pressure(&self) -> Option<BloodPressure> {
        BloodPressure::parse(&self.blood_pressure)
    }

    /// Hemoglobin if actually measured (zero is how forms record "not taken").
    pub fn measured_hb(&self) -> Option<f64> {
        self.hb.filter(|hb| hb.is_finite() && *hb > 0.0)
    }

    /// Fetal heart rate if actually measured.
    pub fn measured_djj(&self) -> Option<u32> {
        self.djj.filter(|djj| *djj > 0)
    }
}

/// A systolic/diastolic pair in mmHg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

impl BloodPressure {
    /// Parses `"120/80"`, tolerating whitespace and a trailing unit (`"120 / 80 mmHg"`).
    ///
    /// Returns `None` for anything else, including zero readings.
    pub fn parse(raw: &str) -> Option<Self> {
        fn leading_number(part: &str) -> Option<u32> {
            let digits: String = part
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }

        let (sys, dia) = raw.split_once('/')?;
        let systolic = leading_number(sys)?;
        let diastolic = leading_number(dia)?;
        if systolic == 0 || diastolic == 0 {
            return None;
        }
        Some(Self {
            systolic,
            diastolic,
        })
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

/// Returns the latest visit recorded for `patient_id`.
///
/// Visits are ordered by `visit_date`; unknown dates sort before every known date. When two
/// visits share a date the one inserted first wins.
pub fn latest_visit<'a>(
    visits: &'a [VisitSummary],
    patient_id: &PatientId,
) -> Option<&'a VisitSummary> {
    visits
        .iter()
        .filter(|v| &v.patient_id == patient_id)
        // `max_by_key` keeps the last of equal maxima; reversed, that is the first inserted.
        .rev()
        .max_by_key(|v| v.visit_date)
}

/// All visits for `patient_id`, newest first, in the same order [`latest_visit`] uses.
pub fn visit_history<'a>(
    visits: &'a [VisitSummary],
    patient_id: &PatientId,
) -> Vec<&'a VisitSummary> {
    let mut history: Vec<(usize, &VisitSummary)> = visits
        .iter()
        .enumerate()
        .filter(|(_, v)| &v.patient_id == patient_id)
        .collect();
    history.sort_by(|(ia, a), (ib, b)| b.visit_date.cmp(&a.visit_date).then(ia.cmp(ib)));
    history.into_iter().map(|(_, v)| v).collect()
}
