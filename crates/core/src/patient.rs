//! Patient register entries and the per-patient assessment.
//!
//! [`assess_patient`] is the single place where the three engine leaves are combined the way
//! every view shows them: latest visit, triage (or NIFAS for postpartum patients), missed
//! control and pregnancy progress.

use crate::config::TriagePolicy;
use crate::constants::KSPR_BASE_SCORE;
use crate::progress::{calculate_progress, PregnancyProgress};
use crate::schedule::{days_overdue, schedule_status, ScheduleStatus};
use crate::triage::RiskCategory;
use crate::visit::{latest_visit, VisitSummary};
use anc_types::{ClinicalDate, PatientId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    Normal,
    Sc,
    Vakum,
    Induksi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaternalCondition {
    Sehat,
    Komplikasi,
    Meninggal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BabyCondition {
    Sehat,
    /// Low birth weight.
    Bblr,
    Asfiksia,
    Meninggal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BabyGender {
    #[serde(rename = "L")]
    Male,
    #[serde(rename = "P")]
    Female,
}

/// Outcome of a delivery, recorded when staff confirm the birth.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeliveryData {
    pub delivery_date: Option<ClinicalDate>,
    pub delivery_type: DeliveryType,
    pub maternal_condition: MaternalCondition,
    pub baby_condition: BabyCondition,
    pub baby_gender: BabyGender,
    /// kg
    pub baby_weight: f64,
}

/// Infant growth condition on a baby log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrowthCondition {
    Sehat,
    GiziKurang,
    GiziBuruk,
    Stunting,
    Sakit,
}

/// One infant growth measurement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BabyLog {
    pub id: String,
    pub date: Option<ClinicalDate>,
    pub age_in_months: u32,
    /// kg
    pub weight: f64,
    /// cm
    pub height: f64,
    /// cm
    pub head_circumference: f64,
    pub immunization: String,
    pub condition: GrowthCondition,
    pub notes: String,
    pub nakes_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitoringEndReason {
    /// Infant aged out of monitoring.
    LulusUsia,
    Meninggal,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A patient (mother) in the clinic register.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub dob: Option<ClinicalDate>,
    pub address: String,
    pub kecamatan: String,
    pub kelurahan: String,
    pub location: Option<GeoPoint>,
    /// Last menstrual period as recorded; parsed on use.
    pub hpht: Option<String>,
    pub pregnancy_month: u32,
    pub gravida: u32,
    pub para: u32,
    pub abortus: u32,
    pub medical_history: String,
    pub selected_risk_factors: Vec<String>,
    /// KSPR points from selected risk factors, excluding the base score.
    pub total_risk_score: u32,
    pub phone: String,
    pub is_active: bool,
    pub is_postpartum: bool,
    pub delivery: Option<DeliveryData>,
    pub pregnancy_history: Vec<DeliveryData>,
    pub baby_logs: Vec<BabyLog>,
    /// `None` means "not set", which counts as active once postpartum.
    pub baby_monitoring_active: Option<bool>,
    pub baby_monitoring_end_reason: Option<MonitoringEndReason>,
}

impl Patient {
    /// Creates an active pregnant patient with every optional field empty.
    pub fn new(id: PatientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dob: None,
            address: String::new(),
            kecamatan: String::new(),
            kelurahan: String::new(),
            location: None,
            hpht: None,
            pregnancy_month: 0,
            gravida: 1,
            para: 0,
            abortus: 0,
            medical_history: String::new(),
            selected_risk_factors: Vec::new(),
            total_risk_score: 0,
            phone: String::new(),
            is_active: true,
            is_postpartum: false,
            delivery: None,
            pregnancy_history: Vec::new(),
            baby_logs: Vec::new(),
            baby_monitoring_active: None,
            baby_monitoring_end_reason: None,
        }
    }

    /// Postpartum patients are monitored through their infant until monitoring is ended.
    pub fn is_baby_monitoring_active(&self) -> bool {
        self.is_postpartum && self.baby_monitoring_active != Some(false)
    }

    /// Gravida/para/abortus formula, e.g. `G2P1A0`.
    pub fn obstetric_formula(&self) -> String {
        format!("G{}P{}A{}", self.gravida, self.para, self.abortus)
    }

    /// Total on the KSPR card, including the base points every pregnancy carries.
    pub fn kspr_total(&self) -> u32 {
        self.total_risk_score.saturating_add(KSPR_BASE_SCORE)
    }

    /// Baby log with the greatest age; on equal ages the one recorded first.
    pub fn latest_baby_log(&self) -> Option<&BabyLog> {
        self.baby_logs
            .iter()
            .rev()
            .max_by_key(|log| log.age_in_months)
    }

    /// Location to plot on the map. A zero latitude counts as "not recorded".
    pub fn map_position(&self) -> Option<GeoPoint> {
        self.location.filter(|p| p.lat != 0.0 && !p.lat.is_nan())
    }
}

/// Everything the register, profile and map show for one patient.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientAssessment<'a> {
    pub patient: &'a Patient,
    pub latest_visit: Option<&'a VisitSummary>,
    pub visit_count: usize,
    pub risk: RiskCategory,
    pub schedule: ScheduleStatus,
    pub missed: bool,
    pub days_overdue: Option<i64>,
    pub progress: PregnancyProgress,
    pub kspr_total: u32,
    pub obstetric_formula: String,
    pub latest_baby_log: Option<&'a BabyLog>,
}

/// Assess one patient against the full visit list.
///
/// Postpartum patients always get the NIFAS category regardless of score or readings.
pub fn assess_patient<'a>(
    patient: &'a Patient,
    visits: &'a [VisitSummary],
    policy: &TriagePolicy,
    today: ClinicalDate,
) -> PatientAssessment<'a> {
    let latest = latest_visit(visits, &patient.id);
    let visit_count = visits.iter().filter(|v| v.patient_id == patient.id).count();

    let risk = if patient.is_postpartum {
        RiskCategory::nifas()
    } else {
        policy.classify(patient.total_risk_score, latest)
    };

    let overdue = days_overdue(patient.is_postpartum, latest, today);

    PatientAssessment {
        patient,
        latest_visit: latest,
        visit_count,
        risk,
        schedule: schedule_status(patient.is_postpartum, latest, today),
        missed: overdue.is_some(),
        days_overdue: overdue,
        progress: calculate_progress(patient.hpht.as_deref(), today),
        kspr_total: patient.kspr_total(),
        obstetric_formula: patient.obstetric_formula(),
        latest_baby_log: patient.latest_baby_log(),
    }
}
