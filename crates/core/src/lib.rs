//! # ANC Core
//!
//! Clinical decision logic for the antenatal care (ANC) monitoring dashboard.
//!
//! This crate contains pure, deterministic operations over in-memory records:
//! - risk triage of pregnant patients (HIJAU, KUNING, MERAH, HITAM) with NIFAS for postpartum
//! - missed-control ("mangkir") detection against a caller-supplied "today"
//! - pregnancy progress (gestational weeks, HPL, percentage of term) from HPHT
//! - the patient register view: filters, map markers and summary counts
//!
//! **No I/O concerns** beyond loading an optional policy file: reading record snapshots belongs
//! in `anc-snapshot`, and process setup (environment, logging) belongs in `anc-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod progress;
pub mod roster;
pub mod schedule;
pub mod triage;
pub mod visit;

pub use anc_types::{ClinicalDate, PatientId, TypesError};
pub use config::{
    today_from_env_value, BloodPressureThresholds, CoreConfig, FetalHeartRateThresholds,
    HemoglobinThresholds, ScoreBand, TriagePolicy,
};
pub use error::{AncError, AncResult};
pub use patient::{
    assess_patient, BabyCondition, BabyGender, BabyLog, DeliveryData, DeliveryType, GeoPoint,
    GrowthCondition, MaternalCondition, MonitoringEndReason, Patient, PatientAssessment,
};
pub use progress::{calculate_progress, progress_from_date, PregnancyProgress, Trimester};
pub use roster::{
    MapMarker, MarkerKind, RiskFilter, Roster, RosterFilter, RosterSummary, StatusFilter,
};
pub use schedule::{days_overdue, is_visit_missed, schedule_status, ScheduleStatus};
pub use triage::{
    classify_risk, DangerAssessment, DangerFinding, FindingKind, FindingSeverity, RiskCategory,
    RiskLabel, RiskTier, StyleToken, TriageExplanation,
};
pub use visit::{latest_visit, visit_history, BloodPressure, VisitStatus, VisitSummary};
