//! Constants used throughout the ANC core crate.
//!
//! Clinical defaults live here so that the default [`TriagePolicy`](crate::TriagePolicy) and
//! the progress calculator read from one place. Policy files may override the triage values;
//! the obstetric dating constants are fixed.

/// Days from HPHT to the estimated due date (Naegele's rule, 40 weeks).
pub const GESTATION_DAYS: u64 = 280;

/// Length of a full-term pregnancy in weeks.
pub const FULL_TERM_WEEKS: u32 = 40;

pub const DAYS_PER_WEEK: i64 = 7;

/// Last gestational week (exclusive) counted as first trimester.
pub const FIRST_TRIMESTER_END_WEEK: u32 = 13;

/// Last gestational week (exclusive) counted as second trimester.
pub const SECOND_TRIMESTER_END_WEEK: u32 = 27;

/// Base points every pregnancy receives on the KSPR card; not included in `total_risk_score`.
pub const KSPR_BASE_SCORE: u32 = 2;

/// Minimum `total_risk_score` for KUNING (KSPR 6-11, high risk pregnancy).
pub const DEFAULT_KUNING_MIN_SCORE: u32 = 4;

/// Minimum `total_risk_score` for MERAH (KSPR >= 12, very high risk pregnancy).
pub const DEFAULT_MERAH_MIN_SCORE: u32 = 10;

/// Systolic pressure (mmHg) at or above which hypertension is a critical sign.
pub const DEFAULT_HYPERTENSION_SYSTOLIC: u32 = 140;
pub const DEFAULT_HYPERTENSION_DIASTOLIC: u32 = 90;

/// Severe-range pressure (mmHg); an extreme finding.
pub const DEFAULT_SEVERE_SYSTOLIC: u32 = 160;
pub const DEFAULT_SEVERE_DIASTOLIC: u32 = 110;

/// Hemoglobin (g/dL) below which anaemia is a warning.
pub const DEFAULT_ANAEMIA_HB: f64 = 11.0;
/// Hemoglobin (g/dL) below which anaemia is a critical sign.
pub const DEFAULT_SEVERE_ANAEMIA_HB: f64 = 8.0;
/// Hemoglobin (g/dL) below which anaemia is an extreme finding.
pub const DEFAULT_EXTREME_ANAEMIA_HB: f64 = 6.0;

/// Normal fetal heart rate range (beats/min, inclusive).
pub const DEFAULT_DJJ_NORMAL_MIN: u32 = 120;
pub const DEFAULT_DJJ_NORMAL_MAX: u32 = 160;

/// Fetal heart rate outside this range (beats/min, inclusive) is an extreme finding.
pub const DEFAULT_DJJ_EXTREME_MIN: u32 = 100;
pub const DEFAULT_DJJ_EXTREME_MAX: u32 = 180;

/// Danger-sign entries that mean "nothing recorded" (compared lower-cased and trimmed).
pub const DANGER_SIGN_PLACEHOLDERS: &[&str] = &["", "-", "tidak ada", "none", "normal"];

/// Environment variable naming an optional YAML triage policy file.
pub const TRIAGE_POLICY_ENV: &str = "ANC_TRIAGE_POLICY";

/// Environment variable holding a fixed "today" (YYYY-MM-DD) for reproducible reports.
pub const TODAY_ENV: &str = "ANC_TODAY";
