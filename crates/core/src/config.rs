//! Core runtime configuration.
//!
//! The triage thresholds are a clinical policy rather than code: the defaults below follow the
//! KSPR score card and common ANC danger-sign cut-offs, and a clinic may replace them with a
//! YAML policy file. Configuration is resolved once at process startup and passed into the
//! engine; nothing in this crate reads environment variables itself.

use crate::constants::*;
use crate::triage::RiskTier;
use crate::{AncError, AncResult};
use anc_types::ClinicalDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One row of the ordered score table: scores at or above `min_score` map to `tier`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreBand {
    pub min_score: u32,
    pub tier: RiskTier,
}

/// Blood pressure cut-offs in mmHg; a reading meets a level when either value reaches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BloodPressureThresholds {
    pub critical_systolic: u32,
    pub critical_diastolic: u32,
    pub extreme_systolic: u32,
    pub extreme_diastolic: u32,
}

impl Default for BloodPressureThresholds {
    fn default() -> Self {
        Self {
            critical_systolic: DEFAULT_HYPERTENSION_SYSTOLIC,
            critical_diastolic: DEFAULT_HYPERTENSION_DIASTOLIC,
            extreme_systolic: DEFAULT_SEVERE_SYSTOLIC,
            extreme_diastolic: DEFAULT_SEVERE_DIASTOLIC,
        }
    }
}

/// Hemoglobin cut-offs in g/dL; a reading strictly below a level meets it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HemoglobinThresholds {
    pub warning_below: f64,
    pub critical_below: f64,
    pub extreme_below: f64,
}

impl Default for HemoglobinThresholds {
    fn default() -> Self {
        Self {
            warning_below: DEFAULT_ANAEMIA_HB,
            critical_below: DEFAULT_SEVERE_ANAEMIA_HB,
            extreme_below: DEFAULT_EXTREME_ANAEMIA_HB,
        }
    }
}

/// Fetal heart rate ranges in beats/min (inclusive bounds).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetalHeartRateThresholds {
    pub normal_min: u32,
    pub normal_max: u32,
    pub extreme_min: u32,
    pub extreme_max: u32,
}

impl Default for FetalHeartRateThresholds {
    fn default() -> Self {
        Self {
            normal_min: DEFAULT_DJJ_NORMAL_MIN,
            normal_max: DEFAULT_DJJ_NORMAL_MAX,
            extreme_min: DEFAULT_DJJ_EXTREME_MIN,
            extreme_max: DEFAULT_DJJ_EXTREME_MAX,
        }
    }
}

/// The complete triage policy.
///
/// Construct with [`TriagePolicy::new`] or [`TriagePolicy::parse`]; both validate, so a
/// `TriagePolicy` in hand is always internally consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct TriagePolicy {
    pub(crate) score_bands: Vec<ScoreBand>,
    pub(crate) blood_pressure: BloodPressureThresholds,
    pub(crate) hemoglobin: HemoglobinThresholds,
    pub(crate) fetal_heart_rate: FetalHeartRateThresholds,
    pub(crate) critical_signs_for_hitam: usize,
}

impl Default for TriagePolicy {
    fn default() -> Self {
        Self {
            score_bands: vec![
                ScoreBand {
                    min_score: 0,
                    tier: RiskTier::Hijau,
                },
                ScoreBand {
                    min_score: DEFAULT_KUNING_MIN_SCORE,
                    tier: RiskTier::Kuning,
                },
                ScoreBand {
                    min_score: DEFAULT_MERAH_MIN_SCORE,
                    tier: RiskTier::Merah,
                },
            ],
            blood_pressure: BloodPressureThresholds::default(),
            hemoglobin: HemoglobinThresholds::default(),
            fetal_heart_rate: FetalHeartRateThresholds::default(),
            critical_signs_for_hitam: 2,
        }
    }
}

impl TriagePolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`AncError::InvalidPolicy`] if:
    /// - the score table is empty, does not start at 0, or is not strictly ascending in both
    ///   score and tier,
    /// - hemoglobin levels are not positive and strictly decreasing from warning to extreme,
    /// - blood pressure extreme levels sit below the critical levels,
    /// - the normal fetal heart rate range is not strictly inside the extreme range,
    /// - `critical_signs_for_hitam` is zero.
    pub fn new(
        score_bands: Vec<ScoreBand>,
        blood_pressure: BloodPressureThresholds,
        hemoglobin: HemoglobinThresholds,
        fetal_heart_rate: FetalHeartRateThresholds,
        critical_signs_for_hitam: usize,
    ) -> AncResult<Self> {
        let policy = Self {
            score_bands,
            blood_pressure,
            hemoglobin,
            fetal_heart_rate,
            critical_signs_for_hitam,
        };
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> AncResult<()> {
        let first = self
            .score_bands
            .first()
            .ok_or_else(|| AncError::InvalidPolicy("score_bands cannot be empty".into()))?;
        if first.min_score != 0 {
            return Err(AncError::InvalidPolicy(format!(
                "first score band must start at 0, got {}",
                first.min_score
            )));
        }
        for pair in self.score_bands.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if hi.min_score <= lo.min_score {
                return Err(AncError::InvalidPolicy(format!(
                    "score bands must be strictly ascending ({} then {})",
                    lo.min_score, hi.min_score
                )));
            }
            if hi.tier <= lo.tier {
                return Err(AncError::InvalidPolicy(format!(
                    "score band tiers must be strictly ascending ({} then {})",
                    lo.tier, hi.tier
                )));
            }
        }

        let hb = self.hemoglobin;
        let hb_ordered = hb.extreme_below > 0.0
            && hb.extreme_below < hb.critical_below
            && hb.critical_below < hb.warning_below
            && hb.warning_below.is_finite();
        if !hb_ordered {
            return Err(AncError::InvalidPolicy(
                "hemoglobin levels must satisfy 0 < extreme_below < critical_below < warning_below"
                    .into(),
            ));
        }

        let bp = self.blood_pressure;
        if bp.extreme_systolic < bp.critical_systolic || bp.extreme_diastolic < bp.critical_diastolic
        {
            return Err(AncError::InvalidPolicy(
                "blood pressure extreme levels must not be below critical levels".into(),
            ));
        }

        let djj = self.fetal_heart_rate;
        let djj_nested = djj.extreme_min < djj.normal_min
            && djj.normal_min <= djj.normal_max
            && djj.normal_max < djj.extreme_max;
        if !djj_nested {
            return Err(AncError::InvalidPolicy(
                "fetal heart rate must satisfy extreme_min < normal_min <= normal_max < extreme_max"
                    .into(),
            ));
        }

        if self.critical_signs_for_hitam == 0 {
            return Err(AncError::InvalidPolicy(
                "critical_signs_for_hitam must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Parse a policy from YAML text.
    ///
    /// Omitted sections fall back to their defaults. Unknown keys are rejected and the error
    /// names the failing path (e.g. `hemoglobin.warning_below`).
    pub fn parse(yaml_text: &str) -> AncResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let file = match serde_path_to_error::deserialize::<_, PolicyFile>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let path = if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(AncError::PolicyParse {
                    path,
                    source: err.into_inner(),
                });
            }
        };

        Self::new(
            file.score_bands,
            file.blood_pressure,
            file.hemoglobin,
            file.fetal_heart_rate,
            file.critical_signs_for_hitam,
        )
    }

    /// Render the policy as YAML, in the same shape [`TriagePolicy::parse`] accepts.
    pub fn render(&self) -> AncResult<String> {
        let file = PolicyFile {
            score_bands: self.score_bands.clone(),
            blood_pressure: self.blood_pressure,
            hemoglobin: self.hemoglobin,
            fetal_heart_rate: self.fetal_heart_rate,
            critical_signs_for_hitam: self.critical_signs_for_hitam,
        };
        serde_yaml::to_string(&file).map_err(AncError::PolicySerialization)
    }

    /// Load and validate a policy file.
    pub fn load(path: &Path) -> AncResult<Self> {
        let text = std::fs::read_to_string(path).map_err(AncError::PolicyRead)?;
        let policy = Self::parse(&text)?;
        tracing::debug!("loaded triage policy from {}", path.display());
        Ok(policy)
    }

    pub fn score_bands(&self) -> &[ScoreBand] {
        &self.score_bands
    }

    pub fn blood_pressure(&self) -> BloodPressureThresholds {
        self.blood_pressure
    }

    pub fn hemoglobin(&self) -> HemoglobinThresholds {
        self.hemoglobin
    }

    pub fn fetal_heart_rate(&self) -> FetalHeartRateThresholds {
        self.fetal_heart_rate
    }

    pub fn critical_signs_for_hitam(&self) -> usize {
        self.critical_signs_for_hitam
    }
}

/// On-disk shape of a policy file.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    #[serde(default = "default_score_bands")]
    score_bands: Vec<ScoreBand>,
    #[serde(default)]
    blood_pressure: BloodPressureThresholds,
    #[serde(default)]
    hemoglobin: HemoglobinThresholds,
    #[serde(default)]
    fetal_heart_rate: FetalHeartRateThresholds,
    #[serde(default = "default_critical_signs_for_hitam")]
    critical_signs_for_hitam: usize,
}

fn default_score_bands() -> Vec<ScoreBand> {
    TriagePolicy::default().score_bands
}

fn default_critical_signs_for_hitam() -> usize {
    TriagePolicy::default().critical_signs_for_hitam
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    policy: TriagePolicy,
    policy_source: Option<PathBuf>,
}

impl CoreConfig {
    pub fn new(policy: TriagePolicy, policy_source: Option<PathBuf>) -> Self {
        Self {
            policy,
            policy_source,
        }
    }

    /// Build the configuration from an explicit override path or the value of
    /// [`TRIAGE_POLICY_ENV`], falling back to the default policy.
    ///
    /// The override wins over the environment value. An empty or whitespace-only value counts
    /// as unset.
    pub fn resolve(
        override_path: Option<PathBuf>,
        env_value: Option<String>,
    ) -> AncResult<Self> {
        let from_env = env_value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        match override_path.or(from_env) {
            Some(path) => {
                let policy = TriagePolicy::load(&path)?;
                Ok(Self::new(policy, Some(path)))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn policy(&self) -> &TriagePolicy {
        &self.policy
    }

    /// Path the policy was loaded from; `None` for the built-in default.
    pub fn policy_source(&self) -> Option<&Path> {
        self.policy_source.as_deref()
    }
}

/// Parse a fixed "today" from an optional string value (e.g. [`TODAY_ENV`]).
///
/// `None` or empty/whitespace means "use the clock".
pub fn today_from_env_value(value: Option<String>) -> AncResult<Option<ClinicalDate>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| ClinicalDate::parse(&v)).transpose()?;
    Ok(parsed)
}
