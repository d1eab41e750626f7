//! Risk triage classification.
//!
//! A pregnant patient's triage tier is the more severe of two independent readings:
//! - the **score tier**, looked up from the cumulative risk score in the policy's ordered
//!   score table, and
//! - the **danger floor**, derived from findings on the latest visit (blood pressure,
//!   hemoglobin, fetal heart rate, edema and recorded danger signs).
//!
//! Taking the maximum keeps classification monotonic: a higher score or an extra danger
//! finding can only keep the tier or raise it. A patient with a zero score and a critical
//! finding is therefore never reported as HIJAU.
//!
//! Postpartum patients are not triaged here; see [`crate::patient`] for the NIFAS override.

use crate::config::TriagePolicy;
use crate::constants::DANGER_SIGN_PLACEHOLDERS;
use crate::visit::VisitSummary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// The four ordered pregnancy triage tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    /// Low risk (green).
    Hijau,
    /// Moderate risk (yellow).
    Kuning,
    /// High risk (red).
    Merah,
    /// Critical (black).
    Hitam,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Hijau,
        RiskTier::Kuning,
        RiskTier::Merah,
        RiskTier::Hitam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Hijau => "HIJAU",
            RiskTier::Kuning => "KUNING",
            RiskTier::Merah => "MERAH",
            RiskTier::Hitam => "HITAM",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label shown for a patient: a triage tier, or NIFAS for postpartum patients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Hijau,
    Kuning,
    Merah,
    Hitam,
    Nifas,
}

impl RiskLabel {
    /// The triage tier behind this label; `None` for NIFAS.
    pub fn tier(self) -> Option<RiskTier> {
        match self {
            RiskLabel::Hijau => Some(RiskTier::Hijau),
            RiskLabel::Kuning => Some(RiskTier::Kuning),
            RiskLabel::Merah => Some(RiskTier::Merah),
            RiskLabel::Hitam => Some(RiskTier::Hitam),
            RiskLabel::Nifas => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.tier() {
            Some(tier) => tier.as_str(),
            None => "NIFAS",
        }
    }

    /// Presentation style owned by the classifier; callers never map labels to colours.
    pub fn style(self) -> StyleToken {
        match self {
            RiskLabel::Hijau => StyleToken::Green,
            RiskLabel::Kuning => StyleToken::Yellow,
            RiskLabel::Merah => StyleToken::Red,
            RiskLabel::Hitam => StyleToken::Black,
            RiskLabel::Nifas => StyleToken::Emerald,
        }
    }
}

impl From<RiskTier> for RiskLabel {
    fn from(tier: RiskTier) -> Self {
        match tier {
            RiskTier::Hijau => RiskLabel::Hijau,
            RiskTier::Kuning => RiskLabel::Kuning,
            RiskTier::Merah => RiskLabel::Merah,
            RiskTier::Hitam => RiskLabel::Hitam,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLabel {
    type Err = crate::AncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIJAU" => Ok(RiskLabel::Hijau),
            "KUNING" => Ok(RiskLabel::Kuning),
            "MERAH" => Ok(RiskLabel::Merah),
            "HITAM" => Ok(RiskLabel::Hitam),
            "NIFAS" => Ok(RiskLabel::Nifas),
            other => Err(crate::AncError::InvalidInput(format!(
                "unknown risk label '{other}'"
            ))),
        }
    }
}

/// Presentation style token for a risk label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleToken {
    Green,
    Yellow,
    Red,
    Black,
    Emerald,
}

impl StyleToken {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleToken::Green => "green",
            StyleToken::Yellow => "yellow",
            StyleToken::Red => "red",
            StyleToken::Black => "black",
            StyleToken::Emerald => "emerald",
        }
    }

    /// Badge classes used on patient cards and the profile header.
    pub fn badge_class(self) -> &'static str {
        match self {
            StyleToken::Green => "bg-emerald-100 text-emerald-700",
            StyleToken::Yellow => "bg-yellow-100 text-yellow-700",
            StyleToken::Red => "bg-red-600 text-white",
            StyleToken::Black => "bg-slate-950 text-white",
            StyleToken::Emerald => "bg-emerald-600 text-white",
        }
    }

    /// Map marker classes; the two most severe tiers pulse.
    pub fn marker_class(self) -> &'static str {
        match self {
            StyleToken::Green => "bg-emerald-500",
            StyleToken::Yellow => "bg-yellow-400",
            StyleToken::Red => "bg-red-600 animate-pulse ring-4 ring-red-400/30",
            StyleToken::Black => "bg-slate-950 animate-pulse ring-4 ring-red-500/50",
            StyleToken::Emerald => "bg-emerald-500",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            StyleToken::Green => "#10b981",
            StyleToken::Yellow => "#facc15",
            StyleToken::Red => "#dc2626",
            StyleToken::Black => "#020617",
            StyleToken::Emerald => "#059669",
        }
    }
}

/// Derived risk for one patient. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RiskCategory {
    pub label: RiskLabel,
    pub style: StyleToken,
}

impl RiskCategory {
    pub fn nifas() -> Self {
        RiskLabel::Nifas.into()
    }

    pub fn tier(&self) -> Option<RiskTier> {
        self.label.tier()
    }
}

impl From<RiskLabel> for RiskCategory {
    fn from(label: RiskLabel) -> Self {
        Self {
            label,
            style: label.style(),
        }
    }
}

impl From<RiskTier> for RiskCategory {
    fn from(tier: RiskTier) -> Self {
        RiskLabel::from(tier).into()
    }
}

/// How strongly a single finding escalates triage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// At least KUNING.
    Warning,
    /// At least MERAH; enough of them together give HITAM.
    Critical,
    /// HITAM on its own.
    Extreme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Edema,
    Anaemia,
    Hypertension,
    FetalHeartRate,
    RecordedDangerSign,
}

/// One danger finding on a visit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DangerFinding {
    pub kind: FindingKind,
    pub severity: FindingSeverity,
    pub detail: String,
}

/// All danger findings on a visit, in a fixed order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DangerAssessment {
    pub findings: Vec<DangerFinding>,
}

impl DangerAssessment {
    pub fn critical_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == FindingSeverity::Critical)
            .count()
    }

    pub fn has(&self, severity: FindingSeverity) -> bool {
        self.findings.iter().any(|f| f.severity == severity)
    }

    /// Minimum tier these findings force, if any.
    pub fn floor(&self, critical_signs_for_hitam: usize) -> Option<RiskTier> {
        if self.has(FindingSeverity::Extreme) || self.critical_count() >= critical_signs_for_hitam
        {
            Some(RiskTier::Hitam)
        } else if self.has(FindingSeverity::Critical) {
            Some(RiskTier::Merah)
        } else if self.has(FindingSeverity::Warning) {
            Some(RiskTier::Kuning)
        } else {
            None
        }
    }
}

/// A classification together with the readings that produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TriageExplanation {
    pub score: u32,
    pub score_tier: RiskTier,
    pub danger: DangerAssessment,
    pub danger_floor: Option<RiskTier>,
    pub category: RiskCategory,
}

impl TriagePolicy {
    /// Tier of the last score band whose `min_score` is at or below `score`.
    pub fn score_tier(&self, score: u32) -> RiskTier {
        self.score_bands
            .iter()
            .take_while(|band| band.min_score <= score)
            .last()
            .map_or(RiskTier::Hijau, |band| band.tier)
    }

    /// Evaluate danger findings on a visit. An absent visit has no findings.
    pub fn assess_danger(&self, visit: Option<&VisitSummary>) -> DangerAssessment {
        let Some(visit) = visit else {
            return DangerAssessment::default();
        };

        let mut findings = Vec::new();

        if let Some(bp) = visit.parsed_blood_pressure() {
            let t = self.blood_pressure;
            let severity = if bp.systolic >= t.extreme_systolic
                || bp.diastolic >= t.extreme_diastolic
            {
                Some(FindingSeverity::Extreme)
            } else if bp.systolic >= t.critical_systolic || bp.diastolic >= t.critical_diastolic {
                Some(FindingSeverity::Critical)
            } else {
                None
            };
            if let Some(severity) = severity {
                findings.push(DangerFinding {
                    kind: FindingKind::Hypertension,
                    severity,
                    detail: format!("blood pressure {bp} mmHg"),
                });
            }
        } else if !visit.blood_pressure.trim().is_empty() {
            tracing::debug!(
                visit = %visit.id,
                "unreadable blood pressure {:?}, ignoring",
                visit.blood_pressure
            );
        }

        if let Some(hb) = visit.measured_hb() {
            let t = self.hemoglobin;
            let severity = if hb < t.extreme_below {
                Some(FindingSeverity::Extreme)
            } else if hb < t.critical_below {
                Some(FindingSeverity::Critical)
            } else if hb < t.warning_below {
                Some(FindingSeverity::Warning)
            } else {
                None
            };
            if let Some(severity) = severity {
                findings.push(DangerFinding {
                    kind: FindingKind::Anaemia,
                    severity,
                    detail: format!("hemoglobin {hb} g/dL"),
                });
            }
        }

        if let Some(djj) = visit.measured_djj() {
            let t = self.fetal_heart_rate;
            let severity = if djj < t.extreme_min || djj > t.extreme_max {
                Some(FindingSeverity::Extreme)
            } else if djj < t.normal_min || djj > t.normal_max {
                Some(FindingSeverity::Critical)
            } else {
                None
            };
            if let Some(severity) = severity {
                findings.push(DangerFinding {
                    kind: FindingKind::FetalHeartRate,
                    severity,
                    detail: format!("fetal heart rate {djj} bpm"),
                });
            }
        }

        if visit.edema {
            findings.push(DangerFinding {
                kind: FindingKind::Edema,
                severity: FindingSeverity::Warning,
                detail: "edema".to_string(),
            });
        }

        for sign in recorded_danger_signs(&visit.danger_signs) {
            findings.push(DangerFinding {
                kind: FindingKind::RecordedDangerSign,
                severity: FindingSeverity::Critical,
                detail: sign.to_string(),
            });
        }

        DangerAssessment { findings }
    }

    /// Classify with the full reasoning attached.
    pub fn explain(&self, score: u32, latest_visit: Option<&VisitSummary>) -> TriageExplanation {
        let score_tier = self.score_tier(score);
        let danger = self.assess_danger(latest_visit);
        let danger_floor = danger.floor(self.critical_signs_for_hitam);
        let tier = danger_floor.map_or(score_tier, |floor| floor.max(score_tier));

        TriageExplanation {
            score,
            score_tier,
            danger,
            danger_floor,
            category: tier.into(),
        }
    }

    /// Classify a pregnant patient. Total: never fails and never returns NIFAS.
    pub fn classify(&self, score: u32, latest_visit: Option<&VisitSummary>) -> RiskCategory {
        self.explain(score, latest_visit).category
    }
}

/// Danger-sign entries with placeholders ("-", "tidak ada", ...) removed, trimmed.
fn recorded_danger_signs(signs: &[String]) -> impl Iterator<Item = &str> {
    signs.iter().map(|s| s.trim()).filter(|s| {
        let lower = s.to_lowercase();
        !DANGER_SIGN_PLACEHOLDERS.contains(&lower.as_str())
    })
}

fn default_policy() -> &'static TriagePolicy {
    static DEFAULT: OnceLock<TriagePolicy> = OnceLock::new();
    DEFAULT.get_or_init(TriagePolicy::default)
}

/// Classify with the default policy.
///
/// # Examples
///
/// ```rust
/// use anc_core::{classify_risk, RiskLabel};
///
/// assert_eq!(classify_risk(0, None).label, RiskLabel::Hijau);
/// assert_eq!(classify_risk(12, None).label, RiskLabel::Merah);
/// ```
pub fn classify_risk(total_risk_score: u32, latest_visit: Option<&VisitSummary>) -> RiskCategory {
    default_policy().classify(total_risk_score, latest_visit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreBand;
    use anc_types::PatientId;

    fn visit() -> VisitSummary {
        VisitSummary::new("v1", PatientId::new("u1").expect("valid id"))
    }

    fn label(score: u32, v: Option<&VisitSummary>) -> RiskLabel {
        classify_risk(score, v).label
    }

    #[test]
    fn score_bands_without_visit() {
        assert_eq!(label(0, None), RiskLabel::Hijau);
        assert_eq!(label(3, None), RiskLabel::Hijau);
        assert_eq!(label(4, None), RiskLabel::Kuning);
        assert_eq!(label(9, None), RiskLabel::Kuning);
        assert_eq!(label(10, None), RiskLabel::Merah);
        assert_eq!(label(u32::MAX, None), RiskLabel::Merah);
    }

    #[test]
    fn clean_visit_does_not_escalate() {
        let mut v = visit();
        v.blood_pressure = "110/70".into();
        v.hb = Some(12.5);
        v.djj = Some(142);
        v.danger_signs = vec!["Tidak Ada".into(), " ".into(), "-".into()];
        assert_eq!(label(0, Some(&v)), RiskLabel::Hijau);
        assert_eq!(label(5, Some(&v)), RiskLabel::Kuning);
    }

    #[test]
    fn zero_score_with_critical_sign_is_at_least_merah() {
        let mut v = visit();
        v.danger_signs = vec!["Perdarahan".into()];
        assert_eq!(label(0, Some(&v)), RiskLabel::Merah);

        let mut v = visit();
        v.blood_pressure = "145/85".into();
        assert_eq!(label(0, Some(&v)), RiskLabel::Merah);

        let mut v = visit();
        v.djj = Some(110);
        assert_eq!(label(0, Some(&v)), RiskLabel::Merah);

        let mut v = visit();
        v.hb = Some(7.5);
        assert_eq!(label(0, Some(&v)), RiskLabel::Merah);
    }

    #[test]
    fn warnings_raise_to_kuning_only() {
        let mut v = visit();
        v.hb = Some(10.2);
        assert_eq!(label(0, Some(&v)), RiskLabel::Kuning);

        let mut v = visit();
        v.edema = true;
        assert_eq!(label(0, Some(&v)), RiskLabel::Kuning);
        assert_eq!(label(10, Some(&v)), RiskLabel::Merah);
    }

    #[test]
    fn multiple_critical_signs_give_hitam() {
        let mut v = visit();
        v.blood_pressure = "150/95".into();
        v.danger_signs = vec!["Kejang".into()];
        assert_eq!(label(0, Some(&v)), RiskLabel::Hitam);
    }

    #[test]
    fn extreme_values_give_hitam() {
        let mut v = visit();
        v.blood_pressure = "170/100".into();
        assert_eq!(label(0, Some(&v)), RiskLabel::Hitam);

        let mut v = visit();
        v.hb = Some(5.4);
        assert_eq!(label(0, Some(&v)), RiskLabel::Hitam);

        let mut v = visit();
        v.djj = Some(90);
        assert_eq!(label(0, Some(&v)), RiskLabel::Hitam);
    }

    #[test]
    fn unreadable_or_missing_readings_are_ignored() {
        let mut v = visit();
        v.blood_pressure = "tinggi".into();
        v.hb = Some(0.0);
        v.djj = Some(0);
        assert_eq!(label(0, Some(&v)), RiskLabel::Hijau);
    }

    #[test]
    fn classification_is_monotonic_in_score() {
        let mut warn = visit();
        warn.hb = Some(10.0);
        let mut crit = visit();
        crit.danger_signs = vec!["Demam tinggi".into()];
        let visits = [None, Some(&warn), Some(&crit)];

        for v in visits {
            let mut previous = RiskTier::Hijau;
            for score in 0..30 {
                let tier = classify_risk(score, v).tier().expect("pregnancy tier");
                assert!(tier >= previous, "score {score} dropped from {previous} to {tier}");
                previous = tier;
            }
        }
    }

    #[test]
    fn adding_a_danger_sign_never_lowers_the_tier() {
        let mut v = visit();
        for score in 0..15 {
            v.danger_signs.clear();
            let before = classify_risk(score, Some(&v)).tier();
            v.danger_signs.push("Bengkak".into());
            let after = classify_risk(score, Some(&v)).tier();
            assert!(after >= before);
        }
    }

    #[test]
    fn classification_is_idempotent() {
        let mut v = visit();
        v.blood_pressure = "142/91".into();
        assert_eq!(classify_risk(6, Some(&v)), classify_risk(6, Some(&v)));
    }

    #[test]
    fn styles_follow_labels() {
        assert_eq!(classify_risk(0, None).style, StyleToken::Green);
        assert_eq!(classify_risk(4, None).style, StyleToken::Yellow);
        assert_eq!(classify_risk(10, None).style, StyleToken::Red);
        assert_eq!(RiskCategory::nifas().style, StyleToken::Emerald);
        assert_eq!(RiskCategory::from(RiskTier::Hitam).style, StyleToken::Black);
        assert!(StyleToken::Black.marker_class().contains("animate-pulse"));
    }

    #[test]
    fn tiers_are_totally_ordered() {
        assert!(RiskTier::Hijau < RiskTier::Kuning);
        assert!(RiskTier::Kuning < RiskTier::Merah);
        assert!(RiskTier::Merah < RiskTier::Hitam);
        assert_eq!(RiskLabel::Nifas.tier(), None);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("hitam".parse::<RiskLabel>().expect("parse"), RiskLabel::Hitam);
        assert_eq!(" NIFAS ".parse::<RiskLabel>().expect("parse"), RiskLabel::Nifas);
        assert!("ungu".parse::<RiskLabel>().is_err());
        assert_eq!(RiskLabel::Kuning.to_string(), "KUNING");
    }

    #[test]
    fn custom_policy_can_add_score_hitam_band() {
        let policy = TriagePolicy::new(
            vec![
                ScoreBand {
                    min_score: 0,
                    tier: RiskTier::Hijau,
                },
                ScoreBand {
                    min_score: 20,
                    tier: RiskTier::Hitam,
                },
            ],
            Default::default(),
            Default::default(),
            Default::default(),
            3,
        )
        .expect("valid policy");
        assert_eq!(policy.classify(19, None).label, RiskLabel::Hijau);
        assert_eq!(policy.classify(20, None).label, RiskLabel::Hitam);

        let mut v = visit();
        v.danger_signs = vec!["a".into(), "b".into()];
        assert_eq!(policy.classify(0, Some(&v)).label, RiskLabel::Merah);
        v.danger_signs.push("c".into());
        assert_eq!(policy.classify(0, Some(&v)).label, RiskLabel::Hitam);
    }

    #[test]
    fn explanation_lists_findings() {
        let mut v = visit();
        v.blood_pressure = "140/80".into();
        v.hb = Some(10.0);
        let explanation = TriagePolicy::default().explain(2, Some(&v));
        assert_eq!(explanation.score_tier, RiskTier::Hijau);
        assert_eq!(explanation.danger_floor, Some(RiskTier::Merah));
        assert_eq!(explanation.category.label, RiskLabel::Merah);
        let kinds: Vec<FindingKind> = explanation.danger.findings.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FindingKind::Hypertension, FindingKind::Anaemia]);
    }
}
