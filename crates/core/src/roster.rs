//! The patient register: filtering, map markers and summary counts.

use crate::config::TriagePolicy;
use crate::patient::{assess_patient, GeoPoint, Patient, PatientAssessment};
use crate::schedule::ScheduleStatus;
use crate::triage::{RiskLabel, StyleToken};
use crate::visit::VisitSummary;
use crate::{AncError, AncResult};
use anc_types::ClinicalDate;
use serde::Serialize;
use std::str::FromStr;

/// Risk column filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RiskFilter {
    #[default]
    All,
    Label(RiskLabel),
}

impl RiskFilter {
    /// NIFAS matches postpartum patients; a tier matches only pregnant patients with that tier.
    pub fn matches(self, assessment: &PatientAssessment<'_>) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::Label(RiskLabel::Nifas) => assessment.patient.is_postpartum,
            RiskFilter::Label(label) => {
                !assessment.patient.is_postpartum && assessment.risk.label == label
            }
        }
    }
}

impl FromStr for RiskFilter {
    type Err = AncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(RiskFilter::All);
        }
        s.parse().map(RiskFilter::Label)
    }
}

/// Status column filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Mangkir,
    OnTime,
    Nifas,
}

impl StatusFilter {
    pub fn matches(self, assessment: &PatientAssessment<'_>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Mangkir => assessment.schedule == ScheduleStatus::Mangkir,
            StatusFilter::OnTime => assessment.schedule == ScheduleStatus::OnTime,
            StatusFilter::Nifas => assessment.schedule == ScheduleStatus::Nifas,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ALL" => Ok(StatusFilter::All),
            "MANGKIR" => Ok(StatusFilter::Mangkir),
            "ON_TIME" => Ok(StatusFilter::OnTime),
            "NIFAS" => Ok(StatusFilter::Nifas),
            other => Err(AncError::InvalidInput(format!(
                "unknown status filter '{other}' (expected ALL, MANGKIR, ON_TIME or NIFAS)"
            ))),
        }
    }
}

/// Combined register filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterFilter {
    /// Free text matched against name and id; several inputs are joined with a space.
    pub search: Vec<String>,
    pub risk: RiskFilter,
    pub status: StatusFilter,
    /// `None` means every kelurahan.
    pub kelurahan: Option<String>,
}

impl RosterFilter {
    fn query(&self) -> String {
        self.search.join(" ").to_lowercase().trim().to_string()
    }

    fn matches(&self, query: &str, assessment: &PatientAssessment<'_>) -> bool {
        let patient = assessment.patient;
        let matches_search = patient.name.to_lowercase().contains(query)
            || patient.id.contains_ignore_case(query);
        let matches_kelurahan = self
            .kelurahan
            .as_deref()
            .map_or(true, |k| patient.kelurahan == k);

        matches_search
            && self.risk.matches(assessment)
            && matches_kelurahan
            && self.status.matches(assessment)
    }
}

/// What a map marker represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Postpartum mother with active infant monitoring.
    Infant,
    Pregnancy(RiskLabel),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapMarker<'a> {
    pub patient: &'a Patient,
    pub position: GeoPoint,
    pub kind: MarkerKind,
    pub style: StyleToken,
}

/// Counts for the dashboard header and map legend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub total: usize,
    pub hijau: usize,
    pub kuning: usize,
    pub merah: usize,
    pub hitam: usize,
    pub nifas: usize,
    pub mangkir: usize,
    pub pregnant_with_location: usize,
    pub postpartum_with_location: usize,
}

/// Read-only view over the register for one "today".
pub struct Roster<'a> {
    patients: &'a [Patient],
    visits: &'a [VisitSummary],
    policy: &'a TriagePolicy,
    today: ClinicalDate,
}

impl<'a> Roster<'a> {
    pub fn new(
        patients: &'a [Patient],
        visits: &'a [VisitSummary],
        policy: &'a TriagePolicy,
        today: ClinicalDate,
    ) -> Self {
        Self {
            patients,
            visits,
            policy,
            today,
        }
    }

    pub fn today(&self) -> ClinicalDate {
        self.today
    }

    /// Assessments for every patient, in register order.
    pub fn assessments(&self) -> Vec<PatientAssessment<'a>> {
        self.patients
            .iter()
            .map(|p| assess_patient(p, self.visits, self.policy, self.today))
            .collect()
    }

    /// Assessments matching `filter`, in register order.
    pub fn filter(&self, filter: &RosterFilter) -> Vec<PatientAssessment<'a>> {
        let query = filter.query();
        self.assessments()
            .into_iter()
            .filter(|a| filter.matches(&query, a))
            .collect()
    }

    pub fn find(&self, id: &str) -> AncResult<PatientAssessment<'a>> {
        let id = id.trim();
        self.patients
            .iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| assess_patient(p, self.visits, self.policy, self.today))
            .ok_or_else(|| AncError::InvalidInput(format!("no patient with id '{id}'")))
    }

    /// Markers for patients with a mappable location (see [`Patient::map_position`]).
    ///
    /// Postpartum patients whose infant monitoring has ended are hidden.
    pub fn map_markers(&self) -> Vec<MapMarker<'a>> {
        self.assessments()
            .into_iter()
            .filter_map(|a| {
                let position = a.patient.map_position()?;
                if a.patient.is_postpartum && !a.patient.is_baby_monitoring_active() {
                    return None;
                }
                let kind = if a.patient.is_postpartum {
                    MarkerKind::Infant
                } else {
                    MarkerKind::Pregnancy(a.risk.label)
                };
                Some(MapMarker {
                    patient: a.patient,
                    position,
                    kind,
                    style: a.risk.style,
                })
            })
            .collect()
    }

    pub fn summary(&self) -> RosterSummary {
        let mut summary = RosterSummary::default();
        for a in self.assessments() {
            summary.total += 1;
            match a.risk.label {
                RiskLabel::Hijau => summary.hijau += 1,
                RiskLabel::Kuning => summary.kuning += 1,
                RiskLabel::Merah => summary.merah += 1,
                RiskLabel::Hitam => summary.hitam += 1,
                RiskLabel::Nifas => summary.nifas += 1,
            }
            if a.missed {
                summary.mangkir += 1;
            }
            if a.patient.map_position().is_some() {
                if !a.patient.is_postpartum {
                    summary.pregnant_with_location += 1;
                } else if a.patient.is_baby_monitoring_active() {
                    summary.postpartum_with_location += 1;
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anc_types::PatientId;

    fn pid(s: &str) -> PatientId {
        PatientId::new(s).expect("valid id")
    }

    fn date(s: &str) -> ClinicalDate {
        ClinicalDate::parse(s).expect("valid date")
    }

    fn fixture() -> (Vec<Patient>, Vec<VisitSummary>) {
        let mut siti = Patient::new(pid("u1"), "Siti Aminah");
        siti.kelurahan = "Jati Padang".into();
        siti.location = Some(GeoPoint {
            lat: -6.29,
            lng: 106.84,
        });

        let mut dewi = Patient::new(pid("u2"), "Dewi Lestari");
        dewi.kelurahan = "Kebagusan".into();
        dewi.total_risk_score = 10;
        dewi.location = Some(GeoPoint {
            lat: -6.30,
            lng: 106.83,
        });

        let mut ani = Patient::new(pid("u3"), "Ani Suryani");
        ani.kelurahan = "Jati Padang".into();
        ani.is_postpartum = true;
        ani.location = Some(GeoPoint {
            lat: -6.28,
            lng: 106.85,
        });

        let mut rina = Patient::new(pid("u4"), "Rina");
        rina.kelurahan = "Kebagusan".into();
        rina.is_postpartum = true;
        rina.baby_monitoring_active = Some(false);
        rina.location = Some(GeoPoint {
            lat: -6.27,
            lng: 106.86,
        });

        let visits = vec![
            VisitSummary {
                visit_date: Some(date("2024-05-01")),
                next_visit_date: Some(date("2024-05-20")),
                ..VisitSummary::new("v1", pid("u1"))
            },
            VisitSummary {
                visit_date: Some(date("2024-05-10")),
                next_visit_date: Some(date("2024-07-01")),
                ..VisitSummary::new("v2", pid("u2"))
            },
        ];

        (vec![siti, dewi, ani, rina], visits)
    }

    fn ids(assessments: &[PatientAssessment<'_>]) -> Vec<String> {
        assessments
            .iter()
            .map(|a| a.patient.id.to_string())
            .collect()
    }

    #[test]
    fn default_filter_returns_everyone_in_order() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));
        assert_eq!(ids(&roster.filter(&RosterFilter::default())), vec!["u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn search_matches_name_or_id_case_insensitively() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));

        let filter = RosterFilter {
            search: vec!["  DEWI".into(), "".into()],
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&filter)), vec!["u2"]);

        let filter = RosterFilter {
            search: vec!["U3".into()],
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&filter)), vec!["u3"]);
    }

    #[test]
    fn risk_filter_separates_nifas_from_tiers() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));

        let nifas = RosterFilter {
            risk: "NIFAS".parse().expect("filter"),
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&nifas)), vec!["u3", "u4"]);

        let merah = RosterFilter {
            risk: "merah".parse().expect("filter"),
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&merah)), vec!["u2"]);

        let hijau = RosterFilter {
            risk: RiskFilter::Label(RiskLabel::Hijau),
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&hijau)), vec!["u1"]);
    }

    #[test]
    fn status_filter_uses_schedule() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));

        let mangkir = RosterFilter {
            status: "mangkir".parse().expect("filter"),
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&mangkir)), vec!["u1"]);

        let on_time = RosterFilter {
            status: "on-time".parse().expect("filter"),
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&on_time)), vec!["u2"]);

        assert!("late".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn kelurahan_and_risk_combine() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));
        let filter = RosterFilter {
            kelurahan: Some("Jati Padang".into()),
            risk: RiskFilter::Label(RiskLabel::Nifas),
            ..Default::default()
        };
        assert_eq!(ids(&roster.filter(&filter)), vec!["u3"]);
    }

    #[test]
    fn map_hides_ended_infant_monitoring() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));
        let markers = roster.map_markers();
        let kinds: Vec<(String, MarkerKind)> = markers
            .iter()
            .map(|m| (m.patient.id.to_string(), m.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("u1".to_string(), MarkerKind::Pregnancy(RiskLabel::Hijau)),
                ("u2".to_string(), MarkerKind::Pregnancy(RiskLabel::Merah)),
                ("u3".to_string(), MarkerKind::Infant),
            ]
        );
        assert_eq!(markers[2].style, StyleToken::Emerald);
    }

    #[test]
    fn summary_counts() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));
        let summary = roster.summary();
        assert_eq!(
            summary,
            RosterSummary {
                total: 4,
                hijau: 1,
                kuning: 0,
                merah: 1,
                hitam: 0,
                nifas: 2,
                mangkir: 1,
                pregnant_with_location: 2,
                postpartum_with_location: 1,
            }
        );
    }

    #[test]
    fn zero_latitude_patients_are_left_off_the_map() {
        let (mut patients, visits) = fixture();
        patients[1].location = Some(GeoPoint { lat: 0.0, lng: 106.83 });
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));

        let ids: Vec<String> = roster
            .map_markers()
            .iter()
            .map(|m| m.patient.id.to_string())
            .collect();
        assert_eq!(ids, vec!["u1", "u3"]);
        assert_eq!(roster.summary().pregnant_with_location, 1);
    }

    #[test]
    fn find_reports_unknown_ids() {
        let (patients, visits) = fixture();
        let policy = TriagePolicy::default();
        let roster = Roster::new(&patients, &visits, &policy, date("2024-06-01"));
        assert_eq!(roster.find(" u2 ").expect("found").patient.name, "Dewi Lestari");
        assert!(matches!(roster.find("u9"), Err(AncError::InvalidInput(msg)) if msg.contains("u9")));
    }
}
