//! Application-state snapshot: the top-level document and format detection.

use crate::users::{self, RegisterEntry, StaffMember, UserWire};
use crate::visits::{self, AncVisitWire};
use crate::{SnapshotError, SnapshotResult};
use anc_core::{ClinicalDate, Patient, Roster, TriagePolicy, VisitSummary};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::path::Path;

/// Serialisation format of a snapshot file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Pick the format from the file extension; without one, text starting with `{` is JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnsupportedFormat`] for any other extension.
    pub fn detect(path: &Path, text: &str) -> SnapshotResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(SnapshotFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(SnapshotFormat::Yaml)
            }
            Some(ext) => Err(SnapshotError::UnsupportedFormat(ext.to_string())),
            None if text.trim_start().starts_with('{') => Ok(SnapshotFormat::Json),
            None => Ok(SnapshotFormat::Yaml),
        }
    }
}

/// A parsed snapshot: the register and every recorded visit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Users with role `USER`, in register order.
    pub patients: Vec<Patient>,
    pub staff: Vec<StaffMember>,
    pub visits: Vec<VisitSummary>,
}

impl Snapshot {
    /// Parse snapshot text in the given format.
    ///
    /// This uses `serde_path_to_error` so that schema errors name the failing field, e.g.
    /// `ancVisits[3].hb`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if:
    /// - the text is not valid JSON/YAML for the snapshot schema,
    /// - any unknown keys are present (due to `#[serde(deny_unknown_fields)]`),
    /// - a patient or visit reference has an empty id.
    pub fn parse(text: &str, format: SnapshotFormat) -> SnapshotResult<Self> {
        let wire = match format {
            SnapshotFormat::Json => {
                let mut deserializer = serde_json::Deserializer::from_str(text);
                let parsed = serde_path_to_error::deserialize::<_, AppStateWire>(&mut deserializer)
                    .map_err(|err| schema_mismatch(err.path().to_string(), err.into_inner()))?;
                deserializer
                    .end()
                    .map_err(|e| SnapshotError::InvalidInput(format!("trailing data: {e}")))?;
                parsed
            }
            SnapshotFormat::Yaml => {
                let deserializer = serde_yaml::Deserializer::from_str(text);
                serde_path_to_error::deserialize::<_, AppStateWire>(deserializer)
                    .map_err(|err| schema_mismatch(err.path().to_string(), err.into_inner()))?
            }
        };

        wire_to_domain(wire)
    }

    /// Read and parse a snapshot file, detecting its format.
    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let format = SnapshotFormat::detect(path, &text)?;
        let snapshot = Self::parse(&text, format)?;
        tracing::info!(
            "loaded snapshot {}: {} patients, {} staff, {} visits",
            path.display(),
            snapshot.patients.len(),
            snapshot.staff.len(),
            snapshot.visits.len()
        );
        Ok(snapshot)
    }

    /// Register view over this snapshot.
    pub fn roster<'a>(&'a self, policy: &'a TriagePolicy, today: ClinicalDate) -> Roster<'a> {
        Roster::new(&self.patients, &self.visits, policy, today)
    }
}

fn schema_mismatch(path: String, source: impl std::fmt::Display) -> SnapshotError {
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    SnapshotError::Translation(format!("Snapshot schema mismatch at {path}: {source}"))
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of the dashboard state.
///
/// Session and UI state (current user, alerts, logs, checklists) may be present in an export;
/// it is accepted and skipped.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct AppStateWire {
    #[serde(default)]
    users: Vec<UserWire>,
    #[serde(default)]
    anc_visits: Vec<AncVisitWire>,
    #[serde(default)]
    #[allow(dead_code)]
    current_user: Option<IgnoredAny>,
    #[serde(default)]
    #[allow(dead_code)]
    alerts: Option<IgnoredAny>,
    #[serde(default)]
    #[allow(dead_code)]
    selected_patient_id: Option<IgnoredAny>,
    #[serde(default)]
    #[allow(dead_code)]
    logs: Option<IgnoredAny>,
    #[serde(default)]
    #[allow(dead_code)]
    user_checklists: Option<IgnoredAny>,
}

fn wire_to_domain(wire: AppStateWire) -> SnapshotResult<Snapshot> {
    let mut snapshot = Snapshot::default();

    for user in wire.users {
        match users::wire_to_domain(user)? {
            RegisterEntry::Patient(patient) => snapshot.patients.push(*patient),
            RegisterEntry::Staff(staff) => snapshot.staff.push(staff),
        }
    }

    for visit in wire.anc_visits {
        let visit = visits::wire_to_domain(visit)?;
        if !snapshot.patients.iter().any(|p| p.id == visit.patient_id) {
            tracing::debug!(
                "visit {} refers to unknown patient {}",
                visit.id,
                visit.patient_id
            );
        }
        snapshot.visits.push(visit);
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anc_core::{RiskLabel, RosterFilter};
    use std::io::Write;

    const YAML: &str = r#"users:
  - id: admin
    name: Admin Puskesmas
    role: ADMIN
  - id: u1
    name: Siti Aminah
    role: USER
    kelurahan: Jati Padang
    totalRiskScore: 2
    hpht: 2024-01-01
  - id: u2
    name: Dewi Lestari
    role: USER
    kelurahan: Kebagusan
    totalRiskScore: 0
ancVisits:
  - id: v1
    patientId: u2
    visitDate: 2024-05-01
    nextVisitDate: 2024-05-20
    bloodPressure: 150/95
    dangerSigns: [Kejang]
currentUser: null
alerts: []
logs: []
"#;

    fn today() -> ClinicalDate {
        ClinicalDate::parse("2024-06-01").expect("valid date")
    }

    #[test]
    fn parses_yaml_and_separates_staff() {
        let snapshot = Snapshot::parse(YAML, SnapshotFormat::Yaml).expect("parse");
        assert_eq!(snapshot.patients.len(), 2);
        assert_eq!(snapshot.staff.len(), 1);
        assert_eq!(snapshot.visits.len(), 1);

        let policy = TriagePolicy::default();
        let roster = snapshot.roster(&policy, today());
        let board = roster.filter(&RosterFilter::default());
        let labels: Vec<RiskLabel> = board.iter().map(|a| a.risk.label).collect();
        assert_eq!(labels, vec![RiskLabel::Hijau, RiskLabel::Hitam]);
        assert!(board[1].missed);
    }

    #[test]
    fn parses_json_with_path_errors() {
        let json = r#"{"users":[{"id":"u1","name":"Siti","role":"USER","totalRiskScore":"tinggi"}]}"#;
        let err = Snapshot::parse(json, SnapshotFormat::Json).expect_err("bad score type");
        match err {
            SnapshotError::Translation(msg) => {
                assert!(msg.contains("users[0].totalRiskScore"), "message was {msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Snapshot::parse("users: []\nunexpected_key: 1\n", SnapshotFormat::Yaml)
            .expect_err("should reject unknown key");
        assert!(matches!(err, SnapshotError::Translation(msg) if msg.contains("unexpected_key")));
    }

    #[test]
    fn empty_document_is_an_empty_snapshot() {
        let snapshot = Snapshot::parse("{}", SnapshotFormat::Json).expect("parse");
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn detects_format_from_extension_or_content() {
        assert_eq!(
            SnapshotFormat::detect(Path::new("state.JSON"), "").expect("json"),
            SnapshotFormat::Json
        );
        assert_eq!(
            SnapshotFormat::detect(Path::new("state.yml"), "").expect("yaml"),
            SnapshotFormat::Yaml
        );
        assert_eq!(
            SnapshotFormat::detect(Path::new("state"), "  {\"users\": []}").expect("sniffed"),
            SnapshotFormat::Json
        );
        assert_eq!(
            SnapshotFormat::detect(Path::new("state"), "users: []").expect("sniffed"),
            SnapshotFormat::Yaml
        );
        assert!(matches!(
            SnapshotFormat::detect(Path::new("state.csv"), ""),
            Err(SnapshotError::UnsupportedFormat(ext)) if ext == "csv"
        ));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("state.yaml");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(YAML.as_bytes()).expect("write");

        let snapshot = Snapshot::load(&path).expect("load");
        assert_eq!(snapshot.patients[0].name, "Siti Aminah");

        let missing = dir.path().join("missing.json");
        assert!(matches!(Snapshot::load(&missing), Err(SnapshotError::Io(_))));
    }
}
