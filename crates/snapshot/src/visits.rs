//! ANC visit wire model and translation.
//!
//! Numeric readings of zero are how the entry form records "not measured"; they translate to
//! `None` so that the engine never mistakes them for a reading.

use crate::users::lenient_date;
use crate::{SnapshotError, SnapshotResult};
use anc_core::{VisitStatus, VisitSummary};
use anc_types::PatientId;
use serde::Deserialize;

/// Wire representation of one entry in `ancVisits`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct AncVisitWire {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub visit_date: String,
    #[serde(default)]
    pub scheduled_date: String,
    #[serde(default)]
    pub next_visit_date: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub blood_pressure: String,
    #[serde(default)]
    pub tfu: f64,
    #[serde(default)]
    pub djj: f64,
    #[serde(default)]
    pub hb: f64,
    #[serde(default)]
    pub complaints: String,
    #[serde(default)]
    pub danger_signs: Vec<String>,
    #[serde(default)]
    pub edema: bool,
    #[serde(default)]
    pub fetal_movement: String,
    #[serde(default)]
    pub follow_up: String,
    #[serde(default)]
    pub nakes_notes: String,
    #[serde(default)]
    pub nakes_id: String,
    #[serde(default)]
    pub status: VisitStatus,
}

fn measured(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

pub(crate) fn wire_to_domain(wire: AncVisitWire) -> SnapshotResult<VisitSummary> {
    let patient_id = PatientId::new(&wire.patient_id).map_err(|e| {
        SnapshotError::Translation(format!("visit '{}' has an invalid patientId: {e}", wire.id))
    })?;
    let owner = format!("visit {}", wire.id);

    let djj = measured(wire.djj).map(|bpm| bpm.round() as u32);

    Ok(VisitSummary {
        visit_date: lenient_date(&wire.visit_date, "visitDate", &owner),
        scheduled_date: lenient_date(&wire.scheduled_date, "scheduledDate", &owner),
        next_visit_date: lenient_date(&wire.next_visit_date, "nextVisitDate", &owner),
        weight: measured(wire.weight),
        blood_pressure: wire.blood_pressure,
        tfu: measured(wire.tfu),
        djj,
        hb: measured(wire.hb),
        complaints: wire.complaints,
        danger_signs: wire.danger_signs,
        edema: wire.edema,
        fetal_movement: wire.fetal_movement,
        follow_up: wire.follow_up,
        nakes_notes: wire.nakes_notes,
        nakes_id: wire.nakes_id,
        status: wire.status,
        ..VisitSummary::new(wire.id, patient_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AncVisitWire {
        serde_json::from_str(json).expect("wire visit")
    }

    #[test]
    fn translates_readings_and_dates() {
        let wire = parse(
            r#"{
  "id": "v1",
  "patientId": "u1",
  "visitDate": "2024-05-01",
  "scheduledDate": "2024-05-01",
  "nextVisitDate": "2024-06-01T00:00:00.000Z",
  "weight": 61.5,
  "bloodPressure": "120/80",
  "tfu": 24,
  "djj": 142,
  "hb": 11.8,
  "complaints": "",
  "dangerSigns": ["Tidak Ada"],
  "edema": false,
  "fetalMovement": "Aktif",
  "followUp": "",
  "nakesNotes": "",
  "nakesId": "n1",
  "status": "COMPLETED"
}"#,
        );
        let visit = wire_to_domain(wire).expect("translate");
        assert_eq!(visit.id, "v1");
        assert_eq!(visit.patient_id.as_str(), "u1");
        assert_eq!(visit.next_visit_date.map(|d| d.to_string()).as_deref(), Some("2024-06-01"));
        assert_eq!(visit.djj, Some(142));
        assert_eq!(visit.hb, Some(11.8));
        assert_eq!(visit.status, VisitStatus::Completed);
    }

    #[test]
    fn zero_readings_are_not_measured() {
        let wire = parse(r#"{"id":"v2","patientId":"u1","hb":0,"djj":0,"tfu":0,"weight":0}"#);
        let visit = wire_to_domain(wire).expect("translate");
        assert_eq!(visit.hb, None);
        assert_eq!(visit.djj, None);
        assert_eq!(visit.tfu, None);
        assert_eq!(visit.weight, None);
        assert_eq!(visit.visit_date, None);
    }

    #[test]
    fn bad_next_visit_date_becomes_unknown() {
        let wire = parse(r#"{"id":"v3","patientId":"u1","nextVisitDate":"minggu depan"}"#);
        let visit = wire_to_domain(wire).expect("translate");
        assert_eq!(visit.next_visit_date, None);
    }

    #[test]
    fn blank_patient_reference_is_an_error() {
        let wire = parse(r#"{"id":"v4","patientId":""}"#);
        let err = wire_to_domain(wire).expect_err("blank patient id");
        assert!(matches!(err, SnapshotError::Translation(msg) if msg.contains("v4")));
    }
}
