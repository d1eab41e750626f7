//! Register user wire models and translation helpers.
//!
//! The dashboard keeps patients and staff in one `users` list distinguished by `role`.
//! Patients translate into [`anc_core::Patient`]; staff become [`StaffMember`] and are never
//! assessed.
//!
//! Responsibilities:
//! - Define a strict wire model for a user entry and its nested delivery and baby log records
//! - Translate wire records into domain types, parsing dates at the boundary
//!
//! Notes:
//! - A date that cannot be read is dropped with a warning rather than failing the snapshot
//! - An empty identifier is a hard error

use crate::{SnapshotError, SnapshotResult};
use anc_core::{
    BabyCondition, BabyGender, BabyLog, DeliveryData, DeliveryType, GeoPoint, GrowthCondition,
    MaternalCondition, MonitoringEndReason, Patient,
};
use anc_types::{ClinicalDate, PatientId};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Role of a register user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    /// Health worker (tenaga kesehatan).
    Nakes,
    /// Patient.
    User,
}

/// A staff account from the snapshot (role ADMIN or NAKES).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub kelurahan: String,
    pub is_active: bool,
}

/// A translated user entry.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RegisterEntry {
    Patient(Box<Patient>),
    Staff(StaffMember),
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of one entry in `users`.
///
/// Credentials (`username`, `password`) are accepted so real exports parse, and are discarded
/// during translation.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct UserWire {
    pub id: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub username: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub password: Option<String>,
    pub name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub kecamatan: String,
    #[serde(default)]
    pub kelurahan: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub hpht: String,
    #[serde(default)]
    pub pregnancy_month: u32,
    #[serde(default)]
    pub pregnancy_number: u32,
    #[serde(default)]
    pub parity_p: u32,
    #[serde(default)]
    pub parity_a: u32,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub selected_risk_factors: Vec<String>,
    #[serde(default)]
    pub total_risk_score: u32,
    pub role: UserRole,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_postpartum: bool,
    #[serde(default)]
    pub delivery_data: Option<DeliveryWire>,
    #[serde(default)]
    pub pregnancy_history: Vec<DeliveryWire>,
    #[serde(default)]
    pub baby_logs: Vec<BabyLogWire>,
    #[serde(default)]
    pub is_baby_monitoring_active: Option<bool>,
    #[serde(default)]
    pub baby_monitoring_end_reason: Option<MonitoringEndReason>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct DeliveryWire {
    #[serde(default)]
    pub delivery_date: String,
    pub delivery_type: DeliveryType,
    pub maternal_condition: MaternalCondition,
    pub baby_condition: BabyCondition,
    pub baby_gender: BabyGender,
    #[serde(default)]
    pub baby_weight: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct BabyLogWire {
    pub id: String,
    #[serde(default)]
    pub date: String,
    pub age_in_months: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub head_circumference: f64,
    #[serde(default)]
    pub immunization: String,
    pub condition: GrowthCondition,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub nakes_id: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Parse an optional date field, logging and dropping values that cannot be read.
pub(crate) fn lenient_date(raw: &str, field: &str, owner: &str) -> Option<ClinicalDate> {
    if raw.trim().is_empty() {
        return None;
    }
    match ClinicalDate::parse(raw) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!("{owner}: ignoring {field}: {err}");
            None
        }
    }
}

fn delivery_to_domain(wire: DeliveryWire, owner: &str) -> DeliveryData {
    DeliveryData {
        delivery_date: lenient_date(&wire.delivery_date, "deliveryDate", owner),
        delivery_type: wire.delivery_type,
        maternal_condition: wire.maternal_condition,
        baby_condition: wire.baby_condition,
        baby_gender: wire.baby_gender,
        baby_weight: wire.baby_weight,
    }
}

fn baby_log_to_domain(wire: BabyLogWire, owner: &str) -> BabyLog {
    BabyLog {
        date: lenient_date(&wire.date, "babyLogs.date", owner),
        id: wire.id,
        age_in_months: wire.age_in_months,
        weight: wire.weight,
        height: wire.height,
        head_circumference: wire.head_circumference,
        immunization: wire.immunization,
        condition: wire.condition,
        notes: wire.notes,
        nakes_id: wire.nakes_id,
    }
}

/// Convert a wire user into a patient or staff entry.
pub(crate) fn wire_to_domain(wire: UserWire) -> SnapshotResult<RegisterEntry> {
    if wire.role != UserRole::User {
        if wire.id.trim().is_empty() {
            return Err(SnapshotError::Translation(format!(
                "staff member '{}' has an empty id",
                wire.name
            )));
        }
        return Ok(RegisterEntry::Staff(StaffMember {
            id: wire.id,
            name: wire.name,
            role: wire.role,
            kelurahan: wire.kelurahan,
            is_active: wire.is_active,
        }));
    }

    let id = PatientId::new(&wire.id).map_err(|e| {
        SnapshotError::Translation(format!("patient '{}' has an invalid id: {e}", wire.name))
    })?;
    let owner = format!("patient {id}");

    let location = match (wire.lat, wire.lng) {
        (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some(GeoPoint { lat, lng }),
        (None, None) => None,
        _ => {
            tracing::warn!("{owner}: ignoring incomplete coordinates");
            None
        }
    };

    let hpht = Some(wire.hpht.trim().to_string()).filter(|h| !h.is_empty());

    let mut patient = Patient::new(id, wire.name);
    patient.dob = lenient_date(&wire.dob, "dob", &owner);
    patient.address = wire.address;
    patient.kecamatan = wire.kecamatan;
    patient.kelurahan = wire.kelurahan;
    patient.location = location;
    patient.hpht = hpht;
    patient.pregnancy_month = wire.pregnancy_month;
    patient.gravida = wire.pregnancy_number;
    patient.para = wire.parity_p;
    patient.abortus = wire.parity_a;
    patient.medical_history = wire.medical_history;
    patient.selected_risk_factors = wire.selected_risk_factors;
    patient.total_risk_score = wire.total_risk_score;
    patient.phone = wire.phone;
    patient.is_active = wire.is_active;
    patient.is_postpartum = wire.is_postpartum;
    patient.delivery = wire.delivery_data.map(|d| delivery_to_domain(d, &owner));
    patient.pregnancy_history = wire
        .pregnancy_history
        .into_iter()
        .map(|d| delivery_to_domain(d, &owner))
        .collect();
    patient.baby_logs = wire
        .baby_logs
        .into_iter()
        .map(|log| baby_log_to_domain(log, &owner))
        .collect();
    patient.baby_monitoring_active = wire.is_baby_monitoring_active;
    patient.baby_monitoring_end_reason = wire.baby_monitoring_end_reason;

    Ok(RegisterEntry::Patient(Box::new(patient)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> UserWire {
        serde_yaml::from_str(yaml).expect("wire user")
    }

    #[test]
    fn translates_patient_with_nested_records() {
        let wire = parse(
            r#"id: u1
name: Siti Aminah
dob: 1995-04-12
kelurahan: Jati Padang
lat: -6.29
lng: 106.84
hpht: 2024-01-01
pregnancyNumber: 2
parityP: 1
parityA: 0
totalRiskScore: 4
role: USER
isPostpartum: true
deliveryData:
  deliveryDate: 2024-10-05
  deliveryType: SC
  maternalCondition: SEHAT
  babyCondition: BBLR
  babyGender: P
  babyWeight: 2.3
babyLogs:
  - id: b1
    date: 2024-11-05
    ageInMonths: 1
    weight: 3.1
    height: 50
    headCircumference: 35
    immunization: BCG
    condition: SEHAT
    notes: ""
    nakesId: n1
"#,
        );

        let RegisterEntry::Patient(patient) = wire_to_domain(wire).expect("translate") else {
            panic!("expected a patient");
        };
        assert_eq!(patient.id.as_str(), "u1");
        assert_eq!(patient.obstetric_formula(), "G2P1A0");
        assert_eq!(patient.location, Some(GeoPoint { lat: -6.29, lng: 106.84 }));
        assert_eq!(patient.hpht.as_deref(), Some("2024-01-01"));
        let delivery = patient.delivery.as_ref().expect("delivery");
        assert_eq!(delivery.delivery_type, DeliveryType::Sc);
        assert_eq!(delivery.baby_gender, BabyGender::Female);
        assert_eq!(delivery.delivery_date.map(|d| d.to_string()).as_deref(), Some("2024-10-05"));
        assert_eq!(patient.baby_logs.len(), 1);
        assert!(patient.is_baby_monitoring_active());
    }

    #[test]
    fn staff_are_kept_apart() {
        let wire = parse("id: n1\nname: Bidan Rina\nrole: NAKES\nusername: rina\npassword: x\n");
        let entry = wire_to_domain(wire).expect("translate");
        assert_eq!(
            entry,
            RegisterEntry::Staff(StaffMember {
                id: "n1".into(),
                name: "Bidan Rina".into(),
                role: UserRole::Nakes,
                kelurahan: String::new(),
                is_active: true,
            })
        );
    }

    #[test]
    fn unreadable_dates_and_partial_coordinates_are_dropped() {
        let wire = parse("id: u2\nname: Dewi\nrole: USER\ndob: kemarin\nlat: -6.3\nhpht: \"  \"\n");
        let RegisterEntry::Patient(patient) = wire_to_domain(wire).expect("translate") else {
            panic!("expected a patient");
        };
        assert_eq!(patient.dob, None);
        assert_eq!(patient.location, None);
        assert_eq!(patient.hpht, None);
    }

    #[test]
    fn blank_patient_id_is_an_error() {
        let wire = parse("id: \"  \"\nname: Tanpa Id\nrole: USER\n");
        let err = wire_to_domain(wire).expect_err("blank id");
        assert!(matches!(err, SnapshotError::Translation(msg) if msg.contains("Tanpa Id")));
    }
}
