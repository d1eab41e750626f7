//! Plain-text rendering for terminal output.

use anc_core::{
    MapMarker, MarkerKind, PatientAssessment, PregnancyProgress, RosterSummary,
    TriageExplanation, Trimester, VisitSummary,
};

pub fn triage(explanation: &TriageExplanation) -> String {
    let mut lines = vec![
        format!(
            "{} ({})",
            explanation.category.label,
            explanation.category.style.as_str()
        ),
        format!(
            "score {} -> {}",
            explanation.score, explanation.score_tier
        ),
    ];
    match explanation.danger_floor {
        Some(floor) => lines.push(format!("danger floor {floor}")),
        None => lines.push("no danger findings".to_string()),
    }
    for finding in &explanation.danger.findings {
        lines.push(format!("  - {:?}: {}", finding.severity, finding.detail).to_lowercase());
    }
    lines.join("\n")
}

fn trimester_name(trimester: Trimester) -> &'static str {
    match trimester {
        Trimester::First => "first trimester",
        Trimester::Second => "second trimester",
        Trimester::Third => "third trimester",
    }
}

pub fn progress(progress: &PregnancyProgress) -> String {
    match (progress.hpl, progress.trimester) {
        (Some(hpl), Some(trimester)) => format!(
            "{} weeks ({}), {}% of term, HPL {}",
            progress.weeks,
            trimester_name(trimester),
            progress.percentage,
            hpl
        ),
        _ => "unknown (HPHT missing, unreadable or in the future)".to_string(),
    }
}

/// One line per patient.
pub fn board(assessments: &[PatientAssessment<'_>], limit: Option<usize>) -> String {
    if assessments.is_empty() {
        return "No patients match.".to_string();
    }
    let shown = limit.unwrap_or(assessments.len()).min(assessments.len());
    let mut lines: Vec<String> = assessments[..shown]
        .iter()
        .map(|a| {
            let last = a
                .latest_visit
                .and_then(|v| v.visit_date)
                .map_or_else(|| "-".to_string(), |d| d.to_string());
            let overdue = a
                .days_overdue
                .map_or_else(String::new, |days| format!(" ({days}d overdue)"));
            format!(
                "{:<10} {:<24} {:<6} {:<8} {:<9}{} last visit {}",
                a.patient.id.as_str(),
                a.patient.name,
                a.risk.label.as_str(),
                a.patient.kelurahan,
                a.schedule.as_str(),
                overdue,
                last
            )
        })
        .collect();
    if shown < assessments.len() {
        lines.push(format!("... {} more", assessments.len() - shown));
    }
    lines.join("\n")
}

pub fn profile(assessment: &PatientAssessment<'_>, history: &[&VisitSummary]) -> String {
    let patient = assessment.patient;
    let mut lines = vec![
        format!("{} ({})", patient.name, patient.id),
        format!(
            "risk {} | KSPR {} | {}",
            assessment.risk.label, assessment.kspr_total, assessment.obstetric_formula
        ),
    ];
    if patient.is_postpartum {
        let monitoring = if patient.is_baby_monitoring_active() {
            "active"
        } else {
            "ended"
        };
        lines.push(format!("postpartum, infant monitoring {monitoring}"));
        if let Some(log) = assessment.latest_baby_log {
            lines.push(format!(
                "latest baby log: {} months, {} kg, {} cm",
                log.age_in_months, log.weight, log.height
            ));
        }
    } else {
        lines.push(format!("progress: {}", progress(&assessment.progress)));
        if let Some(days) = assessment.days_overdue {
            lines.push(format!("MANGKIR: next control was {days} days ago"));
        }
    }
    if !patient.selected_risk_factors.is_empty() {
        lines.push(format!(
            "risk factors: {}",
            patient.selected_risk_factors.join(", ")
        ));
    }
    lines.push(format!("visits ({}):", assessment.visit_count));
    for visit in history {
        let date = visit
            .visit_date
            .map_or_else(|| "unknown date".to_string(), |d| d.to_string());
        let bp = if visit.blood_pressure.trim().is_empty() {
            "-"
        } else {
            visit.blood_pressure.as_str()
        };
        let hb = visit
            .measured_hb()
            .map_or_else(|| "-".to_string(), |hb| hb.to_string());
        let djj = visit
            .measured_djj()
            .map_or_else(|| "-".to_string(), |djj| djj.to_string());
        lines.push(format!("  {date}  BP {bp}  Hb {hb}  DJJ {djj}"));
    }
    lines.join("\n")
}

pub fn map(markers: &[MapMarker<'_>], summary: &RosterSummary) -> String {
    let mut lines = vec![format!(
        "{} pregnant, {} infants on the map",
        summary.pregnant_with_location, summary.postpartum_with_location
    )];
    for marker in markers {
        let kind = match marker.kind {
            MarkerKind::Infant => "INFANT".to_string(),
            MarkerKind::Pregnancy(label) => label.to_string(),
        };
        lines.push(format!(
            "{:>10.5} {:>11.5}  {:<6} {} ({})",
            marker.position.lat,
            marker.position.lng,
            kind,
            marker.patient.name,
            marker.style.hex()
        ));
    }
    lines.push(format!(
        "HIJAU {} | KUNING {} | MERAH {} | HITAM {} | NIFAS {} | MANGKIR {}",
        summary.hijau, summary.kuning, summary.merah, summary.hitam, summary.nifas, summary.mangkir
    ));
    lines.join("\n")
}
