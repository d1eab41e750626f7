mod report;

use anc_core::constants::{TODAY_ENV, TRIAGE_POLICY_ENV};
use anc_core::{
    today_from_env_value, visit_history, BloodPressure, ClinicalDate, CoreConfig, PatientId,
    RiskFilter, RosterFilter, StatusFilter, VisitSummary,
};
use anc_snapshot::Snapshot;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "anc")]
#[command(about = "Antenatal care triage and monitoring")]
struct Cli {
    /// YAML triage policy file (overrides ANC_TRIAGE_POLICY)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,
    /// Date to evaluate against, YYYY-MM-DD (overrides ANC_TODAY; default: local date)
    #[arg(long, global = true)]
    today: Option<ClinicalDate>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one pregnant patient from a score and latest-visit readings
    Triage {
        /// Cumulative risk score, excluding the KSPR base points
        #[arg(long)]
        score: u32,
        /// Blood pressure, e.g. 120/80
        #[arg(long)]
        bp: Option<String>,
        /// Hemoglobin in g/dL
        #[arg(long)]
        hb: Option<f64>,
        /// Fetal heart rate in beats/min
        #[arg(long)]
        djj: Option<u32>,
        /// Edema recorded on the visit
        #[arg(long)]
        edema: bool,
        /// Recorded danger sign (repeatable)
        #[arg(long = "danger-sign")]
        danger_signs: Vec<String>,
    },
    /// Gestational age, HPL and percentage of term from HPHT
    Progress {
        /// Last menstrual period, YYYY-MM-DD
        #[arg(long)]
        hpht: String,
    },
    /// Whether the next control date has been missed
    Missed {
        /// Next scheduled control date; omit when the patient has no visit
        #[arg(long)]
        next_visit: Option<ClinicalDate>,
        /// Patient has delivered
        #[arg(long)]
        postpartum: bool,
    },
    /// Filtered patient register from a snapshot
    Board {
        snapshot: PathBuf,
        /// ALL, HIJAU, KUNING, MERAH, HITAM or NIFAS
        #[arg(long, default_value = "ALL")]
        risk: RiskFilter,
        /// ALL, MANGKIR, ON_TIME or NIFAS
        #[arg(long, default_value = "ALL")]
        status: StatusFilter,
        /// Name or id fragment (repeatable; joined with spaces)
        #[arg(long)]
        search: Vec<String>,
        /// Exact kelurahan, or ALL
        #[arg(long)]
        kelurahan: Option<String>,
        /// Maximum rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Full assessment and visit history for one patient
    Profile {
        snapshot: PathBuf,
        patient_id: String,
    },
    /// Map markers and summary counts
    Map { snapshot: PathBuf },
    /// Print the active triage policy as YAML
    Policy,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("anc=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CoreConfig::resolve(cli.policy.clone(), std::env::var(TRIAGE_POLICY_ENV).ok())?;
    if let Some(source) = config.policy_source() {
        tracing::info!("using triage policy {}", source.display());
    }
    let today = match cli.today {
        Some(today) => today,
        None => today_from_env_value(std::env::var(TODAY_ENV).ok())?
            .unwrap_or_else(|| chrono::Local::now().date_naive().into()),
    };
    let policy = config.policy();

    match cli.command {
        Some(Commands::Triage {
            score,
            bp,
            hb,
            djj,
            edema,
            danger_signs,
        }) => {
            let mut visit = VisitSummary::new("cli", PatientId::new("cli")?);
            if let Some(bp) = bp {
                if BloodPressure::parse(&bp).is_none() {
                    tracing::warn!("blood pressure {bp:?} is not readable and will be ignored");
                }
                visit.blood_pressure = bp;
            }
            visit.hb = hb;
            visit.djj = djj;
            visit.edema = edema;
            visit.danger_signs = danger_signs;

            let explanation = policy.explain(score, Some(&visit));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&explanation)?);
            } else {
                println!("{}", report::triage(&explanation));
            }
        }
        Some(Commands::Progress { hpht }) => {
            let progress = anc_core::calculate_progress(Some(&hpht), today);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
            } else {
                println!("{}", report::progress(&progress));
            }
        }
        Some(Commands::Missed {
            next_visit,
            postpartum,
        }) => {
            let patient_id = PatientId::new("cli")?;
            let visit = next_visit.map(|next| VisitSummary {
                next_visit_date: Some(next),
                ..VisitSummary::new("cli", patient_id)
            });
            let overdue = anc_core::days_overdue(postpartum, visit.as_ref(), today);
            if cli.json {
                let body = serde_json::json!({
                    "missed": overdue.is_some(),
                    "days_overdue": overdue,
                    "today": today,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                match overdue {
                    Some(days) => println!("MANGKIR ({days} days overdue as of {today})"),
                    None => println!("not missed as of {today}"),
                }
            }
        }
        Some(Commands::Board {
            snapshot,
            risk,
            status,
            search,
            kelurahan,
            limit,
        }) => {
            let snapshot = Snapshot::load(&snapshot)?;
            let roster = snapshot.roster(policy, today);
            let filter = RosterFilter {
                search,
                risk,
                status,
                kelurahan: kelurahan.filter(|k| !k.trim().eq_ignore_ascii_case("ALL")),
            };
            let rows = roster.filter(&filter);
            if cli.json {
                let shown = limit.unwrap_or(rows.len()).min(rows.len());
                println!("{}", serde_json::to_string_pretty(&rows[..shown])?);
            } else {
                println!("{}", report::board(&rows, limit));
            }
        }
        Some(Commands::Profile {
            snapshot,
            patient_id,
        }) => {
            let snapshot = Snapshot::load(&snapshot)?;
            let roster = snapshot.roster(policy, today);
            let assessment = roster.find(&patient_id)?;
            let history = visit_history(&snapshot.visits, &assessment.patient.id);
            if cli.json {
                let body = serde_json::json!({
                    "assessment": assessment,
                    "visits": history,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", report::profile(&assessment, &history));
            }
        }
        Some(Commands::Map { snapshot }) => {
            let snapshot = Snapshot::load(&snapshot)?;
            let roster = snapshot.roster(policy, today);
            let markers = roster.map_markers();
            let summary = roster.summary();
            if cli.json {
                let body = serde_json::json!({
                    "markers": markers,
                    "summary": summary,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", report::map(&markers, &summary));
            }
        }
        Some(Commands::Policy) => {
            match config.policy_source() {
                Some(path) => println!("# loaded from {}", path.display()),
                None => println!("# built-in default policy"),
            }
            print!("{}", policy.render()?);
        }
        None => {
            println!("Use 'anc --help' for commands");
        }
    }

    Ok(())
}
