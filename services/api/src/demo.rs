use crate::infra::{build_services, match_scorer, read_json, Services};
use clap::Args;
use fitscore::broadcast::{batch_channel, Subscriber};
use fitscore::config::{AppConfig, JobConfig};
use fitscore::error::AppError;
use fitscore::jobs::{ArtifactStore, JobKind, JobPayload, TargetOutcome};
use fitscore::quota::{QuotaGate, DEFAULT_DAILY_LIMIT};
use fitscore::scoring::{
    CandidateDocument, ContactInfo, ExperienceEntry, MatchScorer, ScoreInput, ScoreResult,
    TargetDocument,
};
use fitscore::store::InMemoryDocumentStore;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Candidate document (JSON)
    #[arg(long)]
    pub(crate) candidate: PathBuf,
    /// Target document (JSON)
    #[arg(long)]
    pub(crate) target: PathBuf,
    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pause between targets in milliseconds
    #[arg(long, default_value_t = 250)]
    pub(crate) delay_ms: u64,
    /// Run a tailoring batch instead of a scoring batch
    #[arg(long)]
    pub(crate) tailor: bool,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let scorer = match_scorer(&config)?;
    let candidate: CandidateDocument = read_json(&args.candidate)?;
    let target: TargetDocument = read_json(&args.target)?;

    let result = scorer
        .score(&ScoreInput::from_documents(&candidate, &target))
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_score(&candidate, &target, &result);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let scorer = MatchScorer::new(Arc::new(QuotaGate::new(DEFAULT_DAILY_LIMIT)));
    let jobs = JobConfig {
        courtesy_delay: Duration::from_millis(args.delay_ms),
        target_timeout: Some(Duration::from_secs(10)),
    };
    let services = build_services(scorer, demo_documents(), jobs);
    let kind = if args.tailor {
        JobKind::BatchTailor
    } else {
        JobKind::BatchScore
    };

    println!("Match scoring demo ({})", kind.label());
    let targets: Vec<String> = ["post-platform", "post-archivist", "post-data"]
        .into_iter()
        .map(str::to_string)
        .collect();
    let job = services.orchestrator.enqueue(
        kind,
        JobPayload {
            targets,
            shared_payload: json!({ "candidate_id": "cand-demo" }),
        },
    )?;
    println!("- Enqueued {} -> status {}", job.id, job.status.label());

    let (observer, mut events) = Subscriber::channel();
    services
        .broadcast
        .subscribe(&batch_channel(&job.id.0), &observer);

    // Events published before the subscription landed are lost; a job that already
    // finished is reported from its stored state alone.
    let finished = services.orchestrator.get_status(&job.id)?.status.is_terminal();
    if !finished {
        while let Some(frame) = events.recv().await {
            let event: Value = serde_json::from_str(&frame)?;
            let data = &event["data"];
            match data["status"].as_str().unwrap_or_default() {
                "generating" => println!(
                    "  [{:>3}%] working on {}",
                    data["progress"].as_u64().unwrap_or_default(),
                    data["current"].as_str().unwrap_or("?")
                ),
                "completed" => {
                    println!("  [100%] completed");
                    break;
                }
                "error" => {
                    println!("  job failed: {}", data["error"].as_str().unwrap_or("unknown"));
                    break;
                }
                other => println!("  unexpected event status {other}"),
            }
        }
    }

    let job = services.orchestrator.get_status(&job.id)?;
    println!("\nResults for {}", job.id);
    let results = job
        .artifacts
        .map(|artifacts| artifacts.results)
        .unwrap_or_default();
    for outcome in &results {
        render_outcome(&services, outcome);
    }
    Ok(())
}

fn render_outcome(services: &Services, outcome: &TargetOutcome) {
    if !outcome.success {
        println!(
            "- {}: failed ({})",
            outcome.target_id,
            outcome.error.as_deref().unwrap_or("no reason recorded")
        );
        return;
    }

    let artifact = outcome
        .artifact_ref
        .as_ref()
        .and_then(|reference| services.artifacts.fetch(reference).ok().flatten());
    match artifact {
        Some(artifact) if artifact.get("breakdown").is_some() => println!(
            "- {}: overall {} ({})",
            outcome.target_id,
            artifact["overall"],
            artifact["strategy"].as_str().unwrap_or("unknown")
        ),
        Some(artifact) => println!(
            "- {}: draft rescored {} -> {}; weave in {}",
            outcome.target_id,
            artifact["baseline_overall"],
            artifact["score"]["overall"],
            artifact["focus_keywords"]
        ),
        None => println!("- {}: artifact unavailable", outcome.target_id),
    }
}

fn render_score(candidate: &CandidateDocument, target: &TargetDocument, result: &ScoreResult) {
    let name = if candidate.name.trim().is_empty() {
        candidate.id.as_str()
    } else {
        candidate.name.as_str()
    };
    println!("{} vs {}", name, target.label());
    println!(
        "Overall {}/100 ({:?} strategy)",
        result.overall, result.strategy
    );
    for (label, points, max) in result.breakdown.sub_scores() {
        println!("  - {label}: {points}/{max}");
    }
    if !result.breakdown.keyword_coverage.missing.is_empty() {
        println!(
            "Missing keywords: {}",
            result.breakdown.keyword_coverage.missing.join(", ")
        );
    }
    if !result.suggestions.is_empty() {
        println!("Suggestions:");
        for suggestion in &result.suggestions {
            println!("  * {suggestion}");
        }
    }
}

fn demo_documents() -> InMemoryDocumentStore {
    let candidate = CandidateDocument {
        id: "cand-demo".to_string(),
        name: "Jordan Rivera".to_string(),
        contact: ContactInfo {
            email: Some("jordan@example.com".to_string()),
            phone: None,
            location: Some("Denver, CO".to_string()),
        },
        summary: "Platform engineer with seven years building Kubernetes infrastructure, \
                  incident response tooling and developer platforms for product teams."
            .to_string(),
        experience: vec![
            ExperienceEntry {
                title: "Staff Platform Engineer".to_string(),
                organization: "Northwind".to_string(),
                bullets: vec![
                    "Cut cloud spend by 28% by right-sizing Kubernetes clusters".to_string(),
                    "Led incident response rotation for twelve services".to_string(),
                    "Introduced Terraform modules adopted by every product team".to_string(),
                ],
            },
            ExperienceEntry {
                title: "Site Reliability Engineer".to_string(),
                organization: "Contoso".to_string(),
                bullets: vec![
                    "Built Prometheus alerting that reduced pages by 40%".to_string(),
                    "Wrote runbooks for on-call engineers".to_string(),
                ],
            },
        ],
        skills: vec![
            "Kubernetes".to_string(),
            "Terraform".to_string(),
            "Prometheus".to_string(),
            "Go".to_string(),
            "Python".to_string(),
        ],
    };

    let targets = vec![
        TargetDocument {
            id: "post-platform".to_string(),
            title: "Senior Platform Engineer".to_string(),
            company: "Globex".to_string(),
            description: "Own our Kubernetes platform and Terraform infrastructure. \
                          Experience with Prometheus and incident response required."
                .to_string(),
        },
        TargetDocument {
            id: "post-data".to_string(),
            title: "Data Engineer".to_string(),
            company: "Initech".to_string(),
            description: "Build Spark and Airflow pipelines feeding our Snowflake warehouse. \
                          Python required; data engineering background preferred."
                .to_string(),
        },
    ];

    InMemoryDocumentStore::with_documents([candidate], targets)
}
