mod render;

use chrono::Utc;
use clap::{Parser, Subcommand};
use jobrec_client_core::{
    CandidateSession, ClientConfig, EvaluationAggregator, HttpBackend, InputTab, JobBackend,
    Persona, ProfileId, ProfileSubmission, RetryPolicy, ScoringMode, SubmitOutcome, View,
    DEFAULT_API_BASE,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "jobrec", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Recommendation service base URL
    #[arg(long, env = "JOBREC_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Attempts per read call; transient failures are retried with backoff
    #[arg(long, default_value = "1")]
    retries: u32,

    /// Number of recommendations to fetch
    #[arg(long, default_value = "10")]
    limit: usize,
}

#[derive(Subcommand)]
enum Command {
    /// List the dataset candidates available for picking.
    Candidates,
    /// Submit pasted text or a resume file for analysis, then show recommendations.
    Analyze {
        /// Profile text to analyze.
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Resume to upload (.pdf, .docx or .txt).
        #[arg(long)]
        file: Option<PathBuf>,
        /// One of "Fresh Grad", "Mid-Career Switcher", "Job-Seeker Retraining".
        #[arg(long, default_value = "Fresh Grad")]
        persona: String,
        /// Scoring mode for the follow-up recommendations.
        #[arg(long, default_value = "hybrid")]
        mode: String,
        /// Print the profile id only, without fetching recommendations.
        #[arg(long, default_value_t = false)]
        no_follow: bool,
    },
    /// Use a dataset candidate as the profile and show recommendations.
    Pick {
        #[arg(long)]
        resume_id: String,
        #[arg(long, default_value = "hybrid")]
        mode: String,
    },
    /// Show recommendations for a profile id, optionally with a gap report.
    Candidate {
        /// Profile id (`dataset-<key>` for dataset rows).
        #[arg(long)]
        profile: String,
        #[arg(long, default_value = "hybrid")]
        mode: String,
        /// Open the gap report for this job id.
        #[arg(long, conflicts_with = "gaps_row")]
        gaps: Option<String>,
        /// Open the gap report for the n-th listed recommendation (1-based).
        #[arg(long)]
        gaps_row: Option<usize>,
    },
    /// Compare offline ranking metrics across every scoring mode.
    Eval {
        /// Cutoff K.
        #[arg(long, default_value = "10")]
        k: usize,
    },
    /// Open a view by its address, e.g. `/candidate/dataset-42` or `/eval`.
    Open { path: String },
    /// Check that the backend is reachable.
    Health,
    /// Ask the backend to reload its datasets and caches.
    Reload,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::new(&cli.api_base)?
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_recommendation_limit(cli.limit)
        .with_retry(RetryPolicy {
            max_attempts: cli.retries.max(1),
            base_delay: Duration::from_millis(500),
        });
    let backend = Arc::new(HttpBackend::new(config.clone())?);

    info!(
        version = app_version,
        api_base = %config.api_base,
        started_at = %Utc::now().to_rfc3339(),
        "jobrec boot"
    );

    match cli.command {
        Command::Candidates => {
            let submission = ProfileSubmission::new(backend);
            print!("{}", render::candidates(submission.start().await));
        }
        Command::Analyze {
            text,
            file,
            persona,
            mode,
            no_follow,
        } => {
            let persona: Persona = persona.parse()?;
            let mode = parse_mode(&mode)?;
            let submission = ProfileSubmission::new(Arc::clone(&backend));
            submission.set_persona(persona);

            if let Some(path) = file {
                submission.attach_path(&path).await?;
                submission.select_tab(InputTab::UploadFile);
            } else {
                submission.set_text(text.unwrap_or_default());
                submission.select_tab(InputTab::PasteText);
            }

            match submission.submit().await {
                SubmitOutcome::Navigate(View::Candidate(profile)) => {
                    println!("profile: {profile}");
                    if !no_follow {
                        show_candidate(backend, profile, &config, mode, None).await;
                    }
                }
                SubmitOutcome::Navigate(view) => println!("continue at {view}"),
                SubmitOutcome::Failed(message) => anyhow::bail!(message),
                SubmitOutcome::AlreadyInFlight => warn!("submission already in flight"),
            }
        }
        Command::Pick { resume_id, mode } => {
            let mode = parse_mode(&mode)?;
            let submission = ProfileSubmission::new(Arc::clone(&backend));
            let view = submission.pick_candidate(&resume_id)?;
            if let View::Candidate(profile) = view {
                println!("profile: {profile}");
                show_candidate(backend, profile, &config, mode, None).await;
            }
        }
        Command::Candidate {
            profile,
            mode,
            gaps,
            gaps_row,
        } => {
            let profile = ProfileId::parse(&profile)?;
            let mode = parse_mode(&mode)?;
            let target = match (gaps, gaps_row) {
                (Some(job_id), _) => Some(GapTarget::Job(job_id)),
                (None, Some(row)) => Some(GapTarget::Row(row.saturating_sub(1))),
                (None, None) => None,
            };
            show_candidate(backend, profile, &config, mode, target).await;
        }
        Command::Eval { k } => {
            show_evaluation(backend, &config, k).await?;
        }
        Command::Open { path } => {
            let view = View::parse(&path)?;
            match view {
                View::Home => {
                    let submission = ProfileSubmission::new(backend);
                    print!("{}", render::candidates(submission.start().await));
                }
                View::Candidate(profile) => {
                    show_candidate(backend, profile, &config, ScoringMode::default(), None).await;
                }
                View::Evaluation => {
                    show_evaluation(backend, &config, config.evaluation_k).await?;
                }
            }
        }
        Command::Health => {
            let status = backend.health().await?;
            println!("status: {status}");
        }
        Command::Reload => {
            let status = backend.reload().await?;
            println!("status: {status}");
        }
    }

    Ok(())
}

enum GapTarget {
    Job(String),
    Row(usize),
}

fn parse_mode(raw: &str) -> anyhow::Result<ScoringMode> {
    Ok(raw.parse()?)
}

async fn show_candidate(
    backend: Arc<HttpBackend>,
    profile: ProfileId,
    config: &ClientConfig,
    mode: ScoringMode,
    gaps: Option<GapTarget>,
) {
    let session = CandidateSession::new(backend, profile, config);
    info!(view = %session.view(), mode = %mode, "entering candidate view");

    let snapshot = session.set_mode(mode).await;
    print!("{}", render::recommendations(&snapshot));

    let state = match gaps {
        Some(GapTarget::Job(job_id)) => session.gaps().open(Some(&job_id)).await,
        Some(GapTarget::Row(index)) => session.open_gaps_at(index).await,
        None => return,
    };

    if let Some(notice) = session.gaps().take_notice() {
        println!("{notice}");
    }
    print!("{}", render::overlay(&state));
}

async fn show_evaluation(
    backend: Arc<HttpBackend>,
    config: &ClientConfig,
    k: usize,
) -> anyhow::Result<()> {
    let aggregator = EvaluationAggregator::new(backend, config);
    aggregator.set_k(k)?;
    let snapshot = aggregator.start().await;
    print!("{}", render::evaluation(&snapshot));
    Ok(())
}
