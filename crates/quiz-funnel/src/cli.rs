//! Command-line surface: `score`, `run`, and `schema`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use funnel_core::{
    FunnelSession, OfferCatalog, OutcomeStatus, PersistenceAdapter, QuizSubmission,
    RawSubmission, ResultStore, RiskLevel, ScoreCategory, ScoringEngine, ScoringResult,
    SubmissionId, Tier,
};
use serde::Serialize;
use tracing::info;

use crate::config::{FunnelConfig, StoreKind};
use crate::presenter::ConsolePresenter;
use crate::store::{build_store, schema, PgResultStore};

/// Wellness quiz funnel runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML config file (overrides FUNNEL_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and score a submission file; prints the result as JSON
    Score {
        /// JSON submission: email, first_name, utm, answers
        answers: PathBuf,
    },

    /// Score a submission, walk the offer chain, and persist the outcome
    Run {
        answers: PathBuf,

        /// Decline the shown offer this many times
        #[arg(long, default_value_t = 0)]
        declines: u32,

        /// Jump straight to the free offer
        #[arg(long, default_value_t = false)]
        skip_to_free: bool,

        /// Accept the offer left on screen (otherwise the run ends declined)
        #[arg(long, default_value_t = false)]
        accept: bool,
    },

    /// Print the results table DDL
    Schema {
        /// Apply it to the configured Postgres database instead of printing
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

/// User actions replayed by `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub declines: u32,
    pub skip_to_free: bool,
    pub accept: bool,
}

/// Summary printed after `run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub submission_id: SubmissionId,
    pub score: u8,
    pub category: ScoreCategory,
    pub risk_level: RiskLevel,
    pub recommended_tier: Tier,
    pub final_tier: Tier,
    pub status: OutcomeStatus,
    pub declines: u32,
    /// The final row landed. It carries every column, so it supersedes a
    /// failed start-of-session write.
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Failure of the start-of-session write, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_warning: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScoreReport<'a> {
    submission_id: SubmissionId,
    label: &'static str,
    #[serde(flatten)]
    result: &'a ScoringResult,
}

/// Read and validate a submission file.
pub fn load_submission(path: &Path) -> Result<QuizSubmission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let raw: RawSubmission = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(raw.validate()?)
}

/// Drive one funnel session to completion and wait for its writes.
pub async fn run_funnel<W: Write + Send>(
    submission: QuizSubmission,
    store: Arc<dyn ResultStore>,
    persist_timeout: Duration,
    options: RunOptions,
    out: W,
) -> RunReport {
    let adapter = PersistenceAdapter::new(store).with_timeout(persist_timeout);
    let (mut session, started) = FunnelSession::start(
        submission,
        &ScoringEngine::new(),
        OfferCatalog::default(),
        ConsolePresenter::new(out),
        adapter,
    );

    if options.skip_to_free {
        session.skip_to_free();
    }
    for _ in 0..options.declines {
        if session.offer_state().is_terminal() {
            break;
        }
        session.decline();
    }

    let receipt = if options.accept {
        session.accept()
    } else {
        session.abandon()
    };

    // The process exits after this, which would cancel pending writes.
    let start_warning = started.warning().await;
    let warning = receipt.persist.warning().await;
    if let Some(err) = &start_warning {
        if warning.is_none() {
            info!(
                submission_id = %receipt.submission_id,
                error = %err,
                "Start-of-session write failed; superseded by the final row"
            );
        }
    }

    RunReport {
        submission_id: receipt.submission_id,
        score: receipt.result.score,
        category: receipt.result.category,
        risk_level: receipt.result.risk_level,
        recommended_tier: receipt.result.recommended_tier,
        final_tier: receipt.outcome.final_tier,
        status: receipt.outcome.status,
        declines: receipt.outcome.declines,
        persisted: warning.is_none(),
        warning: warning.map(|e| e.to_string()),
        start_warning: start_warning.map(|e| e.to_string()),
    }
}

pub async fn execute(command: Command, config: &FunnelConfig) -> Result<()> {
    match command {
        Command::Score { answers } => {
            let submission = load_submission(&answers)?;
            let result = ScoringEngine::new().score_submission(&submission);
            let report = ScoreReport {
                submission_id: submission.id,
                label: result.category.label(),
                result: &result,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Run {
            answers,
            declines,
            skip_to_free,
            accept,
        } => {
            let submission = load_submission(&answers)?;
            let store = build_store(config)
                .await
                .context("Failed to open results store")?;
            let options = RunOptions {
                declines,
                skip_to_free,
                accept,
            };
            let report = run_funnel(
                submission,
                store,
                config.persist_timeout,
                options,
                std::io::stdout(),
            )
            .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Schema { apply: false } => {
            print!("{}", schema::create_table_sql(&config.results_table));
        }
        Command::Schema { apply: true } => {
            if config.store != StoreKind::Postgres {
                bail!("`schema --apply` needs FUNNEL_STORE=postgres (got {})", config.store);
            }
            let url = config
                .database_url
                .as_deref()
                .context("FUNNEL_DATABASE_URL is not set")?;
            let store = PgResultStore::connect(url, &config.results_table).await?;
            store.ensure_schema().await?;
            info!(table = store.table(), "Results table ready");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags_parse() {
        let cli = Cli::try_parse_from([
            "quiz-funnel",
            "run",
            "answers.json",
            "--declines",
            "2",
            "--accept",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                answers,
                declines,
                skip_to_free,
                accept,
            } => {
                assert_eq!(answers, PathBuf::from("answers.json"));
                assert_eq!(declines, 2);
                assert!(!skip_to_free);
                assert!(accept);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["quiz-funnel", "schema", "--config", "funnel.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("funnel.toml")));
        assert!(matches!(cli.command, Command::Schema { apply: false }));
    }

    #[test]
    fn test_score_requires_path() {
        assert!(Cli::try_parse_from(["quiz-funnel", "score"]).is_err());
    }
}
