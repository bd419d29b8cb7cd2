//! Draftmill CLI
//!
//! Entry point for the content pipeline's scheduled steps: the generator
//! leases topics with `reserve` and reports back with `complete`/`fail`,
//! the gate run validates a finished batch, and the remaining commands
//! are operator tooling for the shared topic-store document.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use draftmill_gate::{BatchOutcome, GateConfig, QualityGate};
use draftmill_logging::LogConfig;
use draftmill_queue::{JsonTopicStore, QueuePolicy, QueueStats, TopicQueue};

mod output;

#[derive(Parser, Debug)]
#[command(name = "draftmill", about = "Topic queue and quality gate for the content pipeline")]
struct Cli {
    /// Path to the topic-store document
    #[arg(long, global = true, default_value = "data/topics_queue.json")]
    queue: PathBuf,

    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lease pending topics for a generation run (printed as JSON)
    Reserve {
        /// Maximum number of topics to lease
        #[arg(short, long, default_value_t = 3)]
        count: usize,
    },

    /// Mark a leased topic as completed
    Complete {
        /// Topic id
        id: String,
    },

    /// Record a generation failure for a leased topic
    Fail {
        /// Topic id
        id: String,

        /// What went wrong
        #[arg(short, long)]
        error: String,
    },

    /// Return expired leases to pending
    Reclaim {
        /// Lease age in hours past which a topic counts as stuck
        #[arg(long, default_value_t = 2)]
        ttl_hours: i64,
    },

    /// Return a completed topic to pending (spends its rejection budget)
    Revert {
        /// Topic id
        id: String,
    },

    /// Show queue counts by status, category, and language
    Stats,

    /// Drop abandoned topics and expired trend topics
    Prune,

    /// Validate a generated batch and quarantine failures
    Gate {
        /// Batch manifest: JSON array of artifact paths
        #[arg(long, default_value = "generated_files.json")]
        manifest: PathBuf,

        /// Root of the content tree (<root>/<lang>/...)
        #[arg(long, default_value = "content")]
        content_dir: PathBuf,

        /// Directory holding artifact side images
        #[arg(long, default_value = "static/images")]
        image_dir: PathBuf,

        /// Where to write the detailed report
        #[arg(long, default_value = "quality_report.json")]
        report: PathBuf,

        /// Where to write the list of surviving artifacts
        #[arg(long, default_value = "passed_files.json")]
        passed: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = draftmill_logging::init_logging(LogConfig {
        app_name: "draftmill",
        verbose: cli.verbose,
    }) {
        eprintln!("Failed to initialize logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let store = JsonTopicStore::new(&cli.queue);
    let mut queue = TopicQueue::new(store, QueuePolicy::default());

    match cli.command {
        Commands::Reserve { count } => {
            let topics = queue.reserve(count).context("Failed to reserve topics")?;
            println!("{}", serde_json::to_string_pretty(&topics)?);
        }

        Commands::Complete { id } => {
            let topic = queue
                .complete(&id)
                .with_context(|| format!("Failed to complete topic '{id}'"))?;
            println!("Completed {} ({})", topic.id, topic.keyword);
        }

        Commands::Fail { id, error } => {
            let topic = queue
                .fail(&id, &error)
                .with_context(|| format!("Failed to record failure for topic '{id}'"))?;
            println!(
                "Recorded failure for {} (status: {}, retries: {})",
                topic.id, topic.status, topic.retry_count
            );
        }

        Commands::Reclaim { ttl_hours } => {
            let reclaimed = queue
                .reclaim_stuck(chrono::Duration::hours(ttl_hours))
                .context("Failed to reclaim stuck topics")?;
            println!("Reclaimed {reclaimed} stuck topic(s)");
        }

        Commands::Revert { id } => {
            let topic = queue
                .revert_to_pending(&id)
                .with_context(|| format!("Failed to revert topic '{id}'"))?;
            println!(
                "Reverted {} (status: {}, rejections: {})",
                topic.id, topic.status, topic.rejection_count
            );
        }

        Commands::Stats => {
            let stats = queue.stats().context("Failed to read queue stats")?;
            print_stats(&stats);
        }

        Commands::Prune => {
            let removed = queue.prune().context("Failed to prune queue")?;
            println!("Pruned {removed} topic(s)");
        }

        Commands::Gate {
            manifest,
            content_dir,
            image_dir,
            report,
            passed,
        } => {
            let mut config = GateConfig::new(manifest, content_dir);
            config.image_dir = image_dir;
            config.report_path = report;
            config.passed_path = passed;

            let gate = QualityGate::new(config);
            match gate.run(&mut queue).context("Quality gate run failed")? {
                BatchOutcome::Passed => println!("Quality gate: PASSED"),
                BatchOutcome::AllFailed => {
                    println!("Quality gate: FAILED (no artifact survived)");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_stats(stats: &QueueStats) {
    output::print_table(
        &["Status", "Count"],
        vec![
            vec!["pending".into(), stats.pending.to_string()],
            vec!["in_progress".into(), stats.in_progress.to_string()],
            vec!["completed".into(), stats.completed.to_string()],
            vec!["abandoned".into(), stats.abandoned.to_string()],
            vec!["total".into(), stats.total.to_string()],
        ],
    );

    if !stats.by_category.is_empty() {
        output::print_table(
            &["Category", "Count"],
            stats
                .by_category
                .iter()
                .map(|(category, count)| vec![category.clone(), count.to_string()])
                .collect(),
        );
    }

    if !stats.by_language.is_empty() {
        output::print_table(
            &["Language", "Count"],
            stats
                .by_language
                .iter()
                .map(|(lang, count)| vec![lang.clone(), count.to_string()])
                .collect(),
        );
    }
}
