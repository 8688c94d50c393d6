//! tagsweep CLI
//!
//! Runs hyperparameter sweeps, regenerates the ranking reports, and probes
//! single sentences against a trained model.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tagsweep_core::{HyperparameterConfig, load_records};
use tagsweep_trainer::{
    ConfigFile, Driver, RankingReporter, RnnBuilder, SweepConfig, probe, run_sweep,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "tagsweep")]
#[command(about = "Train, sweep and rank character-level part-of-speech taggers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file with optional `scheme`, `trainer` and `sweep` sections
    #[arg(short, long, env = "TAGSWEEP_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding one subdirectory per trained model
    #[arg(short = 'M', long, env = "TAGSWEEP_MODELS_DIR", global = true)]
    models_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train and evaluate every hyperparameter combination, then rank
    Sweep {
        /// Tagged records (JSON array or JSON lines)
        #[arg(short, long)]
        data: PathBuf,

        /// RNN sizes to sweep
        #[arg(long = "rnn", num_args = 1..)]
        rnn_sizes: Vec<usize>,

        /// Time steps to sweep
        #[arg(long = "ts", num_args = 1..)]
        time_steps: Vec<usize>,

        /// Epoch counts to sweep
        #[arg(long = "epochs", num_args = 1..)]
        epochs: Vec<usize>,

        /// Maximum records per training batch
        #[arg(long)]
        max_batch: Option<usize>,

        /// Skip the ranking reports after the sweep
        #[arg(long)]
        no_rank: bool,

        #[command(flatten)]
        reports: ReportArgs,
    },
    /// Rank every persisted model by hit ratio
    Rank {
        #[command(flatten)]
        reports: ReportArgs,
    },
    /// Tag one sentence with one model and compare against expected tags
    Probe {
        /// RNN size
        #[arg(long = "rnn")]
        rnn_size: usize,

        /// Time steps
        #[arg(long = "ts")]
        time_steps: usize,

        /// Epochs
        #[arg(short, long)]
        epochs: usize,

        /// Sentence to tag
        #[arg(short, long)]
        sentence: String,

        /// Expected tags, one per token
        #[arg(short, long, num_args = 1..)]
        tags: Vec<String>,

        /// Tagged records to train on if the model is not persisted yet
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ReportArgs {
    /// Structured ranking report
    #[arg(long)]
    json: Option<PathBuf>,

    /// Tabular ranking report
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl ReportArgs {
    fn apply(self, settings: &mut ConfigFile) {
        if let Some(json) = self.json {
            settings.trainer.report_json = json;
        }
        if let Some(csv) = self.csv {
            settings.trainer.report_csv = csv;
        }
    }
}

fn load_settings(cli: &Cli) -> Result<ConfigFile> {
    let mut settings = match &cli.config {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConfigFile::default(),
    };
    if let Some(dir) = &cli.models_dir {
        settings.trainer.models_dir = dir.clone();
    }
    Ok(settings)
}

fn rank(settings: &ConfigFile) -> Result<()> {
    let trainer = &settings.trainer;
    let report = RankingReporter::new(&trainer.models_dir)?
        .write_reports(&trainer.report_json, &trainer.report_csv)
        .context("failed to write ranking reports")?;

    match report.stats.first() {
        Some(best) => info!(
            model = %best.model,
            ratio = best.ratio,
            models = report.stats.len(),
            "best model"
        ),
        None => warn!("no evaluated models to rank"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli)?;

    match cli.command {
        Commands::Sweep {
            data,
            rnn_sizes,
            time_steps,
            epochs,
            max_batch,
            no_rank,
            reports,
        } => {
            reports.apply(&mut settings);
            let defaults = settings.sweep.clone();
            let sweep = SweepConfig::new(
                if rnn_sizes.is_empty() { defaults.rnn_sizes } else { rnn_sizes },
                if time_steps.is_empty() { defaults.time_steps } else { time_steps },
                if epochs.is_empty() { defaults.epochs } else { epochs },
            );
            if sweep.is_empty() {
                bail!("sweep has no hyperparameter combinations");
            }
            if let Some(max_batch) = max_batch {
                settings.trainer = settings.trainer.with_max_batch(max_batch);
            }

            let records = load_records(&data)
                .with_context(|| format!("failed to load records from {}", data.display()))?;
            info!(records = records.len(), combinations = sweep.len(), "starting sweep");

            let builder = RnnBuilder::cpu(settings.trainer.learning_rate);
            let driver = Driver::new(settings.scheme.clone(), settings.trainer.clone(), builder)?;
            let outcomes = run_sweep(&driver, &sweep, &records)?;

            let reused = outcomes.iter().filter(|o| o.reused).count();
            info!(
                trained = outcomes.len() - reused,
                reused,
                "sweep complete"
            );

            if !no_rank {
                rank(&settings)?;
            }
        }
        Commands::Rank { reports } => {
            reports.apply(&mut settings);
            rank(&settings)?;
        }
        Commands::Probe {
            rnn_size,
            time_steps,
            epochs,
            sentence,
            tags,
            data,
        } => {
            let config = HyperparameterConfig::new(rnn_size, time_steps, epochs);
            let builder = RnnBuilder::cpu(settings.trainer.learning_rate);
            let driver = Driver::new(settings.scheme.clone(), settings.trainer.clone(), builder)?;

            let model = match &data {
                Some(path) => {
                    let records = load_records(path).with_context(|| {
                        format!("failed to load records from {}", path.display())
                    })?;
                    driver.train_or_load(&config, &records)?.model
                }
                None => driver
                    .load(&config)
                    .with_context(|| format!("no usable model for {config}; pass --data to train one"))?,
            };

            let result = probe(&driver, &model, &config, &sentence, &tags)?;
            info!(tagged = %result.annotated(), "tagged sentence");
            println!("{}", result.to_csv_line());
            result
                .append_to(&settings.trainer.probe_log)
                .context("failed to append probe result")?;
        }
    }

    Ok(())
}
