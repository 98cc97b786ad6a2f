use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rankeval::eval::{evaluate_corpus, render_score, render_summary};
use rankeval::ingest::{read_ground_truth, Predictions};
use rankeval::{Config, EvalOptions, EvalOverrides, SummaryReport};
use std::path::PathBuf;

/// Evaluate ranked predictions against ground truth (MRR@K + error analysis).
#[derive(Parser, Debug)]
#[command(name = "rankeval", version)]
struct Cli {
    /// Config file (default: $RANKEVAL_CONFIG, then ./rankeval.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print MRR@K only.
    Score(InputArgs),
    /// Print MRR@K with first-hit ranks and false positive/negative analysis.
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Number of per-query error samples to show.
        #[arg(long, allow_negative_numbers = true)]
        sample_size: Option<i64>,

        /// Score queries in parallel.
        #[arg(long, overrides_with = "no_parallel")]
        parallel: bool,

        /// Score queries serially, even if the config enables parallelism.
        #[arg(long, overrides_with = "parallel")]
        no_parallel: bool,

        /// Emit the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Ground-truth CSV with query id and relevant id list columns.
    #[arg(long)]
    ground_truth: Option<PathBuf>,

    /// Tab-separated predictions: qid, then ranked item ids.
    #[arg(long)]
    predictions: Option<PathBuf>,

    /// Rank cutoff K.
    #[arg(long, allow_negative_numbers = true)]
    k: Option<i64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Score(input) => {
            let options = config.resolve_options(&input.overrides())?;
            let report = run(&config, &input, &options)?;
            println!("{}", render_score(&report));
        }
        Command::Analyze {
            input,
            sample_size,
            parallel,
            no_parallel,
            json,
        } => {
            let overrides = EvalOverrides {
                sample_size,
                parallel: parallel_flag(parallel, no_parallel),
                ..input.overrides()
            };
            let options = config.resolve_options(&overrides)?;
            let report = run(&config, &input, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render_summary(&report));
            }
        }
    }

    Ok(())
}

impl InputArgs {
    fn overrides(&self) -> EvalOverrides {
        EvalOverrides {
            k: self.k,
            ..EvalOverrides::default()
        }
    }
}

/// `--parallel` / `--no-parallel`; neither leaves the config value in place.
fn parallel_flag(parallel: bool, no_parallel: bool) -> Option<bool> {
    match (parallel, no_parallel) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn run(config: &Config, input: &InputArgs, options: &EvalOptions) -> Result<SummaryReport> {
    let ground_truth_path = input
        .ground_truth
        .clone()
        .or_else(|| config.input.ground_truth.clone())
        .context("No ground truth file given (--ground-truth or [input].ground_truth)")?;
    let predictions_path = input
        .predictions
        .clone()
        .or_else(|| config.input.predictions.clone())
        .context("No predictions file given (--predictions or [input].predictions)")?;

    let records = read_ground_truth(&ground_truth_path, &config.columns())
        .with_context(|| format!("Failed to load ground truth {}", ground_truth_path.display()))?;
    let predictions = Predictions::load(&predictions_path, Some(options.k))
        .with_context(|| format!("Failed to load predictions {}", predictions_path.display()))?;

    let report = evaluate_corpus(records, &predictions, options)?;
    Ok(report)
}
