//! CLI пайплайна и сервер формы оценки риска

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use finrisk_ml::config::{PipelinePaths, DEFAULT_THRESHOLD};
use finrisk_ml::pipeline;
use finrisk_ml::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "finrisk",
    about = "Early warning system for financial deterioration of business units",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Directory with raw and processed CSV files
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,
    /// Directory for model artifacts, config and metrics
    #[arg(long, default_value = "models", global = true)]
    models_dir: PathBuf,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean, impute, engineer ratios and label the raw dataset
    Prepare,
    /// Split, train the candidate models and save the final SVM
    Train {
        /// Probability threshold stored in the model config
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    /// Evaluate the final model on the held-out test split
    Evaluate,
    /// Serve the risk assessment form
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
    },
    /// Prepare, train and evaluate in one go
    Run {
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

fn init_tracing(verbosity: u8) {
    // RUST_LOG имеет приоритет над -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        })
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let paths = PipelinePaths::new(&args.data_dir, &args.models_dir);

    match args.command {
        Commands::Prepare => {
            let thresholds = pipeline::prepare::run(&paths).context("prepare stage failed")?;
            tracing::info!(?thresholds, "dataset prepared");
        }
        Commands::Train { threshold } => {
            let summary = pipeline::train::run(&paths, threshold).context("train stage failed")?;
            for (candidate, reason) in &summary.skipped {
                tracing::warn!("{} was not trained: {}", candidate.name(), reason);
            }
            tracing::info!(
                fitted = summary.fitted.len(),
                train = summary.train_size,
                test = summary.test_size,
                "training finished"
            );
        }
        Commands::Evaluate => {
            let metrics = pipeline::evaluate::run(&paths).context("evaluate stage failed")?;
            tracing::info!(roc_auc = metrics.roc_auc, f1 = metrics.f1, "evaluation finished");
        }
        Commands::Serve { addr } => {
            let state = AppState::load(&paths).with_context(|| {
                format!(
                    "cannot load model from {}; run `finrisk train` first",
                    args.models_dir.display()
                )
            })?;
            server::serve(state, addr).await.context("server error")?;
        }
        Commands::Run { threshold } => {
            let metrics = pipeline::run_all(&paths, threshold).context("pipeline failed")?;
            tracing::info!(roc_auc = metrics.roc_auc, f1 = metrics.f1, "pipeline finished");
        }
    }

    Ok(())
}
