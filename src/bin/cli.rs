//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! CLI supporting `fetch` and `inspect`.
//!
//! Examples:
//! ```bash
//! mnistdl-cli fetch                          # download + decompress into ./data/
//! mnistdl-cli --data-dir /tmp/mnist fetch
//! mnistdl-cli -v inspect                     # header and record counts per split
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mnistdl::{DatasetSplit, Mnist, MnistConfig};

#[derive(Parser)]
#[command(name = "mnistdl-cli", version, about = "Fetch and decode the MNIST archives")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Cache directory (overrides MNISTDL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the archive mirror (overrides MNISTDL_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download and decompress all four archives
    Fetch,
    /// Parse every archive and print its header
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = MnistConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }

    let mnist = Mnist::new(config).context("Failed to set up the archive pipeline")?;

    match cli.cmd {
        Command::Fetch => {
            let reports = mnist.download_all().await.context("Dataset download failed")?;
            for r in reports {
                println!("{:<26} fetch={:?} decompress={:?}", r.split.logical_name(), r.fetch, r.decompress);
            }
        }
        Command::Inspect => {
            let data = mnist.load_all().await.context("Failed to load datasets")?;
            let parsed = [
                (DatasetSplit::TrainImages, &data.train_images),
                (DatasetSplit::TrainLabels, &data.train_labels),
                (DatasetSplit::TestImages, &data.test_images),
                (DatasetSplit::TestLabels, &data.test_labels),
            ];
            for (split, archive) in parsed {
                let h = archive.header;
                let dims = h.dims.map(|(r, c)| format!("{}x{}", r, c)).unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<26} magic={} count={} dims={} records={}",
                    split.logical_name(), h.magic, h.count, dims, archive.records.len()
                );
            }
            info!("cache: {}", mnist.config().data_dir.display());
        }
    }

    Ok(())
}
