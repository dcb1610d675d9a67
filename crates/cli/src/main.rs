//! Composite Predictor CLI
//!
//! A command-line tool for requesting predictions from a running server,
//! running the models locally, and inspecting artifact directories.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{artifacts, local, predict, InputArgs};
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Composite Predictor CLI
#[derive(Parser)]
#[command(name = "compred")]
#[command(author, version, about = "CLI for the Composite Predictor", long_about = None)]
pub struct Cli {
    /// Server URL (can also be set via COMPRED_API_URL env var)
    #[arg(long, env = "COMPRED_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Request a two-stage prediction from a running server
    Predict {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Run a prediction stage in-process against an artifact directory
    Local {
        /// Which stage to run
        #[arg(value_enum)]
        stage: LocalStage,

        /// Directory holding the model artifacts
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Show artifact fingerprints and feature lists
    Artifacts {
        /// Directory holding the model artifacts
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
    },

    /// Show server health and readiness
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LocalStage {
    /// Mechanical properties only
    Properties,
    /// Matrix-to-filler ratio only; inputs must include both predicted properties
    Ratio,
    /// Properties, then ratio
    Optimal,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = config::Config::load()?;

    let format = cli
        .format
        .or_else(|| file_config.default_format())
        .unwrap_or_default();
    let api_url = cli
        .api_url
        .or(file_config.api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    match cli.command {
        Commands::Predict { inputs } => {
            let client = client::ApiClient::new(&api_url)?;
            predict::remote_predict(&client, &inputs, format).await?;
        }
        Commands::Local {
            stage,
            model_dir,
            inputs,
        } => {
            local::run_local(&model_dir, stage, &inputs, format)?;
        }
        Commands::Artifacts { model_dir } => {
            artifacts::show_artifacts(&model_dir, format)?;
        }
        Commands::Status => {
            let client = client::ApiClient::new(&api_url)?;
            predict::show_status(&client, format).await?;
        }
    }

    Ok(())
}
