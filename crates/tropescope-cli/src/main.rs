//! Tropescope CLI - classify text for identity-based rhetorical tropes.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tropescope_pipeline::Pipeline;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // API keys may live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Command::Config => {
            print!("{}", commands::execute_config(&config)?);
            return Ok(());
        }
        Command::Classify { text } => {
            let pipeline = Pipeline::from_config(config).context("failed to set up pipeline")?;
            commands::execute_classify(&pipeline, &text).await?
        }
        Command::Batch { file } => {
            let pipeline = Pipeline::from_config(config).context("failed to set up pipeline")?;
            commands::execute_batch(&pipeline, &file).await?
        }
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
