//! steplog - leveled console output and step spinners from the command line

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use steplog::Config;
use steplog_cli::cmd;
use steplog_cli::{Cli, Commands, diagnostics_filter};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so they never land on top of spinner frames
    tracing_subscriber::fmt()
        .with_env_filter(diagnostics_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Log {
            level,
            name,
            format,
            json,
            words,
        } => cmd::log::log(
            &config,
            &level,
            &name,
            format.as_deref(),
            json.as_deref(),
            &words,
        ),
        Commands::Demo {
            steps,
            warn_at,
            error_at,
            delay_ms,
            frames,
            fail,
        } => {
            let plan = cmd::demo::DemoPlan {
                steps,
                warn_at,
                error_at,
                delay: Duration::from_millis(delay_ms),
                fail,
            };
            cmd::demo::demo(&config, &plan, frames.as_deref()).await
        }
        Commands::Frames => {
            cmd::frames::frames();
            Ok(())
        }
    }
}
