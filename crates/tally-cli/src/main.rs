//! Tally CLI - Predictive expense analytics
//!
//! Usage:
//!   tally forecast --month 8 --months-ahead 3    Ensemble forecast
//!   tally anomalies --days 90                    Unusual spending days
//!   tally stats --period daily                   Descriptive statistics
//!   tally correlate                              Category correlations

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let ctx = commands::AnalyticsContext::load(
        &cli.data,
        cli.config.as_deref(),
        cli.as_of.as_deref(),
        cli.json,
    )?;

    match cli.command {
        Commands::Forecast {
            account,
            year,
            month,
            months_ahead,
        } => commands::cmd_forecast(&ctx, account, year, month, months_ahead),
        Commands::Project { account, months } => commands::cmd_project(&ctx, account, months),
        Commands::Anomalies {
            account,
            days,
            sensitivity,
        } => commands::cmd_anomalies(&ctx, account, days, sensitivity),
        Commands::Stats { account, period } => commands::cmd_stats(&ctx, account, &period),
        Commands::Correlate { account } => commands::cmd_correlate(&ctx, account),
        Commands::Heatmap { account } => commands::cmd_heatmap(&ctx, account),
        Commands::Seasonal { account } => commands::cmd_seasonal(&ctx, account),
    }
}
