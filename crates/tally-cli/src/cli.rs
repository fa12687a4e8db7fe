//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Predictive analytics for your expenses
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Forecasts, anomalies and statistics over an expense ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger file (JSON with "transactions" and "recurring")
    #[arg(long, default_value = "ledger.json", global = true)]
    pub data: PathBuf,

    /// Engine config file (defaults to the data-dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast monthly spending with the method ensemble
    Forecast {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,

        /// First year to forecast (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// First month to forecast, 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,

        /// Number of consecutive months to forecast (1-12)
        #[arg(long, default_value = "1")]
        months_ahead: u32,
    },

    /// Project the coming months from the recent trend
    Project {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,

        /// Months to project (1-12)
        #[arg(long, default_value = "6")]
        months: u32,
    },

    /// Find days with unusual spending
    Anomalies {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,

        /// Days to look back (defaults to the configured lookback)
        #[arg(long)]
        days: Option<u32>,

        /// Standard deviations from the mean that count as unusual
        #[arg(long)]
        sensitivity: Option<f64>,
    },

    /// Descriptive statistics of recent spending
    Stats {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,

        /// Period granularity: monthly or daily
        #[arg(long, default_value = "monthly")]
        period: String,
    },

    /// Correlate spending between top categories
    Correlate {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,
    },

    /// Average daily spending by weekday and month
    Heatmap {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,
    },

    /// Typical spending for each calendar month
    Seasonal {
        /// Account to analyze
        #[arg(short, long, default_value = "1")]
        account: i64,
    },
}
