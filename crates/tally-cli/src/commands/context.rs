//! Shared command context
//!
//! This module contains:
//! - `AnalyticsContext` - Ledger, engine config and reference date for one run
//! - `parse_as_of` - Parse the --as-of flag
//! - `print_json` - Pretty JSON output for --json

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tally_core::{
    EngineConfig, EnrichedSource, Ledger, MemorySource, PredictiveEngine,
    RecurringExpansionCache,
};

/// Engine over the ledger's transactions plus expanded recurring expenses
pub type LedgerEngine<'a> = PredictiveEngine<'a, EnrichedSource<'a, MemorySource>>;

pub struct AnalyticsContext {
    pub ledger: Ledger,
    pub config: EngineConfig,
    pub as_of: Option<NaiveDate>,
    pub json: bool,
}

impl AnalyticsContext {
    /// Load the ledger and config named on the command line
    pub fn load(
        data_path: &Path,
        config_path: Option<&Path>,
        as_of: Option<&str>,
        json: bool,
    ) -> Result<Self> {
        let ledger = Ledger::load(data_path)
            .with_context(|| format!("Failed to load ledger {}", data_path.display()))?;
        let config = EngineConfig::load(config_path).context("Failed to load engine config")?;

        tracing::debug!(
            transactions = ledger.transactions.len(),
            recurring = ledger.recurring.len(),
            "Loaded ledger"
        );

        Ok(Self::new(ledger, config, parse_as_of(as_of)?, json))
    }

    pub fn new(ledger: Ledger, config: EngineConfig, as_of: Option<NaiveDate>, json: bool) -> Self {
        Self {
            ledger,
            config,
            as_of,
            json,
        }
    }

    /// Build a fresh source and engine and hand the engine to `f`
    pub fn run<T>(
        &self,
        f: impl FnOnce(&LedgerEngine<'_>) -> tally_core::Result<T>,
    ) -> tally_core::Result<T> {
        let cache = RecurringExpansionCache::new();
        let source = EnrichedSource::new(
            MemorySource::from_ledger(&self.ledger),
            &self.ledger.recurring,
            &cache,
        );

        let mut engine = PredictiveEngine::with_config(&source, self.config.clone());
        if let Some(date) = self.as_of {
            engine = engine.with_reference_date(date);
        }

        let result = f(&engine);
        tracing::debug!(
            expansions = cache.expansion_count(),
            "Recurring expense expansions"
        );
        result
    }

    /// Today as the engine sees it
    pub fn today(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

pub fn parse_as_of(value: Option<&str>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid --as-of date '{}' (use YYYY-MM-DD)", s))
        })
        .transpose()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a friendly note for "not enough data" and treat it as success;
/// everything else is a real error
pub fn handle_insufficient<T>(result: tally_core::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_insufficient_data() => {
            println!("   ℹ️  {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
