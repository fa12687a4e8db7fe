//! Domain models for Tally
//!
//! Aggregates handed to the analytics engine by a [`TimeSeriesSource`](crate::source::TimeSeriesSource),
//! plus the raw ledger records the bundled sources aggregate from.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::error::{Error, Result};

/// Total spending on a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_amount: f64,
    pub transaction_count: u32,
}

/// Total spending in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub total_amount: f64,
    pub transaction_count: u32,
    /// Days in the month with at least one transaction
    pub active_days: u32,
}

impl MonthlyAggregate {
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }

    /// Group daily aggregates by calendar month, ordered oldest first
    pub fn from_daily(daily: &[DailyAggregate]) -> Vec<MonthlyAggregate> {
        let mut months: BTreeMap<YearMonth, MonthlyAggregate> = BTreeMap::new();

        for day in daily {
            let ym = YearMonth::from_date(day.date);
            let entry = months.entry(ym).or_insert_with(|| MonthlyAggregate {
                year: ym.year,
                month: ym.month,
                total_amount: 0.0,
                transaction_count: 0,
                active_days: 0,
            });
            entry.total_amount += day.total_amount;
            entry.transaction_count += day.transaction_count;
            if day.transaction_count > 0 {
                entry.active_days += 1;
            }
        }

        months.into_values().collect()
    }
}

/// Spending in one category during one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub category: String,
    pub total: f64,
}

impl CategoryMonthlyTotal {
    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// One past occurrence of the month being forecast (e.g. last year's August)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataPoint {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub days_in_month: u32,
}

/// Granularity of a statistics request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Monthly,
    Daily,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Daily => "daily",
        }
    }
}

impl std::str::FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "daily" => Ok(Self::Daily),
            _ => Err(format!("Unknown period type: {} (valid: monthly, daily)", s)),
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single expense as recorded in the ledger (amounts are positive spend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTransaction {
    pub account_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub shop: Option<String>,
}

/// How often a recurring expense is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

/// A scheduled expense (rent, subscriptions) that is charged on a fixed cadence
/// without an explicit ledger entry for every occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// One dated charge produced by expanding a [`RecurringExpense`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringInstance {
    pub expense_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Option<String>,
}

/// Ledger file contents consumed by the in-memory source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub transactions: Vec<ExpenseTransaction>,
    #[serde(default)]
    pub recurring: Vec<RecurringExpense>,
}

impl Ledger {
    /// Read and validate a JSON ledger file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ledger: Ledger = serde_json::from_str(&content)?;
        ledger.validate()?;
        Ok(ledger)
    }

    /// Reject amounts the aggregators cannot sum and schedules that end before
    /// they start
    pub fn validate(&self) -> Result<()> {
        if let Some(tx) = self.transactions.iter().find(|t| !t.amount.is_finite()) {
            return Err(Error::InvalidData(format!(
                "transaction on {} has a non-finite amount",
                tx.date
            )));
        }

        for expense in &self.recurring {
            if !expense.amount.is_finite() {
                return Err(Error::InvalidData(format!(
                    "recurring expense '{}' has a non-finite amount",
                    expense.name
                )));
            }
            if let Some(end) = expense.end_date {
                if end < expense.start_date {
                    return Err(Error::InvalidData(format!(
                        "recurring expense '{}' ends ({}) before it starts ({})",
                        expense.name, end, expense.start_date
                    )));
                }
            }
        }

        Ok(())
    }

    /// Distinct account ids, ascending
    pub fn account_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .transactions
            .iter()
            .map(|t| t.account_id)
            .chain(self.recurring.iter().map(|r| r.account_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
