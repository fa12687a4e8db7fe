//! Time series sources
//!
//! The analytics engine never reads raw storage. It asks a [`TimeSeriesSource`]
//! for already-aggregated spending per account and date range. [`MemorySource`]
//! aggregates an in-memory list of transactions; other backends only need to
//! implement the trait.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar::{months_before, YearMonth};
use crate::error::Result;
use crate::models::{
    CategoryMonthlyTotal, DailyAggregate, ExpenseTransaction, Ledger, MonthlyAggregate,
};

/// Supplier of aggregated spending data
///
/// All date ranges are inclusive on both ends. Results are ordered oldest first
/// and only contain periods that had spending.
pub trait TimeSeriesSource {
    /// Monthly spending totals built from the days in `from..=to`
    fn monthly_totals(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlyAggregate>>;

    /// Daily spending totals for `from..=to`
    fn daily_totals(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAggregate>>;

    /// Per-category monthly totals over the `months_back` months ending at `as_of`
    fn category_monthly_totals(
        &self,
        account_id: i64,
        months_back: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<CategoryMonthlyTotal>>;
}

impl<T: TimeSeriesSource + ?Sized> TimeSeriesSource for &T {
    fn monthly_totals(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlyAggregate>> {
        (**self).monthly_totals(account_id, from, to)
    }

    fn daily_totals(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAggregate>> {
        (**self).daily_totals(account_id, from, to)
    }

    fn category_monthly_totals(
        &self,
        account_id: i64,
        months_back: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<CategoryMonthlyTotal>> {
        (**self).category_monthly_totals(account_id, months_back, as_of)
    }
}

/// Source backed by a list of transactions held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    transactions: Vec<ExpenseTransaction>,
}

impl MemorySource {
    pub fn new(transactions: Vec<ExpenseTransaction>) -> Self {
        Self { transactions }
    }

    /// Build from a ledger's transactions (recurring expenses are handled by
    /// [`EnrichedSource`](crate::recurring::EnrichedSource))
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self::new(ledger.transactions.clone())
    }

    fn in_range(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Iterator<Item = &ExpenseTransaction> {
        self.transactions
            .iter()
            .filter(move |t| t.account_id == account_id && t.date >= from && t.date <= to)
    }
}

impl TimeSeriesSource for MemorySource {
    fn monthly_totals(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthlyAggregate>> {
        let daily = self.daily_totals(account_id, from, to)?;
        Ok(MonthlyAggregate::from_daily(&daily))
    }

    fn daily_totals(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyAggregate>> {
        let mut days: BTreeMap<NaiveDate, DailyAggregate> = BTreeMap::new();

        for tx in self.in_range(account_id, from, to) {
            let entry = days.entry(tx.date).or_insert_with(|| DailyAggregate {
                date: tx.date,
                total_amount: 0.0,
                transaction_count: 0,
            });
            entry.total_amount += tx.amount;
            entry.transaction_count += 1;
        }

        Ok(days.into_values().collect())
    }

    fn category_monthly_totals(
        &self,
        account_id: i64,
        months_back: u32,
        as_of: NaiveDate,
    ) -> Result<Vec<CategoryMonthlyTotal>> {
        let from = months_before(as_of, months_back);
        let mut totals: BTreeMap<(YearMonth, String), f64> = BTreeMap::new();

        for tx in self.in_range(account_id, from, as_of) {
            // Uncategorized spending cannot be correlated
            let Some(category) = tx.category.as_deref() else {
                continue;
            };
            *totals
                .entry((YearMonth::from_date(tx.date), category.to_string()))
                .or_insert(0.0) += tx.amount;
        }

        Ok(totals
            .into_iter()
            .map(|((ym, category), total)| CategoryMonthlyTotal {
                year: ym.year,
                month: ym.month,
                category,
                total,
            })
            .collect())
    }
}
