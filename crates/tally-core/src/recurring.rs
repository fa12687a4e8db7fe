//! Recurring expense enrichment
//!
//! Scheduled expenses (rent, subscriptions) have no ledger row per charge.
//! [`expand`] turns one into dated [`RecurringInstance`]s, and [`EnrichedSource`]
//! merges those instances into the aggregates of any inner [`TimeSeriesSource`].
//!
//! Expansions are memoized per account in a [`RecurringExpansionCache`] that the
//! caller owns and passes in. Build one per request.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::calendar::{months_before, YearMonth};
use crate::error::Result;
use crate::models::{
    CategoryMonthlyTotal, DailyAggregate, Frequency, MonthlyAggregate, RecurringExpense,
    RecurringInstance,
};
use crate::source::TimeSeriesSource;

/// Expand a recurring expense into its charges from `start_date` through
/// `min(end_date, through)`
///
/// Monthly and yearly charges keep the start day-of-month, clamped to shorter
/// months (a Jan 31 start charges Feb 28, then Mar 31).
pub fn expand(expense: &RecurringExpense, through: NaiveDate) -> Vec<RecurringInstance> {
    let end = match expense.end_date {
        Some(end_date) => end_date.min(through),
        None => through,
    };

    let mut instances = Vec::new();
    let mut n: u32 = 0;
    loop {
        let date = occurrence(expense, n);
        if date > end {
            break;
        }
        instances.push(RecurringInstance {
            expense_id: expense.id,
            date,
            amount: expense.amount,
            category: expense.category.clone(),
        });
        n += 1;
    }

    instances
}

/// Date of the n-th charge (0 = start date)
fn occurrence(expense: &RecurringExpense, n: u32) -> NaiveDate {
    let start = expense.start_date;
    let months = match expense.frequency {
        Frequency::Weekly => return start + Duration::days(7 * n as i64),
        Frequency::Monthly => n as i32,
        Frequency::Yearly => 12 * n as i32,
    };

    let target = YearMonth::from_date(start).shift(months);
    let day = start.day().min(target.days_in_month());
    NaiveDate::from_ymd_opt(target.year, target.month, day).unwrap_or(target.last_day())
}

#[derive(Debug)]
struct CachedExpansion {
    through: NaiveDate,
    instances: Vec<RecurringInstance>,
}

/// Per-account memo of expanded recurring expenses
///
/// An entry covers charges up to its horizon. A request past the horizon
/// re-expands that account. Interior mutability makes the cache `!Sync`, so it
/// stays scoped to one request.
#[derive(Debug, Default)]
pub struct RecurringExpansionCache {
    entries: RefCell<HashMap<i64, CachedExpansion>>,
    expansions: Cell<u32>,
}

impl RecurringExpansionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges for `account_id` dated within `from..=to`
    pub fn instances_between(
        &self,
        account_id: i64,
        expenses: &[RecurringExpense],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<RecurringInstance> {
        let mut entries = self.entries.borrow_mut();

        let stale = entries
            .get(&account_id)
            .map(|cached| cached.through < to)
            .unwrap_or(true);

        if stale {
            let instances: Vec<RecurringInstance> = expenses
                .iter()
                .filter(|e| e.account_id == account_id)
                .flat_map(|e| expand(e, to))
                .collect();

            debug!(
                account_id,
                through = %to,
                instances = instances.len(),
                "Expanded recurring expenses"
            );
            self.expansions.set(self.expansions.get() + 1);
            entries.insert(
                account_id,
                CachedExpansion {
                    through: to,
                    instances,
                },
            );
        }

        entries
            .get(&account_id)
            .map(|cached| {
                cached
                    .instances
                    .iter()
                    .filter(|i| i.date >= from && i.date <= to)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// How many times an account had to be (re-)expanded
    pub fn expansion_count(&self) -> u32 {
        self.expansions.get()
    }
}

/// A source that adds recurring-expense charges on top of an inner source
pub struct EnrichedSource<'a, S> {
    inner: S,
    recurring: &'a [RecurringExpense],
    cache: &'a RecurringExpansionCache,
}

impl<'a, S: TimeSeriesSource> EnrichedSource<'a, S> {
    pub fn new(
        inner: S,
        recurring: &'a [RecurringExpense],
        cache: &'a RecurringExpansionCache,
    ) -> Self {
        Self {
            inner,
            recurring,
            cache,
        }
    }
}

impl<S: TimeSeriesSource> TimeSeriesSource for EnrichedSource<'_, S> {
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
        let mut days: BTreeMap<NaiveDate, DailyAggregate> = self
            .inner
            .daily_totals(account_id, from, to)?
            .into_iter()
            .map(|d| (d.date, d))
            .collect();

        for instance in self
            .cache
            .instances_between(account_id, self.recurring, from, to)
        {
            let entry = days.entry(instance.date).or_insert_with(|| DailyAggregate {
                date: instance.date,
                total_amount: 0.0,
                transaction_count: 0,
            });
            entry.total_amount += instance.amount;
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
        let mut totals: BTreeMap<(YearMonth, String), f64> = self
            .inner
            .category_monthly_totals(account_id, months_back, as_of)?
            .into_iter()
            .map(|t| ((t.year_month(), t.category), t.total))
            .collect();

        let from = months_before(as_of, months_back);
        for instance in self
            .cache
            .instances_between(account_id, self.recurring, from, as_of)
        {
            if let Some(category) = instance.category {
                *totals
                    .entry((YearMonth::from_date(instance.date), category))
                    .or_insert(0.0) += instance.amount;
            }
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
