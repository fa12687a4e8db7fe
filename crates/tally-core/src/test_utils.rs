//! Test utilities for tally-core
//!
//! Builders for in-memory ledgers so engine tests can describe spending
//! history in a few lines.

use chrono::{Datelike, Duration, NaiveDate};

use crate::calendar::YearMonth;
use crate::models::{ExpenseTransaction, Frequency, Ledger, RecurringExpense};
use crate::source::MemorySource;

/// Shorthand for a valid calendar date (panics on invalid input)
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Fluent builder for a [`Ledger`]
#[derive(Debug, Default)]
pub struct LedgerBuilder {
    ledger: Ledger,
    next_recurring_id: i64,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One categorized expense
    pub fn spend(mut self, account_id: i64, date: NaiveDate, amount: f64, category: &str) -> Self {
        self.ledger.transactions.push(ExpenseTransaction {
            account_id,
            date,
            amount,
            category: Some(category.to_string()),
            shop: None,
        });
        self
    }

    /// One expense without a category
    pub fn uncategorized(mut self, account_id: i64, date: NaiveDate, amount: f64) -> Self {
        self.ledger.transactions.push(ExpenseTransaction {
            account_id,
            date,
            amount,
            category: None,
            shop: None,
        });
        self
    }

    /// `amount` on the same day of `months` consecutive months from `start`
    pub fn monthly_spend(self, account_id: i64, start: NaiveDate, months: u32, amount: f64) -> Self {
        let totals = vec![amount; months as usize];
        self.monthly_series(account_id, start, &totals, "General")
    }

    /// One expense per month from `start`, amounts taken from `totals` in order
    pub fn monthly_series(
        mut self,
        account_id: i64,
        start: NaiveDate,
        totals: &[f64],
        category: &str,
    ) -> Self {
        let first = YearMonth::from_date(start);
        for (offset, total) in totals.iter().enumerate() {
            let month = first.shift(offset as i32);
            let day = start.day().min(month.days_in_month());
            self = self.spend(account_id, date(month.year, month.month, day), *total, category);
        }
        self
    }

    /// `amount` every day for `days` days from `start`
    pub fn daily_spend(mut self, account_id: i64, start: NaiveDate, days: u32, amount: f64) -> Self {
        for offset in 0..days {
            self = self.spend(
                account_id,
                start + Duration::days(offset as i64),
                amount,
                "Daily",
            );
        }
        self
    }

    /// Daily amounts from `start`, one per element of `amounts`
    pub fn daily_series(mut self, account_id: i64, start: NaiveDate, amounts: &[f64]) -> Self {
        for (offset, amount) in amounts.iter().enumerate() {
            self = self.spend(
                account_id,
                start + Duration::days(offset as i64),
                *amount,
                "Daily",
            );
        }
        self
    }

    pub fn recurring(
        mut self,
        account_id: i64,
        name: &str,
        amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        self.next_recurring_id += 1;
        self.ledger.recurring.push(RecurringExpense {
            id: self.next_recurring_id,
            account_id,
            name: name.to_string(),
            amount,
            category: Some(name.to_string()),
            frequency,
            start_date,
            end_date: None,
        });
        self
    }

    pub fn build(self) -> Ledger {
        self.ledger
    }

    pub fn build_source(self) -> MemorySource {
        MemorySource::from_ledger(&self.ledger)
    }
}
