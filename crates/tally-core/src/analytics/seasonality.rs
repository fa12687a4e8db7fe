//! Seasonal factors and weekday/weekend spending patterns

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};

use super::stats::mean;
use super::types::{Heatmap, HeatmapCell, SeasonalMonth};
use crate::calendar::is_weekend;
use crate::models::{DailyAggregate, MonthlyAggregate};

/// Average spend of `month` across the window relative to the average month.
///
/// 1.0 when the month is missing or either average is zero.
pub fn monthly_factor(monthly: &[MonthlyAggregate], month: u32) -> f64 {
    let all: Vec<f64> = monthly.iter().map(|m| m.total_amount).collect();
    let same_month: Vec<f64> = monthly
        .iter()
        .filter(|m| m.month == month)
        .map(|m| m.total_amount)
        .collect();

    if same_month.is_empty() {
        return 1.0;
    }

    let overall = mean(&all);
    let month_avg = mean(&same_month);
    if overall == 0.0 || month_avg == 0.0 {
        return 1.0;
    }

    month_avg / overall
}

/// Average daily spend on weekdays vs weekends
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayPattern {
    pub weekday_average: f64,
    pub weekend_average: f64,
    pub has_pattern: bool,
}

impl WeekdayPattern {
    /// Bucket days with spending into Mon-Fri and Sat-Sun and compare their means.
    ///
    /// A pattern needs both buckets populated and a relative gap above `threshold`.
    pub fn detect(daily: &[DailyAggregate], threshold: f64) -> Self {
        let (weekend, weekday): (Vec<&DailyAggregate>, Vec<&DailyAggregate>) =
            daily.iter().partition(|d| is_weekend(d.date));

        let weekday_average = mean(&weekday.iter().map(|d| d.total_amount).collect::<Vec<_>>());
        let weekend_average = mean(&weekend.iter().map(|d| d.total_amount).collect::<Vec<_>>());

        let has_pattern = weekday_average > 0.0 && weekend_average > 0.0 && {
            let gap = (weekend_average - weekday_average).abs();
            gap / weekday_average.max(weekend_average) > threshold
        };

        Self {
            weekday_average,
            weekend_average,
            has_pattern,
        }
    }

    /// Expected spend on a single day
    pub fn average_for(&self, date: NaiveDate) -> f64 {
        if is_weekend(date) {
            self.weekend_average
        } else {
            self.weekday_average
        }
    }

    /// Expected spend over the given calendar days
    pub fn projected_spend<I>(&self, dates: I) -> f64
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().map(|d| self.average_for(d)).sum()
    }
}

/// Average daily spend for every (weekday, calendar month) combination
pub fn weekday_month_heatmap(daily: &[DailyAggregate]) -> Heatmap {
    let mut buckets: BTreeMap<(u32, u32), (f64, u32)> = BTreeMap::new();

    for day in daily {
        let key = (day.date.month(), day.date.weekday().num_days_from_monday());
        let entry = buckets.entry(key).or_insert((0.0, 0));
        entry.0 += day.total_amount;
        entry.1 += 1;
    }

    let cells: Vec<HeatmapCell> = buckets
        .into_iter()
        .map(|((month, weekday), (total, occurrences))| HeatmapCell {
            weekday: weekday_from_index(weekday),
            month,
            average: total / occurrences as f64,
            occurrences,
        })
        .collect();

    let max_value = cells.iter().map(|c| c.average).fold(0.0, f64::max);

    Heatmap { cells, max_value }
}

fn weekday_from_index(index: u32) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Average total per calendar month across the years present in `monthly`
pub fn seasonal_profile(monthly: &[MonthlyAggregate]) -> Vec<SeasonalMonth> {
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for m in monthly {
        by_month.entry(m.month).or_default().push(m.total_amount);
    }

    by_month
        .into_iter()
        .map(|(month, totals)| SeasonalMonth {
            month,
            average_total: mean(&totals),
            years: totals.len() as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32, total: f64) -> MonthlyAggregate {
        MonthlyAggregate {
            year,
            month,
            total_amount: total,
            transaction_count: 1,
            active_days: 1,
        }
    }

    fn day(y: i32, m: u32, d: u32, total: f64) -> DailyAggregate {
        DailyAggregate {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            total_amount: total,
            transaction_count: 1,
        }
    }

    #[test]
    fn test_monthly_factor() {
        let monthly = vec![
            month(2025, 11, 100.0),
            month(2025, 12, 300.0),
            month(2026, 1, 200.0),
        ];
        assert!((monthly_factor(&monthly, 12) - 1.5).abs() < 1e-9);
        assert_eq!(monthly_factor(&monthly, 6), 1.0);
        assert_eq!(monthly_factor(&[], 12), 1.0);
    }

    #[test]
    fn test_weekday_pattern_detected() {
        // 2026-10-12 is a Monday
        let daily = vec![
            day(2026, 10, 12, 20.0),
            day(2026, 10, 13, 20.0),
            day(2026, 10, 17, 80.0),
            day(2026, 10, 18, 60.0),
        ];
        let pattern = WeekdayPattern::detect(&daily, 0.2);
        assert_eq!(pattern.weekday_average, 20.0);
        assert_eq!(pattern.weekend_average, 70.0);
        assert!(pattern.has_pattern);

        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
        assert_eq!(pattern.projected_spend([saturday, sunday, monday]), 160.0);
    }

    #[test]
    fn test_weekday_pattern_requires_both_buckets() {
        let daily = vec![day(2026, 10, 12, 20.0), day(2026, 10, 13, 40.0)];
        let pattern = WeekdayPattern::detect(&daily, 0.2);
        assert!(!pattern.has_pattern);
        assert_eq!(pattern.weekend_average, 0.0);
    }

    #[test]
    fn test_small_gap_is_not_a_pattern() {
        let daily = vec![day(2026, 10, 12, 100.0), day(2026, 10, 17, 110.0)];
        assert!(!WeekdayPattern::detect(&daily, 0.2).has_pattern);
    }

    #[test]
    fn test_heatmap_cells() {
        let daily = vec![
            day(2026, 10, 12, 20.0),
            day(2026, 10, 19, 40.0),
            day(2026, 10, 17, 90.0),
            day(2025, 11, 1, 10.0),
        ];
        let heatmap = weekday_month_heatmap(&daily);

        let monday = heatmap.cell(Weekday::Mon, 10).unwrap();
        assert_eq!(monday.average, 30.0);
        assert_eq!(monday.occurrences, 2);
        assert_eq!(heatmap.max_value, 90.0);
        assert_eq!(heatmap.cells.len(), 3);
        assert_eq!(heatmap.cells[0].month, 10);
        assert_eq!(heatmap.cells[0].weekday, Weekday::Mon);
    }

    #[test]
    fn test_seasonal_profile() {
        let monthly = vec![
            month(2024, 12, 400.0),
            month(2025, 1, 100.0),
            month(2025, 12, 600.0),
        ];
        let profile = seasonal_profile(&monthly);
        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].month, 1);
        assert_eq!(profile[1].average_total, 500.0);
        assert_eq!(profile[1].years, 2);
    }
}
