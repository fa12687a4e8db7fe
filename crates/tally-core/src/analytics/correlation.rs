//! Cross-category correlation of monthly spending

use std::collections::BTreeMap;

use tracing::debug;

use super::stats::pearson;
use super::types::{CorrelationDirection, CorrelationPair, CorrelationReport, CorrelationStrength};
use crate::calendar::YearMonth;
use crate::config::CorrelationConfig;
use crate::models::CategoryMonthlyTotal;

#[derive(Debug, Clone)]
pub struct CorrelationAnalyzer {
    top_categories: usize,
    min_denominator: f64,
    strong_threshold: f64,
    moderate_threshold: f64,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new(&CorrelationConfig::default())
    }
}

impl CorrelationAnalyzer {
    pub fn new(config: &CorrelationConfig) -> Self {
        Self {
            top_categories: config.top_categories,
            min_denominator: config.min_denominator,
            strong_threshold: config.strong_threshold,
            moderate_threshold: config.moderate_threshold,
        }
    }

    /// Correlate the highest-spend categories pairwise.
    ///
    /// Series are aligned on every month that has categorized spending; a
    /// category with nothing in a month counts as 0 for it.
    pub fn analyze(&self, totals: &[CategoryMonthlyTotal]) -> CorrelationReport {
        let mut matrix: BTreeMap<YearMonth, BTreeMap<&str, f64>> = BTreeMap::new();
        let mut category_totals: BTreeMap<&str, f64> = BTreeMap::new();

        for row in totals {
            *matrix
                .entry(row.year_month())
                .or_default()
                .entry(row.category.as_str())
                .or_insert(0.0) += row.total;
            *category_totals.entry(row.category.as_str()).or_insert(0.0) += row.total;
        }

        // Largest spend first, ties by name
        let mut ranked: Vec<(&str, f64)> = category_totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<&str> = ranked
            .into_iter()
            .take(self.top_categories)
            .map(|(name, _)| name)
            .collect();

        let series: Vec<Vec<f64>> = top
            .iter()
            .map(|category| {
                matrix
                    .values()
                    .map(|month| month.get(category).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        let mut correlations = Vec::new();
        for i in 0..top.len() {
            for j in (i + 1)..top.len() {
                if series[i].len() < 2 {
                    continue;
                }
                let coefficient = pearson(&series[i], &series[j], self.min_denominator);
                correlations.push(CorrelationPair {
                    category_a: top[i].to_string(),
                    category_b: top[j].to_string(),
                    coefficient,
                    strength: self.strength(coefficient),
                    direction: if coefficient > 0.0 {
                        CorrelationDirection::Positive
                    } else {
                        CorrelationDirection::Negative
                    },
                });
            }
        }

        correlations.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));

        debug!(
            categories = top.len(),
            months = matrix.len(),
            pairs = correlations.len(),
            "Computed category correlations"
        );

        CorrelationReport {
            correlations,
            categories_analyzed: top.iter().map(|c| c.to_string()).collect(),
            total_months: matrix.len(),
        }
    }

    fn strength(&self, coefficient: f64) -> CorrelationStrength {
        let r = coefficient.abs();
        if r > self.strong_threshold {
            CorrelationStrength::Strong
        } else if r > self.moderate_threshold {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }
}
