//! Z-score anomaly detection over daily spending

use tracing::{debug, warn};

use super::stats::{mean, population_std};
use super::types::{AnomalyRecord, AnomalyReport, AnomalySeverity, AnomalyStatistics, AnomalyType};
use crate::config::AnomalyConfig;
use crate::error::{Error, Result};
use crate::models::DailyAggregate;

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    min_points: usize,
    high_z: f64,
    critical_z: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(&AnomalyConfig::default())
    }
}

impl AnomalyDetector {
    pub fn new(config: &AnomalyConfig) -> Self {
        Self {
            min_points: config.min_points,
            high_z: config.high_z,
            critical_z: config.critical_z,
        }
    }

    /// Flag days whose total lies outside `mean +/- sensitivity * std`.
    ///
    /// The lower threshold is floored at zero. Negative or NaN sensitivity is
    /// treated as zero, which flags every day that differs from the mean.
    /// Infinite sensitivity flags nothing.
    pub fn detect(&self, daily: &[DailyAggregate], sensitivity: f64) -> Result<AnomalyReport> {
        if daily.len() < self.min_points {
            return Err(Error::InsufficientData(format!(
                "anomaly detection needs at least {} days of spending, found {}",
                self.min_points,
                daily.len()
            )));
        }

        let sensitivity = if sensitivity < 0.0 || sensitivity.is_nan() {
            warn!(sensitivity, "Negative or NaN anomaly sensitivity clamped to 0");
            0.0
        } else {
            sensitivity
        };

        let totals: Vec<f64> = daily.iter().map(|d| d.total_amount).collect();
        let avg = mean(&totals);
        let std_dev = population_std(&totals);
        // inf * 0 is NaN, so a flat series keeps both thresholds at the mean
        let spread = if std_dev > 0.0 {
            sensitivity * std_dev
        } else {
            0.0
        };
        let threshold_upper = avg + spread;
        let threshold_lower = (avg - spread).max(0.0);

        let mut anomalies: Vec<AnomalyRecord> = daily
            .iter()
            .filter_map(|day| {
                let anomaly_type = if day.total_amount > threshold_upper {
                    AnomalyType::High
                } else if day.total_amount < threshold_lower {
                    AnomalyType::Low
                } else {
                    return None;
                };

                let deviation = day.total_amount - avg;
                let z_score = if std_dev > 0.0 { deviation / std_dev } else { 0.0 };

                Some(AnomalyRecord {
                    date: day.date,
                    amount: day.total_amount,
                    transaction_count: day.transaction_count,
                    deviation,
                    z_score,
                    anomaly_type,
                    severity: self.severity(z_score),
                })
            })
            .collect();

        anomalies.sort_by(|a, b| b.date.cmp(&a.date));

        let total_days = daily.len();
        let anomaly_count = anomalies.len();
        debug!(
            total_days,
            anomaly_count,
            mean = avg,
            std_dev,
            "Scanned daily totals for anomalies"
        );

        Ok(AnomalyReport {
            anomalies,
            statistics: AnomalyStatistics {
                mean: avg,
                std_dev,
                threshold_upper,
                threshold_lower,
                sensitivity,
                total_days,
                anomaly_count,
                anomaly_rate: anomaly_count as f64 / total_days as f64 * 100.0,
            },
        })
    }

    fn severity(&self, z_score: f64) -> AnomalySeverity {
        let z = z_score.abs();
        if z > self.critical_z {
            AnomalySeverity::Critical
        } else if z > self.high_z {
            AnomalySeverity::High
        } else {
            AnomalySeverity::Moderate
        }
    }
}
