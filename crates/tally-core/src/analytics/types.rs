//! Result types produced by the analytics engine

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::PeriodType;

/// Forecasting methods combined by the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Month-to-date pace extended to month end
    SimplePace,
    /// Weighted average of past years' same month, scaled by trend
    HistoricalTrend,
    /// Remaining days projected with separate weekday/weekend averages
    WeekdayAware,
    /// Exponentially smoothed monthly totals
    ExponentialSmoothing,
    /// Short-window weighted auto-regression
    Arima,
}

impl ForecastMethod {
    pub const ALL: [ForecastMethod; 5] = [
        ForecastMethod::SimplePace,
        ForecastMethod::HistoricalTrend,
        ForecastMethod::WeekdayAware,
        ForecastMethod::ExponentialSmoothing,
        ForecastMethod::Arima,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMethod::SimplePace => "simple_pace",
            ForecastMethod::HistoricalTrend => "historical_trend",
            ForecastMethod::WeekdayAware => "weekday_aware",
            ForecastMethod::ExponentialSmoothing => "exponential_smoothing",
            ForecastMethod::Arima => "arima",
        }
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ForecastMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple_pace" => Ok(ForecastMethod::SimplePace),
            "historical_trend" => Ok(ForecastMethod::HistoricalTrend),
            "weekday_aware" => Ok(ForecastMethod::WeekdayAware),
            "exponential_smoothing" => Ok(ForecastMethod::ExponentialSmoothing),
            "arima" => Ok(ForecastMethod::Arima),
            _ => Err(format!("Unknown forecast method: {}", s)),
        }
    }
}

/// Ensemble forecast for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub year: i32,
    pub month: u32,
    pub predicted_amount: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    pub confidence_margin: f64,
    pub trend_coefficient: f64,
    pub seasonal_factor: f64,
    pub methods_used: BTreeSet<ForecastMethod>,
    pub method_predictions: BTreeMap<ForecastMethod, f64>,
    pub historical_points_used: usize,
    /// Same month one year earlier, if there was spending
    pub last_year_actual: Option<f64>,
    pub current_actual: f64,
    /// Days of the month already elapsed (0 for a month not yet started)
    pub current_day: u32,
    pub days_in_month: u32,
}

impl PredictionResult {
    /// Whether the prediction falls inside its confidence interval.
    ///
    /// With two or more historical points the interval is centered on the
    /// historical mean, not the prediction, so this can be false.
    pub fn within_confidence(&self) -> bool {
        self.confidence_lower <= self.predicted_amount
            && self.predicted_amount <= self.confidence_upper
    }

    /// Whether the month had already started on the reference date
    pub fn is_in_progress(&self) -> bool {
        self.current_day > 0 && self.current_day < self.days_in_month
    }
}

/// Direction of an anomalous day relative to the mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    High,
    Low,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::High => "high",
            AnomalyType::Low => "low",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnomalyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(AnomalyType::High),
            "low" => Ok(AnomalyType::Low),
            _ => Err(format!("Unknown anomaly type: {}", s)),
        }
    }
}

/// How far an anomalous day sits from the mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Moderate,
    High,
    Critical,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Moderate => "moderate",
            AnomalySeverity::High => "high",
            AnomalySeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnomalySeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moderate" => Ok(AnomalySeverity::Moderate),
            "high" => Ok(AnomalySeverity::High),
            "critical" => Ok(AnomalySeverity::Critical),
            _ => Err(format!("Unknown anomaly severity: {}", s)),
        }
    }
}

/// A day whose spending fell outside the anomaly thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub transaction_count: u32,
    /// amount - mean
    pub deviation: f64,
    pub z_score: f64,
    pub anomaly_type: AnomalyType,
    pub severity: AnomalySeverity,
}

/// Distribution summary behind an anomaly scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyStatistics {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold_upper: f64,
    pub threshold_lower: f64,
    pub sensitivity: f64,
    pub total_days: usize,
    pub anomaly_count: usize,
    /// Percentage of scanned days that were flagged
    pub anomaly_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// Most recent first
    pub anomalies: Vec<AnomalyRecord>,
    pub statistics: AnomalyStatistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CorrelationStrength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weak" => Ok(CorrelationStrength::Weak),
            "moderate" => Ok(CorrelationStrength::Moderate),
            "strong" => Ok(CorrelationStrength::Strong),
            _ => Err(format!("Unknown correlation strength: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationDirection::Positive => "positive",
            CorrelationDirection::Negative => "negative",
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CorrelationDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(CorrelationDirection::Positive),
            "negative" => Ok(CorrelationDirection::Negative),
            _ => Err(format!("Unknown correlation direction: {}", s)),
        }
    }
}

/// Pearson correlation between two categories' monthly spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub category_a: String,
    pub category_b: String,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Strongest first (by absolute coefficient)
    pub correlations: Vec<CorrelationPair>,
    pub categories_analyzed: Vec<String>,
    pub total_months: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub margin_of_error: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewInterpretation {
    Symmetric,
    RightSkewed,
    LeftSkewed,
}

impl SkewInterpretation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkewInterpretation::Symmetric => "symmetric",
            SkewInterpretation::RightSkewed => "right_skewed",
            SkewInterpretation::LeftSkewed => "left_skewed",
        }
    }
}

impl fmt::Display for SkewInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SkewInterpretation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symmetric" => Ok(SkewInterpretation::Symmetric),
            "right_skewed" => Ok(SkewInterpretation::RightSkewed),
            "left_skewed" => Ok(SkewInterpretation::LeftSkewed),
            _ => Err(format!("Unknown skew interpretation: {}", s)),
        }
    }
}

/// Summary statistics over a series of period totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub period_type: PeriodType,
    pub sample_size: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub variance: f64,
    pub std_deviation: f64,
    /// Percent
    pub coefficient_of_variation: f64,
    pub quartiles: Quartiles,
    pub iqr: f64,
    pub skewness: f64,
    pub skew_interpretation: SkewInterpretation,
    pub confidence_interval_95: ConfidenceInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Projected spending for one future month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub year: i32,
    pub month: u32,
    pub predicted_amount: f64,
    /// 0.0 - 1.0, decays the further out the month is
    pub confidence: f64,
    pub seasonal_factor: f64,
}

/// Fitted model behind a multi-month projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionModel {
    pub slope: f64,
    pub intercept: f64,
    pub moving_average: f64,
    pub trend: TrendDirection,
    /// |slope| as a percentage of the mean monthly total
    pub trend_rate: f64,
    pub data_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionReport {
    pub projections: Vec<MonthlyProjection>,
    pub model: ProjectionModel,
}

/// Average daily spending for one weekday within one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub weekday: Weekday,
    pub month: u32,
    pub average: f64,
    /// Number of days with spending that fell in this cell
    pub occurrences: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    /// Ordered by month, then weekday (Monday first)
    pub cells: Vec<HeatmapCell>,
    pub max_value: f64,
}

impl Heatmap {
    pub fn cell(&self, weekday: Weekday, month: u32) -> Option<&HeatmapCell> {
        self.cells
            .iter()
            .find(|c| c.weekday == weekday && c.month == month)
    }
}

/// Typical spending in one calendar month across years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalMonth {
    pub month: u32,
    pub average_total: f64,
    pub years: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_method_roundtrip_names() {
        for method in ForecastMethod::ALL {
            assert_eq!(ForecastMethod::from_str(method.as_str()).unwrap(), method);
        }
        assert!(ForecastMethod::from_str("prophet").is_err());
    }

    #[test]
    fn test_method_map_serializes_with_snake_case_keys() {
        let mut predictions = BTreeMap::new();
        predictions.insert(ForecastMethod::ExponentialSmoothing, 10.0);
        let json = serde_json::to_string(&predictions).unwrap();
        assert_eq!(json, r#"{"exponential_smoothing":10.0}"#);
    }

    #[test]
    fn test_within_confidence() {
        let mut result = PredictionResult {
            year: 2026,
            month: 8,
            predicted_amount: 1240.0,
            confidence_lower: 940.0,
            confidence_upper: 1260.0,
            confidence_margin: 160.0,
            trend_coefficient: 1.0,
            seasonal_factor: 1.0,
            methods_used: BTreeSet::new(),
            method_predictions: BTreeMap::new(),
            historical_points_used: 3,
            last_year_actual: None,
            current_actual: 600.0,
            current_day: 15,
            days_in_month: 31,
        };
        assert!(result.within_confidence());
        assert!(result.is_in_progress());

        result.predicted_amount = 1300.0;
        assert!(!result.within_confidence());
    }

    #[test]
    fn test_trend_direction_from_slope() {
        assert_eq!(TrendDirection::from_slope(2.5), TrendDirection::Increasing);
        assert_eq!(TrendDirection::from_slope(-0.1), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::from_slope(0.0), TrendDirection::Stable);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AnomalySeverity::Critical > AnomalySeverity::High);
        assert!(AnomalySeverity::High > AnomalySeverity::Moderate);
    }
}
