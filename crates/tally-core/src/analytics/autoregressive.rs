//! Short-window weighted auto-regression
//!
//! Not a fitted ARIMA model: the last `order` observations are averaged with
//! linearly increasing weights so the newest month counts most.

#[derive(Debug, Clone)]
pub struct AutoRegressiveEstimator {
    order: usize,
}

impl Default for AutoRegressiveEstimator {
    fn default() -> Self {
        Self::new(crate::config::AR_ORDER)
    }
}

impl AutoRegressiveEstimator {
    pub fn new(order: usize) -> Self {
        Self {
            order: order.max(1),
        }
    }

    /// Estimate the next value of chronological `totals`
    pub fn estimate(&self, totals: &[f64]) -> f64 {
        if totals.len() < self.order + 1 {
            return totals.last().copied().unwrap_or(0.0);
        }

        let window = &totals[totals.len() - self.order..];
        let (weighted, weight_sum) = window
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sum, weights), (i, value)| {
                let weight = (i + 1) as f64;
                (sum + value * weight, weights + weight)
            });

        weighted / weight_sum
    }
}
