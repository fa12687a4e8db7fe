//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `context` - Shared context (ledger, config, reference date) and engine setup
//! - `forecast` - Ensemble forecast and multi-month projection
//! - `anomalies` - Unusual spending days
//! - `statistics` - Descriptive statistics and category correlation
//! - `patterns` - Weekday heatmap and seasonal profile

pub mod anomalies;
pub mod context;
pub mod forecast;
pub mod patterns;
pub mod statistics;

// Re-export command functions for main.rs
pub use anomalies::*;
pub use context::*;
pub use forecast::*;
pub use patterns::*;
pub use statistics::*;

/// Short English month name for 1-12
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("???")
}

/// Horizontal bar scaled so that `max` fills `width` cells
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "█".repeat(cells.min(width))
}
