//! Anomaly command implementation

use anyhow::Result;
use tally_core::analytics::{AnomalySeverity, AnomalyType};

use super::{handle_insufficient, print_json, AnalyticsContext};

pub fn cmd_anomalies(
    ctx: &AnalyticsContext,
    account: i64,
    days: Option<u32>,
    sensitivity: Option<f64>,
) -> Result<()> {
    let days = days.unwrap_or(ctx.config.anomaly.default_days_back);
    let sensitivity = sensitivity.unwrap_or(ctx.config.anomaly.default_sensitivity);

    let report = ctx.run(|engine| engine.detect_anomalies(account, days, sensitivity));
    let Some(report) = handle_insufficient(report)? else {
        return Ok(());
    };

    if ctx.json {
        return print_json(&report);
    }

    let stats = &report.statistics;

    println!();
    println!("🚨 Spending Anomalies (last {} days)", days);
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Daily mean ${:.2}, std dev ${:.2}, normal range ${:.2} to ${:.2}",
        stats.mean, stats.std_dev, stats.threshold_lower, stats.threshold_upper
    );
    println!(
        "   {} of {} days flagged ({:.1}%)",
        stats.anomaly_count, stats.total_days, stats.anomaly_rate
    );

    if report.anomalies.is_empty() {
        println!();
        println!("   ✅ Nothing unusual at sensitivity {:.1}", stats.sensitivity);
        return Ok(());
    }

    println!();
    println!(
        "   {:<10}   {:<10} │ {:>10} │ {:>7} │ {:>4}",
        "Severity", "Date", "Amount", "Z", "Txns"
    );
    println!("   ─────────────────────────────────────────────");

    for a in &report.anomalies {
        let icon = match (a.severity, a.anomaly_type) {
            (AnomalySeverity::Critical, _) => "🔴",
            (AnomalySeverity::High, _) => "🟠",
            (_, AnomalyType::High) => "🔺",
            (_, AnomalyType::Low) => "🔻",
        };
        println!(
            "   {} {:<8} {} │ {:>10.2} │ {:>+7.2} │ {:>4}",
            icon,
            a.severity.as_str(),
            a.date.format("%Y-%m-%d"),
            a.amount,
            a.z_score,
            a.transaction_count,
        );
    }

    Ok(())
}
