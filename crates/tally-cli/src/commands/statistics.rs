//! Descriptive statistics and correlation command implementations

use anyhow::Result;
use tally_core::PeriodType;

use super::{handle_insufficient, print_json, AnalyticsContext};

pub fn cmd_stats(ctx: &AnalyticsContext, account: i64, period: &str) -> Result<()> {
    let period_type: PeriodType = period.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let stats = ctx.run(|engine| engine.compute_statistics(account, period_type));
    let Some(stats) = handle_insufficient(stats)? else {
        return Ok(());
    };

    if ctx.json {
        return print_json(&stats);
    }

    let ci = &stats.confidence_interval_95;

    println!();
    println!("📊 Spending Statistics ({} totals, account {})", period_type, account);
    println!("   ─────────────────────────────────────────────");
    println!("   Sample size:      {:>12}", stats.sample_size);
    println!("   Mean:             ${:>11.2}", stats.mean);
    println!("   Median:           ${:>11.2}", stats.median);
    println!("   Min / Max:        ${:.2} / ${:.2}", stats.min, stats.max);
    println!("   Std deviation:    ${:>11.2}", stats.std_deviation);
    println!("   Variation:        {:>11.1}%", stats.coefficient_of_variation);
    println!(
        "   Quartiles:        ${:.2} │ ${:.2} │ ${:.2}  (IQR ${:.2})",
        stats.quartiles.q1, stats.quartiles.q2, stats.quartiles.q3, stats.iqr
    );
    println!(
        "   Skewness:         {:>12.3}  ({})",
        stats.skewness, stats.skew_interpretation
    );
    println!(
        "   95% CI of mean:   ${:.2} to ${:.2}",
        ci.lower, ci.upper
    );

    Ok(())
}

pub fn cmd_correlate(ctx: &AnalyticsContext, account: i64) -> Result<()> {
    let report = ctx.run(|engine| engine.correlate_categories(account))?;

    if ctx.json {
        return print_json(&report);
    }

    println!();
    println!("🔗 Category Correlations ({} months)", report.total_months);
    println!("   ─────────────────────────────────────────────");

    if report.correlations.is_empty() {
        println!("   Not enough categorized spending to compare categories.");
        return Ok(());
    }

    println!("   Categories: {}", report.categories_analyzed.join(", "));
    println!();

    for pair in &report.correlations {
        println!(
            "   {:<16} ↔ {:<16} {:>+6.3}  {} {}",
            pair.category_a, pair.category_b, pair.coefficient, pair.strength, pair.direction
        );
    }

    Ok(())
}
