//! Forecast and projection command implementations

use anyhow::Result;
use chrono::Datelike;

use super::{handle_insufficient, month_name, print_json, AnalyticsContext};

pub fn cmd_forecast(
    ctx: &AnalyticsContext,
    account: i64,
    year: Option<i32>,
    month: Option<u32>,
    months_ahead: u32,
) -> Result<()> {
    let today = ctx.today();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());

    let results = ctx.run(|engine| engine.forecast(account, year, month, months_ahead));
    let Some(results) = handle_insufficient(results)? else {
        return Ok(());
    };

    if ctx.json {
        return print_json(&results);
    }

    println!();
    println!("🔮 Spending Forecast (account {})", account);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<10} │ {:>12} │ {:>25} │ {:>7} │ {:>8}",
        "Month", "Predicted", "95% band", "Trend", "Season"
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for r in &results {
        println!(
            "   {:<10} │ {:>12.2} │ {:>11.2} – {:>11.2} │ {:>7.3} │ {:>8.3}",
            format!("{} {}", month_name(r.month), r.year),
            r.predicted_amount,
            r.confidence_lower,
            r.confidence_upper,
            r.trend_coefficient,
            r.seasonal_factor,
        );
    }

    for r in results.iter().filter(|r| r.is_in_progress()) {
        println!();
        println!(
            "   📅 {} {} so far: ${:.2} after {} of {} days",
            month_name(r.month),
            r.year,
            r.current_actual,
            r.current_day,
            r.days_in_month
        );
    }

    if let Some(first) = results.first() {
        println!();
        println!(
            "   Methods ({} months of history):",
            first.historical_points_used
        );
        for (method, amount) in &first.method_predictions {
            println!("     {:<22} ${:>12.2}", method.as_str(), amount);
        }
        if let Some(last_year) = first.last_year_actual {
            println!("     {:<22} ${:>12.2}", "same month last year", last_year);
        }
    }

    Ok(())
}

pub fn cmd_project(ctx: &AnalyticsContext, account: i64, months: u32) -> Result<()> {
    let report = ctx.run(|engine| engine.project_monthly(account, months));
    let Some(report) = handle_insufficient(report)? else {
        return Ok(());
    };

    if ctx.json {
        return print_json(&report);
    }

    let model = &report.model;

    println!();
    println!("📈 Monthly Projection (account {})", account);
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Trend: {} ({:.1}% of average per month)",
        model.trend, model.trend_rate
    );
    println!(
        "   Moving average: ${:.2} over {} months of data",
        model.moving_average, model.data_points
    );
    println!();

    for p in &report.projections {
        println!(
            "   {:<10} ${:>12.2}   confidence {:>3.0}%   season {:.2}",
            format!("{} {}", month_name(p.month), p.year),
            p.predicted_amount,
            p.confidence * 100.0,
            p.seasonal_factor,
        );
    }

    Ok(())
}
