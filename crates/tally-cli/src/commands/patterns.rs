//! Spending pattern command implementations

use anyhow::Result;
use chrono::Weekday;

use super::{bar, month_name, print_json, AnalyticsContext};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn cmd_heatmap(ctx: &AnalyticsContext, account: i64) -> Result<()> {
    let heatmap = ctx.run(|engine| engine.weekday_month_heatmap(account))?;

    if ctx.json {
        return print_json(&heatmap);
    }

    println!();
    println!("🗓️  Average Daily Spending by Weekday");
    println!("   ─────────────────────────────────────────────────────────────");

    if heatmap.cells.is_empty() {
        println!("   No spending recorded yet.");
        return Ok(());
    }

    print!("   {:<5}", "");
    for weekday in WEEKDAYS {
        print!(" │ {:>7}", weekday.to_string());
    }
    println!();

    for month in 1..=12 {
        if !WEEKDAYS.iter().any(|&w| heatmap.cell(w, month).is_some()) {
            continue;
        }
        print!("   {:<5}", month_name(month));
        for weekday in WEEKDAYS {
            match heatmap.cell(weekday, month) {
                Some(cell) => print!(" │ {:>7.0}", cell.average),
                None => print!(" │ {:>7}", "-"),
            }
        }
        println!();
    }

    println!();
    println!("   Busiest cell: ${:.2} per day", heatmap.max_value);

    Ok(())
}

pub fn cmd_seasonal(ctx: &AnalyticsContext, account: i64) -> Result<()> {
    let profile = ctx.run(|engine| engine.seasonal_profile(account))?;

    if ctx.json {
        return print_json(&profile);
    }

    println!();
    println!("🍂 Seasonal Spending Profile");
    println!("   ─────────────────────────────────────────────");

    if profile.is_empty() {
        println!("   No spending recorded yet.");
        return Ok(());
    }

    let max = profile
        .iter()
        .map(|m| m.average_total)
        .fold(0.0, f64::max);

    for m in &profile {
        println!(
            "   {:<4} ${:>10.2}  ({} yr)  {}",
            month_name(m.month),
            m.average_total,
            m.years,
            bar(m.average_total, max, 30)
        );
    }

    Ok(())
}
