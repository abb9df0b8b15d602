// src/bin/run_scenarios.rs
//
// Prints the scenario summary table. With an output directory argument,
// also writes summary.csv, paths.csv and projections.json there.
use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use balance_sheet_dashboard::config::DashboardConfig;
use balance_sheet_dashboard::services::dashboard::{compare, summarize};
use balance_sheet_dashboard::services::export::{to_json, write_paths_csv, write_summary_csv};
use balance_sheet_dashboard::services::scenarios;
use log::info;

fn fmt_opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load()?;
    let ctx = config.projection_context()?;
    println!(
        "Starting conditions: reserves {:.1}B, ON RRP {:.2}B, TGA {:.1}B, balance sheet {:.1}B",
        ctx.starting.reserves, ctx.starting.rrp, ctx.starting.tga, ctx.starting.balance_sheet
    );

    let results = compare(&scenarios::canonical(), &ctx)?;
    let rows = summarize(&results);

    println!(
        "\n{:<16} {:>8} {:>8} {:>10} {:>10} {:>10}",
        "Scenario", "Danger", "Stress", "12mo $B", "24mo $B", "Drain $B"
    );
    println!("{}", "-".repeat(67));
    for row in &rows {
        println!(
            "{:<16} {:>8} {:>8} {:>10} {:>10} {:>10.1}",
            row.scenario,
            fmt_opt(row.months_until_danger),
            fmt_opt(row.months_until_stress),
            fmt_opt(row.reserves_12m.map(|v| format!("{:.1}", v))),
            fmt_opt(row.reserves_24m.map(|v| format!("{:.1}", v))),
            row.total_reserve_drain
        );
    }

    println!("\nDerived metrics (approximate bands):");
    for r in &results {
        println!(
            "{:<16} 10y {:.2}-{:.2}%  mortgage {:.2}-{:.2}%  S&P {:.0}-{:.0}  gold {:.0}-{:.0}  DXY {:.1}-{:.1}",
            r.scenario.name(),
            r.ten_year_yield.low,
            r.ten_year_yield.high,
            r.mortgage_rate.low,
            r.mortgage_rate.high,
            r.sp500_fair_value.low,
            r.sp500_fair_value.high,
            r.gold_range.low,
            r.gold_range.high,
            r.dxy_range.low,
            r.dxy_range.high
        );
    }
    if let Some(first) = results.first() {
        println!("\n{}", first.note);
    }

    if let Some(dir) = std::env::args().nth(1).map(PathBuf::from) {
        fs::create_dir_all(&dir).with_context(|| format!("Creating {}", dir.display()))?;
        write_summary_csv(File::create(dir.join("summary.csv"))?, &rows)?;
        write_paths_csv(File::create(dir.join("paths.csv"))?, &results)?;
        fs::write(dir.join("projections.json"), to_json(&results)?)?;
        info!("Exports written to {}", dir.display());
        println!("\nSaved exports to {}", dir.display());
    }
    Ok(())
}
