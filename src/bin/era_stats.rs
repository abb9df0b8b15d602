// src/bin/era_stats.rs
//
// Era statistics table from a combined FRED CSV:
//   era_stats [path]   (defaults to $FRED_COMBINED_CSV)
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use balance_sheet_dashboard::services::eras::era_statistics;
use balance_sheet_dashboard::services::observations::load_combined_csv_path;
use balance_sheet_dashboard::services::registry;
use dotenv::dotenv;
use log::info;

fn cell(v: Option<f64>) -> String {
    v.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "—".to_string())
}

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FRED_COMBINED_CSV").ok())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: era_stats <fred_combined.csv> (or set FRED_COMBINED_CSV)"))?;
    info!("Reading {}", path.display());
    let table = load_combined_csv_path(&path)?;

    let series = |name: &str| -> Result<Vec<_>> {
        let code = registry::lookup(name)?.source_code;
        table
            .get(code)
            .cloned()
            .ok_or_else(|| anyhow!("{} has no {} column", path.display(), code))
    };
    let stats = era_statistics(
        &series("fed_total_assets")?,
        &series("m2_money_supply")?,
        &series("monetary_base")?,
    )?;

    println!(
        "{:<12} {:<10} {:<10} {:>10} {:>10} {:>10} {:>10}",
        "Era", "Start", "End", "BS Δ $T", "M2 Δ $T", "Mult", "Corr"
    );
    println!("{}", "-".repeat(78));
    for s in &stats {
        println!(
            "{:<12} {:<10} {:<10} {:>10} {:>10} {:>10} {:>10}",
            s.era,
            s.start.to_string(),
            s.end.to_string(),
            cell(s.balance_sheet_change),
            cell(s.m2_change),
            cell(s.avg_money_multiplier),
            cell(s.correlation)
        );
    }
    Ok(())
}
