// src/services/export.rs
use std::io::Write;

use anyhow::Result;
use chrono::Months;
use csv::Writer;
use log::info;

use crate::models::ProjectionResult;
use crate::services::dashboard::SummaryRow;

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn amount(v: f64) -> String {
    format!("{:.1}", v)
}

pub fn write_summary_csv<W: Write>(out: W, rows: &[SummaryRow]) -> Result<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record([
        "scenario",
        "months_until_danger",
        "months_until_stress",
        "reserves_12m_bn",
        "reserves_24m_bn",
        "reserves_end_bn",
        "total_reserve_drain_bn",
        "balance_sheet_end_bn",
        "target_gap_bn",
    ])?;
    for row in rows {
        wtr.write_record([
            row.scenario.clone(),
            opt(row.months_until_danger),
            opt(row.months_until_stress),
            opt(row.reserves_12m.map(amount)),
            opt(row.reserves_24m.map(amount)),
            amount(row.reserves_end),
            amount(row.total_reserve_drain),
            amount(row.balance_sheet_end),
            amount(row.target_gap),
        ])?;
    }
    wtr.flush()?;
    info!("Wrote summary for {} scenarios", rows.len());
    Ok(())
}

/// One row per scenario-month. The `month` column is filled when the
/// results carry a start month.
pub fn write_paths_csv<W: Write>(out: W, results: &[ProjectionResult]) -> Result<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["scenario", "month_index", "month", "reserves_bn", "danger_zone", "stress"])?;
    for result in results {
        for point in &result.reserve_path {
            let month = result
                .start_month
                .and_then(|d| d.checked_add_months(Months::new(point.month_index)))
                .map(|d| d.format("%Y-%m").to_string());
            wtr.write_record([
                result.scenario.name().to_string(),
                point.month_index.to_string(),
                opt(month),
                amount(point.reserves),
                point.danger_zone.to_string(),
                point.stress.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_json(results: &[ProjectionResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::{compare, summarize, ProjectionContext};
    use crate::services::scenarios::{canonical, define};
    use chrono::NaiveDate;

    #[test]
    fn summary_csv_has_a_row_per_scenario() {
        let results = compare(&canonical(), &ProjectionContext::default()).unwrap();
        let mut buf = Vec::new();
        write_summary_csv(&mut buf, &summarize(&results)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Warsh Hawk,6,16,1860.0,720.0,"));
    }

    #[test]
    fn path_csv_labels_calendar_months() {
        let ctx = ProjectionContext {
            start_month: NaiveDate::from_ymd_opt(2026, 2, 1),
            ..Default::default()
        };
        let s = define("Two", 10.0, 0.0, 3.0, 6_000.0, 2).unwrap();
        let results = compare(&[s], &ctx).unwrap();
        let mut buf = Vec::new();
        write_paths_csv(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Two,0,2026-02,3000.0,false,false"));
        assert!(text.contains("Two,2,2026-04,2980.0,false,false"));
    }

    #[test]
    fn json_export_marks_estimates_approximate() {
        let results = compare(&canonical(), &ProjectionContext::default()).unwrap();
        let json = to_json(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["approximate"], true);
        assert_eq!(value[0]["scenario"]["name"], "Warsh Hawk");
    }
}
