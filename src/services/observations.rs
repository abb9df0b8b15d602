// src/services/observations.rs
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::Reader;
use log::{debug, info, warn};

use crate::models::{MarketSnapshot, Observation, StartingConditions};
use crate::services::registry;

/// Series keyed by source code (e.g. "WALCL"), each sorted by date.
pub type SeriesTable = BTreeMap<String, Vec<Observation>>;

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    // pandas writes either a bare date or a full timestamp
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").with_context(|| format!("Bad date '{}'", raw))
}

/// Parses a date-indexed wide CSV: first column is the date, every other
/// column is one series named by its source code. Blank cells are skipped.
pub fn load_combined_csv<R: Read>(reader: R) -> Result<SeriesTable> {
    let mut rdr = Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(anyhow!("Combined CSV needs a date column and at least one series"));
    }

    let codes: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    let mut seen = BTreeSet::new();
    for code in &codes {
        if !seen.insert(code.as_str()) {
            return Err(anyhow!("Combined CSV has more than one {} column", code));
        }
        if registry::lookup_code(code).is_err() {
            debug!("Column {} is not in the series registry; loading it anyway", code);
        }
    }

    let mut table: SeriesTable = codes.iter().map(|c| (c.clone(), Vec::new())).collect();
    for (line, record) in rdr.records().enumerate() {
        let row = record.with_context(|| format!("Unreadable CSV row {}", line + 2))?;
        let date = parse_date(row.get(0).unwrap_or_default())?;
        for (code, cell) in codes.iter().zip(row.iter().skip(1)) {
            let cell = cell.trim();
            if cell.is_empty() || cell == "." {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(value) => {
                    if let Some(series) = table.get_mut(code) {
                        series.push(Observation { date, value });
                    }
                }
                Err(e) => warn!("Skipping {} on {}: '{}' ({})", code, date, cell, e),
            }
        }
    }

    for series in table.values_mut() {
        series.sort_by_key(|o| o.date);
    }
    info!("Loaded {} series from combined CSV", table.len());
    Ok(table)
}

pub fn load_combined_csv_path(path: &Path) -> Result<SeriesTable> {
    let file = std::fs::File::open(path).with_context(|| format!("Opening {}", path.display()))?;
    load_combined_csv(file)
}

pub fn latest(series: &[Observation]) -> Option<Observation> {
    series.last().copied()
}

/// Latest value of the series behind `canonical_name`, converted to $B for
/// currency series.
pub fn latest_value(table: &SeriesTable, canonical_name: &str) -> Option<f64> {
    let series_ref = registry::lookup(canonical_name).ok()?;
    let obs = table.get(series_ref.source_code).and_then(|s| latest(s))?;
    Some(series_ref.to_billions(obs.value))
}

impl StartingConditions {
    /// Starting liabilities from the latest observations, falling back to
    /// `fallback` for any series the table lacks.
    pub fn from_observations(table: &SeriesTable, fallback: StartingConditions) -> StartingConditions {
        let pick = |name: &str, default: f64| match latest_value(table, name) {
            Some(v) => v,
            None => {
                warn!("No observations for {}; using configured {:.1}", name, default);
                default
            }
        };
        StartingConditions {
            reserves: pick("bank_reserves", fallback.reserves),
            rrp: pick("overnight_reverse_repo", fallback.rrp),
            tga: pick("treasury_general_account", fallback.tga),
            balance_sheet: pick("fed_total_assets", fallback.balance_sheet),
        }
    }
}

impl MarketSnapshot {
    /// Replaces base levels that have observations. Gold and the forward
    /// P/E are not in the registry, and the registry's dollar series is the
    /// broad trade-weighted index rather than DXY, so those three always
    /// come from config.
    pub fn overlay_observations(mut self, table: &SeriesTable) -> MarketSnapshot {
        let fields: [(&str, &mut f64); 4] = [
            ("fed_funds_rate", &mut self.fed_funds_rate),
            ("treasury_10y", &mut self.ten_year_yield),
            ("mortgage_30y", &mut self.mortgage_rate),
            ("sp500", &mut self.sp500_level),
        ];
        for (name, slot) in fields {
            if let Some(v) = latest_value(table, name) {
                *slot = v;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CSV: &str = "\
,WALCL,TOTRESNS,RRPONTSYD,WTREGEN,DGS10
2026-01-07,6580000,,4.2,820000,4.18
2026-01-08,,,3.9,,4.21
2026-01-31 00:00:00,6575000,2950.5,,845000,.
";

    #[test]
    fn parses_sparse_columns() {
        let table = load_combined_csv(CSV.as_bytes()).unwrap();
        assert_eq!(table["WALCL"].len(), 2);
        assert_eq!(table["TOTRESNS"].len(), 1);
        assert_eq!(table["DGS10"].len(), 2);
        let last = latest(&table["RRPONTSYD"]).unwrap();
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
        assert_eq!(last.value, 3.9);
    }

    #[test]
    fn starting_conditions_are_normalized_to_billions() {
        let table = load_combined_csv(CSV.as_bytes()).unwrap();
        let start = StartingConditions::from_observations(&table, StartingConditions::default());
        assert_relative_eq!(start.reserves, 2_950.5);
        assert_relative_eq!(start.rrp, 3.9);
        assert_relative_eq!(start.tga, 845.0);
        assert_relative_eq!(start.balance_sheet, 6_575.0);
    }

    #[test]
    fn missing_series_fall_back() {
        let table = load_combined_csv(",DGS10\n2026-01-02,4.3\n".as_bytes()).unwrap();
        let fallback = StartingConditions::default();
        assert_eq!(StartingConditions::from_observations(&table, fallback), fallback);
        let market = MarketSnapshot::default().overlay_observations(&table);
        assert_eq!(market.ten_year_yield, 4.3);
        assert_eq!(market.gold_spot, MarketSnapshot::default().gold_spot);
    }

    #[test]
    fn broad_dollar_index_does_not_replace_dxy() {
        let table = load_combined_csv(",DTWEXBGS,SP500\n2026-01-02,120.4,6950\n".as_bytes()).unwrap();
        let market = MarketSnapshot::default().overlay_observations(&table);
        assert_eq!(market.dxy, MarketSnapshot::default().dxy);
        assert_eq!(market.sp500_level, 6_950.0);
    }

    #[test]
    fn duplicate_columns_are_an_error() {
        let err = load_combined_csv(",DGS10,WALCL,DGS10\n2026-01-02,4.3,6600000,4.4\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("DGS10"));
    }

    #[test]
    fn bad_date_is_an_error() {
        assert!(load_combined_csv(",DGS10\nyesterday,4.3\n".as_bytes()).is_err());
    }
}
