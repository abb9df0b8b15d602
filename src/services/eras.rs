// src/services/eras.rs
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::Serialize;

use crate::error::Result;
use crate::models::Observation;
use crate::services::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EraKind {
    Easing,
    Tightening,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolicyEra {
    pub name: &'static str,
    pub kind: EraKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

const ERA_TABLE: [(&str, EraKind, (i32, u32, u32), (i32, u32, u32)); 6] = [
    ("QE1", EraKind::Easing, (2008, 11, 1), (2010, 3, 31)),
    ("QE2", EraKind::Easing, (2010, 11, 1), (2011, 6, 30)),
    ("QE3", EraKind::Easing, (2012, 9, 1), (2014, 10, 31)),
    ("Pandemic QE", EraKind::Easing, (2020, 3, 1), (2022, 3, 31)),
    ("QT1", EraKind::Tightening, (2017, 10, 1), (2019, 9, 30)),
    ("QT2", EraKind::Tightening, (2022, 6, 1), (2025, 12, 31)),
];

/// Historical QE and QT episodes, easing first.
pub fn eras() -> Vec<PolicyEra> {
    ERA_TABLE
        .iter()
        .filter_map(|&(name, kind, (sy, sm, sd), (ey, em, ed))| {
            Some(PolicyEra {
                name,
                kind,
                start: NaiveDate::from_ymd_opt(sy, sm, sd)?,
                end: NaiveDate::from_ymd_opt(ey, em, ed)?,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EraStatistics {
    pub era: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Change in Fed total assets over the era, $T.
    pub balance_sheet_change: Option<f64>,
    /// Change in M2 over the era, $T.
    pub m2_change: Option<f64>,
    pub avg_money_multiplier: Option<f64>,
    pub correlation: Option<f64>,
}

type MonthKey = (i32, u32);

/// Month-end levels of `series` in $B, scaled by the registry units of
/// `canonical_name`.
fn month_end_billions(canonical_name: &str, series: &[Observation]) -> Result<BTreeMap<MonthKey, f64>> {
    let series_ref = registry::lookup(canonical_name)?;
    Ok(month_end(series)
        .into_iter()
        .map(|(k, v)| (k, series_ref.to_billions(v)))
        .collect())
}

/// Last observation of each calendar month, forward-filled over gaps.
fn month_end(series: &[Observation]) -> BTreeMap<MonthKey, f64> {
    let mut out = BTreeMap::new();
    for o in series {
        out.insert((o.date.year(), o.date.month()), o.value);
    }
    let (Some(&first), Some(&last)) = (out.keys().next(), out.keys().next_back()) else {
        return out;
    };
    let mut filled = BTreeMap::new();
    let mut carry = None;
    let mut key: MonthKey = first;
    loop {
        if let Some(v) = out.get(&key) {
            carry = Some(*v);
        }
        if let Some(v) = carry {
            filled.insert(key, v);
        }
        if key == last {
            break;
        }
        key = if key.1 == 12 { (key.0 + 1, 1) } else { (key.0, key.1 + 1) };
    }
    filled
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(xs)?, mean(ys)?);
    let (mut cov, mut vx, mut vy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        None
    } else {
        Some(cov / (vx.sqrt() * vy.sqrt()))
    }
}

/// Per-era balance sheet and money statistics. Each series is taken in the
/// units it is published in and scaled through the series registry.
pub fn era_statistics(walcl: &[Observation], m2: &[Observation], base: &[Observation]) -> Result<Vec<EraStatistics>> {
    let walcl = month_end_billions("fed_total_assets", walcl)?;
    let m2 = month_end_billions("m2_money_supply", m2)?;
    let base = month_end_billions("monetary_base", base)?;

    Ok(eras()
        .into_iter()
        .map(|era| {
            let from = (era.start.year(), era.start.month());
            let to = (era.end.year(), era.end.month());
            // Months where all three series have a value, in $B.
            let rows: Vec<(f64, f64, f64)> = walcl
                .range(from..=to)
                .filter_map(|(k, w)| Some((*w, *m2.get(k)?, *base.get(k)?)))
                .collect();
            if rows.is_empty() {
                warn!("No overlapping observations for era {}", era.name);
            }

            let bs: Vec<f64> = rows.iter().map(|r| r.0 / 1e3).collect();
            let money: Vec<f64> = rows.iter().map(|r| r.1 / 1e3).collect();
            let multipliers: Vec<f64> = rows
                .iter()
                .filter(|r| r.2 != 0.0)
                .map(|r| r.1 / r.2)
                .collect();

            EraStatistics {
                era: era.name,
                start: era.start,
                end: era.end,
                balance_sheet_change: bs.first().zip(bs.last()).map(|(a, b)| b - a),
                m2_change: money.first().zip(money.last()).map(|(a, b)| b - a),
                avg_money_multiplier: mean(&multipliers),
                correlation: pearson(&bs, &money),
            }
        })
        .collect())
}
