// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

/// Units a source publishes a series in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    MillionsUsd,
    BillionsUsd,
    Percent,
    Index,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRef {
    pub canonical_name: &'static str,
    pub source_code: &'static str,
    pub frequency: Frequency,
    pub units: Units,
    pub description: &'static str,
}

impl SeriesRef {
    /// Converts a raw observation to billions of USD. Non-currency series
    /// pass through unchanged.
    pub fn to_billions(&self, value: f64) -> f64 {
        match self.units {
            Units::MillionsUsd => value / 1_000.0,
            _ => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A runoff pace applied to the first `months` months of a scenario
/// before the scenario's own pace takes over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadIn {
    pub months: u32,
    pub treasury_runoff: f64,
    pub mbs_runoff: f64,
}

/// A named bundle of policy-pace assumptions. Built through
/// `services::scenarios::define` and immutable afterwards.
///
/// Runoff is in $B per month, positive when the balance sheet shrinks.
/// Easing scenarios carry negative runoff to represent purchases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub(crate) name: String,
    pub(crate) monthly_treasury_runoff: f64,
    pub(crate) monthly_mbs_runoff: f64,
    pub(crate) target_fed_funds_rate: f64,
    pub(crate) target_balance_sheet: f64,
    pub(crate) horizon_months: u32,
    pub(crate) easing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) lead_in: Option<LeadIn>,
}

impl Scenario {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn monthly_treasury_runoff(&self) -> f64 {
        self.monthly_treasury_runoff
    }

    pub fn monthly_mbs_runoff(&self) -> f64 {
        self.monthly_mbs_runoff
    }

    pub fn target_fed_funds_rate(&self) -> f64 {
        self.target_fed_funds_rate
    }

    pub fn target_balance_sheet(&self) -> f64 {
        self.target_balance_sheet
    }

    pub fn horizon_months(&self) -> u32 {
        self.horizon_months
    }

    pub fn is_easing(&self) -> bool {
        self.easing
    }

    pub fn lead_in(&self) -> Option<LeadIn> {
        self.lead_in
    }

    /// Treasury and MBS runoff in effect during `month` (1-based).
    pub fn runoff_at(&self, month: u32) -> (f64, f64) {
        match self.lead_in {
            Some(lead) if month <= lead.months => (lead.treasury_runoff, lead.mbs_runoff),
            _ => (self.monthly_treasury_runoff, self.monthly_mbs_runoff),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservePathPoint {
    pub month_index: u32,
    pub reserves: f64,
    /// Reserves below the danger threshold (or clamped at zero).
    pub danger_zone: bool,
    /// Reserves below the historical stress level.
    pub stress: bool,
    /// The raw balance went negative and was clamped at zero.
    pub floored: bool,
}

/// Low/high band for a heuristic estimate. `low <= high` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Band { low: a, high: b }
        } else {
            Band { low: b, high: a }
        }
    }

    pub fn point(v: f64) -> Self {
        Band { low: v, high: v }
    }

    /// Tightest band covering every value. `None` for an empty input.
    pub fn covering<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Band::point(v)),
            Some(b) => Some(Band {
                low: b.low.min(v),
                high: b.high.max(v),
            }),
        })
    }

    pub fn ends(&self) -> [f64; 2] {
        [self.low, self.high]
    }

    pub fn mid(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.low && v <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub ten_year_yield: Band,
    pub mortgage_rate: Band,
    pub sp500_fair_value: Band,
    pub gold_range: Band,
    pub dxy_range: Band,
    pub approximate: bool,
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub scenario: Scenario,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_month: Option<NaiveDate>,
    pub reserve_path: Vec<ReservePathPoint>,
    /// Net balance-sheet reduction over the horizon; negative for purchases.
    pub cumulative_runoff: f64,
    pub balance_sheet_end: f64,
    pub first_danger_month: Option<u32>,
    pub first_stress_month: Option<u32>,
    pub ten_year_yield: Band,
    pub mortgage_rate: Band,
    pub sp500_fair_value: Band,
    pub gold_range: Band,
    pub dxy_range: Band,
    pub approximate: bool,
    pub note: &'static str,
}

impl ProjectionResult {
    pub fn end_reserves(&self) -> f64 {
        self.reserve_path.last().map(|p| p.reserves).unwrap_or(0.0)
    }

    pub fn reserves_at(&self, month: u32) -> Option<f64> {
        self.reserve_path
            .get(month as usize)
            .map(|p| p.reserves)
    }
}

/// Fed liability levels at the start of a projection, in $B.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingConditions {
    pub reserves: f64,
    pub rrp: f64,
    pub tga: f64,
    pub balance_sheet: f64,
}

impl Default for StartingConditions {
    fn default() -> Self {
        StartingConditions {
            reserves: 3_000.0,
            rrp: 5.0,
            tga: 850.0,
            balance_sheet: 6_600.0,
        }
    }
}

/// Base market levels the estimator shifts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub fed_funds_rate: f64,
    pub ten_year_yield: f64,
    pub mortgage_rate: f64,
    pub sp500_level: f64,
    pub sp500_forward_pe: f64,
    pub gold_spot: f64,
    /// ICE US Dollar Index level.
    pub dxy: f64,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        MarketSnapshot {
            fed_funds_rate: 3.75,
            ten_year_yield: 4.25,
            mortgage_rate: 6.20,
            sp500_level: 6_900.0,
            sp500_forward_pe: 22.0,
            gold_spot: 4_800.0,
            dxy: 97.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_orders_its_ends() {
        let b = Band::new(5.0, 2.0);
        assert_eq!(b.low, 2.0);
        assert_eq!(b.high, 5.0);
        assert!(b.contains(3.0));
        assert_eq!(b.mid(), 3.5);
    }

    #[test]
    fn covering_takes_min_and_max() {
        let b = Band::covering([3.0, -1.0, 7.5, 2.0]).unwrap();
        assert_eq!(b, Band { low: -1.0, high: 7.5 });
        assert!(Band::covering(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn millions_are_scaled_to_billions() {
        let s = SeriesRef {
            canonical_name: "treasury_general_account",
            source_code: "WTREGEN",
            frequency: Frequency::Weekly,
            units: Units::MillionsUsd,
            description: "",
        };
        assert_eq!(s.to_billions(850_000.0), 850.0);
    }
}
