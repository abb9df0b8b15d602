// src/services/estimator.rs
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::models::{Band, DerivedMetrics, MarketSnapshot, ReservePathPoint, Scenario};

pub const APPROXIMATION_NOTE: &str = "Heuristic linear sensitivities applied to the cumulative \
balance-sheet change; illustrative bands, not a regression fit or a forecast.";

/// Linear sensitivity ranges. Each metric is evaluated at every
/// combination of band ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivities {
    /// Term premium, bp per $100B of duration removed.
    pub term_premium_bp_per_100bn: Band,
    /// Share of the policy-rate change passed to the 10y yield.
    pub policy_passthrough: Band,
    /// Mortgage spread widening, bp per $100B of MBS runoff.
    pub mortgage_spread_bp_per_100bn_mbs: Band,
    /// P/E points lost per 100bp rise in the 10y yield.
    pub pe_points_per_100bp: Band,
    /// Percent gold falls per $1T of balance-sheet reduction.
    pub gold_pct_per_trillion: Band,
    /// Percent the dollar index rises per $1T of balance-sheet reduction.
    pub dxy_pct_per_trillion: Band,
}

impl Default for Sensitivities {
    fn default() -> Self {
        Sensitivities {
            term_premium_bp_per_100bn: Band::new(3.0, 8.0),
            policy_passthrough: Band::new(0.25, 0.50),
            mortgage_spread_bp_per_100bn_mbs: Band::new(1.0, 3.0),
            pe_points_per_100bp: Band::new(2.0, 3.0),
            gold_pct_per_trillion: Band::new(4.0, 8.0),
            dxy_pct_per_trillion: Band::new(1.5, 3.0),
        }
    }
}

/// Net balance-sheet reduction over the horizon as (total, MBS part).
/// Negative when the scenario is buying.
pub fn cumulative_runoff(scenario: &Scenario) -> (f64, f64) {
    (1..=scenario.horizon_months()).fold((0.0, 0.0), |(total, mbs_total), m| {
        let (treasury, mbs) = scenario.runoff_at(m);
        (total + treasury + mbs, mbs_total + mbs)
    })
}

fn cross<F>(a: Band, b: Band, f: F) -> Band
where
    F: Fn(f64, f64) -> f64,
{
    let values = a
        .ends()
        .into_iter()
        .flat_map(|x| b.ends().into_iter().map(move |y| (x, y)))
        .map(|(x, y)| f(x, y));
    // Both inputs have two ends, so there is always something to cover.
    Band::covering(values).unwrap_or_else(|| Band::point(f(a.low, b.low)))
}

pub fn estimate(
    scenario: &Scenario,
    reserve_path: &[ReservePathPoint],
    market: &MarketSnapshot,
    sens: &Sensitivities,
) -> DerivedMetrics {
    let (runoff, mbs_runoff) = cumulative_runoff(scenario);
    let rate_change = scenario.target_fed_funds_rate() - market.fed_funds_rate;
    if reserve_path.iter().any(|p| p.floored) {
        warn!(
            "{}: reserves hit zero inside the horizon; linear estimates are unreliable there",
            scenario.name()
        );
    }
    debug!(
        "{}: cumulative runoff {:.1}B (MBS {:.1}B), policy change {:+.2}pp",
        scenario.name(),
        runoff,
        mbs_runoff,
        rate_change
    );

    // 10y yield shift in bp.
    let yield_shift_bp = cross(sens.term_premium_bp_per_100bn, sens.policy_passthrough, |tp, pass| {
        tp * runoff / 100.0 + pass * rate_change * 100.0
    });
    let ten_year_yield = Band::new(
        market.ten_year_yield + yield_shift_bp.low / 100.0,
        market.ten_year_yield + yield_shift_bp.high / 100.0,
    );

    let mortgage_rate = cross(yield_shift_bp, sens.mortgage_spread_bp_per_100bn_mbs, |dy, spread| {
        market.mortgage_rate + (dy + spread * mbs_runoff / 100.0) / 100.0
    });

    let eps = if market.sp500_forward_pe > 0.0 {
        market.sp500_level / market.sp500_forward_pe
    } else {
        0.0
    };
    let sp500_fair_value = cross(yield_shift_bp, sens.pe_points_per_100bp, |dy, k| {
        eps * (market.sp500_forward_pe - k * dy / 100.0).max(1.0)
    });

    let runoff_tn = runoff / 1_000.0;
    let gold_range = Band::covering(
        sens.gold_pct_per_trillion
            .ends()
            .map(|g| market.gold_spot * (1.0 - g * runoff_tn / 100.0).max(0.0)),
    )
    .unwrap_or_else(|| Band::point(market.gold_spot));
    let dxy_range = Band::covering(
        sens.dxy_pct_per_trillion
            .ends()
            .map(|d| market.dxy * (1.0 + d * runoff_tn / 100.0).max(0.0)),
    )
    .unwrap_or_else(|| Band::point(market.dxy));

    DerivedMetrics {
        ten_year_yield,
        mortgage_rate,
        sp500_fair_value,
        gold_range,
        dxy_range,
        approximate: true,
        note: APPROXIMATION_NOTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reserves::project;
    use crate::services::scenarios::{canonical_by_name, define, CRISIS_REVERSAL, WARSH_HAWK};
    use approx::assert_relative_eq;

    fn flat_market() -> MarketSnapshot {
        MarketSnapshot {
            fed_funds_rate: 3.5,
            ten_year_yield: 4.0,
            mortgage_rate: 6.0,
            sp500_level: 5_000.0,
            sp500_forward_pe: 20.0,
            gold_spot: 4_000.0,
            dxy: 100.0,
        }
    }

    #[test]
    fn hawk_runoff_totals() {
        let hawk = canonical_by_name(WARSH_HAWK).unwrap();
        let (total, mbs) = cumulative_runoff(&hawk);
        assert_relative_eq!(total, 2_280.0);
        assert_relative_eq!(mbs, 840.0);
    }

    #[test]
    fn reversal_nets_purchases_against_lead_in() {
        let s = canonical_by_name(CRISIS_REVERSAL).unwrap();
        let (total, _) = cumulative_runoff(&s);
        assert_relative_eq!(total, 5.0 * 95.0 - 19.0 * 75.0);
    }

    #[test]
    fn tightening_lifts_yields_and_cuts_gold() {
        // $1T of runoff, policy rate unchanged.
        let s = define("Tight", 100.0, 0.0, 3.5, 5_000.0, 10).unwrap();
        let path = project(&s, 3_000.0).unwrap();
        let m = estimate(&s, &path, &flat_market(), &Sensitivities::default());

        assert_relative_eq!(m.ten_year_yield.low, 4.30, epsilon = 1e-9);
        assert_relative_eq!(m.ten_year_yield.high, 4.80, epsilon = 1e-9);
        assert_relative_eq!(m.mortgage_rate.low, 6.30, epsilon = 1e-9);
        assert_relative_eq!(m.mortgage_rate.high, 6.80, epsilon = 1e-9);
        // EPS 250; P/E falls 0.6..2.4 points.
        assert_relative_eq!(m.sp500_fair_value.low, 250.0 * 17.6, epsilon = 1e-6);
        assert_relative_eq!(m.sp500_fair_value.high, 250.0 * 19.4, epsilon = 1e-6);
        assert_relative_eq!(m.gold_range.low, 3_680.0, epsilon = 1e-9);
        assert_relative_eq!(m.gold_range.high, 3_840.0, epsilon = 1e-9);
        assert_relative_eq!(m.dxy_range.low, 101.5, epsilon = 1e-9);
        assert_relative_eq!(m.dxy_range.high, 103.0, epsilon = 1e-9);
        assert!(m.approximate);
    }

    #[test]
    fn rate_cut_without_runoff_lowers_yields() {
        let s = define("Cut", 0.0, 0.0, 2.5, 6_600.0, 12).unwrap();
        let path = project(&s, 3_000.0).unwrap();
        let m = estimate(&s, &path, &flat_market(), &Sensitivities::default());
        assert_relative_eq!(m.ten_year_yield.low, 3.50, epsilon = 1e-9);
        assert_relative_eq!(m.ten_year_yield.high, 3.75, epsilon = 1e-9);
        assert_eq!(m.gold_range, Band::point(4_000.0));
        assert!(m.sp500_fair_value.low > 5_000.0);
    }

    #[test]
    fn every_band_is_ordered() {
        let market = MarketSnapshot::default();
        for name in [WARSH_HAWK, CRISIS_REVERSAL] {
            let s = canonical_by_name(name).unwrap();
            let path = project(&s, 3_000.0).unwrap();
            let m = estimate(&s, &path, &market, &Sensitivities::default());
            for b in [m.ten_year_yield, m.mortgage_rate, m.sp500_fair_value, m.gold_range, m.dxy_range] {
                assert!(b.low <= b.high);
            }
        }
    }
}
