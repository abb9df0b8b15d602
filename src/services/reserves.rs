// src/services/reserves.rs
//
// Reserve drain ("plumbing") projection. Each month reserves move by
//
//   -treasury_runoff - mbs_runoff + delta_rrp + delta_tga - currency - other
//
// where delta_rrp and delta_tga are signed impacts on reserves (an ON RRP
// drawdown adds reserves, a TGA build drains them).
use std::f64::consts::PI;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::models::{ReservePathPoint, Scenario, StartingConditions};

/// Reserve levels that flag a projected month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerZone {
    /// Caution level in $B; months strictly below it are flagged.
    pub threshold: f64,
    /// Historical stress level in $B (Sep 2019 repo episode).
    pub stress: f64,
}

impl Default for DangerZone {
    fn default() -> Self {
        DangerZone {
            threshold: 2_500.0,
            stress: 1_500.0,
        }
    }
}

impl DangerZone {
    /// Both levels finite and non-negative, stress at or below the caution level.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("threshold", self.threshold), ("stress", self.stress)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProjectionError::InvalidInput(format!(
                    "danger zone {} must be finite and non-negative (got {})",
                    field, value
                )));
            }
        }
        if self.stress > self.threshold {
            return Err(ProjectionError::InvalidInput(format!(
                "stress level {} is above the danger threshold {}",
                self.stress, self.threshold
            )));
        }
        Ok(())
    }
}

/// Seasonal Treasury General Account swing around a mean balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TgaSeasonal {
    pub mean: f64,
    pub amplitude: f64,
    pub period_months: f64,
}

impl TgaSeasonal {
    pub fn validate(&self) -> Result<()> {
        if !(self.mean.is_finite() && self.amplitude.is_finite()) {
            return Err(ProjectionError::InvalidInput(
                "TGA seasonal mean and amplitude must be finite".to_string(),
            ));
        }
        if !self.period_months.is_finite() || self.period_months <= 0.0 {
            return Err(ProjectionError::InvalidInput(format!(
                "TGA seasonal period must be a positive number of months (got {})",
                self.period_months
            )));
        }
        Ok(())
    }

    pub fn level_at(&self, month: u32) -> f64 {
        self.mean + self.amplitude * (2.0 * PI * month as f64 / self.period_months).sin()
    }
}

/// Assumptions behind the non-QT flows. The default is all zero, which
/// reduces the projection to pure runoff.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowAssumptions {
    /// Drain the remaining ON RRP balance into reserves in month 1.
    pub rrp_drawdown: bool,
    pub tga_seasonal: Option<TgaSeasonal>,
    /// Currency growth drain, $B per month.
    pub currency_drain: f64,
    /// Other liability growth, $B per month.
    pub other_drains: f64,
}

impl FlowAssumptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(tga) = &self.tga_seasonal {
            tga.validate()?;
        }
        for (field, value) in [("currency_drain", self.currency_drain), ("other_drains", self.other_drains)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProjectionError::InvalidInput(format!(
                    "{} must be finite and non-negative (got {})",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

/// Monthly reserve impacts. Index `m - 1` holds month `m`; missing entries
/// count as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowAdjustments {
    pub delta_rrp: Vec<f64>,
    pub delta_tga: Vec<f64>,
    pub currency_drain: f64,
    pub other_drains: f64,
}

impl FlowAdjustments {
    pub fn rrp_at(&self, month: u32) -> f64 {
        month_entry(&self.delta_rrp, month)
    }

    pub fn tga_at(&self, month: u32) -> f64 {
        month_entry(&self.delta_tga, month)
    }

    /// Materializes the adjustment series for `horizon` months from the
    /// starting liability levels.
    pub fn from_assumptions(
        assumptions: &FlowAssumptions,
        start: &StartingConditions,
        horizon: u32,
    ) -> Self {
        let mut delta_rrp = vec![0.0; horizon as usize];
        if assumptions.rrp_drawdown && start.rrp > 0.0 {
            if let Some(first) = delta_rrp.first_mut() {
                *first = start.rrp;
            }
        }

        let delta_tga = match assumptions.tga_seasonal {
            Some(tga) => {
                let mut prev = start.tga;
                (1..=horizon)
                    .map(|m| {
                        let level = tga.level_at(m);
                        let impact = -(level - prev);
                        prev = level;
                        impact
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        FlowAdjustments {
            delta_rrp,
            delta_tga,
            currency_drain: assumptions.currency_drain,
            other_drains: assumptions.other_drains,
        }
    }
}

fn month_entry(series: &[f64], month: u32) -> f64 {
    match month {
        0 => 0.0,
        m => series.get(m as usize - 1).copied().unwrap_or(0.0),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReserveProjector {
    pub danger: DangerZone,
    pub flows: FlowAdjustments,
}

impl ReserveProjector {
    pub fn new(danger: DangerZone, flows: FlowAdjustments) -> Self {
        ReserveProjector { danger, flows }
    }

    pub fn project(&self, scenario: &Scenario, starting_reserves: f64) -> Result<Vec<ReservePathPoint>> {
        if !starting_reserves.is_finite() || starting_reserves < 0.0 {
            return Err(ProjectionError::InvalidInput(format!(
                "starting reserves must be finite and non-negative (got {})",
                starting_reserves
            )));
        }

        let horizon = scenario.horizon_months();
        let mut path = Vec::with_capacity(horizon as usize + 1);
        path.push(self.point(0, starting_reserves, false));

        let mut reserves = starting_reserves;
        for m in 1..=horizon {
            let (treasury, mbs) = scenario.runoff_at(m);
            let raw = reserves - treasury - mbs + self.flows.rrp_at(m) + self.flows.tga_at(m)
                - self.flows.currency_drain
                - self.flows.other_drains;
            let floored = raw < 0.0;
            reserves = raw.max(0.0);
            if floored {
                debug!("{}: reserves floored at zero in month {}", scenario.name(), m);
            }
            path.push(self.point(m, reserves, floored));
        }

        if let Some(first) = path.iter().find(|p| p.danger_zone) {
            info!(
                "{}: reserves enter the danger zone (< {:.0}B) in month {}",
                scenario.name(),
                self.danger.threshold,
                first.month_index
            );
        }
        Ok(path)
    }

    fn point(&self, month_index: u32, reserves: f64, floored: bool) -> ReservePathPoint {
        ReservePathPoint {
            month_index,
            reserves,
            danger_zone: floored || reserves < self.danger.threshold,
            stress: reserves < self.danger.stress,
            floored,
        }
    }
}

/// Projects with zero flows and the default danger zone.
pub fn project(scenario: &Scenario, starting_reserves: f64) -> Result<Vec<ReservePathPoint>> {
    ReserveProjector::default().project(scenario, starting_reserves)
}

/// First month at or after month 0 flagged by `pred`.
pub fn first_month<F>(path: &[ReservePathPoint], pred: F) -> Option<u32>
where
    F: Fn(&ReservePathPoint) -> bool,
{
    path.iter().find(|p| pred(p)).map(|p| p.month_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scenarios::{canonical_by_name, define, define_easing, WARSH_HAWK};
    use approx::assert_relative_eq;

    #[test]
    fn zero_horizon_is_the_starting_point() {
        let s = define("Flat", 60.0, 35.0, 3.5, 5_000.0, 0).unwrap();
        let path = project(&s, 3_000.0).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].reserves, 3_000.0);
        assert_eq!(path[0].month_index, 0);
    }

    #[test]
    fn warsh_hawk_drains_95b_a_month() {
        let hawk = canonical_by_name(WARSH_HAWK).unwrap();
        let path = project(&hawk, 3_000.0).unwrap();
        assert_eq!(path.len(), 25);
        assert_relative_eq!(path[12].reserves, 1_860.0, epsilon = 1e-9);
        assert_relative_eq!(path[4].reserves, 2_620.0, epsilon = 1e-9);
        assert!(!path[5].danger_zone);
        assert!(path[6].danger_zone);
        assert_eq!(first_month(&path, |p| p.danger_zone), Some(6));
    }

    #[test]
    fn clamps_at_zero_and_flags() {
        let s = define("Drain", 400.0, 200.0, 3.0, 1_000.0, 6).unwrap();
        let path = project(&s, 1_000.0).unwrap();
        assert_eq!(path[1].reserves, 400.0);
        assert_eq!(path[2].reserves, 0.0);
        assert!(path[2].floored && path[2].danger_zone && path[2].stress);
        assert!(path.iter().all(|p| p.reserves >= 0.0));
    }

    #[test]
    fn purchases_add_reserves_after_lead_in() {
        let s = define_easing("Pivot", -50.0, -25.0, 2.0, 7_500.0, 8)
            .unwrap()
            .with_lead_in(2, 60.0, 35.0)
            .unwrap();
        let path = project(&s, 3_000.0).unwrap();
        assert_relative_eq!(path[2].reserves, 2_810.0);
        assert_relative_eq!(path[3].reserves, 2_885.0);
        assert_relative_eq!(path[8].reserves, 3_260.0);
    }

    #[test]
    fn flows_offset_runoff() {
        let s = define("Offset", 50.0, 0.0, 3.0, 6_000.0, 3).unwrap();
        let flows = FlowAdjustments {
            delta_rrp: vec![80.0],
            delta_tga: vec![0.0, -20.0],
            currency_drain: 0.0,
            other_drains: 0.0,
        };
        let path = ReserveProjector::new(DangerZone::default(), flows)
            .project(&s, 3_000.0)
            .unwrap();
        let levels: Vec<f64> = path.iter().map(|p| p.reserves).collect();
        assert_eq!(levels, vec![3_000.0, 3_030.0, 2_960.0, 2_910.0]);
    }

    #[test]
    fn plumbing_assumptions_drain_rrp_and_track_tga() {
        let assumptions = FlowAssumptions {
            rrp_drawdown: true,
            tga_seasonal: Some(TgaSeasonal {
                mean: 650.0,
                amplitude: 100.0,
                period_months: 6.0,
            }),
            currency_drain: 5.5,
            other_drains: 2.0,
        };
        let start = StartingConditions {
            reserves: 3_000.0,
            rrp: 12.0,
            tga: 850.0,
            balance_sheet: 6_600.0,
        };
        let flows = FlowAdjustments::from_assumptions(&assumptions, &start, 6);
        assert_eq!(flows.rrp_at(1), 12.0);
        assert_eq!(flows.rrp_at(2), 0.0);
        // TGA falls from 850 toward the seasonal path, releasing reserves.
        let tga1 = 650.0 + 100.0 * (2.0 * PI / 6.0).sin();
        assert_relative_eq!(flows.tga_at(1), 850.0 - tga1, epsilon = 1e-9);
        // A full period nets the seasonal swing back out.
        let net: f64 = (2..=6).map(|m| flows.tga_at(m)).sum();
        assert_relative_eq!(net, tga1 - 650.0, epsilon = 1e-9);
    }

    #[test]
    fn custom_danger_zone_moves_the_flags() {
        let hawk = canonical_by_name(WARSH_HAWK).unwrap();
        let danger = DangerZone {
            threshold: 2_000.0,
            stress: 1_860.0,
        };
        let path = ReserveProjector::new(danger, FlowAdjustments::default())
            .project(&hawk, 3_000.0)
            .unwrap();
        // 3000 - 95m < 2000 first holds at m = 11 (1955).
        assert!(!path[10].danger_zone);
        assert_eq!(first_month(&path, |p| p.danger_zone), Some(11));
        // Month 12 sits exactly on the stress level, which does not count.
        assert_eq!(path[12].reserves, 1_860.0);
        assert!(!path[12].stress);
        assert_eq!(first_month(&path, |p| p.stress), Some(13));
    }

    #[test]
    fn danger_zone_validation() {
        assert!(DangerZone::default().validate().is_ok());
        let inverted = DangerZone {
            threshold: 1_000.0,
            stress: 1_500.0,
        };
        assert!(matches!(inverted.validate(), Err(ProjectionError::InvalidInput(_))));
        let nan = DangerZone {
            threshold: f64::NAN,
            stress: 1_500.0,
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn flow_assumption_validation() {
        let seasonal = |period_months: f64| FlowAssumptions {
            tga_seasonal: Some(TgaSeasonal {
                mean: 650.0,
                amplitude: 100.0,
                period_months,
            }),
            ..FlowAssumptions::default()
        };
        assert!(seasonal(6.0).validate().is_ok());
        for period in [0.0, -6.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(seasonal(period).validate(), Err(ProjectionError::InvalidInput(_))));
        }

        let negative_drain = FlowAssumptions {
            currency_drain: -5.5,
            ..FlowAssumptions::default()
        };
        assert!(negative_drain.validate().is_err());
        let nan_drain = FlowAssumptions {
            other_drains: f64::NAN,
            ..FlowAssumptions::default()
        };
        assert!(nan_drain.validate().is_err());
        assert!(FlowAssumptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_negative_start() {
        let s = define("Any", 1.0, 1.0, 1.0, 1.0, 1).unwrap();
        assert!(matches!(project(&s, -1.0), Err(ProjectionError::InvalidInput(_))));
        assert!(project(&s, f64::NAN).is_err());
    }
}
