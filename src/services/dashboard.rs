// src/services/dashboard.rs
use chrono::NaiveDate;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::models::{MarketSnapshot, ProjectionResult, Scenario, StartingConditions};
use crate::services::estimator::{cumulative_runoff, estimate, Sensitivities};
use crate::services::reserves::{first_month, DangerZone, FlowAdjustments, FlowAssumptions, ReserveProjector};

/// Everything a dashboard run needs besides the scenarios themselves.
#[derive(Debug, Clone, Default)]
pub struct ProjectionContext {
    pub starting: StartingConditions,
    pub market: MarketSnapshot,
    pub sensitivities: Sensitivities,
    pub danger: DangerZone,
    pub flows: FlowAssumptions,
    /// Calendar month of month 0, used only for labels.
    pub start_month: Option<NaiveDate>,
}

impl ProjectionContext {
    pub fn run(&self, scenario: &Scenario) -> Result<ProjectionResult> {
        let flows = FlowAdjustments::from_assumptions(&self.flows, &self.starting, scenario.horizon_months());
        let projector = ReserveProjector::new(self.danger, flows);
        let reserve_path = projector.project(scenario, self.starting.reserves)?;
        let metrics = estimate(scenario, &reserve_path, &self.market, &self.sensitivities);
        let (runoff, _) = cumulative_runoff(scenario);

        Ok(ProjectionResult {
            scenario: scenario.clone(),
            start_month: self.start_month,
            first_danger_month: first_month(&reserve_path, |p| p.danger_zone),
            first_stress_month: first_month(&reserve_path, |p| p.stress),
            reserve_path,
            cumulative_runoff: runoff,
            balance_sheet_end: (self.starting.balance_sheet - runoff).max(0.0),
            ten_year_yield: metrics.ten_year_yield,
            mortgage_rate: metrics.mortgage_rate,
            sp500_fair_value: metrics.sp500_fair_value,
            gold_range: metrics.gold_range,
            dxy_range: metrics.dxy_range,
            approximate: metrics.approximate,
            note: metrics.note,
        })
    }
}

/// Runs every scenario, preserving input order.
pub fn compare(scenarios: &[Scenario], ctx: &ProjectionContext) -> Result<Vec<ProjectionResult>> {
    info!("Projecting {} scenarios from {:.1}B of reserves", scenarios.len(), ctx.starting.reserves);
    scenarios.iter().map(|s| ctx.run(s)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub scenario: String,
    pub months_until_danger: Option<u32>,
    pub months_until_stress: Option<u32>,
    pub reserves_12m: Option<f64>,
    pub reserves_24m: Option<f64>,
    pub reserves_end: f64,
    /// Starting minus ending reserves.
    pub total_reserve_drain: f64,
    pub balance_sheet_end: f64,
    /// Ending balance sheet minus the scenario's target.
    pub target_gap: f64,
}

pub fn summarize(results: &[ProjectionResult]) -> Vec<SummaryRow> {
    results
        .iter()
        .map(|r| {
            let start = r.reserves_at(0).unwrap_or(0.0);
            SummaryRow {
                scenario: r.scenario.name().to_string(),
                months_until_danger: r.first_danger_month,
                months_until_stress: r.first_stress_month,
                reserves_12m: r.reserves_at(12),
                reserves_24m: r.reserves_at(24),
                reserves_end: r.end_reserves(),
                total_reserve_drain: start - r.end_reserves(),
                balance_sheet_end: r.balance_sheet_end,
                target_gap: r.balance_sheet_end - r.scenario.target_balance_sheet(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scenarios::{canonical, define, WARSH_HAWK};
    use approx::assert_relative_eq;

    #[test]
    fn compare_keeps_input_order() {
        let mut scenarios = canonical();
        scenarios.reverse();
        let results = compare(&scenarios, &ProjectionContext::default()).unwrap();
        let names: Vec<_> = results.iter().map(|r| r.scenario.name()).collect();
        let expected: Vec<_> = scenarios.iter().map(|s| s.name()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(compare(&[], &ProjectionContext::default()).unwrap().is_empty());
    }

    #[test]
    fn summary_for_warsh_hawk() {
        let ctx = ProjectionContext::default();
        let results = compare(&canonical(), &ctx).unwrap();
        let rows = summarize(&results);
        let hawk = rows.iter().find(|r| r.scenario == WARSH_HAWK).unwrap();
        assert_eq!(hawk.months_until_danger, Some(6));
        assert_eq!(hawk.months_until_stress, Some(16));
        assert_relative_eq!(hawk.reserves_12m.unwrap(), 1_860.0);
        assert_relative_eq!(hawk.reserves_24m.unwrap(), 720.0);
        assert_relative_eq!(hawk.total_reserve_drain, 2_280.0);
        assert_relative_eq!(hawk.balance_sheet_end, 6_600.0 - 2_280.0);
        assert_relative_eq!(hawk.target_gap, 20.0);
    }

    #[test]
    fn short_horizon_has_no_24m_value() {
        let s = define("Short", 10.0, 0.0, 3.0, 6_000.0, 12).unwrap();
        let results = compare(&[s], &ProjectionContext::default()).unwrap();
        let row = &summarize(&results)[0];
        assert!(row.reserves_12m.is_some());
        assert!(row.reserves_24m.is_none());
    }

    #[test]
    fn results_are_tagged_approximate() {
        let results = compare(&canonical(), &ProjectionContext::default()).unwrap();
        assert!(results.iter().all(|r| r.approximate && !r.note.is_empty()));
    }
}
