// src/services/scenarios.rs
use log::{debug, warn};
use serde::Deserialize;

use crate::error::{ProjectionError, Result};
use crate::models::{LeadIn, Scenario};

/// Longest horizon accepted, in months.
pub const MAX_HORIZON_MONTHS: i64 = 600;

pub const WARSH_HAWK: &str = "Warsh Hawk";
pub const MODERATE: &str = "Moderate";
pub const STATUS_QUO: &str = "Status Quo";
pub const CRISIS_REVERSAL: &str = "Crisis Reversal";

const CANONICAL_HORIZON: u32 = 24;

/// Defines a tightening (or neutral) scenario. Negative runoff or rate is
/// rejected; use `define_easing` for purchase scenarios.
pub fn define(
    name: impl Into<String>,
    treasury_runoff: f64,
    mbs_runoff: f64,
    target_rate: f64,
    target_balance_sheet: f64,
    horizon_months: i64,
) -> Result<Scenario> {
    build(
        name.into(),
        treasury_runoff,
        mbs_runoff,
        target_rate,
        target_balance_sheet,
        horizon_months,
        false,
    )
}

/// Defines an easing scenario. Runoff values may be negative, meaning the
/// central bank is buying securities.
pub fn define_easing(
    name: impl Into<String>,
    treasury_runoff: f64,
    mbs_runoff: f64,
    target_rate: f64,
    target_balance_sheet: f64,
    horizon_months: i64,
) -> Result<Scenario> {
    build(
        name.into(),
        treasury_runoff,
        mbs_runoff,
        target_rate,
        target_balance_sheet,
        horizon_months,
        true,
    )
}

fn build(
    name: String,
    treasury_runoff: f64,
    mbs_runoff: f64,
    target_rate: f64,
    target_balance_sheet: f64,
    horizon_months: i64,
    easing: bool,
) -> Result<Scenario> {
    let reject = |reason: String| {
        warn!("Rejecting scenario '{}': {}", name, reason);
        Err(ProjectionError::invalid_scenario(name.clone(), reason))
    };

    if name.trim().is_empty() {
        return reject("name must not be blank".to_string());
    }
    if horizon_months < 0 {
        return reject(format!("horizon_months must not be negative (got {})", horizon_months));
    }
    if horizon_months > MAX_HORIZON_MONTHS {
        return reject(format!(
            "horizon_months must be at most {} (got {})",
            MAX_HORIZON_MONTHS, horizon_months
        ));
    }
    for (field, value) in [
        ("monthly_treasury_runoff", treasury_runoff),
        ("monthly_mbs_runoff", mbs_runoff),
        ("target_fed_funds_rate", target_rate),
        ("target_balance_sheet", target_balance_sheet),
    ] {
        if !value.is_finite() {
            return reject(format!("{} must be finite", field));
        }
    }
    if !easing {
        for (field, value) in [
            ("monthly_treasury_runoff", treasury_runoff),
            ("monthly_mbs_runoff", mbs_runoff),
            ("target_fed_funds_rate", target_rate),
        ] {
            if value < 0.0 {
                return reject(format!(
                    "{} is negative ({}) but the scenario is not flagged as easing",
                    field, value
                ));
            }
        }
    }
    if target_balance_sheet < 0.0 {
        return reject(format!(
            "target_balance_sheet must not be negative (got {})",
            target_balance_sheet
        ));
    }

    debug!("Defined scenario '{}' over {} months", name, horizon_months);
    Ok(Scenario {
        name,
        monthly_treasury_runoff: treasury_runoff,
        monthly_mbs_runoff: mbs_runoff,
        target_fed_funds_rate: target_rate,
        target_balance_sheet,
        horizon_months: horizon_months as u32,
        easing,
        lead_in: None,
    })
}

impl Scenario {
    /// Runs the first `months` months at a different (tightening) pace,
    /// e.g. QT continuing until a crisis forces the reversal.
    pub fn with_lead_in(mut self, months: u32, treasury_runoff: f64, mbs_runoff: f64) -> Result<Scenario> {
        if months > self.horizon_months {
            return Err(ProjectionError::invalid_scenario(
                self.name,
                format!("lead-in of {} months exceeds the horizon", months),
            ));
        }
        if !(treasury_runoff.is_finite() && mbs_runoff.is_finite())
            || treasury_runoff < 0.0
            || mbs_runoff < 0.0
        {
            return Err(ProjectionError::invalid_scenario(
                self.name,
                "lead-in runoff must be finite and non-negative",
            ));
        }
        self.lead_in = Some(LeadIn {
            months,
            treasury_runoff,
            mbs_runoff,
        });
        Ok(self)
    }
}

/// The four pre-defined policy scenarios, in dashboard order.
pub fn canonical() -> Vec<Scenario> {
    let preset = |name: &str, treasury: f64, mbs: f64, rate: f64, target: f64, easing: bool| Scenario {
        name: name.to_string(),
        monthly_treasury_runoff: treasury,
        monthly_mbs_runoff: mbs,
        target_fed_funds_rate: rate,
        target_balance_sheet: target,
        horizon_months: CANONICAL_HORIZON,
        easing,
        lead_in: None,
    };

    // QT at the hawkish pace until month 6, then $75B/mo of purchases.
    let mut reversal = preset(CRISIS_REVERSAL, -50.0, -25.0, 2.00, 7_500.0, true);
    reversal.lead_in = Some(LeadIn {
        months: 5,
        treasury_runoff: 60.0,
        mbs_runoff: 35.0,
    });

    vec![
        preset(WARSH_HAWK, 60.0, 35.0, 3.50, 4_300.0, false),
        preset(MODERATE, 25.0, 15.0, 3.50, 5_600.0, false),
        preset(STATUS_QUO, 0.0, 0.0, 3.75, 6_600.0, false),
        reversal,
    ]
}

pub fn canonical_by_name(name: &str) -> Option<Scenario> {
    canonical()
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(name))
}

/// Wire shape for a user-supplied scenario. Goes through `define` so the
/// same validation applies.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioRequest {
    pub name: String,
    pub monthly_treasury_runoff: f64,
    pub monthly_mbs_runoff: f64,
    pub target_fed_funds_rate: f64,
    pub target_balance_sheet: f64,
    pub horizon_months: i64,
    #[serde(default)]
    pub easing: bool,
    #[serde(default)]
    pub lead_in: Option<LeadIn>,
}

impl ScenarioRequest {
    pub fn into_scenario(self) -> Result<Scenario> {
        let scenario = build(
            self.name,
            self.monthly_treasury_runoff,
            self.monthly_mbs_runoff,
            self.target_fed_funds_rate,
            self.target_balance_sheet,
            self.horizon_months,
            self.easing,
        )?;
        match self.lead_in {
            Some(lead) => scenario.with_lead_in(lead.months, lead.treasury_runoff, lead.mbs_runoff),
            None => Ok(scenario),
        }
    }
}
