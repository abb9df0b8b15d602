// src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dotenv::dotenv;
use log::{info, warn};
use serde::Deserialize;

use crate::models::{MarketSnapshot, StartingConditions};
use crate::services::dashboard::ProjectionContext;
use crate::services::estimator::Sensitivities;
use crate::services::observations::{load_combined_csv_path, SeriesTable};
use crate::services::reserves::{DangerZone, FlowAssumptions};

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.json";
pub const DEFAULT_PORT: u16 = 3030;

/// Contents of the dashboard JSON file. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub starting: StartingConditions,
    pub market: MarketSnapshot,
    pub sensitivities: Sensitivities,
    pub danger: DangerZone,
    pub flows: FlowAssumptions,
    pub start_month: Option<NaiveDate>,
    /// Combined FRED CSV used to refresh starting conditions.
    pub data_csv: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Parsing {}", path.display()))
    }

    /// Loads `.env`, then the JSON file named by `DASHBOARD_CONFIG`, then
    /// applies env overrides. A missing default file yields the defaults.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mut config = match env::var("DASHBOARD_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            Err(_) => {
                warn!("{} not found, using built-in defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };

        if let Ok(path) = env::var("FRED_COMBINED_CSV") {
            config.data_csv = Some(PathBuf::from(path));
        }
        if let Some(v) = env_f64("STARTING_RESERVES_BN")? {
            config.starting.reserves = v;
        }
        if let Some(v) = env_f64("DANGER_THRESHOLD_BN")? {
            config.danger.threshold = v;
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects danger levels and flow assumptions the projector cannot use.
    pub fn validate(&self) -> Result<()> {
        self.danger.validate().context("Invalid danger zone settings")?;
        self.flows.validate().context("Invalid flow assumptions")?;
        Ok(())
    }

    /// Builds the projection context, refreshing starting conditions and
    /// market levels from the combined CSV when one is configured.
    pub fn projection_context(&self) -> Result<ProjectionContext> {
        self.validate()?;
        let (starting, market) = match &self.data_csv {
            Some(path) => {
                let table: SeriesTable = load_combined_csv_path(path)?;
                info!("Starting conditions taken from {}", path.display());
                (
                    StartingConditions::from_observations(&table, self.starting),
                    self.market.overlay_observations(&table),
                )
            }
            None => (self.starting, self.market),
        };

        Ok(ProjectionContext {
            starting,
            market,
            sensitivities: self.sensitivities,
            danger: self.danger,
            flows: self.flows,
            start_month: self.start_month,
        })
    }
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        Err(_) => Ok(None),
    }
}

pub fn port() -> u16 {
    match env::var("PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("PORT '{}' is not a number, defaulting to {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => {
            warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
            DEFAULT_PORT
        }
    }
}
