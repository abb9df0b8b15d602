// src/handlers/dashboard.rs
use std::sync::Arc;

use log::{error, info};
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::Json;
use warp::{Rejection, Reply};

use super::error::ApiError;
use crate::models::ProjectionResult;
use crate::services::dashboard::{compare, summarize, ProjectionContext, SummaryRow};
use crate::services::export::write_summary_csv;
use crate::services::scenarios::{self, ScenarioRequest};

/// Shared, read-only state for every request.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub ctx: ProjectionContext,
}

#[derive(Debug, Deserialize)]
pub struct DashboardRequest {
    pub scenarios: Vec<ScenarioRequest>,
    #[serde(default)]
    pub starting_reserves: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub results: Vec<ProjectionResult>,
    pub summary: Vec<SummaryRow>,
}

fn respond(results: Vec<ProjectionResult>) -> DashboardResponse {
    let summary = summarize(&results);
    DashboardResponse { results, summary }
}

pub async fn get_dashboard(state: Arc<DashboardState>) -> Result<Json, Rejection> {
    info!("Handling request for the canonical dashboard");
    let results = compare(&scenarios::canonical(), &state.ctx).map_err(|e| {
        error!("Canonical projection failed: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;
    Ok(warp::reply::json(&respond(results)))
}

pub async fn post_dashboard(request: DashboardRequest, state: Arc<DashboardState>) -> Result<Json, Rejection> {
    info!("Handling custom dashboard request with {} scenarios", request.scenarios.len());
    if request.scenarios.is_empty() {
        return Err(warp::reject::custom(ApiError::bad_request("at least one scenario is required")));
    }

    let scenarios = request
        .scenarios
        .into_iter()
        .map(ScenarioRequest::into_scenario)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    let mut ctx = state.ctx.clone();
    if let Some(reserves) = request.starting_reserves {
        ctx.starting.reserves = reserves;
    }

    let results = compare(&scenarios, &ctx).map_err(|e| {
        error!("Custom projection failed: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;
    Ok(warp::reply::json(&respond(results)))
}

pub async fn get_summary_csv(state: Arc<DashboardState>) -> Result<impl Reply, Rejection> {
    info!("Handling request for the summary CSV export");
    let results = compare(&scenarios::canonical(), &state.ctx)
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    let mut buf = Vec::new();
    write_summary_csv(&mut buf, &summarize(&results)).map_err(|e| {
        error!("Failed to write summary CSV: {}", e);
        warp::reject::custom(ApiError::new(e.to_string()))
    })?;
    let body = String::from_utf8(buf).map_err(|e| warp::reject::custom(ApiError::new(e.to_string())))?;

    Ok(warp::reply::with_status(
        warp::reply::with_header(body, "content-type", "text/csv; charset=utf-8"),
        StatusCode::OK,
    ))
}
