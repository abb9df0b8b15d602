// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::dashboard::{get_dashboard, get_summary_csv, post_dashboard, DashboardState};
use crate::handlers::scenarios::list_scenarios;
use crate::handlers::series::{get_series, list_series};
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

/// Largest accepted request body, in bytes.
const MAX_BODY_BYTES: u64 = 64 * 1024;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(body_error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = body_error.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<DashboardState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let series_list_route = warp::path!("api" / "v1" / "series")
        .and(warp::get())
        .and_then(list_series);

    let series_route = warp::path!("api" / "v1" / "series" / String)
        .and(warp::get())
        .and_then(get_series);

    let scenarios_route = warp::path!("api" / "v1" / "scenarios")
        .and(warp::get())
        .and_then(list_scenarios);

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_dashboard);

    let custom_dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(post_dashboard);

    let summary_csv_route = warp::path!("api" / "v1" / "dashboard" / "summary.csv")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_summary_csv);

    info!("All routes configured successfully.");

    series_list_route
        .or(series_route)
        .or(scenarios_route)
        .or(dashboard_route)
        .or(custom_dashboard_route)
        .or(summary_csv_route)
        .recover(handle_rejection)
}
