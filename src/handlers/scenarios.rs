// src/handlers/scenarios.rs
use log::info;
use warp::reply::Json;
use warp::Rejection;

use crate::services::scenarios;

pub async fn list_scenarios() -> Result<Json, Rejection> {
    info!("Handling request to list canonical scenarios");
    Ok(warp::reply::json(&scenarios::canonical()))
}
