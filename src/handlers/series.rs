// src/handlers/series.rs
use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::registry;

pub async fn list_series() -> Result<Json, Rejection> {
    info!("Handling request to list series");
    Ok(warp::reply::json(&registry::all()))
}

pub async fn get_series(name: String) -> Result<Json, Rejection> {
    info!("Handling request for series {}", name);
    match registry::lookup(&name) {
        Ok(series) => Ok(warp::reply::json(series)),
        Err(e) => {
            error!("Series lookup failed: {}", e);
            Err(warp::reject::custom(ApiError::from(e)))
        }
    }
}
