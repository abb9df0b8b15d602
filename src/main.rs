use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use balance_sheet_dashboard::config::{self, DashboardConfig};
use balance_sheet_dashboard::handlers::dashboard::DashboardState;
use balance_sheet_dashboard::routes;
use log::info;
use warp::Filter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the dashboard...");

    let settings = DashboardConfig::load()?;
    let ctx = settings.projection_context()?;
    info!(
        "Starting reserves {:.1}B, danger threshold {:.0}B",
        ctx.starting.reserves, ctx.danger.threshold
    );
    let state = Arc::new(DashboardState { ctx });

    let port = config::port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    // Set up CORS
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
