//! Event ingestion and job registration API.
//!
//! Wires `fc-auth`/`fc-store`/`fc-events`/`fc-jobs` behind a minimal
//! `axum` surface (§1: routing/request-parsing plumbing beyond the two
//! guard middlewares is out of scope). Shaped after the teacher's
//! `bin/fc-scheduler-server`: logging init, config load, health routes,
//! graceful shutdown on `ctrl_c`.

mod error;
mod middleware;
mod routes;
mod state;

use std::net::SocketAddr;

use fc_config::ConfigLoader;
use fc_store::{PgAuthStore, PgStore};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fc_common::logging::init_logging("fc-server");

    let config = ConfigLoader::new().load()?;
    info!(port = config.http.port, "configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(config.postgres.max_connections)
        .connect(&config.postgres.url)
        .await?;
    sqlx::migrate!("../../crates/fc-store/migrations").run(&pool).await?;

    let store = PgStore::new(pool.clone());
    let auth_store = PgAuthStore::new(pool);
    let state = AppState::new(store, auth_store, config.clone());

    let app = routes::build_router(state);

    let addr = SocketAddr::from((
        config.http.host.parse::<std::net::IpAddr>().unwrap_or([0, 0, 0, 0].into()),
        config.http.port,
    ));
    info!(?addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("fc-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("failed to install ctrl_c handler");
    info!("shutdown signal received");
}
