use std::sync::Arc;

use pickup_dispatch::api;
use pickup_dispatch::config::{Config, LogFormat};
use pickup_dispatch::engine::clock::SystemClock;
use pickup_dispatch::engine::notify::run_notification_worker;
use pickup_dispatch::error::AppError;
use pickup_dispatch::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }

    let policy = config.dispatch_policy()?;
    tracing::info!(
        radius_km = policy.radius_km,
        lead_days = policy.lead_days,
        pickup_time = %policy.pickup_time,
        utc_offset = %policy.utc_offset,
        "dispatch policy loaded"
    );

    let (app_state, notification_rx) = AppState::new(
        policy,
        Arc::new(SystemClock),
        config.notification_queue_size,
        config.event_buffer_size,
    );
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(run_notification_worker(
        shared_state.clone(),
        notification_rx,
    ));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
