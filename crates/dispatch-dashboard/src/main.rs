//! Dashboard binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize structured logging (tracing)
//! 3. Select the route backend (directions or straight line)
//! 4. Read the relay stream until `Ctrl-C`

use std::sync::Arc;

use dispatch_dashboard::{
    DashboardConfig, DashboardError, DashboardSession, EventStreamClient, MarkerAnimator,
    RouteBackend, TracingCanvas,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Payloads buffered between the stream reader and the session.
const EVENT_QUEUE: usize = 256;

/// Application entry point for the dashboard.
///
/// Runs on a single-threaded runtime so marker teardown and animation
/// steps never interleave mid-operation.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a client cannot be
/// built.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = DashboardConfig::from_env()?;
    run(config).await?;
    Ok(())
}

async fn run(config: DashboardConfig) -> Result<(), DashboardError> {
    let routes = Arc::new(RouteBackend::from_config(&config)?);
    let client = EventStreamClient::new(&config)?;
    info!(
        url = client.url(),
        routes = routes.name(),
        step = ?config.animation_step,
        "dispatch-dashboard starting"
    );

    let (tx, rx) = mpsc::channel(EVENT_QUEUE);
    let reader = tokio::spawn(async move { client.run(tx).await });

    let animator = MarkerAnimator::new(routes, Arc::new(TracingCanvas), config.animation_step);
    let mut session = DashboardSession::new(animator);

    tokio::select! {
        () = session.run(rx) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        }
    }
    reader.abort();

    info!(
        events = session.state().events().len(),
        "dispatch-dashboard exited"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
