//! Relay binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize structured logging (tracing)
//! 3. Construct the broadcaster and application state
//! 4. Serve until `Ctrl-C`

use std::sync::Arc;

use dispatch_relay::{AppState, Broadcaster, LogFormat, RelayConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application entry point for the relay.
///
/// The relay runs on a single-threaded runtime: all broadcaster
/// mutation happens on one reactor thread.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RelayConfig::from_env()?;
    init_tracing(config.log_format);

    info!(
        host = config.server.host,
        port = config.server.port,
        stream_buffer = config.stream_buffer,
        "dispatch-relay starting"
    );

    let broadcaster = Arc::new(Broadcaster::new());
    let state = Arc::new(AppState::new(Arc::clone(&broadcaster), config.stream_buffer));

    dispatch_relay::start_server(&config.server, state).await?;

    info!(
        events_relayed = broadcaster.published_count(),
        "dispatch-relay exited"
    );
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
