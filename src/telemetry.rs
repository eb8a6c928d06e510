//! Tracing initialization.
//!
//! Sets up a `tracing-subscriber` fmt layer with an env-filter. The filter is
//! taken from `RUST_LOG` when set and defaults to `info` otherwise:
//!
//! ```bash
//! RUST_LOG=medqa=debug,sqlx=warn medqa -f config.yaml
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
