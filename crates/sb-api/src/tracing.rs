//! Log output for the service.
//!
//! Development prints pretty, colored logs with source locations. Production
//! writes one JSON object per line with the current span (and so the request
//! id) flattened into every event. `RUST_LOG` overrides the default filter in
//! both modes.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

fn default_filter(env: Environment) -> &'static str {
    if env.is_development() {
        "debug,tower_http=debug,sqlx=warn,tower_governor=info"
    } else {
        "info,tower_http=info,sqlx=warn,tower_governor=warn"
    }
}

fn env_filter(env: Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(env: Environment) -> anyhow::Result<()> {
    let filter = env_filter(env);

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .pretty()
                    .with_filter(filter),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(filter),
            )
            .try_init()?;
    }

    tracing::info!(environment = ?env, "Tracing initialized");
    Ok(())
}
