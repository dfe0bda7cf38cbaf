//! Tracing setup: subscriber initialization, span macros, structured events.

pub mod events;
pub mod spans;

use std::sync::Once;

use granula_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "GRANULA_LOG";
/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "granula=info";

static INIT: Once = Once::new();

/// Initialize human-readable logging.
///
/// Reads `GRANULA_LOG` for per-crate levels, e.g.
/// `GRANULA_LOG=granula_pipeline=debug,granula_routing=info`.
/// Falls back to `granula=info`. Only the first `init_*` call takes effect.
pub fn init_tracing() {
    install(env_filter(DEFAULT_FILTER), false);
}

/// Initialize structured JSON logging with the same filter rules as [`init_tracing`].
pub fn init_tracing_json() {
    install(env_filter(DEFAULT_FILTER), true);
}

/// Initialize from config: `log_level` applies to every granula crate unless
/// `GRANULA_LOG` is set, `json_logs` picks the output format.
pub fn init_from_config(config: &ObservabilityConfig) {
    let fallback = default_directive(&config.log_level);
    install(env_filter(&fallback), config.json_logs);
}

/// Initialize with an explicit filter string (tests, embedding).
pub fn init_tracing_with_filter(filter: &str) {
    install(EnvFilter::new(filter), false);
}

/// Filter directive enabling `level` for every granula crate.
pub fn default_directive(level: &str) -> String {
    format!("granula={level}")
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn install(filter: EnvFilter, json: bool) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        // A subscriber installed elsewhere wins; ignore the error.
        let _ = if json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_current_span(true),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_is_a_valid_filter() {
        let d = default_directive("debug");
        assert_eq!(d, "granula=debug");
        assert!(EnvFilter::try_new(&d).is_ok());
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing_with_filter("granula=warn");
        init_tracing();
        init_tracing_json();
    }
}
