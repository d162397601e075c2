//! Logging utilities for detailcrm.
//!
//! Every binary calls [`init_with_level`] once at startup. Library code logs
//! through the `tracing` macros directly.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` directives still apply; `level` is added for the workspace's own
/// crates (`detailcrm*`) and for request tracing from `tower_http`.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    for target in ["detailcrm", "tower_http"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // try_init: tests and admin commands may initialize more than once
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Default level for a deployment environment (the VERCEL_ENV value).
pub fn level_for_environment(environment: &str) -> Level {
    match environment.to_ascii_lowercase().as_str() {
        "production" | "preview" => Level::INFO,
        _ => Level::DEBUG,
    }
}
