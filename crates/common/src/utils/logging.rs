use std::io;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,tower_http=info,sea_orm=warn";

/// Install the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise request tracing stays at info and the ORM is quieted down.
/// Safe to call more than once (later calls are no-ops), which keeps
/// test binaries from panicking on double init.
pub fn init_logging_default() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::stdout)
        .try_init();
}
