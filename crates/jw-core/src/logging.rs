use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize tracing for the bot.
///
/// `RUST_LOG` overrides the default filter. Without it our crates log at
/// `info` (or `debug` when `debug` is set) and everything else at `warn`.
pub fn init(service_name: &str, debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name, debug)));

    fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_ansi(debug)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}

fn default_directives(service_name: &str, debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    let crates = ["jw_core", "jw_health", "jw_jobspy", "jw_store", "jw_telegram"]
        .iter()
        .map(|c| format!("{c}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("warn,{service_name}={level},{crates}")
}
