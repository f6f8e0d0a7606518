pub mod config;

pub use config::{Config, UnitSystem};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Logs go to stderr so that formatted and `--raw` output on stdout stays
/// machine-readable.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("worldmatrix core initialized");
    Ok(())
}
