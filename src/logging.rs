//! Log output setup for the binaries. `RUST_LOG` overrides the given
//! default directive.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

pub fn init(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("initializing logging: {e}"))
}
