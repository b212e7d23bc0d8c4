//! Optional tracing subscriber setup for library consumers.
//!
//! The crate logs through `tracing` macros; embedding applications that
//! already install a subscriber can ignore this module entirely.

use crate::error::{GraphError, Result};
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| GraphError::InvalidArgument(format!("Invalid log level: {e}")))?,
        )
        .with_target(true)
        .try_init()
        .map_err(|_| GraphError::InvalidArgument("Logging already initialized".into()))
}
