use anyhow::Result;
use flexi_logger::{opt_format, Logger, LoggerHandle};

pub const DEFAULT_LOG_SPEC: &str = "warn";

/// Starts logging to stderr; stdout belongs to the UCI protocol. `RUST_LOG`
/// overrides `spec`. Keep the returned handle alive for the whole run.
pub fn setup_logging(spec: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(spec)?
        .log_to_stderr()
        .format(opt_format)
        .start()?;
    Ok(handle)
}
