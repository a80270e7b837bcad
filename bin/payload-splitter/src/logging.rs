use anyhow::anyhow;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filtering directives.
const LOG_LEVEL_ENV_VAR: &str = "PAYLOAD_SPLITTER_LOG_LEVEL";

/// Initializes the logging subsystem for `tracing`.
///
/// Filtering directives are read from `PAYLOAD_SPLITTER_LOG_LEVEL`, falling back to `default_level` when unset. Logs are
/// written to standard error, either in a compact human-readable format or as JSON.
pub fn initialize_logging(default_level: LevelFilter, json: bool) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_LEVEL_ENV_VAR)
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.compact().with_ansi(true).try_init()
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
