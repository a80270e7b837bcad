use std::path::PathBuf;

use bytesize::ByteSize;
use clap::{ArgAction, Parser};
use payload_marshal::PayloadFormat;
use tracing::level_filters::LevelFilter;

use crate::config::Strategy;

/// Splits a file of metric samples into size-bounded payloads.
#[derive(Debug, Parser)]
#[command(about)]
pub struct Cli {
    /// Enable verbose output. (Specify twice for more verbosity.)
    #[arg(short = 'v', long, action = ArgAction::Count, default_value_t = 0)]
    verbose: u8,

    /// Emit logs as JSON instead of the human-readable format.
    #[arg(long)]
    pub log_format_json: bool,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config_file: Option<PathBuf>,

    /// Path to the input file, containing one JSON-encoded sample per line.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Directory to write payloads to.
    ///
    /// The directory is created if it does not exist. Payloads are written as `payload-<n>.json` or `payload-<n>.pb`,
    /// depending on the payload format.
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Payload format (`json` or `binary`).
    ///
    /// Overrides `payload_format` from the configuration.
    #[arg(short = 'f', long)]
    pub format: Option<PayloadFormat>,

    /// Maximum size of a single payload, such as `512KiB` or `5MB`.
    ///
    /// Overrides `payload_size_limit` from the configuration.
    #[arg(short = 'l', long)]
    pub limit: Option<ByteSize>,

    /// Strategy used to build payloads.
    ///
    /// Overrides `strategy` from the configuration.
    #[arg(short = 's', long, value_enum)]
    pub strategy: Option<Strategy>,
}

impl Cli {
    /// Gets the default log level based on the user-supplied verbosity level.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
