use std::path::Path;

use anyhow::{bail, Context as _};
use bytesize::ByteSize;
use figment::{
    providers::{Env, Format as _, Yaml},
    Figment,
};
use payload_marshal::{PayloadFormat, SplitterConfiguration};
use serde::Deserialize;

use crate::cli::Cli;

/// Environment variable prefix for configuration overrides.
pub const ENV_VAR_PREFIX: &str = "PAYLOAD_SPLITTER_";

const fn default_payload_format() -> PayloadFormat {
    PayloadFormat::Json
}

const fn default_payload_size_limit() -> ByteSize {
    ByteSize::mib(5)
}

/// Strategy used to build payloads.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Encode everything at once, then split oversized payloads until every part fits.
    #[default]
    Split,

    /// Pack records into JSON payloads one at a time, starting a new payload whenever the next record would not fit.
    Greedy,
}

/// Payload splitter configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Payload format.
    ///
    /// Defaults to JSON.
    #[serde(default = "default_payload_format")]
    pub payload_format: PayloadFormat,

    /// Maximum size of a single payload.
    ///
    /// Defaults to 5MiB.
    #[serde(default = "default_payload_size_limit")]
    pub payload_size_limit: ByteSize,

    /// Strategy used to build payloads.
    ///
    /// Defaults to splitting.
    #[serde(default)]
    pub strategy: Strategy,

    /// Splitting limits.
    #[serde(flatten)]
    pub splitter: SplitterConfiguration,
}

impl Config {
    /// Loads the configuration from the given YAML file, if any, and from environment variables.
    ///
    /// Environment variables take precedence over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            let file_data = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read configuration file '{}'.", path.display()))?;
            figment = figment.merge(Yaml::string(&file_data));
        }

        Self::from_figment(figment.merge(Env::prefixed(ENV_VAR_PREFIX)))
    }

    fn from_figment(figment: Figment) -> Result<Self, anyhow::Error> {
        figment.extract().context("Failed to parse configuration.")
    }

    /// Applies any overrides given on the command line.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(format) = cli.format {
            self.payload_format = format;
        }
        if let Some(limit) = cli.limit {
            self.payload_size_limit = limit;
        }
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.splitter.validate().context("Invalid splitter configuration.")?;

        if self.strategy == Strategy::Greedy && self.payload_format != PayloadFormat::Json {
            bail!(
                "The greedy strategy only supports JSON payloads, but the payload format is '{}'.",
                self.payload_format
            );
        }

        self.payload_size_limit()?;
        Ok(())
    }

    /// Returns the payload size limit, in bytes.
    pub fn payload_size_limit(&self) -> Result<usize, anyhow::Error> {
        usize::try_from(self.payload_size_limit.as_u64()).with_context(|| {
            format!(
                "Payload size limit ({}) is too large for this platform.",
                self.payload_size_limit
            )
        })
    }
}
