use serde::Deserialize;
use snafu::Snafu;

use crate::{Producer, Splitter};

const fn default_split_factor() -> usize {
    2
}

const fn default_max_depth() -> usize {
    32
}

const fn default_max_parts() -> usize {
    4096
}

const fn default_max_records_per_payload() -> usize {
    usize::MAX
}

/// A splitter configuration error.
#[derive(Debug, Eq, PartialEq, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigurationError {
    /// Split factor was too small to make progress.
    #[snafu(display("Split factor must be at least 2, got {}.", split_factor))]
    InvalidSplitFactor {
        /// Configured split factor.
        split_factor: usize,
    },

    /// A limit which must be non-zero was set to zero.
    #[snafu(display("'{}' must be greater than zero.", field))]
    ZeroLimit {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Payload splitting configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SplitterConfiguration {
    /// Number of parts an oversized range of records is divided into at each step.
    ///
    /// Defaults to 2.
    #[serde(rename = "serializer_split_factor", default = "default_split_factor")]
    pub split_factor: usize,

    /// Maximum number of times a range of records can be divided before giving up.
    ///
    /// Defaults to 32.
    #[serde(rename = "serializer_max_split_depth", default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of parts a single collection can be split into before giving up.
    ///
    /// Defaults to 4096.
    #[serde(rename = "serializer_max_split_parts", default = "default_max_parts")]
    pub max_parts: usize,

    /// Maximum number of records allowed in a single payload, regardless of its size.
    ///
    /// Defaults to no limit.
    #[serde(
        rename = "serializer_max_records_per_payload",
        default = "default_max_records_per_payload"
    )]
    pub max_records_per_payload: usize,
}

impl SplitterConfiguration {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// If the split factor is less than 2, or any of the limits are zero, an error is returned.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.split_factor < 2 {
            return Err(ConfigurationError::InvalidSplitFactor {
                split_factor: self.split_factor,
            });
        }

        for (field, value) in [
            ("serializer_max_split_depth", self.max_depth),
            ("serializer_max_split_parts", self.max_parts),
            ("serializer_max_records_per_payload", self.max_records_per_payload),
        ] {
            if value == 0 {
                return Err(ConfigurationError::ZeroLimit { field });
            }
        }

        Ok(())
    }

    /// Builds a [`Splitter`] from this configuration.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, an error is returned.
    pub fn build(&self) -> Result<Splitter, ConfigurationError> {
        self.validate()?;
        Ok(self.splitter())
    }

    /// Builds a [`Producer`] from this configuration.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, an error is returned.
    pub fn build_producer(&self) -> Result<Producer, ConfigurationError> {
        self.build().map(Producer::new)
    }

    pub(crate) fn splitter(&self) -> Splitter {
        Splitter::from_parts(
            self.split_factor,
            self.max_depth,
            self.max_parts,
            self.max_records_per_payload,
        )
    }
}

impl Default for SplitterConfiguration {
    fn default() -> Self {
        Self {
            split_factor: default_split_factor(),
            max_depth: default_max_depth(),
            max_parts: default_max_parts(),
            max_records_per_payload: default_max_records_per_payload(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigurationError, SplitterConfiguration};

    #[test]
    fn defaults_are_valid() {
        let config = SplitterConfiguration::default();
        assert_eq!(config.validate(), Ok(()));

        let splitter = config.build().unwrap();
        assert_eq!(splitter.split_factor(), 2);
        assert_eq!(splitter.max_records_per_payload(), usize::MAX);
    }

    #[test]
    fn split_factor_too_small() {
        for split_factor in [0, 1] {
            let config = SplitterConfiguration {
                split_factor,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigurationError::InvalidSplitFactor { split_factor })
            );
        }
    }

    #[test]
    fn zero_limits() {
        let config = SplitterConfiguration {
            max_parts: 0,
            ..Default::default()
        };
        assert_eq!(
            config.build().unwrap_err(),
            ConfigurationError::ZeroLimit {
                field: "serializer_max_split_parts"
            }
        );
    }
}
