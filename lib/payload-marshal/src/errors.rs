use std::{error::Error, fmt, ops::Range};

use snafu::Snafu;

use crate::{stream::StreamState, PayloadFormat};

/// Marshaling errors.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum MarshalError<E>
where
    E: Error + 'static,
{
    /// A record could not be encoded in the target format.
    #[snafu(display("failed to encode record {} ({}): {}", index, description, source))]
    Encoding {
        /// Index of the record in the collection.
        index: usize,

        /// Human-readable identifier of the record.
        description: String,

        /// Error returned by the record encoder.
        source: E,
    },

    /// The encoded records do not fit within the payload size limit, and cannot be split any further.
    ///
    /// This covers a single record that is larger than the limit on its own, as well as a limit that is smaller than
    /// the fixed overhead of the format, in which case `records` spans the entire collection.
    #[snafu(display(
        "records {:?} encode to {} byte(s), which exceeds the payload size limit of {} byte(s)",
        records,
        size,
        limit
    ))]
    PayloadTooLarge {
        /// Range of record indices that could not fit.
        records: Range<usize>,

        /// Encoded size, in bytes.
        size: usize,

        /// Payload size limit, in bytes.
        limit: usize,
    },

    /// Splitting hit its configured safety limits before every part fit within the payload size limit.
    #[snafu(display(
        "unable to fit payloads within {} byte(s) without exceeding split limits (max depth {}, max parts {})",
        limit,
        max_depth,
        max_parts
    ))]
    SplitLimitExceeded {
        /// Payload size limit, in bytes.
        limit: usize,

        /// Configured maximum split depth.
        max_depth: usize,

        /// Configured maximum number of parts.
        max_parts: usize,
    },

    /// A streaming session was driven out of order.
    #[snafu(display("'{}' called out of sequence (stream state: {})", operation, state))]
    Sequence {
        /// Name of the operation that was called.
        operation: &'static str,

        /// State of the stream when the operation was called.
        state: StreamState,
    },

    /// Framing the encoded records into a binary payload failed.
    #[snafu(display("failed to frame binary payload: {}", source))]
    Framing {
        /// Error source.
        source: protobuf::Error,
    },
}

impl<E> MarshalError<E>
where
    E: Error + 'static,
{
    /// Returns the index of the offending record, if the error concerns a single record.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Encoding { index, .. } => Some(*index),
            Self::PayloadTooLarge { records, .. } if records.len() == 1 => Some(records.start),
            _ => None,
        }
    }

    /// Returns `true` if the error is recoverable, allowing the caller to continue with the remaining records.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The offending records can be dropped and the rest sent as usual.
            Self::PayloadTooLarge { .. } => true,
            _ => false,
        }
    }
}

/// Stage of [`Producer::produce`][crate::Producer::produce] that produced an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Binary encoding.
    Binary,

    /// JSON encoding.
    Json,

    /// Payload splitting.
    Split,
}

impl From<PayloadFormat> for Stage {
    fn from(format: PayloadFormat) -> Self {
        match format {
            PayloadFormat::Binary => Self::Binary,
            PayloadFormat::Json => Self::Json,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary encoding"),
            Self::Json => f.write_str("JSON encoding"),
            Self::Split => f.write_str("payload splitting"),
        }
    }
}

/// Error returned by [`Producer::produce`][crate::Producer::produce].
///
/// Wraps the underlying [`MarshalError`], unchanged, along with the stage that produced it.
#[derive(Debug)]
pub struct ProduceError<E>
where
    E: Error + 'static,
{
    stage: Stage,
    source: MarshalError<E>,
}

impl<E> ProduceError<E>
where
    E: Error + 'static,
{
    pub(crate) fn new(stage: Stage, source: MarshalError<E>) -> Self {
        Self { stage, source }
    }

    /// Returns the stage that produced the error.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns a reference to the underlying error.
    pub fn inner(&self) -> &MarshalError<E> {
        &self.source
    }

    /// Consumes the error and returns the underlying error.
    pub fn into_inner(self) -> MarshalError<E> {
        self.source
    }
}

impl<E> fmt::Display for ProduceError<E>
where
    E: Error + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.source)
    }
}

impl<E> Error for ProduceError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}
