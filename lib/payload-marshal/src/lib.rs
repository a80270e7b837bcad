//! Marshaling of record collections into size-bounded JSON and binary payloads.
//!
//! Collections implement [`Marshaler`], which describes how each record is encoded. From there, a collection can be
//! encoded in one shot ([`marshal`], [`marshal_json`]), emitted incrementally as JSON ([`JsonStream`]), split into
//! parts that each fit a payload size limit ([`Splitter`]), or handed to [`Producer`], which combines all of the above
//! into a single entry point for transport layers.
#![deny(missing_docs)]

mod builder;
pub use self::builder::JsonPayloadBuilder;

pub mod codec;
pub use self::codec::{marshal, marshal_json};

mod config;
pub use self::config::{ConfigurationError, SplitterConfiguration};

mod errors;
pub use self::errors::{MarshalError, ProduceError, Stage};

mod marshaler;
pub use self::marshaler::{Marshaler, Subset};

mod payload;
pub use self::payload::{Payload, PayloadFormat};

mod producer;
pub use self::producer::Producer;

mod split;
pub use self::split::{split_payload, SplitPart, SplitResult, Splitter};

mod stream;
pub use self::stream::{JsonStream, StreamState};

#[cfg(test)]
mod test_util;
