use std::{fmt, ops::Range, str::FromStr};

use bytes::Bytes;
use http::HeaderValue;
use serde::Deserialize;

static CONTENT_TYPE_JSON: HeaderValue = HeaderValue::from_static("application/json");
static CONTENT_TYPE_PROTOBUF: HeaderValue = HeaderValue::from_static("application/x-protobuf");

/// Encoded form of a payload.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// Compact binary form.
    ///
    /// Records are framed as a repeated, length-delimited Protocol Buffers field.
    #[serde(alias = "protobuf")]
    Binary,

    /// JSON array, with one element per record.
    Json,
}

impl PayloadFormat {
    /// Returns the name of the format.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }

    /// Returns the MIME type of payloads in this format.
    pub fn content_type(&self) -> HeaderValue {
        match self {
            Self::Binary => CONTENT_TYPE_PROTOBUF.clone(),
            Self::Json => CONTENT_TYPE_JSON.clone(),
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "protobuf" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown payload format '{}' (expected 'binary' or 'json')", s)),
        }
    }
}

/// A finished, transport-ready payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payload {
    format: PayloadFormat,
    records: Range<usize>,
    data: Bytes,
}

impl Payload {
    pub(crate) fn new(format: PayloadFormat, records: Range<usize>, data: Vec<u8>) -> Self {
        Self {
            format,
            records,
            data: Bytes::from(data),
        }
    }

    /// Returns the format of the payload.
    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Returns the size of the payload, in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the range of indices, in the source collection, of the records contained in this payload.
    pub fn records(&self) -> Range<usize> {
        self.records.clone()
    }

    /// Returns the number of records contained in this payload.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns the encoded payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the payload and returns the encoded bytes.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Returns the MIME type of the payload.
    pub fn content_type(&self) -> HeaderValue {
        self.format.content_type()
    }
}
