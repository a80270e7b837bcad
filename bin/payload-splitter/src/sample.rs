use payload_marshal::Marshaler;
use protobuf::CodedOutputStream;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt as _, Snafu};

const SERIES_HEADER: &[u8] = b"{\"series\":[";
const SERIES_FOOTER: &[u8] = b"]}";

mod field_numbers {
    pub const METRIC: u32 = 1;
    pub const VALUE: u32 = 2;
    pub const TIMESTAMP: u32 = 3;
    pub const TAGS: u32 = 4;
    pub const HOST: u32 = 5;
}

/// A single metric sample.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Sample {
    /// Metric name.
    pub metric: String,

    /// Sample value.
    pub value: f64,

    /// Sample timestamp, in seconds since the Unix epoch.
    pub timestamp: i64,

    /// Tags attached to the sample.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Host the sample was emitted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum SampleEncodeError {
    #[snafu(display("value {} is not a finite number", value))]
    NonFiniteValue { value: f64 },

    #[snafu(display("failed to encode sample as JSON: {}", source))]
    Json { source: serde_json::Error },

    #[snafu(display("failed to encode sample as Protocol Buffers: {}", source))]
    Protobuf { source: protobuf::Error },
}

/// An ordered batch of metric samples.
///
/// In JSON form, the batch is wrapped as `{"series":[...]}`. In binary form, each sample is a Protocol Buffers message
/// with the metric name, value, timestamp, tags, and host as fields 1 through 5.
#[derive(Debug)]
pub struct SampleBatch {
    samples: Vec<Sample>,
}

impl SampleBatch {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Returns the samples in the batch.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    fn checked_sample(&self, index: usize) -> Result<&Sample, SampleEncodeError> {
        let sample = &self.samples[index];
        if !sample.value.is_finite() {
            return Err(SampleEncodeError::NonFiniteValue { value: sample.value });
        }
        Ok(sample)
    }
}

impl Marshaler for SampleBatch {
    type EncodeError = SampleEncodeError;

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn describe_item(&self, index: usize) -> String {
        match self.samples.get(index) {
            Some(sample) => format!("{}@{}", sample.metric, sample.timestamp),
            None => format!("<sample #{}>", index),
        }
    }

    fn write_json_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        let sample = self.checked_sample(index)?;
        serde_json::to_writer(buf, sample).context(Json)
    }

    fn write_binary_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        let sample = self.checked_sample(index)?;

        let mut os = CodedOutputStream::vec(buf);
        os.write_string(field_numbers::METRIC, &sample.metric).context(Protobuf)?;
        os.write_double(field_numbers::VALUE, sample.value).context(Protobuf)?;
        os.write_int64(field_numbers::TIMESTAMP, sample.timestamp).context(Protobuf)?;
        for tag in &sample.tags {
            os.write_string(field_numbers::TAGS, tag).context(Protobuf)?;
        }
        if let Some(host) = &sample.host {
            os.write_string(field_numbers::HOST, host).context(Protobuf)?;
        }
        os.flush().context(Protobuf)
    }

    fn json_header(&self) -> &[u8] {
        SERIES_HEADER
    }

    fn json_footer(&self) -> &[u8] {
        SERIES_FOOTER
    }
}
