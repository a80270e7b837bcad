use std::fmt;

use crate::Marshaler;

#[derive(Debug)]
pub struct TestRecordError(pub usize);

impl fmt::Display for TestRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} is not encodable", self.0)
    }
}

impl std::error::Error for TestRecordError {}

/// A collection of string records.
///
/// Records are encoded as JSON strings (no escaping, so values should stick to plain ASCII), and as their raw bytes in
/// the binary form. Individual records can be marked as broken, which makes both encoders fail for them.
#[derive(Clone, Debug)]
pub struct TestRecords {
    values: Vec<String>,
    broken: Vec<bool>,
    header: &'static [u8],
    footer: &'static [u8],
    separator: &'static [u8],
}

impl TestRecords {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect::<Vec<String>>();
        let broken = vec![false; values.len()];
        Self {
            values,
            broken,
            header: b"[",
            footer: b"]",
            separator: b",",
        }
    }

    /// Creates `count` records that each encode to exactly `json_len` bytes of JSON.
    pub fn sized(count: usize, json_len: usize) -> Self {
        Self::from_values((0..count).map(|i| padded_value(i, json_len.saturating_sub(2))))
    }

    /// Creates one record per entry in `json_lens`, each encoding to exactly that many bytes of JSON.
    pub fn with_json_lens(json_lens: &[usize]) -> Self {
        Self::from_values(
            json_lens
                .iter()
                .enumerate()
                .map(|(i, len)| padded_value(i, len.saturating_sub(2))),
        )
    }

    pub fn with_delimiters(mut self, header: &'static [u8], footer: &'static [u8], separator: &'static [u8]) -> Self {
        self.header = header;
        self.footer = footer;
        self.separator = separator;
        self
    }

    pub fn break_record(&mut self, index: usize) {
        self.broken[index] = true;
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    fn check(&self, index: usize) -> Result<&str, TestRecordError> {
        if self.broken[index] {
            Err(TestRecordError(index))
        } else {
            Ok(&self.values[index])
        }
    }
}

fn padded_value(index: usize, len: usize) -> String {
    let mut value = format!("r{}", index);
    value.truncate(len);
    while value.len() < len {
        value.push('x');
    }
    value
}

impl Marshaler for TestRecords {
    type EncodeError = TestRecordError;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn describe_item(&self, index: usize) -> String {
        format!("record #{}", index)
    }

    fn write_json_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        let value = self.check(index)?;
        buf.push(b'"');
        buf.extend_from_slice(value.as_bytes());
        buf.push(b'"');
        Ok(())
    }

    fn write_binary_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        let value = self.check(index)?;
        buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn json_header(&self) -> &[u8] {
        self.header
    }

    fn json_footer(&self) -> &[u8] {
        self.footer
    }

    fn json_separator(&self) -> &[u8] {
        self.separator
    }
}
