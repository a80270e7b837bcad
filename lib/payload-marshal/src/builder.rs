use tracing::{debug, trace};

use crate::{codec::write_json_record, MarshalError, Marshaler, Payload, PayloadFormat};

const SCRATCH_BUF_CAPACITY: usize = 8192;

/// Greedy builder for JSON payloads.
///
/// Where [`Splitter`][crate::Splitter] starts from a single payload and divides it until every part fits, the builder
/// goes the other way: records are encoded one at a time and appended to the current payload for as long as the
/// payload, once closed with the JSON footer, would still fit within the limit. When the next record would not fit,
/// the current payload is flushed and a new one is started.
///
/// This makes a single pass over the collection, and generally produces fewer, fuller payloads than splitting, at the
/// cost of never reusing a previously encoded payload.
#[derive(Clone, Debug)]
pub struct JsonPayloadBuilder {
    max_records_per_payload: usize,
}

impl JsonPayloadBuilder {
    /// Creates a new `JsonPayloadBuilder` with no limit on the number of records per payload.
    pub fn new() -> Self {
        Self {
            max_records_per_payload: usize::MAX,
        }
    }

    /// Sets the maximum number of records that can be encoded in a single payload.
    pub fn with_max_records_per_payload(&mut self, max_records_per_payload: usize) -> &mut Self {
        self.max_records_per_payload = max_records_per_payload.max(1);
        self
    }

    /// Encodes the collection into JSON payloads, each no larger than `limit` bytes.
    ///
    /// Payloads are returned in collection order, and together contain every record exactly once. An empty collection
    /// produces no payloads.
    ///
    /// # Errors
    ///
    /// If a record fails to encode, or a record cannot fit within the limit even in a payload of its own, an error is
    /// returned.
    pub fn build<M>(&self, collection: &M, limit: usize) -> Result<Vec<Payload>, MarshalError<M::EncodeError>>
    where
        M: Marshaler + ?Sized,
    {
        let mut payloads = Vec::new();
        if collection.is_empty() {
            return Ok(payloads);
        }

        let header = collection.json_header();
        let footer = collection.json_footer();
        let separator = collection.json_separator();

        // The footer is accounted for up front, since it has to be written before the payload is flushed, no matter
        // how many records end up in it.
        let overhead = header.len() + footer.len();
        if limit < overhead {
            return Err(MarshalError::PayloadTooLarge {
                records: 0..collection.len(),
                size: overhead,
                limit,
            });
        }

        let mut scratch_buf = Vec::with_capacity(SCRATCH_BUF_CAPACITY);
        let mut current = Vec::new();
        current.extend_from_slice(header);
        let mut start = 0;

        for index in 0..collection.len() {
            scratch_buf.clear();
            write_json_record(collection, index, &mut scratch_buf)?;

            let encoded_len = scratch_buf.len();
            if overhead + encoded_len > limit {
                return Err(MarshalError::PayloadTooLarge {
                    records: index..index + 1,
                    size: overhead + encoded_len,
                    limit,
                });
            }

            // If the record won't fit into the current payload, or we've hit the record limit, flush what we have and
            // start over with an empty payload, which we know the record fits into.
            let records_in_payload = index - start;
            if records_in_payload > 0 {
                let would_exceed_limit = current.len() + separator.len() + encoded_len + footer.len() > limit;
                if would_exceed_limit || records_in_payload >= self.max_records_per_payload {
                    trace!(
                        records = records_in_payload,
                        size = current.len() + footer.len(),
                        "Flushing payload."
                    );

                    current.extend_from_slice(footer);
                    payloads.push(Payload::new(PayloadFormat::Json, start..index, std::mem::take(&mut current)));

                    current.extend_from_slice(header);
                    start = index;
                }
            }

            if index != start {
                current.extend_from_slice(separator);
            }
            current.extend_from_slice(&scratch_buf);
        }

        current.extend_from_slice(footer);
        payloads.push(Payload::new(PayloadFormat::Json, start..collection.len(), current));

        debug!(
            records = collection.len(),
            payloads = payloads.len(),
            limit,
            "Built JSON payloads."
        );

        Ok(payloads)
    }
}

impl Default for JsonPayloadBuilder {
    fn default() -> Self {
        Self::new()
    }
}
