use std::{fmt, ops::Range};

use tracing::{debug, trace, warn};

use crate::{
    codec::{fixed_overhead, marshal_records},
    MarshalError, Marshaler, Payload, PayloadFormat, SplitterConfiguration, Subset,
};

/// One part of a split collection.
pub struct SplitPart<'a, M: ?Sized> {
    records: Subset<'a, M>,
    payload: Payload,
}

impl<'a, M> SplitPart<'a, M>
where
    M: Marshaler + ?Sized,
{
    /// Returns the records contained in this part.
    pub fn records(&self) -> &Subset<'a, M> {
        &self.records
    }

    /// Returns the encoded payload for this part.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consumes the part and returns the encoded payload.
    pub fn into_payload(self) -> Payload {
        self.payload
    }
}

impl<M: ?Sized> fmt::Debug for SplitPart<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitPart")
            .field("records", &self.records)
            .field("payload_size", &self.payload.size())
            .finish()
    }
}

/// The result of splitting a collection.
///
/// Parts are ordered, contiguous, and disjoint: concatenating the records of every part, in order, yields the original
/// collection exactly.
pub struct SplitResult<'a, M: ?Sized> {
    parts: Vec<SplitPart<'a, M>>,
}

impl<'a, M> SplitResult<'a, M>
where
    M: Marshaler + ?Sized,
{
    fn empty() -> Self {
        Self { parts: Vec::new() }
    }

    /// Returns the number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` if there are no parts.
    ///
    /// This is only the case when the collection being split was empty.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the parts.
    pub fn parts(&self) -> &[SplitPart<'a, M>] {
        &self.parts
    }

    /// Returns an iterator over the records of each part.
    pub fn subsets(&self) -> impl Iterator<Item = &Subset<'a, M>> {
        self.parts.iter().map(|part| part.records())
    }

    /// Consumes the result and returns the encoded payload of each part, in order.
    pub fn into_payloads(self) -> Vec<Payload> {
        self.parts.into_iter().map(SplitPart::into_payload).collect()
    }
}

impl<'a, M: ?Sized> IntoIterator for SplitResult<'a, M> {
    type Item = SplitPart<'a, M>;
    type IntoIter = std::vec::IntoIter<SplitPart<'a, M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<M: ?Sized> fmt::Debug for SplitResult<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.parts.iter()).finish()
    }
}

struct PendingRange {
    records: Range<usize>,
    depth: usize,
    encoded: Option<Payload>,
}

/// Splits collections into parts whose encoded payloads fit within a size limit.
///
/// Oversized ranges of records are partitioned into `split_factor` contiguous, near-equal parts, each of which is
/// encoded and checked again, until every part fits. The splitter works entirely on index ranges into the original
/// collection, so records are never copied.
///
/// Splitting is deterministic: the same collection, format, and limit always yield the same parts.
#[derive(Clone, Debug)]
pub struct Splitter {
    split_factor: usize,
    max_depth: usize,
    max_parts: usize,
    max_records_per_payload: usize,
}

impl Splitter {
    pub(crate) fn from_parts(
        split_factor: usize, max_depth: usize, max_parts: usize, max_records_per_payload: usize,
    ) -> Self {
        Self {
            split_factor,
            max_depth,
            max_parts,
            max_records_per_payload,
        }
    }

    /// Returns the number of parts an oversized range is divided into at each step.
    pub fn split_factor(&self) -> usize {
        self.split_factor
    }

    /// Returns the maximum number of records allowed in a single payload.
    pub fn max_records_per_payload(&self) -> usize {
        self.max_records_per_payload
    }

    /// Returns `true` if the given payload satisfies both the size limit and the record count limit.
    pub fn fits(&self, payload: &Payload, limit: usize) -> bool {
        payload.size() <= limit && payload.record_count() <= self.max_records_per_payload
    }

    /// Splits the collection into parts whose payloads, in the given format, each fit within `limit` bytes.
    ///
    /// If the collection already fits, the result holds a single part covering the whole collection. If the collection
    /// is empty, the result holds no parts, and nothing is encoded.
    ///
    /// # Errors
    ///
    /// If a record fails to encode, if a single record does not fit within the limit on its own (or the limit is
    /// smaller than the fixed overhead of the format), or if the configured split limits are reached, an error is
    /// returned.
    pub fn split<'a, M>(
        &self, collection: &'a M, format: PayloadFormat, limit: usize,
    ) -> Result<SplitResult<'a, M>, MarshalError<M::EncodeError>>
    where
        M: Marshaler + ?Sized,
    {
        if collection.is_empty() {
            return Ok(SplitResult::empty());
        }

        self.check_overhead(collection, format, limit)?;

        let root = marshal_records(collection, format, 0..collection.len())?;
        self.split_encoded(collection, format, limit, root)
    }

    /// Ensures that the limit can fit at least the fixed overhead of the format.
    pub(crate) fn check_overhead<M>(
        &self, collection: &M, format: PayloadFormat, limit: usize,
    ) -> Result<(), MarshalError<M::EncodeError>>
    where
        M: Marshaler + ?Sized,
    {
        let overhead = fixed_overhead(collection, format);
        if limit < overhead {
            return Err(MarshalError::PayloadTooLarge {
                records: 0..collection.len(),
                size: overhead,
                limit,
            });
        }

        Ok(())
    }

    /// Splits the collection, starting from an already-encoded payload covering the whole collection.
    pub(crate) fn split_encoded<'a, M>(
        &self, collection: &'a M, format: PayloadFormat, limit: usize, root: Payload,
    ) -> Result<SplitResult<'a, M>, MarshalError<M::EncodeError>>
    where
        M: Marshaler + ?Sized,
    {
        trace!(
            %format,
            records = root.record_count(),
            size = root.size(),
            limit,
            "Starting payload split operation."
        );

        let mut parts = Vec::new();
        let mut encode_calls = 0usize;
        let mut pending = vec![PendingRange {
            records: root.records(),
            depth: 0,
            encoded: Some(root),
        }];

        // Pending ranges are kept in a stack, with the leftmost range on top, so that finished parts come out in their
        // original order.
        while let Some(PendingRange {
            records,
            depth,
            encoded,
        }) = pending.pop()
        {
            let payload = match encoded {
                Some(payload) => payload,
                None => {
                    encode_calls += 1;
                    marshal_records(collection, format, records.clone())?
                }
            };

            if self.fits(&payload, limit) {
                trace!(records = ?records, size = payload.size(), depth, "Part fits within limits.");
                parts.push(SplitPart {
                    records: Subset::new(collection, records),
                    payload,
                });
                continue;
            }

            if records.len() == 1 {
                warn!(
                    %format,
                    index = records.start,
                    record = %collection.describe_item(records.start),
                    size = payload.size(),
                    limit,
                    "Single record exceeds payload size limit."
                );
                return Err(MarshalError::PayloadTooLarge {
                    records,
                    size: payload.size(),
                    limit,
                });
            }

            // Every pending range turns into at least one part, so this is a lower bound on the final number of parts.
            let factor = self.split_factor.min(records.len());
            if depth >= self.max_depth || parts.len() + pending.len() + factor > self.max_parts {
                debug!(
                    %format,
                    limit,
                    depth,
                    parts = parts.len(),
                    pending = pending.len(),
                    "Split limits reached before payloads fit."
                );
                return Err(MarshalError::SplitLimitExceeded {
                    limit,
                    max_depth: self.max_depth,
                    max_parts: self.max_parts,
                });
            }

            trace!(records = ?records, size = payload.size(), depth, factor, "Splitting oversized range.");
            for subrange in partition(records, factor).into_iter().rev() {
                pending.push(PendingRange {
                    records: subrange,
                    depth: depth + 1,
                    encoded: None,
                });
            }
        }

        debug!(
            %format,
            limit,
            parts = parts.len(),
            encode_calls,
            "Finished splitting oversized payload."
        );

        Ok(SplitResult { parts })
    }
}

impl Default for Splitter {
    fn default() -> Self {
        SplitterConfiguration::default().splitter()
    }
}

/// Splits the collection into `parts` contiguous, near-equal views, without encoding anything.
///
/// Longer views come first, and concatenating every view in order yields the original collection. `parts` is clamped to
/// `1..=collection.len()`, so every view is non-empty. An empty collection yields no views.
pub fn split_payload<M>(collection: &M, parts: usize) -> Vec<Subset<'_, M>>
where
    M: Marshaler + ?Sized,
{
    let len = collection.len();
    if len == 0 {
        return Vec::new();
    }

    partition(0..len, parts.clamp(1, len))
        .into_iter()
        .map(|records| Subset::new(collection, records))
        .collect()
}

/// Partitions `records` into `parts` contiguous ranges whose lengths differ by at most one.
///
/// Longer ranges come first.
fn partition(records: Range<usize>, parts: usize) -> Vec<Range<usize>> {
    let base = records.len() / parts;
    let remainder = records.len() % parts;

    let mut start = records.start;
    (0..parts)
        .map(|i| {
            let len = base + usize::from(i < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}
