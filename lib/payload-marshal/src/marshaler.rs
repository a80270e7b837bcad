use std::{fmt, ops::Range};

/// A collection of records that can be marshaled into payloads.
///
/// Implementations describe how a single record, identified by its position in the collection, is encoded in each
/// supported format. Framing, streaming and splitting are all handled generically on top of this trait.
///
/// The collection must not change for the duration of any operation that borrows it: `len` must stay fixed, and a given
/// index must always refer to the same record.
pub trait Marshaler {
    /// The error type returned when a record cannot be encoded.
    type EncodeError: std::error::Error + 'static;

    /// Returns the number of records in the collection.
    fn len(&self) -> usize;

    /// Returns `true` if the collection contains no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a short, human-readable identifier for the record at `index`.
    ///
    /// This is only used for diagnostics, such as when logging a record that failed to encode or could not fit within a
    /// payload. `index` may be past the end of the collection, in which case implementations must return a placeholder
    /// rather than panic.
    fn describe_item(&self, index: usize) -> String;

    /// Encodes the record at `index` as JSON and writes it to the given buffer.
    ///
    /// Implementations MUST NOT clear the buffer before writing to it, as it may already hold other parts of the
    /// payload.
    ///
    /// # Errors
    ///
    /// If the record cannot be represented as JSON, an error will be returned.
    fn write_json_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError>;

    /// Encodes the record at `index` in the binary form and writes it to the given buffer.
    ///
    /// The encoded bytes are opaque: they are framed as a single length-delimited field by the binary codec. As with
    /// [`write_json_item`][Self::write_json_item], implementations MUST NOT clear the buffer.
    ///
    /// # Errors
    ///
    /// If the record cannot be represented in the binary form, an error will be returned.
    fn write_binary_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError>;

    /// Returns the bytes written at the start of every JSON payload.
    fn json_header(&self) -> &[u8] {
        b"["
    }

    /// Returns the bytes written at the end of every JSON payload.
    fn json_footer(&self) -> &[u8] {
        b"]"
    }

    /// Returns the bytes written between two consecutive records in a JSON payload.
    fn json_separator(&self) -> &[u8] {
        b","
    }
}

impl<M> Marshaler for &M
where
    M: Marshaler + ?Sized,
{
    type EncodeError = M::EncodeError;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn describe_item(&self, index: usize) -> String {
        (**self).describe_item(index)
    }

    fn write_json_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        (**self).write_json_item(index, buf)
    }

    fn write_binary_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        (**self).write_binary_item(index, buf)
    }

    fn json_header(&self) -> &[u8] {
        (**self).json_header()
    }

    fn json_footer(&self) -> &[u8] {
        (**self).json_footer()
    }

    fn json_separator(&self) -> &[u8] {
        (**self).json_separator()
    }
}

/// A contiguous, read-only view over part of a collection.
///
/// `Subset` is what the splitter hands back for each part of a split: rather than copying records into new
/// collections, each part borrows the original collection along with the range of indices it covers. A `Subset` is
/// itself a [`Marshaler`], with indices relative to the start of the view.
pub struct Subset<'a, M: ?Sized> {
    source: &'a M,
    range: Range<usize>,
}

impl<'a, M> Subset<'a, M>
where
    M: Marshaler + ?Sized,
{
    pub(crate) fn new(source: &'a M, range: Range<usize>) -> Self {
        debug_assert!(range.end <= source.len());
        Self { source, range }
    }

    /// Returns the collection this view borrows from.
    pub fn source(&self) -> &'a M {
        self.source
    }

    /// Returns the range of indices, in the source collection, covered by this view.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Translates an index relative to this view into an index in the source collection.
    pub fn source_index(&self, index: usize) -> usize {
        self.range.start + index
    }
}

impl<M: ?Sized> Clone for Subset<'_, M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            range: self.range.clone(),
        }
    }
}

impl<M: ?Sized> fmt::Debug for Subset<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subset").field("range", &self.range).finish()
    }
}

impl<M> Marshaler for Subset<'_, M>
where
    M: Marshaler + ?Sized,
{
    type EncodeError = M::EncodeError;

    fn len(&self) -> usize {
        self.range.len()
    }

    fn describe_item(&self, index: usize) -> String {
        // Never describe a source record that lies outside of this view.
        if index >= self.range.len() {
            return format!("<index {} outside of records {:?}>", index, self.range);
        }
        self.source.describe_item(self.source_index(index))
    }

    fn write_json_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        self.source.write_json_item(self.source_index(index), buf)
    }

    fn write_binary_item(&self, index: usize, buf: &mut Vec<u8>) -> Result<(), Self::EncodeError> {
        self.source.write_binary_item(self.source_index(index), buf)
    }

    fn json_header(&self) -> &[u8] {
        self.source.json_header()
    }

    fn json_footer(&self) -> &[u8] {
        self.source.json_footer()
    }

    fn json_separator(&self) -> &[u8] {
        self.source.json_separator()
    }
}
