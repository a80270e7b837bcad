use std::fmt;

use crate::{codec::write_json_record, MarshalError, Marshaler};

/// State of a [`JsonStream`] session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamState {
    /// No fragment has been emitted yet.
    NotStarted,

    /// The header has been emitted, but no items.
    HeaderEmitted,

    /// The item at `index` was the last fragment emitted.
    ItemEmitted {
        /// Index of the last emitted item.
        index: usize,
    },

    /// An item failed to encode. The session can only be abandoned.
    Failed,

    /// The footer has been emitted.
    Complete,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::HeaderEmitted => f.write_str("header emitted"),
            Self::ItemEmitted { index } => write!(f, "item {} emitted", index),
            Self::Failed => f.write_str("failed"),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// Incremental JSON emitter.
///
/// Produces the same bytes as [`marshal_json`][crate::marshal_json], one fragment at a time: the header, then one
/// fragment per record (including the separator that precedes it, for every record but the first), and finally the
/// footer. This lets callers write each fragment directly to their output, checking the cumulative size as they go,
/// without ever holding the full document in memory.
///
/// The call order is enforced: `header` once, then `item` for every index from `0` to `len() - 1` in order, then
/// `footer` once. Any deviation fails with [`MarshalError::Sequence`]. If an item fails to encode, the session moves to
/// [`StreamState::Failed`] and must be abandoned; whatever was emitted so far is not a well-formed document.
///
/// Abandoning a session at any point is done by dropping it.
pub struct JsonStream<'a, M: ?Sized> {
    collection: &'a M,
    state: StreamState,
    scratch_buf: Vec<u8>,
    bytes_emitted: usize,
}

impl<'a, M> JsonStream<'a, M>
where
    M: Marshaler + ?Sized,
{
    /// Creates a new streaming session over the given collection.
    pub fn new(collection: &'a M) -> Self {
        Self {
            collection,
            state: StreamState::NotStarted,
            scratch_buf: Vec::new(),
            bytes_emitted: 0,
        }
    }

    /// Returns the current state of the session.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Returns the number of items in the collection.
    pub fn len(&self) -> usize {
        self.collection.len()
    }

    /// Returns `true` if the collection contains no items.
    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Returns the total number of bytes emitted so far.
    pub fn bytes_emitted(&self) -> usize {
        self.bytes_emitted
    }

    /// Returns `true` if the footer has been emitted.
    pub fn is_complete(&self) -> bool {
        self.state == StreamState::Complete
    }

    /// Returns a short, human-readable identifier for the item at `index`.
    ///
    /// This has no effect on the session, and can be called at any time. Indices past the end of the collection yield a
    /// placeholder instead of panicking.
    pub fn describe(&self, index: usize) -> String {
        self.collection.describe_item(index)
    }

    /// Emits the header.
    ///
    /// # Errors
    ///
    /// If the header was already emitted, an error is returned.
    pub fn header(&mut self) -> Result<&'a [u8], MarshalError<M::EncodeError>> {
        if self.state != StreamState::NotStarted {
            return Err(self.out_of_sequence("header"));
        }

        let collection = self.collection;
        let header = collection.json_header();
        self.state = StreamState::HeaderEmitted;
        self.bytes_emitted += header.len();
        Ok(header)
    }

    /// Emits the item at `index`, preceded by the separator if it is not the first item.
    ///
    /// # Errors
    ///
    /// If `index` is not the next item to emit, or the header has not been emitted, or the session has failed or
    /// completed, an error is returned. If the item cannot be encoded, an error is returned and the session moves to the
    /// failed state.
    pub fn item(&mut self, index: usize) -> Result<&[u8], MarshalError<M::EncodeError>> {
        let expected = match self.state {
            StreamState::HeaderEmitted => 0,
            StreamState::ItemEmitted { index } => index + 1,
            _ => return Err(self.out_of_sequence("item")),
        };
        if index != expected || index >= self.collection.len() {
            return Err(self.out_of_sequence("item"));
        }

        self.scratch_buf.clear();
        if index > 0 {
            self.scratch_buf.extend_from_slice(self.collection.json_separator());
        }

        if let Err(e) = write_json_record(self.collection, index, &mut self.scratch_buf) {
            self.state = StreamState::Failed;
            return Err(e);
        }

        self.state = StreamState::ItemEmitted { index };
        self.bytes_emitted += self.scratch_buf.len();
        Ok(&self.scratch_buf)
    }

    /// Emits the footer, completing the session.
    ///
    /// # Errors
    ///
    /// If not every item has been emitted, or the session has failed or completed, an error is returned.
    pub fn footer(&mut self) -> Result<&'a [u8], MarshalError<M::EncodeError>> {
        let all_items_emitted = match self.state {
            StreamState::HeaderEmitted => self.collection.is_empty(),
            StreamState::ItemEmitted { index } => index + 1 == self.collection.len(),
            _ => false,
        };
        if !all_items_emitted {
            return Err(self.out_of_sequence("footer"));
        }

        let collection = self.collection;
        let footer = collection.json_footer();
        self.state = StreamState::Complete;
        self.bytes_emitted += footer.len();
        Ok(footer)
    }

    fn out_of_sequence(&self, operation: &'static str) -> MarshalError<M::EncodeError> {
        MarshalError::Sequence {
            operation,
            state: self.state,
        }
    }
}
