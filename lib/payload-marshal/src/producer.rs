use tracing::debug;

use crate::{codec::marshal_records, Marshaler, Payload, PayloadFormat, ProduceError, Splitter, Stage};

/// Produces size-bounded payloads from a collection.
///
/// This is the main entry point for transport layers: the collection is encoded once in the requested format, and if
/// the resulting payload fits within the limit, it is returned as-is. Otherwise, the collection is split until every
/// payload fits.
#[derive(Clone, Debug, Default)]
pub struct Producer {
    splitter: Splitter,
}

impl Producer {
    /// Creates a new `Producer` that splits oversized payloads with the given splitter.
    pub fn new(splitter: Splitter) -> Self {
        Self { splitter }
    }

    /// Returns a reference to the splitter used for oversized payloads.
    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// Encodes the collection into one or more payloads, in the given format, each no larger than `limit` bytes.
    ///
    /// Payloads are returned in collection order, and together contain every record exactly once. An empty collection
    /// produces no payloads.
    ///
    /// # Errors
    ///
    /// If a record fails to encode, or the collection cannot be split such that every payload fits within the limit, an
    /// error is returned, tagged with the stage that failed.
    pub fn produce<M>(
        &self, collection: &M, format: PayloadFormat, limit: usize,
    ) -> Result<Vec<Payload>, ProduceError<M::EncodeError>>
    where
        M: Marshaler + ?Sized,
    {
        if collection.is_empty() {
            return Ok(Vec::new());
        }

        let payload = marshal_records(collection, format, 0..collection.len())
            .map_err(|e| ProduceError::new(Stage::from(format), e))?;
        if self.splitter.fits(&payload, limit) {
            return Ok(vec![payload]);
        }

        debug!(
            %format,
            records = payload.record_count(),
            size = payload.size(),
            limit,
            "Payload exceeds limits. Splitting."
        );

        self.splitter
            .check_overhead(collection, format, limit)
            .and_then(|()| self.splitter.split_encoded(collection, format, limit, payload))
            .map(|result| result.into_payloads())
            .map_err(|e| ProduceError::new(Stage::Split, e))
    }
}
