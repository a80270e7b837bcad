//! One-shot codecs.
//!
//! Both codecs encode an entire collection into a single [`Payload`] with no awareness of size limits. Internally,
//! they operate over a range of record indices so that the splitter can encode parts of a collection without copying
//! records into new collections.

use std::ops::Range;

use crate::{MarshalError, Marshaler, Payload, PayloadFormat};

mod binary;
pub use self::binary::{marshal, RECORD_FIELD_NUMBER};

mod json;
pub use self::json::marshal_json;
pub(crate) use self::json::write_json_record;

/// Encodes the given range of records in the given format.
pub(crate) fn marshal_records<M>(
    collection: &M, format: PayloadFormat, records: Range<usize>,
) -> Result<Payload, MarshalError<M::EncodeError>>
where
    M: Marshaler + ?Sized,
{
    match format {
        PayloadFormat::Binary => binary::marshal_range(collection, records),
        PayloadFormat::Json => json::marshal_json_range(collection, records),
    }
}

/// Returns the size, in bytes, of a payload in the given format that contains no records.
///
/// No payload in this format can be smaller than this.
pub(crate) fn fixed_overhead<M>(collection: &M, format: PayloadFormat) -> usize
where
    M: Marshaler + ?Sized,
{
    match format {
        PayloadFormat::Binary => 0,
        PayloadFormat::Json => collection.json_header().len() + collection.json_footer().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::{fixed_overhead, marshal_records};
    use crate::{test_util::TestRecords, PayloadFormat};

    #[test]
    fn overhead_matches_empty_payload() {
        let records = TestRecords::from_values::<_, &str>([]);

        for format in [PayloadFormat::Binary, PayloadFormat::Json] {
            let payload = marshal_records(&records, format, 0..0).unwrap();
            assert_eq!(payload.size(), fixed_overhead(&records, format));
        }
    }

    #[test]
    fn range_reports_absolute_indices() {
        let records = TestRecords::from_values(["a", "b", "c", "d"]);

        let payload = marshal_records(&records, PayloadFormat::Json, 2..4).unwrap();
        assert_eq!(payload.records(), 2..4);
        assert_eq!(&payload.data()[..], b"[\"c\",\"d\"]");
    }
}
