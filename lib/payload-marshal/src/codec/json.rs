use std::ops::Range;

use crate::{MarshalError, Marshaler, Payload, PayloadFormat};

/// Encodes the entire collection into a single JSON payload.
///
/// The payload consists of the collection's JSON header, every record separated by the JSON separator, and the JSON
/// footer. With the default delimiters, this is a JSON array with one element per record.
///
/// # Errors
///
/// If any record cannot be encoded, an error identifying the record's index is returned.
pub fn marshal_json<M>(collection: &M) -> Result<Payload, MarshalError<M::EncodeError>>
where
    M: Marshaler + ?Sized,
{
    marshal_json_range(collection, 0..collection.len())
}

pub(super) fn marshal_json_range<M>(
    collection: &M, records: Range<usize>,
) -> Result<Payload, MarshalError<M::EncodeError>>
where
    M: Marshaler + ?Sized,
{
    let mut buf = Vec::new();
    buf.extend_from_slice(collection.json_header());

    for index in records.clone() {
        if index != records.start {
            buf.extend_from_slice(collection.json_separator());
        }
        write_json_record(collection, index, &mut buf)?;
    }

    buf.extend_from_slice(collection.json_footer());

    Ok(Payload::new(PayloadFormat::Json, records, buf))
}

/// Encodes a single record as JSON, attaching the record's index and description to any error.
pub(crate) fn write_json_record<M>(
    collection: &M, index: usize, buf: &mut Vec<u8>,
) -> Result<(), MarshalError<M::EncodeError>>
where
    M: Marshaler + ?Sized,
{
    collection
        .write_json_item(index, buf)
        .map_err(|source| MarshalError::Encoding {
            index,
            description: collection.describe_item(index),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::marshal_json;
    use crate::{test_util::TestRecords, MarshalError, PayloadFormat};

    #[test]
    fn json_array() {
        let records = TestRecords::from_values(["hello, world!", "foo", "bar"]);

        let payload = marshal_json(&records).unwrap();
        assert_eq!(payload.format(), PayloadFormat::Json);
        assert_eq!(payload.record_count(), 3);
        assert_eq!(&payload.data()[..], br#"["hello, world!","foo","bar"]"#);
    }

    #[test]
    fn empty_collection() {
        let records = TestRecords::from_values::<_, &str>([]);

        let payload = marshal_json(&records).unwrap();
        assert_eq!(&payload.data()[..], b"[]");
    }

    #[test]
    fn custom_delimiters() {
        let records = TestRecords::from_values(["a", "b"]).with_delimiters(b"{\"series\":[", b"]}", b", ");

        let payload = marshal_json(&records).unwrap();
        assert_eq!(&payload.data()[..], br#"{"series":["a", "b"]}"#);
    }

    #[test]
    fn encoding_error_names_record() {
        let mut records = TestRecords::from_values(["a", "b", "c"]);
        records.break_record(2);

        let error = marshal_json(&records).unwrap_err();
        assert!(matches!(error, MarshalError::Encoding { index: 2, .. }));
    }
}
