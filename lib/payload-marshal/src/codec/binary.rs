use std::ops::Range;

use protobuf::CodedOutputStream;
use snafu::ResultExt as _;

use crate::{
    errors::{Framing, MarshalError},
    Marshaler, Payload, PayloadFormat,
};

const SCRATCH_BUF_CAPACITY: usize = 8192;

/// Protocol Buffers field number under which every record is framed.
///
/// A binary payload is therefore a valid encoding of any message whose field 1 is a repeated message (or `bytes`)
/// field, such as a series payload with repeated series.
pub const RECORD_FIELD_NUMBER: u32 = 1;

/// Encodes the entire collection into a single binary payload.
///
/// # Errors
///
/// If any record cannot be encoded, an error identifying the record's index is returned.
pub fn marshal<M>(collection: &M) -> Result<Payload, MarshalError<M::EncodeError>>
where
    M: Marshaler + ?Sized,
{
    marshal_range(collection, 0..collection.len())
}

pub(super) fn marshal_range<M>(
    collection: &M, records: Range<usize>,
) -> Result<Payload, MarshalError<M::EncodeError>>
where
    M: Marshaler + ?Sized,
{
    let mut buf = Vec::new();
    let mut scratch_buf = Vec::with_capacity(SCRATCH_BUF_CAPACITY);

    {
        let mut writer = CodedOutputStream::vec(&mut buf);
        for index in records.clone() {
            // Records are encoded separately so that we know their length before writing the field header.
            scratch_buf.clear();
            collection
                .write_binary_item(index, &mut scratch_buf)
                .map_err(|source| MarshalError::Encoding {
                    index,
                    description: collection.describe_item(index),
                    source,
                })?;

            writer.write_bytes(RECORD_FIELD_NUMBER, &scratch_buf).context(Framing)?;
        }
        writer.flush().context(Framing)?;
    }

    Ok(Payload::new(PayloadFormat::Binary, records, buf))
}

#[cfg(test)]
mod tests {
    use protobuf::CodedInputStream;

    use super::{marshal, RECORD_FIELD_NUMBER};
    use crate::{test_util::TestRecords, MarshalError, PayloadFormat};

    fn decode_records(data: &[u8]) -> Vec<Vec<u8>> {
        let mut reader = CodedInputStream::from_bytes(data);
        let mut records = Vec::new();
        while !reader.eof().unwrap() {
            let tag = reader.read_raw_varint32().unwrap();
            assert_eq!(tag, (RECORD_FIELD_NUMBER << 3) | 2, "unexpected field tag");
            records.push(reader.read_bytes().unwrap());
        }
        records
    }

    #[test]
    fn frames_records_in_order() {
        let records = TestRecords::from_values(["alpha", "", "gamma"]);

        let payload = marshal(&records).unwrap();
        assert_eq!(payload.format(), PayloadFormat::Binary);
        assert_eq!(payload.records(), 0..3);

        let decoded = decode_records(payload.data());
        assert_eq!(decoded, vec![b"alpha".to_vec(), Vec::new(), b"gamma".to_vec()]);
    }

    #[test]
    fn empty_collection() {
        let records = TestRecords::from_values::<_, &str>([]);

        let payload = marshal(&records).unwrap();
        assert_eq!(payload.size(), 0);
        assert_eq!(payload.record_count(), 0);
    }

    #[test]
    fn deterministic() {
        let records = TestRecords::sized(16, 40);

        assert_eq!(marshal(&records).unwrap(), marshal(&records).unwrap());
    }

    #[test]
    fn encoding_error_names_record() {
        let mut records = TestRecords::from_values(["a", "b", "c"]);
        records.break_record(1);

        match marshal(&records) {
            Err(MarshalError::Encoding { index, description, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(description, "record #1");
            }
            other => panic!("expected encoding error, got {:?}", other),
        }
    }
}
