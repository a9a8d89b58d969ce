use marquee_core::TitleRecord;

use crate::StorageError;

pub fn encode_record(record: &TitleRecord) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec(record)?)
}

pub fn decode_record(bytes: &[u8]) -> Result<TitleRecord, StorageError> {
    Ok(serde_json::from_slice(bytes)?)
}
