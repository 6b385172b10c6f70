//! Compressed binary record encoding for on-disk backends.

use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zstd::{decode_all, encode_all};

use crate::StoreError;

const ZSTD_LEVEL: i32 = 3;

pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, StoreError> {
    let encoded = encode_to_vec(record, standard())?;
    Ok(encode_all(encoded.as_slice(), ZSTD_LEVEL)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    let decompressed = decode_all(bytes)?;
    let (record, _) = decode_from_slice(&decompressed, standard())?;
    Ok(record)
}
