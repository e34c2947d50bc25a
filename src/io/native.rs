//! Native binary format: magic, version byte, postcard payload.

use thiserror::Error;

use super::payload::{Payload, PayloadV1};
use crate::model::Model;

/// File identification bytes.
pub const MAGIC: [u8; 4] = *b"CRBM";
/// Current format version, bumped when [`Payload`] gains a variant.
pub const FORMAT_VERSION: u8 = 1;

/// Errors while serializing or writing a model.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] postcard::Error),
}

/// Errors while reading or deserializing a model.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a model file (bad magic bytes)")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("decode error: {0}")]
    Decode(#[from] postcard::Error),
    #[error("malformed model: {0}")]
    Malformed(String),
}

/// Serialize a model into the native binary format.
pub fn to_bytes(model: &Model) -> Result<Vec<u8>, SaveError> {
    let payload = Payload::V1(PayloadV1::from(model));
    let mut bytes = Vec::from(MAGIC);
    bytes.push(FORMAT_VERSION);
    let body = postcard::to_stdvec(&payload)?;
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Deserialize a model from the native binary format.
pub fn from_bytes(bytes: &[u8]) -> Result<Model, LoadError> {
    if bytes.len() < MAGIC.len() + 1 || bytes[..MAGIC.len()] != MAGIC {
        return Err(LoadError::BadMagic);
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion(version));
    }
    let payload: Payload = postcard::from_bytes(&bytes[MAGIC.len() + 1..])?;
    match payload {
        Payload::V1(v1) => v1.into_model(),
    }
}
