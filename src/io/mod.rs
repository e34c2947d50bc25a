//! Model persistence in the native binary format.

mod native;
mod payload;

pub use native::{from_bytes, to_bytes, LoadError, SaveError, FORMAT_VERSION, MAGIC};
pub use payload::{ForestPayload, Payload, PayloadV1, TreePayload};
