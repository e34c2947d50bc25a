//! Data containers for training and prediction.
//!
//! The central type is [`Pool`]: a bundled dataset grouping feature records,
//! labels, and categorical feature declarations for reuse across fit and
//! predict calls. Construct one from mixed rows with [`Pool::from_rows`] or
//! column by column with [`Pool::builder`].

mod error;
mod pool;
mod schema;
mod value;
mod vocab;

pub use error::PoolError;
pub use pool::{Pool, PoolBuilder};
pub use schema::{FeatureMeta, FeatureType, PoolSchema};
pub use value::{Labels, RowValue};
pub use vocab::CategoryVocab;
