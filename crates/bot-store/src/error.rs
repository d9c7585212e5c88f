//! Store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No store URL configured")]
    MissingUrl,

    #[error("Unsupported store scheme: {0}")]
    UnsupportedScheme(String),
}
