//! crates/catalog_core/src/error.rs
//!
//! Error taxonomy for the product store operations.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A required field is missing or a field could not be interpreted.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Unsupported media type '{0}': only image uploads are accepted")]
    UnsupportedMediaType(String),

    #[error("Image of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// The image storage collaborator failed to store an upload.
    #[error("Image storage error: {0}")]
    Storage(#[from] PortError),
}

/// A convenience type alias for `Result<T, CatalogError>`.
pub type CatalogResult<T> = Result<T, CatalogError>;
