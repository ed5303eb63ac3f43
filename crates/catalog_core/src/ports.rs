//! crates/catalog_core/src/ports.rs
//!
//! Defines the service contracts (traits) the catalog core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of where images and product records actually live.

use async_trait::async_trait;

use crate::domain::Product;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external collaborators (disk, database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Stores the bytes under a collision-free name derived from `suggested_name`
    /// and returns the storage-relative reference (e.g. `/uploads/product-....png`).
    async fn save(&self, bytes: &[u8], suggested_name: &str) -> PortResult<String>;

    /// Removes the file behind a storage-relative reference.
    ///
    /// Returns `Ok(false)` when there was nothing to delete.
    async fn delete(&self, reference: &str) -> PortResult<bool>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Loads every persisted product, in insertion order.
    async fn load_all(&self) -> PortResult<Vec<Product>>;

    /// Replaces the persisted state with `products`.
    async fn save_all(&self, products: &[Product]) -> PortResult<()>;
}
