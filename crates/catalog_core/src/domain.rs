//! crates/catalog_core/src/domain.rs
//!
//! Defines the pure, core data structures for the catalog.
//! These structs are independent of any storage or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The largest image attachment accepted by the store, in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// A single catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub main_category: String,
    pub sub_category: String,
    pub nested_category: String,
    pub description: String,
    pub usage: String,
    /// Empty, a storage-relative reference (`/uploads/...`) or an absolute URL.
    pub image: String,
    pub specifications: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tags as they arrive from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagsInput {
    /// A single comma-delimited string, e.g. `"eco, natural"`.
    Delimited(String),
    /// A sequence that has already been split.
    List(Vec<String>),
}

/// Specification fields as they arrive from a caller.
///
/// `structured` holds a raw JSON object payload; `fields` holds individually
/// submitted keys. A well-formed structured payload wins over the flat fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecificationsInput {
    pub structured: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl SpecificationsInput {
    pub fn is_empty(&self) -> bool {
        self.structured.is_none() && self.fields.is_empty()
    }
}

/// The loosely-typed field set accepted by create and update.
///
/// Every field is optional here; `create` requires `name`, `update` only
/// touches what is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInput {
    pub name: Option<String>,
    /// Numeric or numeric-string price, e.g. `"12.5"`.
    pub price: Option<String>,
    pub category: Option<String>,
    pub main_category: Option<String>,
    pub sub_category: Option<String>,
    pub nested_category: Option<String>,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub in_stock: Option<String>,
    /// An externally hosted image URL supplied instead of an upload.
    pub image_url: Option<String>,
    pub specifications: SpecificationsInput,
    pub tags: Option<TagsInput>,
}

/// An image attachment that accompanies a create or update call.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Snapshot of the store used by the health endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHealth {
    pub product_count: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}
