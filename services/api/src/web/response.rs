//! services/api/src/web/response.rs
//!
//! Response envelopes and payload structs shared by the REST handlers.

use catalog_core::{Product, StoreHealth};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

//=========================================================================================
// Envelopes
//=========================================================================================

/// `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
        }
    }

    pub fn with_count(data: T, count: usize) -> Self {
        Self {
            success: true,
            data,
            count: Some(count),
        }
    }
}

/// `{ "success": false, "error": { "code": ..., "message": ... } }`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

//=========================================================================================
// Payloads
//=========================================================================================

/// A product as returned to callers, with its image already resolved.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub main_category: String,
    pub sub_category: String,
    pub nested_category: String,
    pub description: String,
    pub usage: String,
    pub image: String,
    pub specifications: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            category: product.category,
            main_category: product.main_category,
            sub_category: product.sub_category,
            nested_category: product.nested_category,
            description: product.description,
            usage: product.usage,
            image: product.image,
            specifications: product.specifications,
            tags: product.tags,
            in_stock: product.in_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub products: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
}

impl From<StoreHealth> for HealthResponse {
    fn from(health: StoreHealth) -> Self {
        Self {
            status: "ok",
            products: health.product_count,
            started_at: health.started_at,
            uptime_seconds: health.uptime_seconds,
        }
    }
}
