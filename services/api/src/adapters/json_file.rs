//! services/api/src/adapters/json_file.rs
//!
//! This module contains the JSON-file repository, the concrete implementation of
//! the `ProductRepository` port that keeps the whole collection in one JSON array.

use async_trait::async_trait;
use catalog_core::domain::Product;
use catalog_core::ports::{PortError, PortResult, ProductRepository};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A repository that rewrites a single JSON document after every mutation.
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Creates a new `JsonFileRepository`. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

//=========================================================================================
// "Impure" Record Structs
//=========================================================================================

/// On-disk shape of a product. Every field but `id` and `name` is optional so
/// documents written by older revisions still load.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRecord {
    id: IdValue,
    name: String,
    #[serde(default)]
    price: PriceValue,
    #[serde(default)]
    category: String,
    #[serde(default)]
    main_category: String,
    #[serde(default)]
    sub_category: String,
    #[serde(default)]
    nested_category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    usage: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    specifications: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_in_stock")]
    in_stock: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Ids were numeric timestamps in older documents.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(serde_json::Number),
}

/// Prices were sometimes stored as strings.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl Default for PriceValue {
    fn default() -> Self {
        PriceValue::Number(0.0)
    }
}

fn default_in_stock() -> bool {
    true
}

impl ProductRecord {
    fn to_domain(self) -> Product {
        let created_at = self.created_at.or(self.updated_at).unwrap_or_else(Utc::now);
        let updated_at = self.updated_at.unwrap_or(created_at).max(created_at);
        let main_category = if self.main_category.is_empty() {
            self.category
        } else {
            self.main_category
        };
        Product {
            id: match self.id {
                IdValue::Text(id) => id,
                IdValue::Number(id) => id.to_string(),
            },
            name: self.name,
            price: match self.price {
                PriceValue::Number(price) => price,
                PriceValue::Text(price) => price.trim().parse().unwrap_or(0.0),
            },
            category: main_category.clone(),
            main_category,
            sub_category: self.sub_category,
            nested_category: self.nested_category,
            description: self.description,
            usage: self.usage,
            image: self.image,
            specifications: self
                .specifications
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect(),
            tags: self.tags,
            in_stock: self.in_stock,
            created_at,
            updated_at,
        }
    }

    fn from_domain(product: &Product) -> Self {
        Self {
            id: IdValue::Text(product.id.clone()),
            name: product.name.clone(),
            price: PriceValue::Number(product.price),
            category: product.category.clone(),
            main_category: product.main_category.clone(),
            sub_category: product.sub_category.clone(),
            nested_category: product.nested_category.clone(),
            description: product.description.clone(),
            usage: product.usage.clone(),
            image: product.image.clone(),
            specifications: product
                .specifications
                .iter()
                .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
                .collect(),
            tags: product.tags.clone(),
            in_stock: product.in_stock,
            created_at: Some(product.created_at),
            updated_at: Some(product.updated_at),
        }
    }
}

//=========================================================================================
// `ProductRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProductRepository for JsonFileRepository {
    async fn load_all(&self) -> PortResult<Vec<Product>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PortError::Unexpected(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let records: Vec<ProductRecord> = serde_json::from_slice(&contents).map_err(|e| {
            PortError::Unexpected(format!("failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(records.into_iter().map(ProductRecord::to_domain).collect())
    }

    async fn save_all(&self, products: &[Product]) -> PortResult<()> {
        let records: Vec<ProductRecord> = products.iter().map(ProductRecord::from_domain).collect();
        let json = serde_json::to_vec_pretty(&records)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        // Write beside the target and rename so readers never see a torn file.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, json).await.map_err(|e| {
            PortError::Unexpected(format!("failed to write {}: {e}", staging.display()))
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|e| {
            PortError::Unexpected(format!("failed to replace {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}
