//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and how it is assembled from config.

use crate::adapters::{JsonFileRepository, LocalImageStorage};
use crate::config::{Config, StorageMode, UPLOADS_PREFIX};
use crate::error::ApiError;
use catalog_core::{ImageResolver, ProductStore};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ProductStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the configured adapters into a `ProductStore`.
    pub async fn from_config(config: Arc<Config>) -> Result<Self, ApiError> {
        let images = LocalImageStorage::new(&config.uploads_dir, UPLOADS_PREFIX);
        images.ensure_root().await?;
        let images = Arc::new(images);

        let resolver = ImageResolver::new(
            &config.public_base_url,
            UPLOADS_PREFIX,
            config.placeholder_image_url.clone(),
        );

        let store = match &config.storage {
            StorageMode::Memory => {
                info!("Keeping products in memory only.");
                ProductStore::in_memory(images, resolver)
            }
            StorageMode::JsonFile(path) => {
                info!("Persisting products to {}", path.display());
                let repository = Arc::new(JsonFileRepository::new(path));
                ProductStore::open(images, repository, resolver).await?
            }
        };

        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }
}
