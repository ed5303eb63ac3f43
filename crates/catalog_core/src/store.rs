//! crates/catalog_core/src/store.rs
//!
//! The product store: authoritative CRUD over the catalog, coupled with the
//! lifecycle of each product's locally stored image file.
//!
//! Every mutation runs under a single lock covering "read current state →
//! save/delete image files → persist → update in-memory state", so concurrent
//! requests observe the same ordering a single-threaded host would.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Product, ProductInput, StoreHealth, Upload, MAX_IMAGE_BYTES};
use crate::error::{CatalogError, CatalogResult};
use crate::normalize::{
    clean_text, merge_specifications, normalize_specifications, normalize_tags, parse_flag,
    parse_price, parse_price_change,
};
use crate::ports::{ImageStorage, PortResult, ProductRepository};
use crate::resolver::{is_absolute_url, ImageResolver};

pub struct ProductStore {
    products: Mutex<Vec<Product>>,
    images: Arc<dyn ImageStorage>,
    repository: Option<Arc<dyn ProductRepository>>,
    resolver: ImageResolver,
    started_at: DateTime<Utc>,
}

impl ProductStore {
    /// Creates an empty store that keeps its state in memory only.
    pub fn in_memory(images: Arc<dyn ImageStorage>, resolver: ImageResolver) -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            images,
            repository: None,
            resolver,
            started_at: Utc::now(),
        }
    }

    /// Creates a store seeded from `repository`, which is then written after
    /// every mutation.
    ///
    /// Image URLs that older data stored with this service's host baked in are
    /// turned back into storage-relative references.
    pub async fn open(
        images: Arc<dyn ImageStorage>,
        repository: Arc<dyn ProductRepository>,
        resolver: ImageResolver,
    ) -> PortResult<Self> {
        let mut products = repository.load_all().await?;
        for product in &mut products {
            product.image = resolver.to_storage_reference(&product.image);
        }
        info!(count = products.len(), "loaded persisted products");

        Ok(Self {
            products: Mutex::new(products),
            images,
            repository: Some(repository),
            resolver,
            started_at: Utc::now(),
        })
    }

    //=====================================================================================
    // Reads
    //=====================================================================================

    /// Returns every product in insertion order, with resolved image URLs.
    pub async fn list(&self) -> Vec<Product> {
        let products = self.products.lock().await;
        products.iter().map(|p| self.resolved(p)).collect()
    }

    pub async fn get(&self, id: &str) -> CatalogResult<Product> {
        let products = self.products.lock().await;
        products
            .iter()
            .find(|p| p.id == id)
            .map(|p| self.resolved(p))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub async fn health(&self) -> StoreHealth {
        let product_count = self.products.lock().await.len();
        StoreHealth {
            product_count,
            started_at: self.started_at,
            uptime_seconds: (Utc::now() - self.started_at).num_seconds(),
        }
    }

    //=====================================================================================
    // Mutations
    //=====================================================================================

    pub async fn create(
        &self,
        input: ProductInput,
        upload: Option<Upload>,
    ) -> CatalogResult<Product> {
        let name = clean_text(input.name.as_ref())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CatalogError::Validation("name is required".to_string()))?;
        let price = input.price.as_deref().map(parse_price).transpose()?;
        let image_url = match (&upload, input.image_url.as_deref()) {
            (Some(upload), _) => {
                validate_upload(upload)?;
                None
            }
            (None, Some(url)) => self.external_image(url, "")?,
            (None, None) => None,
        };

        let mut products = self.products.lock().await;

        let image = match upload {
            Some(upload) => self.images.save(&upload.bytes, &upload.file_name).await?,
            None => image_url.unwrap_or_default(),
        };

        let main_category = category_of(&input).unwrap_or_default();
        let now = Utc::now();
        let product = Product {
            id: unique_id(&products),
            name,
            price: price.unwrap_or(0.0),
            category: main_category.clone(),
            main_category,
            sub_category: clean_text(input.sub_category.as_ref()).unwrap_or_default(),
            nested_category: clean_text(input.nested_category.as_ref()).unwrap_or_default(),
            description: clean_text(input.description.as_ref()).unwrap_or_default(),
            usage: clean_text(input.usage.as_ref()).unwrap_or_default(),
            image,
            specifications: normalize_specifications(&input.specifications),
            tags: input.tags.as_ref().map(normalize_tags).unwrap_or_default(),
            in_stock: input.in_stock.as_deref().map_or(true, parse_flag),
            created_at: now,
            updated_at: now,
        };
        info!(id = %product.id, name = %product.name, "product created");

        products.push(product.clone());
        self.persist(&products).await;
        Ok(self.resolved(&product))
    }

    pub async fn update(
        &self,
        id: &str,
        input: ProductInput,
        upload: Option<Upload>,
    ) -> CatalogResult<Product> {
        let mut products = self.products.lock().await;
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        // Everything is validated before the first side effect.
        let name = match clean_text(input.name.as_ref()) {
            Some(name) if name.is_empty() => {
                return Err(CatalogError::Validation("name cannot be empty".to_string()))
            }
            other => other,
        };
        let price = match input.price.as_deref() {
            Some(raw) => parse_price_change(raw)?,
            None => None,
        };
        let image_url = match (&upload, input.image_url.as_deref()) {
            (Some(upload), _) => {
                validate_upload(upload)?;
                None
            }
            (None, Some(url)) => self.external_image(url, &products[index].image)?,
            (None, None) => None,
        };

        let new_image = match upload {
            Some(upload) => Some(self.images.save(&upload.bytes, &upload.file_name).await?),
            None => image_url,
        };
        if let Some(new_image) = new_image {
            let previous = std::mem::take(&mut products[index].image);
            if previous != new_image {
                self.discard_image(&previous).await;
            }
            products[index].image = new_image;
        }

        let product = &mut products[index];
        if let Some(name) = name {
            product.name = name;
        }
        if let Some(price) = price {
            product.price = price;
        }
        if let Some(main_category) = category_of(&input) {
            product.category = main_category.clone();
            product.main_category = main_category;
        }
        if let Some(sub_category) = clean_text(input.sub_category.as_ref()) {
            product.sub_category = sub_category;
        }
        if let Some(nested_category) = clean_text(input.nested_category.as_ref()) {
            product.nested_category = nested_category;
        }
        if let Some(description) = clean_text(input.description.as_ref()) {
            product.description = description;
        }
        if let Some(usage) = clean_text(input.usage.as_ref()) {
            product.usage = usage;
        }
        if let Some(in_stock) = input.in_stock.as_deref() {
            product.in_stock = parse_flag(in_stock);
        }
        if !input.specifications.is_empty() {
            product.specifications =
                merge_specifications(&product.specifications, &input.specifications);
        }
        if let Some(tags) = input.tags.as_ref() {
            product.tags = normalize_tags(tags);
        }
        product.updated_at = Utc::now().max(product.updated_at);

        let updated = product.clone();
        info!(id = %updated.id, "product updated");

        self.persist(&products).await;
        Ok(self.resolved(&updated))
    }

    /// Removes a product and the local image file it owns. Returns the id.
    pub async fn delete(&self, id: &str) -> CatalogResult<String> {
        let mut products = self.products.lock().await;
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let removed = products.remove(index);
        self.discard_image(&removed.image).await;
        info!(id = %removed.id, "product deleted");

        self.persist(&products).await;
        Ok(removed.id)
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    fn resolved(&self, product: &Product) -> Product {
        Product {
            image: self.resolver.resolve(&product.image),
            ..product.clone()
        }
    }

    /// Interprets a caller-supplied image URL.
    ///
    /// Absolute external URLs are accepted. A URL pointing at our own uploads is
    /// only accepted when it is the product's current image, so no two products
    /// share a file. Blank input means "leave unchanged".
    fn external_image(&self, url: &str, current: &str) -> CatalogResult<Option<String>> {
        let reference = self.resolver.to_storage_reference(url);
        if reference.is_empty() || (!current.is_empty() && reference == current) {
            return Ok(None);
        }
        if is_absolute_url(&reference) {
            return Ok(Some(reference));
        }
        Err(CatalogError::Validation(format!(
            "image must be an uploaded file or an absolute URL, got '{reference}'"
        )))
    }

    /// Best-effort removal of a locally stored image. Absolute URLs are never
    /// touched and a missing file is not an error.
    async fn discard_image(&self, reference: &str) {
        if reference.is_empty() || is_absolute_url(reference) {
            return;
        }
        match self.images.delete(reference).await {
            Ok(true) => debug!(reference, "deleted image file"),
            Ok(false) => debug!(reference, "image file already absent"),
            Err(e) => warn!(reference, error = %e, "failed to delete image file"),
        }
    }

    /// Writes the full collection if persistence is enabled. Failures are
    /// logged; the in-memory state stays authoritative.
    async fn persist(&self, products: &[Product]) {
        let Some(repository) = &self.repository else {
            return;
        };
        if let Err(e) = repository.save_all(products).await {
            warn!(error = %e, "failed to persist products, keeping in-memory state");
        }
    }
}

fn validate_upload(upload: &Upload) -> CatalogResult<()> {
    let content_type = upload.content_type.as_deref().unwrap_or_default().trim();
    if !content_type.to_ascii_lowercase().starts_with("image/") {
        let declared = if content_type.is_empty() {
            "unknown"
        } else {
            content_type
        };
        return Err(CatalogError::UnsupportedMediaType(declared.to_string()));
    }
    if upload.bytes.len() > MAX_IMAGE_BYTES {
        return Err(CatalogError::PayloadTooLarge {
            size: upload.bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// `mainCategory` and its legacy alias `category` are kept in sync.
fn category_of(input: &ProductInput) -> Option<String> {
    clean_text(input.main_category.as_ref()).or_else(|| clean_text(input.category.as_ref()))
}

fn unique_id(products: &[Product]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if products.iter().all(|p| p.id != id) {
            return id;
        }
    }
}
