pub mod domain;
pub mod error;
pub mod normalize;
pub mod ports;
pub mod resolver;
pub mod store;

pub use domain::{
    Product, ProductInput, SpecificationsInput, StoreHealth, TagsInput, Upload, MAX_IMAGE_BYTES,
};
pub use error::{CatalogError, CatalogResult};
pub use ports::{ImageStorage, PortError, PortResult, ProductRepository};
pub use resolver::{is_absolute_url, ImageResolver};
pub use store::ProductStore;
