//! crates/catalog_core/src/resolver.rs
//!
//! Maps stored image references to externally fetchable URLs.
//!
//! Stored data never contains a host: resolution happens only when a product
//! leaves the store, so moving to a new public base URL needs no migration.

/// Hosts that older data may have baked into image URLs.
const LOCAL_HOSTS: [&str; 2] = ["http://localhost", "http://127.0.0.1"];

#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: String,
    uploads_prefix: String,
    placeholder: Option<String>,
}

impl ImageResolver {
    /// Creates a resolver.
    ///
    /// `uploads_prefix` is the path under which storage-relative references
    /// live (e.g. `/uploads`). A trailing `/` on `base_url` is ignored.
    pub fn new(base_url: &str, uploads_prefix: &str, placeholder: Option<String>) -> Self {
        let prefix = uploads_prefix.trim_matches('/');
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            uploads_prefix: format!("/{prefix}/"),
            placeholder: placeholder.filter(|url| !url.trim().is_empty()),
        }
    }

    /// Resolves a stored reference for a caller.
    pub fn resolve(&self, reference: &str) -> String {
        let reference = reference.trim();
        if reference.is_empty() {
            return self.placeholder.clone().unwrap_or_default();
        }
        if is_absolute_url(reference) {
            return reference.to_string();
        }
        if self.is_storage_reference(reference) {
            let path = reference.trim_start_matches('/');
            return format!("{}/{}", self.base_url, path);
        }
        reference.to_string()
    }

    /// Whether `reference` points into the image-storage root.
    pub fn is_storage_reference(&self, reference: &str) -> bool {
        let with_slash = if reference.starts_with('/') {
            reference.to_string()
        } else {
            format!("/{reference}")
        };
        with_slash.starts_with(&self.uploads_prefix) && with_slash.len() > self.uploads_prefix.len()
    }

    /// Turns a URL that points at this service's own uploads back into a
    /// storage-relative reference. Anything else is returned trimmed.
    pub fn to_storage_reference(&self, url: &str) -> String {
        let url = url.trim();
        let hosts = std::iter::once(self.base_url.as_str()).chain(LOCAL_HOSTS);
        for host in hosts {
            let Some(rest) = url.strip_prefix(host) else {
                continue;
            };
            // Skip an optional `:port` after a bare local host.
            let path = match rest.strip_prefix(':') {
                Some(after_colon) => after_colon.trim_start_matches(|c: char| c.is_ascii_digit()),
                None => rest,
            };
            if path.starts_with(&self.uploads_prefix) {
                return path.to_string();
            }
        }
        url.to_string()
    }
}

/// Whether `reference` already carries a URL scheme (`https://`, `data:`, ...).
pub fn is_absolute_url(reference: &str) -> bool {
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && (reference[scheme.len()..].starts_with("://") || scheme.eq_ignore_ascii_case("data"))
}
