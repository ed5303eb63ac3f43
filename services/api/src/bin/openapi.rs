//! services/api/src/bin/openapi.rs
//!
//! Writes the catalog's OpenAPI document to disk.
//!
//! Usage: `openapi [OUTPUT]`. The document goes to `openapi.json` in the
//! current directory unless another path is given.

use api_lib::web::rest::ApiDoc;
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

/// Picks the output path from the first command-line argument.
fn output_path(mut args: impl Iterator<Item = String>) -> PathBuf {
    args.nth(1)
        .filter(|arg| !arg.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

/// Renders the catalog API document and writes it to `path`, creating
/// parent directories as needed.
fn write_document(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let document = ApiDoc::openapi().to_pretty_json()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, document)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = output_path(std::env::args());
    write_document(&path)?;
    println!("Catalog OpenAPI document written to {}", path.display());
    Ok(())
}
