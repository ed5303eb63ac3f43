//! crates/catalog_core/src/normalize.rs
//!
//! Defaulting and normalization rules for the loosely-typed product fields.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{SpecificationsInput, TagsInput};
use crate::error::{CatalogError, CatalogResult};

/// Specification keys every product carries, empty when not supplied.
pub const SPECIFICATION_KEYS: [&str; 7] = [
    "composition",
    "gsm",
    "width",
    "threadCount",
    "construction",
    "weave",
    "finish",
];

//=========================================================================================
// Tags
//=========================================================================================

/// Splits and trims tags. Empty segments are dropped, so the result is stable
/// when fed back in as a `TagsInput::List`.
pub fn normalize_tags(input: &TagsInput) -> Vec<String> {
    match input {
        TagsInput::Delimited(raw) => {
            // Some clients send the sequence JSON-encoded in a text field.
            if let Ok(items) = serde_json::from_str::<Vec<String>>(raw.trim()) {
                return clean_tags(items.iter().map(String::as_str));
            }
            clean_tags(raw.split(','))
        }
        TagsInput::List(items) => clean_tags(items.iter().map(String::as_str)),
    }
}

fn clean_tags<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

//=========================================================================================
// Specifications
//=========================================================================================

/// Builds the specification map for a new product.
pub fn normalize_specifications(input: &SpecificationsInput) -> BTreeMap<String, String> {
    let mut specs = input
        .structured
        .as_deref()
        .and_then(parse_structured)
        .unwrap_or_else(|| trimmed_fields(&input.fields));
    fill_default_keys(&mut specs);
    specs
}

/// Applies an update to an existing specification map.
///
/// A well-formed structured payload replaces the map; otherwise each supplied
/// field overwrites its key and every other key keeps its prior value.
pub fn merge_specifications(
    existing: &BTreeMap<String, String>,
    input: &SpecificationsInput,
) -> BTreeMap<String, String> {
    let mut specs = match input.structured.as_deref().and_then(parse_structured) {
        Some(structured) => structured,
        None => {
            let mut merged = existing.clone();
            merged.extend(trimmed_fields(&input.fields));
            merged
        }
    };
    fill_default_keys(&mut specs);
    specs
}

fn parse_structured(raw: &str) -> Option<BTreeMap<String, String>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(
            map.iter()
                .map(|(key, value)| (key.trim().to_string(), spec_value(value)))
                .filter(|(key, _)| !key.is_empty())
                .collect(),
        ),
        Ok(_) => {
            debug!("specifications payload is not a JSON object, using individual fields");
            None
        }
        Err(e) => {
            debug!(error = %e, "malformed specifications payload, using individual fields");
            None
        }
    }
}

fn spec_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn trimmed_fields(fields: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    fields
        .iter()
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn fill_default_keys(specs: &mut BTreeMap<String, String>) {
    for key in SPECIFICATION_KEYS {
        specs.entry(key.to_string()).or_default();
    }
}

//=========================================================================================
// Scalars
//=========================================================================================

/// Parses a numeric or numeric-string price for a new product.
///
/// Blank or unparseable input yields `0.0`. Negative and non-finite values
/// are rejected.
pub fn parse_price(raw: &str) -> CatalogResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(price) => checked_price(price, trimmed),
        Err(_) => {
            debug!(price = trimmed, "unparseable price, defaulting to 0");
            Ok(0.0)
        }
    }
}

/// Parses a price supplied on update.
///
/// Blank input means "leave unchanged" and yields `None`. Unlike
/// [`parse_price`], unparseable input is rejected so a stored price is never
/// silently replaced by `0`.
pub fn parse_price_change(raw: &str) -> CatalogResult<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let price = trimmed.parse::<f64>().map_err(|_| {
        CatalogError::Validation(format!("price must be a number, got '{trimmed}'"))
    })?;
    checked_price(price, trimmed).map(Some)
}

fn checked_price(price: f64, raw: &str) -> CatalogResult<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::Validation(format!(
            "price must be a non-negative number, got '{raw}'"
        )));
    }
    Ok(price)
}

/// Interprets form-style booleans (`true`, `1`, `yes`, `on`).
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Trims a text field, mapping absent to `None`.
pub fn clean_text(raw: Option<&String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
}
