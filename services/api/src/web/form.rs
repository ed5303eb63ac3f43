//! services/api/src/web/form.rs
//!
//! Decodes a `multipart/form-data` product form into the core's input types.

use crate::error::ApiError;
use axum::{extract::multipart::MultipartError, extract::Multipart, http::StatusCode};
use catalog_core::normalize::SPECIFICATION_KEYS;
use catalog_core::{ProductInput, TagsInput, Upload};
use tracing::debug;

/// Accumulates text fields while the multipart stream is read.
#[derive(Debug, Default)]
struct FormFields {
    input: ProductInput,
    tag_values: Vec<String>,
    tags_are_sequence: bool,
}

impl FormFields {
    fn apply(&mut self, name: &str, value: String) {
        let input = &mut self.input;
        match name {
            "name" => input.name = Some(value),
            "price" => input.price = Some(value),
            "category" => input.category = Some(value),
            "mainCategory" => input.main_category = Some(value),
            "subCategory" => input.sub_category = Some(value),
            "nestedCategory" => input.nested_category = Some(value),
            "description" => input.description = Some(value),
            "usage" => input.usage = Some(value),
            "inStock" => input.in_stock = Some(value),
            "image" | "imageUrl" => input.image_url = Some(value),
            "specifications" => input.specifications.structured = Some(value),
            "tags" => self.tag_values.push(value),
            "tags[]" => {
                self.tags_are_sequence = true;
                self.tag_values.push(value);
            }
            other => match specification_key(other) {
                Some(key) => {
                    input.specifications.fields.insert(key.to_string(), value);
                }
                None => debug!(field = other, "ignoring unknown form field"),
            },
        }
    }

    fn finish(mut self) -> ProductInput {
        self.input.tags = match (self.tag_values.len(), self.tags_are_sequence) {
            (0, _) => None,
            (1, false) => self.tag_values.pop().map(TagsInput::Delimited),
            _ => Some(TagsInput::List(self.tag_values)),
        };
        self.input
    }
}

/// Bare well-known keys, or `specifications.<key>` / `specifications[<key>]`.
fn specification_key(field: &str) -> Option<&str> {
    if SPECIFICATION_KEYS.contains(&field) {
        return Some(field);
    }
    field
        .strip_prefix("specifications.")
        .or_else(|| {
            field
                .strip_prefix("specifications[")
                .and_then(|rest| rest.strip_suffix(']'))
        })
        .filter(|key| !key.trim().is_empty())
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BodyTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Reads every part of the form. A file part named `image` becomes the upload;
/// an empty file part (a form submitted without choosing a file) is ignored.
pub async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(ProductInput, Option<Upload>), ApiError> {
    let mut fields = FormFields::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if name != "image" {
                debug!(field = %name, "ignoring unexpected file part");
            } else if !(file_name.is_empty() && bytes.is_empty()) {
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        fields.apply(&name, value);
    }

    Ok((fields.finish(), upload))
}
