//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::{
    form::read_product_form,
    response::{
        ApiResponse, DeletedResponse, ErrorBody, ErrorEnvelope, HealthResponse, ProductResponse,
    },
    state::AppState,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_products_handler,
        get_product_handler,
        create_product_handler,
        update_product_handler,
        delete_product_handler,
        health_handler,
    ),
    components(
        schemas(ProductResponse, DeletedResponse, HealthResponse, ErrorEnvelope, ErrorBody)
    ),
    tags(
        (name = "Product Catalog API", description = "Product records with image uploads.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every product in insertion order.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products, wrapped in the success envelope with a count", body = [ProductResponse])
    )
)]
pub async fn list_products_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<ProductResponse>>> {
    let products: Vec<ProductResponse> = app_state
        .store
        .list()
        .await
        .into_iter()
        .map(ProductResponse::from)
        .collect();
    let count = products.len();
    Json(ApiResponse::with_count(products, count))
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product, wrapped in the success envelope", body = ProductResponse),
        (status = 404, description = "No product with that id", body = ErrorEnvelope)
    )
)]
pub async fn get_product_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let product = app_state.store.get(&id).await?;
    Ok(Json(ApiResponse::new(product.into())))
}

/// Create a product.
///
/// Accepts a multipart/form-data request. `name` is required; an optional
/// `image` file part must be an image of at most 10 MiB.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body(content_type = "multipart/form-data", description = "Product fields and an optional `image` file."),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing name or malformed field", body = ErrorEnvelope),
        (status = 413, description = "Image larger than 10 MiB", body = ErrorEnvelope),
        (status = 415, description = "Attachment is not an image", body = ErrorEnvelope)
    )
)]
pub async fn create_product_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (input, upload) = read_product_form(multipart).await?;

    let product = app_state.store.create(input, upload).await?;
    info!(id = %product.id, "created product via API");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ProductResponse::from(product))),
    ))
}

/// Update a product. Omitted fields keep their current values.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body(content_type = "multipart/form-data", description = "Fields to change and an optional replacement `image` file."),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Malformed field", body = ErrorEnvelope),
        (status = 404, description = "No product with that id", body = ErrorEnvelope),
        (status = 413, description = "Image larger than 10 MiB", body = ErrorEnvelope),
        (status = 415, description = "Attachment is not an image", body = ErrorEnvelope)
    )
)]
pub async fn update_product_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (input, upload) = read_product_form(multipart).await?;

    let product = app_state.store.update(&id, input, upload).await?;
    Ok(Json(ApiResponse::new(product.into())))
}

/// Delete a product and its locally stored image.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = DeletedResponse),
        (status = 404, description = "No product with that id", body = ErrorEnvelope)
    )
)]
pub async fn delete_product_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let id = app_state.store.delete(&id).await?;
    Ok(Json(ApiResponse::new(DeletedResponse { id })))
}

/// Report store health.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Item count and uptime", body = HealthResponse)
    )
)]
pub async fn health_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<ApiResponse<HealthResponse>> {
    let health = app_state.store.health().await;
    Json(ApiResponse::new(health.into()))
}
