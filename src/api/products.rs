// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product catalog endpoints.
//!
//! Reads are public; catalog mutation requires an authenticated principal.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::repository::products::{NewProduct, ProductRepository, ProductUpdate, StoredProduct},
};

/// Create a product.
#[utoipa::path(
    post,
    path = "/v1/products",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = StoredProduct),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_product(
    Auth(_principal): Auth,
    State(state): State<AppState>,
    Json(request): Json<NewProduct>,
) -> Result<(StatusCode, Json<StoredProduct>), ApiError> {
    let products = ProductRepository::new(&state.db);
    let product = products.create(request)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List all products.
#[utoipa::path(
    get,
    path = "/v1/products",
    tag = "Products",
    responses((status = 200, description = "All products", body = [StoredProduct]))
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredProduct>>, ApiError> {
    let products = ProductRepository::new(&state.db);
    Ok(Json(products.list()?))
}

/// Get a product by ID.
#[utoipa::path(
    get,
    path = "/v1/products/{product_id}",
    tag = "Products",
    params(("product_id" = String, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = StoredProduct),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StoredProduct>, ApiError> {
    let products = ProductRepository::new(&state.db);
    Ok(Json(products.get(&product_id)?))
}

/// Update a product. Only supplied fields are changed.
#[utoipa::path(
    put,
    path = "/v1/products/{product_id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("product_id" = String, Path, description = "Product ID")),
    request_body = ProductUpdate,
    responses(
        (status = 200, description = "Updated product", body = StoredProduct),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    Auth(_principal): Auth,
    Path(product_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<ProductUpdate>,
) -> Result<Json<StoredProduct>, ApiError> {
    let products = ProductRepository::new(&state.db);
    Ok(Json(products.update(&product_id, request)?))
}

/// Delete a product.
#[utoipa::path(
    delete,
    path = "/v1/products/{product_id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("product_id" = String, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    Auth(_principal): Auth,
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let products = ProductRepository::new(&state.db);
    products.delete(&product_id)?;
    Ok(StatusCode::NO_CONTENT)
}
