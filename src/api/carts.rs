// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cart endpoints.
//!
//! All cart operations require authentication and enforce ownership.
//! Ownership mismatches on cart internals are masked as 404, with the same
//! message a genuine absence produces, so callers cannot probe for other
//! users' cart or item ids.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::repository::carts::{
        CartItemResponse, CartRepository, CartResponse, NewCartItem, CART_ITEM_ENTITY,
    },
    storage::OwnershipEnforcer,
};

/// Request to create a cart with initial items.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCartRequest {
    /// Must match the authenticated principal; carts cannot be created on
    /// behalf of another user, admins included.
    pub owner_user_id: String,
    pub items: Vec<NewCartItem>,
}

/// Request to change an item's quantity.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// Create a cart for the authenticated user.
///
/// Every referenced product is validated before anything is persisted; on
/// any missing product the whole request fails and no cart is created.
#[utoipa::path(
    post,
    path = "/v1/carts",
    tag = "Carts",
    security(("bearer_auth" = [])),
    request_body = CreateCartRequest,
    responses(
        (status = 201, description = "Cart created", body = CartResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 403, description = "Cart owner differs from the caller"),
        (status = 404, description = "Referenced product not found"),
        (status = 409, description = "Caller already has a cart")
    )
)]
pub async fn create_cart(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateCartRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    if request.owner_user_id != principal.user_id {
        return Err(ApiError::forbidden(
            "Not authorized to create cart for this user",
        ));
    }

    let carts = CartRepository::new(&state.db);
    let cart = carts.create(&principal.user_id, &request.items)?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// Get the authenticated user's cart.
#[utoipa::path(
    get,
    path = "/v1/carts",
    tag = "Carts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's cart", body = CartResponse),
        (status = 404, description = "Caller has no cart")
    )
)]
pub async fn get_cart(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>, ApiError> {
    let carts = CartRepository::new(&state.db);
    Ok(Json(carts.get_by_owner(&principal.user_id)?))
}

/// Add an item to an existing cart.
#[utoipa::path(
    post,
    path = "/v1/carts/{cart_id}/items",
    tag = "Carts",
    security(("bearer_auth" = [])),
    params(("cart_id" = String, Path, description = "Cart ID")),
    request_body = NewCartItem,
    responses(
        (status = 201, description = "Item added", body = CartItemResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Cart or product not found")
    )
)]
pub async fn add_cart_item(
    Auth(principal): Auth,
    Path(cart_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<NewCartItem>,
) -> Result<(StatusCode, Json<CartItemResponse>), ApiError> {
    let carts = CartRepository::new(&state.db);

    let cart = carts.get(&cart_id)?;
    cart.verify_owner_masked(&principal, &format!("Cart {cart_id}"))?;

    let item = carts.add_item(&cart_id, &request.product_id, request.quantity)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Change the quantity of a cart item. Returns the whole cart.
#[utoipa::path(
    put,
    path = "/v1/carts/{cart_id}/items/{item_id}",
    tag = "Carts",
    security(("bearer_auth" = [])),
    params(
        ("cart_id" = String, Path, description = "Cart ID"),
        ("item_id" = String, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Item absent or not owned by the caller")
    )
)]
pub async fn update_cart_item(
    Auth(principal): Auth,
    Path((cart_id, item_id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let carts = CartRepository::new(&state.db);

    let cart = carts.get(&cart_id)?;
    cart.verify_owner_masked(&principal, CART_ITEM_ENTITY)?;

    let updated = carts.update_item(&cart_id, &item_id, request.quantity)?;
    Ok(Json(updated))
}

/// Remove an item from a cart.
#[utoipa::path(
    delete,
    path = "/v1/carts/{cart_id}/items/{item_id}",
    tag = "Carts",
    security(("bearer_auth" = [])),
    params(
        ("cart_id" = String, Path, description = "Cart ID"),
        ("item_id" = String, Path, description = "Cart item ID")
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 404, description = "Item absent or not owned by the caller")
    )
)]
pub async fn remove_cart_item(
    Auth(principal): Auth,
    Path((cart_id, item_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let carts = CartRepository::new(&state.db);

    let cart = carts.get(&cart_id)?;
    cart.verify_owner_masked(&principal, CART_ITEM_ENTITY)?;

    carts.remove_item(&cart_id, &item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a cart and all of its items.
#[utoipa::path(
    delete,
    path = "/v1/carts/{cart_id}",
    tag = "Carts",
    security(("bearer_auth" = [])),
    params(("cart_id" = String, Path, description = "Cart ID")),
    responses(
        (status = 204, description = "Cart deleted"),
        (status = 404, description = "Cart absent or not owned by the caller")
    )
)]
pub async fn delete_cart(
    Auth(principal): Auth,
    Path(cart_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let carts = CartRepository::new(&state.db);

    let cart = carts.get(&cart_id)?;
    cart.verify_owner_masked(&principal, &format!("Cart {cart_id}"))?;

    carts.delete(&cart_id)?;
    Ok(StatusCode::NO_CONTENT)
}
