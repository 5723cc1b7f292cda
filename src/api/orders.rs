// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Order endpoints.
//!
//! Orders are visible to their owner and to admins; the order list, partial
//! updates, and deletion are admin-only; cancellation is strictly
//! owner-only. Ownership mismatches here are reported as 403, not masked.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    state::AppState,
    storage::repository::orders::{
        NewOrder, NewOrderItem, OrderRepository, OrderResponse, OrderUpdate,
    },
    storage::repository::users::UserRepository,
    storage::OwnershipEnforcer,
};

/// Request to create an order.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// User the order is placed for; must be the caller unless the caller
    /// is an admin.
    pub owner_user_id: String,
    /// Declared total; stored as-is, not recomputed from item prices.
    pub total_price: f64,
    /// Initial status; defaults to `pending`.
    pub status: Option<String>,
    /// Declared creation timestamp; defaults to now.
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<NewOrderItem>,
}

/// Partial admin update of an order.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub total_price: Option<f64>,
    pub status: Option<String>,
}

/// Create an order.
///
/// All items are validated against the product catalog before anything is
/// persisted; one missing product aborts the whole order.
#[utoipa::path(
    post,
    path = "/v1/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Empty order or invalid quantity"),
        (status = 403, description = "Order owner differs from the caller"),
        (status = 404, description = "Owner or referenced product not found")
    )
)]
pub async fn create_order(
    Auth(principal): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    if !principal.is_admin() && request.owner_user_id != principal.user_id {
        return Err(ApiError::forbidden(
            "Not authorized to create an order for this user",
        ));
    }

    // The order must belong to an existing account.
    UserRepository::new(&state.db).get(&request.owner_user_id)?;

    let orders = OrderRepository::new(&state.db);
    let order = orders.create(NewOrder {
        owner_user_id: request.owner_user_id,
        total_price: request.total_price,
        status: request.status,
        created_at: request.created_at,
        items: request.items,
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// List all orders. Admin only.
#[utoipa::path(
    get,
    path = "/v1/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_orders(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = OrderRepository::new(&state.db);
    Ok(Json(orders.list_all()?))
}

/// Get an order by ID. Visible to the order's owner and to admins.
#[utoipa::path(
    get,
    path = "/v1/orders/{order_id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Auth(principal): Auth,
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, ApiError> {
    let orders = OrderRepository::new(&state.db);

    let record = orders.get_record(&order_id)?;
    record.verify_owner_or_admin(&principal)?;

    Ok(Json(orders.get(&order_id)?))
}

/// Update an order's status or total. Admin only; partial semantics.
#[utoipa::path(
    put,
    path = "/v1/orders/{order_id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is cancelled")
    )
)]
pub async fn update_order(
    AdminOnly(_admin): AdminOnly,
    Path(order_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let orders = OrderRepository::new(&state.db);
    let order = orders.update(
        &order_id,
        OrderUpdate {
            total_price: request.total_price,
            status: request.status,
        },
    )?;
    Ok(Json(order))
}

/// Cancel a pending order. Owner only; admins get no exception.
///
/// A second cancellation of the same order is rejected with 409.
#[utoipa::path(
    post,
    path = "/v1/orders/{order_id}/cancel",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderResponse),
        (status = 403, description = "Not the order's owner"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not pending")
    )
)]
pub async fn cancel_order(
    Auth(principal): Auth,
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderResponse>, ApiError> {
    let orders = OrderRepository::new(&state.db);

    let record = orders.get_record(&order_id)?;
    record.verify_owner(&principal)?;

    Ok(Json(orders.cancel(&order_id)?))
}

/// Delete an order and its items. Admin only.
#[utoipa::path(
    delete,
    path = "/v1/orders/{order_id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("order_id" = String, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    AdminOnly(_admin): AdminOnly,
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let orders = OrderRepository::new(&state.db);
    orders.delete(&order_id)?;
    Ok(StatusCode::NO_CONTENT)
}
