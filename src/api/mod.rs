// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;
use crate::storage::repository::{
    carts::{CartItemResponse, CartResponse, NewCartItem},
    orders::{NewOrderItem, OrderItemResponse, OrderResponse},
    products::{NewProduct, ProductUpdate, StoredProduct},
    users::UserResponse,
};

pub mod carts;
pub mod health;
pub mod orders;
pub mod products;
pub mod token;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/token", post(token::login))
        .route("/users", post(users::register).get(users::list_users))
        .route("/users/me", get(users::get_current_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{product_id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/carts", post(carts::create_cart).get(carts::get_cart))
        .route("/carts/{cart_id}", delete(carts::delete_cart))
        .route("/carts/{cart_id}/items", post(carts::add_cart_item))
        .route(
            "/carts/{cart_id}/items/{item_id}",
            put(carts::update_cart_item).delete(carts::remove_cart_item),
        )
        .route(
            "/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route(
            "/orders/{order_id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/{order_id}/cancel", post(orders::cancel_order))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        health::health,
        token::login,
        users::register,
        users::get_current_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        products::create_product,
        products::list_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        carts::create_cart,
        carts::get_cart,
        carts::add_cart_item,
        carts::update_cart_item,
        carts::remove_cart_item,
        carts::delete_cart,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order,
        orders::cancel_order,
        orders::delete_order
    ),
    components(
        schemas(
            health::HealthResponse,
            token::LoginRequest,
            token::TokenResponse,
            users::RegisterRequest,
            users::UpdateUserRequest,
            UserResponse,
            NewProduct,
            ProductUpdate,
            StoredProduct,
            carts::CreateCartRequest,
            carts::UpdateCartItemRequest,
            NewCartItem,
            CartItemResponse,
            CartResponse,
            orders::CreateOrderRequest,
            orders::UpdateOrderRequest,
            NewOrderItem,
            OrderItemResponse,
            OrderResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness probes"),
        (name = "Token", description = "Credential login and token issuance"),
        (name = "Users", description = "Registration and account management"),
        (name = "Products", description = "Product catalog"),
        (name = "Carts", description = "Per-user shopping carts"),
        (name = "Orders", description = "Order placement and lifecycle")
    )
)]
struct ApiDoc;
