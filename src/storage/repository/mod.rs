// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository provides the operations for one aggregate, using a
//! shared [`super::Database`] handle. Multi-row mutations are transactional:
//! they either fully commit or leave the database untouched.

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

pub use carts::{CartItemResponse, CartRepository, CartResponse, NewCartItem, StoredCart};
pub use orders::{
    NewOrder, NewOrderItem, OrderItemResponse, OrderRepository, OrderResponse, OrderUpdate,
    StoredOrder, STATUS_CANCELLED, STATUS_PENDING,
};
pub use products::{NewProduct, ProductRepository, ProductUpdate, StoredProduct};
pub use users::{NewUser, StoredUser, UserRepository, UserResponse, UserUpdate};
