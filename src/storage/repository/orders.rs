// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Order repository.
//!
//! Orders are immutable snapshots: items carry the product id and quantity
//! as they were at creation and are unaffected by later product or cart
//! changes. Creation is all-or-nothing across the order row and every item
//! row.
//!
//! ## Status machine
//!
//! `pending --(cancel)--> cancelled`; admin updates may edit a pending
//! order in place. There is no transition out of `cancelled`. Other status
//! strings (e.g. `fulfilled`) are accepted opaquely on admin update and
//! carry no transition semantics of their own.
//!
//! `total_price` is stored exactly as declared by the caller; it is not
//! recomputed from product prices.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{
    child_key, child_prefix, child_prefix_end, Database, StorageError, StorageResult, ORDERS,
    ORDER_ITEMS, PRODUCTS,
};
use super::super::ownership::OwnedResource;

/// Status of a freshly created order.
pub const STATUS_PENDING: &str = "pending";

/// Terminal status reached through cancellation.
pub const STATUS_CANCELLED: &str = "cancelled";

/// Order row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOrder {
    /// Unique order identifier (UUID)
    pub order_id: String,
    /// User the order belongs to
    pub owner_user_id: String,
    /// Caller-declared total; not recomputed from item prices
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl OwnedResource for StoredOrder {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }
}

/// Order item row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredOrderItem {
    /// Unique item identifier (UUIDv7, time-ordered)
    pub item_id: String,
    pub order_id: String,
    /// Product reference frozen at creation time
    pub product_id: String,
    pub quantity: u32,
}

/// Order item shape returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub item_id: String,
    pub product_id: String,
    pub quantity: u32,
}

impl From<StoredOrderItem> for OrderItemResponse {
    fn from(item: StoredOrderItem) -> Self {
        Self {
            item_id: item.item_id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// Order with its items, as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: String,
    pub owner_user_id: String,
    pub total_price: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

/// Line item input for order creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Input for order creation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner_user_id: String,
    pub total_price: f64,
    /// Caller-declared status; defaults to [`STATUS_PENDING`]
    pub status: Option<String>,
    /// Caller-declared creation timestamp; defaults to now
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<NewOrderItem>,
}

/// Partial update applied by admins; only `Some` fields are mutated.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub total_price: Option<f64>,
    pub status: Option<String>,
}

/// Repository for orders and their items.
pub struct OrderRepository<'a> {
    db: &'a Database,
}

impl<'a> OrderRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an order with its items.
    ///
    /// Requires at least one item; validates every referenced product
    /// before persisting. Any failure aborts the whole transaction and no
    /// partial order survives.
    pub fn create(&self, new: NewOrder) -> StorageResult<OrderResponse> {
        if new.items.is_empty() {
            return Err(StorageError::Validation(
                "order must contain at least one item".to_string(),
            ));
        }

        let order = StoredOrder {
            order_id: Uuid::new_v4().to_string(),
            owner_user_id: new.owner_user_id,
            total_price: new.total_price,
            status: new.status.unwrap_or_else(|| STATUS_PENDING.to_string()),
            created_at: new.created_at.unwrap_or_else(Utc::now),
        };
        let order_bytes = serde_json::to_vec(&order)?;

        let mut response_items = Vec::with_capacity(new.items.len());
        let write_txn = self.db.begin_write()?;
        {
            // Validate every line before persisting anything.
            let products = write_txn.open_table(PRODUCTS)?;
            for item in &new.items {
                if item.quantity == 0 {
                    return Err(StorageError::Validation(
                        "quantity must be a positive integer".to_string(),
                    ));
                }
                if products.get(item.product_id.as_str())?.is_none() {
                    return Err(StorageError::NotFound(format!(
                        "Product {}",
                        item.product_id
                    )));
                }
            }

            let mut orders = write_txn.open_table(ORDERS)?;
            orders.insert(order.order_id.as_str(), order_bytes.as_slice())?;

            let mut order_items = write_txn.open_table(ORDER_ITEMS)?;
            for item in &new.items {
                let stored = StoredOrderItem {
                    item_id: Uuid::now_v7().to_string(),
                    order_id: order.order_id.clone(),
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                };
                let key = child_key(&order.order_id, &stored.item_id);
                order_items.insert(key.as_slice(), serde_json::to_vec(&stored)?.as_slice())?;
                response_items.push(stored.into());
            }
        }
        write_txn.commit()?;

        Ok(OrderResponse {
            order_id: order.order_id,
            owner_user_id: order.owner_user_id,
            total_price: order.total_price,
            status: order.status,
            created_at: order.created_at,
            items: response_items,
        })
    }

    /// Get an order row by ID (for ownership checks).
    pub fn get_record(&self, order_id: &str) -> StorageResult<StoredOrder> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS)?;
        match table.get(order_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("Order {order_id}"))),
        }
    }

    /// Get an order with its items.
    pub fn get(&self, order_id: &str) -> StorageResult<OrderResponse> {
        let order = self.get_record(order_id)?;
        let items = self.items(order_id)?;
        Ok(assemble(order, items))
    }

    /// List the items of an order.
    pub fn items(&self, order_id: &str) -> StorageResult<Vec<StoredOrderItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDER_ITEMS)?;

        let mut items = Vec::new();
        let prefix = child_prefix(order_id);
        let end = child_prefix_end(order_id);
        for entry in table.range(prefix.as_slice()..end.as_slice())? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    /// List all orders with their items (admin view).
    pub fn list_all(&self) -> StorageResult<Vec<OrderResponse>> {
        let orders: Vec<StoredOrder> = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(ORDERS)?;
            let mut orders = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                orders.push(serde_json::from_slice(value.value())?);
            }
            orders
        };

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items(&order.order_id)?;
            responses.push(assemble(order, items));
        }
        Ok(responses)
    }

    /// Apply a partial admin update.
    ///
    /// Rejected with `Conflict` on a cancelled order: there is no
    /// transition out of `cancelled`.
    pub fn update(&self, order_id: &str, update: OrderUpdate) -> StorageResult<OrderResponse> {
        let write_txn = self.db.begin_write()?;
        {
            let mut orders = write_txn.open_table(ORDERS)?;
            let bytes = match orders.get(order_id)? {
                Some(value) => value.value().to_vec(),
                None => return Err(StorageError::NotFound(format!("Order {order_id}"))),
            };

            let mut order: StoredOrder = serde_json::from_slice(&bytes)?;
            if order.status == STATUS_CANCELLED {
                return Err(StorageError::Conflict(format!(
                    "Order {order_id} is cancelled"
                )));
            }

            if let Some(total_price) = update.total_price {
                order.total_price = total_price;
            }
            if let Some(status) = update.status {
                order.status = status;
            }

            orders.insert(order_id, serde_json::to_vec(&order)?.as_slice())?;
        }
        write_txn.commit()?;

        self.get(order_id)
    }

    /// Cancel a pending order.
    ///
    /// Cancelling an already-cancelled order is a `Conflict`, not a silent
    /// no-op; so is cancelling from any other non-pending status.
    pub fn cancel(&self, order_id: &str) -> StorageResult<OrderResponse> {
        let write_txn = self.db.begin_write()?;
        {
            let mut orders = write_txn.open_table(ORDERS)?;
            let bytes = match orders.get(order_id)? {
                Some(value) => value.value().to_vec(),
                None => return Err(StorageError::NotFound(format!("Order {order_id}"))),
            };

            let mut order: StoredOrder = serde_json::from_slice(&bytes)?;
            if order.status == STATUS_CANCELLED {
                return Err(StorageError::Conflict(format!(
                    "Order {order_id} is already cancelled"
                )));
            }
            if order.status != STATUS_PENDING {
                return Err(StorageError::Conflict(format!(
                    "Order {order_id} cannot be cancelled from status {}",
                    order.status
                )));
            }

            order.status = STATUS_CANCELLED.to_string();
            orders.insert(order_id, serde_json::to_vec(&order)?.as_slice())?;
        }
        write_txn.commit()?;

        self.get(order_id)
    }

    /// Delete an order and all of its items in one transaction.
    pub fn delete(&self, order_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut orders = write_txn.open_table(ORDERS)?;
            if orders.remove(order_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Order {order_id}")));
            }

            // Cascade: collect the item keys, then remove them.
            let keys: Vec<Vec<u8>> = {
                let order_items = write_txn.open_table(ORDER_ITEMS)?;
                let prefix = child_prefix(order_id);
                let end = child_prefix_end(order_id);
                let mut keys = Vec::new();
                for entry in order_items.range(prefix.as_slice()..end.as_slice())? {
                    let (key, _) = entry?;
                    keys.push(key.value().to_vec());
                }
                keys
            };
            let mut order_items = write_txn.open_table(ORDER_ITEMS)?;
            for key in &keys {
                order_items.remove(key.as_slice())?;
            }
        }
        write_txn.commit()?;

        Ok(())
    }
}

fn assemble(order: StoredOrder, items: Vec<StoredOrderItem>) -> OrderResponse {
    OrderResponse {
        order_id: order.order_id,
        owner_user_id: order.owner_user_id,
        total_price: order.total_price,
        status: order.status,
        created_at: order.created_at,
        items: items.into_iter().map(Into::into).collect(),
    }
}
