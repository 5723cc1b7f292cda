// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `username_index`: username → user_id (uniqueness + login lookup)
//! - `email_index`: email → user_id (uniqueness)
//! - `products`: product_id → serialized StoredProduct
//! - `carts`: cart_id → serialized StoredCart
//! - `cart_owner_index`: owner_user_id → cart_id (one cart per owner)
//! - `cart_items`: composite key (cart_id|item_id) → serialized StoredCartItem
//! - `orders`: order_id → serialized StoredOrder
//! - `order_items`: composite key (order_id|item_id) → serialized StoredOrderItem
//!
//! Child rows live under a `parent|child` composite key so a single prefix
//! range scan yields all children of a parent, and a range delete inside the
//! parent's write transaction implements cascade semantics.
//!
//! Every multi-row mutation runs inside a single `begin_write()` transaction.
//! Returning an error before `commit()` drops the transaction and rolls back
//! all of its writes.

use std::path::Path;

use redb::{ReadTransaction, TableDefinition, WriteTransaction};
use thiserror::Error;

/// Database file name under the data directory.
const DB_FILE: &str = "commerce.redb";

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized StoredUser (JSON bytes).
pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: username → user_id. Enforces the unique constraint on `username`.
pub(crate) const USERNAME_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("username_index");

/// Index: email → user_id. Enforces the unique constraint on `email`.
pub(crate) const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");

/// Primary table: product_id → serialized StoredProduct (JSON bytes).
pub(crate) const PRODUCTS: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Primary table: cart_id → serialized StoredCart (JSON bytes).
pub(crate) const CARTS: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Index: owner_user_id → cart_id. Enforces one cart per owner.
pub(crate) const CART_OWNER_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("cart_owner_index");

/// Child table: composite key (cart_id|item_id) → serialized StoredCartItem.
pub(crate) const CART_ITEMS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("cart_items");

/// Primary table: order_id → serialized StoredOrder (JSON bytes).
pub(crate) const ORDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Child table: composite key (order_id|item_id) → serialized StoredOrderItem.
pub(crate) const ORDER_ITEMS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("order_items");

// =============================================================================
// Error Type
// =============================================================================

/// Error type for storage operations.
///
/// The `NotFound` / `AlreadyExists` / `Conflict` / `Validation` /
/// `PermissionDenied` variants carry domain outcomes; everything else is a
/// server-side storage fault.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("permission denied: user {user_id} cannot access {resource}")]
    PermissionDenied { user_id: String, resource: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Composite Key Helpers
// =============================================================================

/// Build a composite key for a child row: `parent_id | b'|' | child_id`.
///
/// IDs are UUID strings and never contain `|`, so the separator is
/// unambiguous and all children of a parent sort contiguously.
pub(crate) fn child_key(parent_id: &str, child_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(parent_id.len() + 1 + child_id.len());
    key.extend_from_slice(parent_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(child_id.as_bytes());
    key
}

/// Build the inclusive lower bound for a prefix range scan over a parent's
/// children.
pub(crate) fn child_prefix(parent_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(parent_id.len() + 1);
    prefix.extend_from_slice(parent_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the exclusive upper bound for a prefix range scan (prefix with
/// 0xFF bytes appended, past any valid UUID child id).
pub(crate) fn child_prefix_end(parent_id: &str) -> Vec<u8> {
    let mut end = child_prefix(parent_id);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID database shared by all repositories.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database under the given data directory.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let db = redb::Database::create(data_dir.join(DB_FILE))?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(PRODUCTS)?;
            let _ = write_txn.open_table(CARTS)?;
            let _ = write_txn.open_table(CART_OWNER_INDEX)?;
            let _ = write_txn.open_table(CART_ITEMS)?;
            let _ = write_txn.open_table(ORDERS)?;
            let _ = write_txn.open_table(ORDER_ITEMS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction.
    pub(crate) fn begin_read(&self) -> StorageResult<ReadTransaction> {
        use redb::ReadableDatabase;
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction. Dropping the transaction without
    /// committing rolls back every write made through it.
    pub(crate) fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::ReadableTable;
    use tempfile::TempDir;

    #[test]
    fn open_creates_all_tables() {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(dir.path()).expect("open database");

        // A read transaction over a pre-created table must not fail.
        let read_txn = db.begin_read().expect("begin read");
        let table = read_txn.open_table(USERS).expect("open users table");
        assert!(table.get("missing").expect("get").is_none());
    }

    #[test]
    fn child_keys_sort_under_parent_prefix() {
        let key = child_key("cart-a", "item-1");
        let prefix = child_prefix("cart-a");
        let end = child_prefix_end("cart-a");

        assert!(key.as_slice() >= prefix.as_slice());
        assert!(key.as_slice() < end.as_slice());

        // A sibling parent's child never falls inside the range.
        let other = child_key("cart-b", "item-1");
        assert!(other.as_slice() >= end.as_slice() || other.as_slice() < prefix.as_slice());
    }

    #[test]
    fn uncommitted_write_transaction_rolls_back() {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(dir.path()).expect("open database");

        {
            let write_txn = db.begin_write().expect("begin write");
            {
                let mut table = write_txn.open_table(USERS).expect("open users");
                table
                    .insert("user-1", b"{}".as_slice())
                    .expect("insert user");
            }
            // Dropped without commit.
        }

        let read_txn = db.begin_read().expect("begin read");
        let table = read_txn.open_table(USERS).expect("open users");
        assert!(table.get("user-1").expect("get").is_none());
    }
}
