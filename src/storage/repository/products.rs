// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Product catalog repository.
//!
//! Products are referenced, never owned, by cart and order items. The cart
//! and order repositories check product existence inside their own write
//! transactions; this module only provides the catalog CRUD.

use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{Database, StorageError, StorageResult, PRODUCTS};

/// Product row as persisted and returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredProduct {
    /// Unique product identifier (UUID)
    pub product_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub in_stock: bool,
}

/// Input for product creation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

/// Partial update; only `Some` fields are mutated.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
}

/// Repository for catalog rows.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new product.
    pub fn create(&self, new: NewProduct) -> StorageResult<StoredProduct> {
        let product = StoredProduct {
            product_id: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            price: new.price,
            in_stock: new.in_stock,
        };
        let bytes = serde_json::to_vec(&product)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRODUCTS)?;
            table.insert(product.product_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(product)
    }

    /// Get a product by ID.
    pub fn get(&self, product_id: &str) -> StorageResult<StoredProduct> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS)?;
        match table.get(product_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("Product {product_id}"))),
        }
    }

    /// List all products.
    pub fn list(&self) -> StorageResult<Vec<StoredProduct>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS)?;

        let mut products = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    /// Apply a partial update to a product.
    pub fn update(&self, product_id: &str, update: ProductUpdate) -> StorageResult<StoredProduct> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(PRODUCTS)?;
            let bytes = match table.get(product_id)? {
                Some(value) => value.value().to_vec(),
                None => {
                    return Err(StorageError::NotFound(format!("Product {product_id}")))
                }
            };

            let mut product: StoredProduct = serde_json::from_slice(&bytes)?;
            if let Some(name) = update.name {
                product.name = name;
            }
            if let Some(description) = update.description {
                product.description = Some(description);
            }
            if let Some(price) = update.price {
                product.price = price;
            }
            if let Some(in_stock) = update.in_stock {
                product.in_stock = in_stock;
            }

            table.insert(product_id, serde_json::to_vec(&product)?.as_slice())?;
            product
        };
        write_txn.commit()?;

        Ok(updated)
    }

    /// Delete a product.
    ///
    /// Existing cart and order items keep their product id; items snapshot
    /// the reference at creation time and are not retroactively validated.
    pub fn delete(&self, product_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRODUCTS)?;
            if table.remove(product_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Product {product_id}")));
            }
        }
        write_txn.commit()?;

        Ok(())
    }
}
