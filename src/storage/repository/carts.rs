// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cart repository.
//!
//! Each user has at most one cart, enforced by the owner index inside the
//! creation transaction. Cart items live under composite `cart_id|item_id`
//! keys; item ids are UUIDv7, so a prefix range scan returns items in
//! time order.
//!
//! Creation validates every referenced product before anything is
//! persisted; a single missing product aborts the whole transaction and no
//! partial cart survives.

use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{
    child_key, child_prefix, child_prefix_end, Database, StorageError, StorageResult, CARTS,
    CART_ITEMS, CART_OWNER_INDEX, PRODUCTS,
};
use super::super::ownership::OwnedResource;

/// Entity label used when masking cart item absence and ownership mismatch.
pub const CART_ITEM_ENTITY: &str = "Cart item";

/// Cart row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCart {
    /// Unique cart identifier (UUID)
    pub cart_id: String,
    /// User who owns this cart
    pub owner_user_id: String,
}

impl OwnedResource for StoredCart {
    fn owner_user_id(&self) -> &str {
        &self.owner_user_id
    }
}

/// Cart item row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCartItem {
    /// Unique item identifier (UUIDv7, time-ordered)
    pub item_id: String,
    pub cart_id: String,
    /// Referenced product; validated to exist when the item is created
    pub product_id: String,
    pub quantity: u32,
}

/// Cart item shape returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub item_id: String,
    pub product_id: String,
    pub quantity: u32,
}

impl From<StoredCartItem> for CartItemResponse {
    fn from(item: StoredCartItem) -> Self {
        Self {
            item_id: item.item_id,
            product_id: item.product_id,
            quantity: item.quantity,
        }
    }
}

/// Cart with its items, as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub cart_id: String,
    pub owner_user_id: String,
    pub items: Vec<CartItemResponse>,
}

/// Line item input for cart creation and item addition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCartItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Repository for carts and their items.
pub struct CartRepository<'a> {
    db: &'a Database,
}

impl<'a> CartRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a cart with its initial items.
    ///
    /// Fails with `AlreadyExists` if the owner already has a cart, with
    /// `Validation` on a non-positive quantity, and with `NotFound` if any
    /// referenced product is missing. On failure nothing is persisted.
    pub fn create(&self, owner_user_id: &str, items: &[NewCartItem]) -> StorageResult<CartResponse> {
        let cart = StoredCart {
            cart_id: Uuid::new_v4().to_string(),
            owner_user_id: owner_user_id.to_string(),
        };
        let cart_bytes = serde_json::to_vec(&cart)?;

        let mut response_items = Vec::with_capacity(items.len());
        let write_txn = self.db.begin_write()?;
        {
            let mut owner_index = write_txn.open_table(CART_OWNER_INDEX)?;
            if owner_index.get(owner_user_id)?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "Cart for user {owner_user_id}"
                )));
            }

            // Validate every line before persisting anything.
            let products = write_txn.open_table(PRODUCTS)?;
            for item in items {
                validate_quantity(item.quantity)?;
                if products.get(item.product_id.as_str())?.is_none() {
                    return Err(StorageError::NotFound(format!(
                        "Product {}",
                        item.product_id
                    )));
                }
            }

            let mut carts = write_txn.open_table(CARTS)?;
            carts.insert(cart.cart_id.as_str(), cart_bytes.as_slice())?;
            owner_index.insert(owner_user_id, cart.cart_id.as_str())?;

            let mut cart_items = write_txn.open_table(CART_ITEMS)?;
            for item in items {
                let stored = StoredCartItem {
                    item_id: Uuid::now_v7().to_string(),
                    cart_id: cart.cart_id.clone(),
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                };
                let key = child_key(&cart.cart_id, &stored.item_id);
                cart_items.insert(key.as_slice(), serde_json::to_vec(&stored)?.as_slice())?;
                response_items.push(stored.into());
            }
        }
        write_txn.commit()?;

        Ok(CartResponse {
            cart_id: cart.cart_id,
            owner_user_id: cart.owner_user_id,
            items: response_items,
        })
    }

    /// Get a cart row by ID (for ownership checks before item operations).
    pub fn get(&self, cart_id: &str) -> StorageResult<StoredCart> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS)?;
        match table.get(cart_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StorageError::NotFound(format!("Cart {cart_id}"))),
        }
    }

    /// Get the single cart owned by a user, with its items.
    pub fn get_by_owner(&self, owner_user_id: &str) -> StorageResult<CartResponse> {
        let read_txn = self.db.begin_read()?;
        let owner_index = read_txn.open_table(CART_OWNER_INDEX)?;
        let cart_id = match owner_index.get(owner_user_id)? {
            Some(value) => value.value().to_string(),
            None => return Err(StorageError::NotFound("Cart".to_string())),
        };
        drop(owner_index);

        self.assemble(&cart_id)
    }

    /// Get a cart with its items.
    pub fn assemble(&self, cart_id: &str) -> StorageResult<CartResponse> {
        let cart = self.get(cart_id)?;
        let items = self.items(cart_id)?;
        Ok(CartResponse {
            cart_id: cart.cart_id,
            owner_user_id: cart.owner_user_id,
            items: items.into_iter().map(Into::into).collect(),
        })
    }

    /// List the items of a cart, ordered by item id (time-based).
    pub fn items(&self, cart_id: &str) -> StorageResult<Vec<StoredCartItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CART_ITEMS)?;

        let mut items = Vec::new();
        let prefix = child_prefix(cart_id);
        let end = child_prefix_end(cart_id);
        for entry in table.range(prefix.as_slice()..end.as_slice())? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    /// Append an item to an existing cart.
    pub fn add_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> StorageResult<CartItemResponse> {
        validate_quantity(quantity)?;

        let stored = StoredCartItem {
            item_id: Uuid::now_v7().to_string(),
            cart_id: cart_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
        };
        let bytes = serde_json::to_vec(&stored)?;

        let write_txn = self.db.begin_write()?;
        {
            let carts = write_txn.open_table(CARTS)?;
            if carts.get(cart_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Cart {cart_id}")));
            }

            let products = write_txn.open_table(PRODUCTS)?;
            if products.get(product_id)?.is_none() {
                return Err(StorageError::NotFound(format!("Product {product_id}")));
            }

            let mut cart_items = write_txn.open_table(CART_ITEMS)?;
            let key = child_key(cart_id, &stored.item_id);
            cart_items.insert(key.as_slice(), bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(stored.into())
    }

    /// Change the quantity of an existing item.
    ///
    /// Absence is reported with the generic [`CART_ITEM_ENTITY`] label so
    /// handlers can mask ownership mismatch identically.
    pub fn update_item(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> StorageResult<CartResponse> {
        validate_quantity(quantity)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut cart_items = write_txn.open_table(CART_ITEMS)?;
            let key = child_key(cart_id, item_id);
            let bytes = match cart_items.get(key.as_slice())? {
                Some(value) => value.value().to_vec(),
                None => return Err(StorageError::NotFound(CART_ITEM_ENTITY.to_string())),
            };

            let mut item: StoredCartItem = serde_json::from_slice(&bytes)?;
            item.quantity = quantity;
            cart_items.insert(key.as_slice(), serde_json::to_vec(&item)?.as_slice())?;
        }
        write_txn.commit()?;

        self.assemble(cart_id)
    }

    /// Remove a single item from a cart.
    pub fn remove_item(&self, cart_id: &str, item_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut cart_items = write_txn.open_table(CART_ITEMS)?;
            let key = child_key(cart_id, item_id);
            if cart_items.remove(key.as_slice())?.is_none() {
                return Err(StorageError::NotFound(CART_ITEM_ENTITY.to_string()));
            }
        }
        write_txn.commit()?;

        Ok(())
    }

    /// Delete a cart and all of its items in one transaction.
    pub fn delete(&self, cart_id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut carts = write_txn.open_table(CARTS)?;
            let bytes = match carts.get(cart_id)? {
                Some(value) => value.value().to_vec(),
                None => return Err(StorageError::NotFound(format!("Cart {cart_id}"))),
            };
            let cart: StoredCart = serde_json::from_slice(&bytes)?;
            carts.remove(cart_id)?;

            let mut owner_index = write_txn.open_table(CART_OWNER_INDEX)?;
            owner_index.remove(cart.owner_user_id.as_str())?;

            // Cascade: collect the item keys, then remove them.
            let keys: Vec<Vec<u8>> = {
                let cart_items = write_txn.open_table(CART_ITEMS)?;
                let prefix = child_prefix(cart_id);
                let end = child_prefix_end(cart_id);
                let mut keys = Vec::new();
                for entry in cart_items.range(prefix.as_slice()..end.as_slice())? {
                    let (key, _) = entry?;
                    keys.push(key.value().to_vec());
                }
                keys
            };
            let mut cart_items = write_txn.open_table(CART_ITEMS)?;
            for key in &keys {
                cart_items.remove(key.as_slice())?;
            }
        }
        write_txn.commit()?;

        Ok(())
    }
}

fn validate_quantity(quantity: u32) -> StorageResult<()> {
    if quantity == 0 {
        return Err(StorageError::Validation(
            "quantity must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::products::{NewProduct, ProductRepository};
    use tempfile::TempDir;

    fn test_db() -> (Database, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::open(dir.path()).expect("open database");
        (db, dir)
    }

    fn seed_product(db: &Database, name: &str) -> String {
        ProductRepository::new(db)
            .create(NewProduct {
                name: name.to_string(),
                description: None,
                price: 5.0,
                in_stock: true,
            })
            .expect("product creation succeeds")
            .product_id
    }

    #[test]
    fn create_cart_with_items() {
        let (db, _dir) = test_db();
        let product_id = seed_product(&db, "Widget");
        let repo = CartRepository::new(&db);

        let cart = repo
            .create(
                "user-a",
                &[NewCartItem {
                    product_id: product_id.clone(),
                    quantity: 2,
                }],
            )
            .expect("cart creation succeeds");

        assert_eq!(cart.owner_user_id, "user-a");
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, product_id);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn missing_product_aborts_whole_creation() {
        let (db, _dir) = test_db();
        let product_id = seed_product(&db, "Widget");
        let repo = CartRepository::new(&db);

        let result = repo.create(
            "user-a",
            &[
                NewCartItem {
                    product_id,
                    quantity: 2,
                },
                NewCartItem {
                    product_id: "9999".to_string(),
                    quantity: 1,
                },
            ],
        );

        assert!(matches!(result, Err(StorageError::NotFound(_))));
        // Nothing persisted: no cart for the owner, and the owner slot is
        // still free for a later successful creation.
        assert!(matches!(
            repo.get_by_owner("user-a"),
            Err(StorageError::NotFound(_))
        ));
        repo.create("user-a", &[]).expect("retry succeeds");
    }

    #[test]
    fn one_cart_per_owner() {
        let (db, _dir) = test_db();
        let repo = CartRepository::new(&db);

        repo.create("user-a", &[]).expect("first cart succeeds");
        let result = repo.create("user-a", &[]);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn zero_quantity_is_a_validation_error() {
        let (db, _dir) = test_db();
        let product_id = seed_product(&db, "Widget");
        let repo = CartRepository::new(&db);

        let result = repo.create(
            "user-a",
            &[NewCartItem {
                product_id: product_id.clone(),
                quantity: 0,
            }],
        );
        assert!(matches!(result, Err(StorageError::Validation(_))));

        let cart = repo.create("user-a", &[]).expect("empty cart succeeds");
        let result = repo.add_item(&cart.cart_id, &product_id, 0);
        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[test]
    fn add_then_update_then_remove_item() {
        let (db, _dir) = test_db();
        let product_id = seed_product(&db, "Widget");
        let repo = CartRepository::new(&db);

        let cart = repo.create("user-a", &[]).expect("cart creation succeeds");
        let item = repo
            .add_item(&cart.cart_id, &product_id, 1)
            .expect("item addition succeeds");

        let updated = repo
            .update_item(&cart.cart_id, &item.item_id, 5)
            .expect("item update succeeds");
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].quantity, 5);

        repo.remove_item(&cart.cart_id, &item.item_id)
            .expect("item removal succeeds");
        assert!(repo.items(&cart.cart_id).expect("items read").is_empty());
    }

    #[test]
    fn update_missing_item_is_masked_not_found() {
        let (db, _dir) = test_db();
        let repo = CartRepository::new(&db);
        let cart = repo.create("user-a", &[]).expect("cart creation succeeds");

        let result = repo.update_item(&cart.cart_id, "no-such-item", 3);
        match result {
            Err(StorageError::NotFound(entity)) => assert_eq!(entity, CART_ITEM_ENTITY),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn delete_cascades_to_items() {
        let (db, _dir) = test_db();
        let product_id = seed_product(&db, "Widget");
        let repo = CartRepository::new(&db);

        let cart = repo
            .create(
                "user-a",
                &[
                    NewCartItem {
                        product_id: product_id.clone(),
                        quantity: 1,
                    },
                    NewCartItem {
                        product_id: product_id.clone(),
                        quantity: 2,
                    },
                    NewCartItem {
                        product_id,
                        quantity: 3,
                    },
                ],
            )
            .expect("cart creation succeeds");
        assert_eq!(cart.items.len(), 3);

        repo.delete(&cart.cart_id).expect("deletion succeeds");

        // Zero items reference the deleted cart id.
        assert!(repo.items(&cart.cart_id).expect("items read").is_empty());
        assert!(matches!(
            repo.get_by_owner("user-a"),
            Err(StorageError::NotFound(_))
        ));

        // The owner can create a fresh cart afterwards.
        repo.create("user-a", &[]).expect("recreation succeeds");
    }

    #[test]
    fn items_are_scoped_to_their_cart() {
        let (db, _dir) = test_db();
        let product_id = seed_product(&db, "Widget");
        let repo = CartRepository::new(&db);

        let cart_a = repo
            .create(
                "user-a",
                &[NewCartItem {
                    product_id: product_id.clone(),
                    quantity: 1,
                }],
            )
            .expect("cart a succeeds");
        let cart_b = repo
            .create(
                "user-b",
                &[NewCartItem {
                    product_id,
                    quantity: 2,
                }],
            )
            .expect("cart b succeeds");

        assert_eq!(repo.items(&cart_a.cart_id).expect("items a").len(), 1);
        assert_eq!(repo.items(&cart_b.cart_id).expect("items b").len(), 1);

        repo.delete(&cart_a.cart_id).expect("delete a");
        assert_eq!(repo.items(&cart_b.cart_id).expect("items b").len(), 1);
    }
}
