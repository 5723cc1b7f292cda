// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for users, products, carts, and orders on top of an
//! embedded redb database (pure Rust, ACID).
//!
//! ## Layout
//!
//! - [`database`] — table definitions, composite child keys, the shared
//!   [`Database`] handle, and [`StorageError`]
//! - [`ownership`] — owner/admin decision functions applied before any
//!   sensitive operation
//! - [`repository`] — one repository per aggregate; every multi-row
//!   mutation (cart + items, order + items, user + uniqueness indexes)
//!   happens inside a single write transaction and either fully commits or
//!   leaves no trace

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{Database, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipEnforcer};
