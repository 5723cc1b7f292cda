// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for storage-backed resources.
//!
//! These are the pure decision functions of the authorization guard: they
//! compare a resolved [`Principal`] against a resource's owner id and
//! return a typed outcome, with no side effects. Every mutating or
//! sensitive-read operation on carts and orders passes through one of them
//! before touching storage.
//!
//! Two rejection shapes exist on purpose:
//! - `verify_owner` / `verify_owner_or_admin` report a mismatch as
//!   `PermissionDenied` (403) — used where the resource's existence is not
//!   a secret (orders).
//! - `verify_owner_masked` reports a mismatch as `NotFound` (404),
//!   indistinguishable from genuine absence — used for cart internals so a
//!   caller cannot probe for other users' cart ids.

use crate::auth::Principal;

use super::database::{StorageError, StorageResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;
}

/// Trait for enforcing ownership on storage operations.
pub trait OwnershipEnforcer {
    /// Verify that the principal owns this resource. Admins get no
    /// exception here (owner-only operations such as order cancellation).
    fn verify_owner(&self, principal: &Principal) -> StorageResult<()>;

    /// Verify that the principal owns this resource or is an admin.
    fn verify_owner_or_admin(&self, principal: &Principal) -> StorageResult<()>;

    /// Verify ownership, reporting a mismatch as `NotFound` for the given
    /// entity label so it is indistinguishable from absence.
    fn verify_owner_masked(&self, principal: &Principal, entity: &str) -> StorageResult<()>;
}

impl<T: OwnedResource> OwnershipEnforcer for T {
    fn verify_owner(&self, principal: &Principal) -> StorageResult<()> {
        if principal.owns(self.owner_user_id()) {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                user_id: principal.user_id.clone(),
                resource: "resource".to_string(),
            })
        }
    }

    fn verify_owner_or_admin(&self, principal: &Principal) -> StorageResult<()> {
        if principal.is_admin() {
            return Ok(());
        }
        self.verify_owner(principal)
    }

    fn verify_owner_masked(&self, principal: &Principal, entity: &str) -> StorageResult<()> {
        if principal.owns(self.owner_user_id()) {
            Ok(())
        } else {
            Err(StorageError::NotFound(entity.to_string()))
        }
    }
}
