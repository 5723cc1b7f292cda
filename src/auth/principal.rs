// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authenticated principal attached to a request.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Authenticated identity resolved from a bearer token.
///
/// This is the primary type used throughout the application to represent
/// the authenticated user making a request. It is resolved per request from
/// the token subject and the current user row, so role checks always see
/// the user's present privileges even for tokens issued earlier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    /// Canonical user ID (owner identifier on carts and orders)
    pub user_id: String,

    /// Login name (the token `sub` claim)
    pub username: String,

    /// User's role
    pub role: Role,
}

impl Principal {
    /// Check if the principal has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this principal is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check if this principal owns the resource with the given owner id.
    pub fn owns(&self, owner_user_id: &str) -> bool {
        self.user_id == owner_user_id
    }
}
