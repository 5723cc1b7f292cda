// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access, including other users' orders and the admin
///   endpoints
/// - `Standard` - Normal user, restricted to resources they own
///
/// The role is derived from the stored `is_admin` flag in exactly one place
/// (principal resolution); business logic checks the role, never the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Normal user (owns carts and orders)
    Standard,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Admin can do anything
            (Role::Admin, _) => true,
            // Standard users can do standard things
            (Role::Standard, Role::Standard) => true,
            _ => false,
        }
    }

    /// Derive the role from the persisted admin flag.
    pub fn from_admin_flag(is_admin: bool) -> Role {
        if is_admin {
            Role::Admin
        } else {
            Role::Standard
        }
    }
}

impl Default for Role {
    /// Default role is Standard (least privilege for authenticated users).
    fn default() -> Self {
        Role::Standard
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Standard => write!(f, "standard"),
        }
    }
}
