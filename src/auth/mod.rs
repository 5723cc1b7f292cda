// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token-based authentication for the commerce API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with username + password (`POST /v1/token`)
//! 2. Server verifies the password against the stored argon2 digest and
//!    issues an HMAC-signed JWT (`sub` = username, `exp` = now + TTL)
//! 3. Client sends `Authorization: Bearer <token>` on subsequent requests
//! 4. The `Auth` extractor validates signature and expiry, then resolves
//!    the subject against the user table into a [`Principal`]
//!
//! ## Security
//!
//! - The signing secret is loaded once at startup; a missing secret aborts
//!   boot
//! - Expiry comparison has zero leeway (no clock-skew grace window)
//! - Login failures never reveal whether the username or the password was
//!   wrong
//! - Tokens carry no revocation marker; they expire, and deleted subjects
//!   are rejected at resolution time

pub mod error;
pub mod extractor;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;

pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use principal::Principal;
pub use roles::Role;
pub use token::TokenService;
