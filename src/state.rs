// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::Database;

/// Process-wide shared state handed to every handler.
///
/// Both fields are immutable after boot; per-request mutation happens only
/// through database transactions.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenService) -> Self {
        Self {
            db: Arc::new(db),
            tokens: Arc::new(tokens),
        }
    }

    /// State over a throwaway database with a fixed test secret.
    #[cfg(test)]
    pub fn for_tests(data_dir: &std::path::Path) -> Self {
        let db = Database::open(data_dir).expect("test database opens");
        let tokens = TokenService::new(b"test-secret-key", jsonwebtoken::Algorithm::HS256, 30);
        Self::new(db, tokens)
    }
}
