// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated principals.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is the resolved Principal
//! }
//! ```
//!
//! `Auth` is the principal-resolution step of the authorization guard:
//! bearer token → signature/expiry validation → subject lookup in the user
//! table. A token whose subject no longer exists resolves to 401, so
//! deleting an account invalidates its outstanding tokens in practice even
//! though the tokens themselves carry no revocation marker.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::state::AppState;
use crate::storage::repository::users::UserRepository;

use super::{AuthError, Principal};

/// Extractor for authenticated principals.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_cart(
///     Auth(principal): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<CartResponse>, ApiError> {
///     // principal.user_id identifies the caller
/// }
/// ```
pub struct Auth(pub Principal);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        // Verify signature and expiry, yielding the subject
        let subject = state.tokens.validate(token)?;

        // Resolve the subject against the current user table. Absence
        // (user deleted after token issuance) is reported exactly like an
        // invalid token.
        let users = UserRepository::new(&state.db);
        let user = users
            .find_by_username(&subject)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::UnknownSubject)?;

        Ok(Auth(user.to_principal()))
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub Principal);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(principal) = Auth::from_request_parts(parts, state).await?;

        if !principal.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::storage::repository::users::NewUser;
    use axum::http::Request;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let state = AppState::for_tests(dir.path());
        (state, dir)
    }

    fn seed_user(state: &AppState, username: &str, is_admin: bool) {
        let users = UserRepository::new(&state.db);
        users
            .create(NewUser {
                username: username.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: format!("{username}@example.com"),
                password_hash: hash_password("a strong password").expect("hashing succeeds"),
                is_admin,
            })
            .expect("user creation succeeds");
    }

    fn request_with_token(token: &str) -> Parts {
        Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_header() {
        let (state, _dir) = test_state();
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic abc123")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_resolves_seeded_user() {
        let (state, _dir) = test_state();
        seed_user(&state, "alice", false);

        let token = state.tokens.issue("alice").expect("token issues");
        let mut parts = request_with_token(&token);

        let Auth(principal) = Auth::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction succeeds");
        assert_eq!(principal.username, "alice");
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn auth_extractor_rejects_deleted_subject() {
        let (state, _dir) = test_state();

        // Token for a user that was never (or no longer is) in the table.
        let token = state.tokens.issue("ghost").expect("token issues");
        let mut parts = request_with_token(&token);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownSubject)));
    }

    #[tokio::test]
    async fn admin_only_rejects_standard_user() {
        let (state, _dir) = test_state();
        seed_user(&state, "bob", false);

        let token = state.tokens.issue("bob").expect("token issues");
        let mut parts = request_with_token(&token);

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let (state, _dir) = test_state();
        seed_user(&state, "root", true);

        let token = state.tokens.issue("root").expect("token issues");
        let mut parts = request_with_token(&token);

        let AdminOnly(principal) = AdminOnly::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction succeeds");
        assert!(principal.is_admin());
    }
}
