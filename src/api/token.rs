// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint: exchanges credentials for an access token.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::password::verify_password, error::ApiError, state::AppState,
    storage::repository::users::UserRepository,
};

/// Credentials presented at login.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed bearer token
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
}

/// Exchange username and password for an access token.
///
/// An unknown username and a wrong password produce the same response, so
/// the endpoint cannot be used to enumerate accounts.
#[utoipa::path(
    post,
    path = "/v1/token",
    tag = "Token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let users = UserRepository::new(&state.db);

    let user = users.find_by_username(&request.username)?;
    let user = match user {
        Some(user) if verify_password(&request.password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Incorrect username or password")),
    };

    let token = state
        .tokens
        .issue(&user.username)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::storage::repository::users::NewUser;
    use axum::http::StatusCode;
    use tempfile::TempDir;

    fn test_state() -> (AppState, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let state = AppState::for_tests(dir.path());
        (state, dir)
    }

    fn seed_alice(state: &AppState) {
        UserRepository::new(&state.db)
            .create(NewUser {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Example".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: hash_password("a strong password").expect("hashing succeeds"),
                is_admin: false,
            })
            .expect("user creation succeeds");
    }

    #[tokio::test]
    async fn login_issues_validatable_token() {
        let (state, _dir) = test_state();
        seed_alice(&state);

        let Json(response) = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "alice".to_string(),
                password: "a strong password".to_string(),
            }),
        )
        .await
        .expect("login succeeds");

        assert_eq!(response.token_type, "bearer");
        let subject = state
            .tokens
            .validate(&response.access_token)
            .expect("token validates");
        assert_eq!(subject, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let (state, _dir) = test_state();
        seed_alice(&state);

        let wrong_password = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "alice".to_string(),
                password: "not the password".to_string(),
            }),
        )
        .await
        .expect_err("login fails");

        let unknown_user = login(
            State(state.clone()),
            Json(LoginRequest {
                username: "nobody".to_string(),
                password: "a strong password".to_string(),
            }),
        )
        .await
        .expect_err("login fails");

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.status, unknown_user.status);
        assert_eq!(wrong_password.message, unknown_user.message);
    }
}
