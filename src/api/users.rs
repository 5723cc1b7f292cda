// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints: registration, profile, and admin management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::password::{hash_password, validate_password},
    auth::{AdminOnly, Auth, Principal},
    error::ApiError,
    state::AppState,
    storage::repository::users::{NewUser, UserRepository, UserResponse, UserUpdate},
};

/// Request to register a new user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update.
///
/// `is_admin` may only be supplied by an admin.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// Owner-or-admin gate on a user id taken from the request path.
fn require_self_or_admin(principal: &Principal, user_id: &str) -> Result<(), ApiError> {
    if principal.is_admin() || principal.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not enough permissions"))
    }
}

/// Register a new user account.
///
/// Registration is open; accounts are created without admin privileges.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if request.username.trim().is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }
    if !request.email.contains('@') {
        return Err(ApiError::bad_request("email address is invalid"));
    }
    validate_password(&request.password).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let password_hash =
        hash_password(&request.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let users = UserRepository::new(&state.db);
    let user = users.create(NewUser {
        username: request.username,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        password_hash,
        is_admin: false,
    })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Auth(principal): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let users = UserRepository::new(&state.db);
    let user = users.get(&principal.user_id)?;
    Ok(Json(user.into()))
}

/// List all users. Admin only.
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(&state.db);
    let all = users.list()?;
    Ok(Json(all.into_iter().map(Into::into).collect()))
}

/// Get a user by ID. Visible to the account owner and admins.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Auth(principal): Auth,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    require_self_or_admin(&principal, &user_id)?;

    let users = UserRepository::new(&state.db);
    let user = users.get(&user_id)?;
    Ok(Json(user.into()))
}

/// Update a user. The owner may edit names and password; only an admin may
/// change the admin flag.
#[utoipa::path(
    put,
    path = "/v1/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Not the account owner, or admin flag change by non-admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    Auth(principal): Auth,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_self_or_admin(&principal, &user_id)?;

    if request.is_admin.is_some() && !principal.is_admin() {
        return Err(ApiError::forbidden(
            "Only admins can change the admin flag",
        ));
    }

    let password_hash = match request.password.as_deref() {
        Some(password) => {
            validate_password(password).map_err(|e| ApiError::bad_request(e.to_string()))?;
            Some(hash_password(password).map_err(|e| ApiError::internal(e.to_string()))?)
        }
        None => None,
    };

    let users = UserRepository::new(&state.db);
    let user = users.update(
        &user_id,
        UserUpdate {
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
            is_admin: request.is_admin,
        },
    )?;

    Ok(Json(user.into()))
}

/// Delete a user. Admin only.
#[utoipa::path(
    delete,
    path = "/v1/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    AdminOnly(_admin): AdminOnly,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let users = UserRepository::new(&state.db);
    users.delete(&user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
