// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup, login and session endpoints.

use axum::{extract::State, Json};

use super::LenientJson;
use crate::{
    auth::{AuthError, BearerToken, OptionalBearer},
    error::ApiError,
    models::{
        AuthenticateResponse, CreateUserRequest, CreateUserResponse, LoginRequest, LoginResponse,
        SuccessResponse, UserListResponse,
    },
    state::AppState,
};

/// Register a user and fund a fresh wallet.
///
/// Generates a keypair, sends 10 ETH and mints 5 BRB to it, stores the
/// credentials on the ledger and returns a session token.
#[utoipa::path(
    post,
    path = "/createUser",
    tag = "Accounts",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Missing fields, username or email taken"),
        (status = 500, description = "Funding or credential write failed")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    LenientJson(req): LenientJson<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    Ok(Json(state.campus.create_user(req).await?))
}

/// Exchange email and encrypted password for a session token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to verify credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    LenientJson(req): LenientJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    Ok(Json(state.campus.login(req).await?))
}

/// Report whether the bearer token is a live session.
///
/// Never fails: any problem yields `{"valid": false}`.
#[utoipa::path(
    get,
    path = "/authenticateUser",
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session status", body = AuthenticateResponse)
    )
)]
pub async fn authenticate_user(
    State(state): State<AppState>,
    OptionalBearer(token): OptionalBearer,
) -> Json<AuthenticateResponse> {
    Json(state.campus.authenticate(token.as_deref()))
}

/// End a session.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = SuccessResponse),
        (status = 400, description = "No token provided or token not active")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<SuccessResponse>, AuthError> {
    Ok(Json(state.campus.logout(&token)?))
}

/// List registered users for the admin dashboard.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Accounts",
    responses(
        (status = 200, description = "Registered users", body = UserListResponse),
        (status = 500, description = "Registry unavailable")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    Ok(Json(state.campus.list_users()?))
}
