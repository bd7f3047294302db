// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance, card field and purchase endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::LenientJson;
use crate::{
    error::{ApiError, ErrorShape},
    models::{
        BalancesResponse, BuyBearBucksRequest, BuyBearBucksResponse, TxResponse,
        UpdateUserAssetsRequest, UserAssetsResponse,
    },
    state::AppState,
};

/// ETH and BRB balances of a user.
///
/// The username `merchant` returns the bootstrap merchant's balances.
#[utoipa::path(
    get,
    path = "/balances/{username}",
    tag = "Assets",
    params(("username" = String, Path, description = "Username, or `merchant`")),
    responses(
        (status = 200, description = "Balances as decimal strings", body = BalancesResponse),
        (status = 404, description = "User or merchant not found"),
        (status = 500, description = "Failed to fetch balances")
    )
)]
pub async fn get_balances(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<BalancesResponse>, ApiError> {
    Ok(Json(state.campus.balances(&username).await?))
}

/// Overwrite a user's student id, access flags and attendance.
#[utoipa::path(
    post,
    path = "/updateUserAssets",
    tag = "Assets",
    request_body = UpdateUserAssetsRequest,
    responses(
        (status = 200, description = "Assets written", body = TxResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to update user assets")
    )
)]
pub async fn update_user_assets(
    State(state): State<AppState>,
    LenientJson(req): LenientJson<UpdateUserAssetsRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    Ok(Json(state.campus.update_user_assets(req).await?))
}

/// Card fields and balances of a user.
#[utoipa::path(
    get,
    path = "/getUserAssets/{username}",
    tag = "Assets",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Card fields and balances", body = UserAssetsResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to fetch user assets")
    )
)]
pub async fn get_user_assets(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserAssetsResponse>, ApiError> {
    Ok(Json(state.campus.get_user_assets(&username).await?))
}

/// Mint BRB to a user.
#[utoipa::path(
    post,
    path = "/buybearbucks",
    tag = "Assets",
    request_body = BuyBearBucksRequest,
    responses(
        (status = 200, description = "BearBucks minted", body = BuyBearBucksResponse),
        (status = 400, description = "Missing or invalid username or amount"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Failed to buy BearBucks")
    )
)]
pub async fn buy_bearbucks(
    State(state): State<AppState>,
    body: Result<LenientJson<BuyBearBucksRequest>, ApiError>,
) -> Result<Json<BuyBearBucksResponse>, ApiError> {
    let LenientJson(req) = body.map_err(|e| e.with_shape(ErrorShape::Message))?;
    state
        .campus
        .buy_bearbucks(req)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, ErrorShape::Message))
}
