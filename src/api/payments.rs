// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card payment and transaction history endpoints.

use axum::{extract::State, Json};

use super::LenientJson;
use crate::{
    error::{ApiError, ErrorShape},
    models::{TransactionListResponse, TransferRequest, TxResponse},
    state::AppState,
};

/// Pay a merchant with a student card.
///
/// The card's owner signs the transfer. Errors use the
/// `{success: false, message, details?}` body.
#[utoipa::path(
    post,
    path = "/transfer",
    tag = "Payments",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Payment confirmed", body = TxResponse),
        (status = 400, description = "Missing student id, invalid amount or insufficient funds"),
        (status = 404, description = "Unauthorized card or merchant not found"),
        (status = 500, description = "Transfer failed")
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    body: Result<LenientJson<TransferRequest>, ApiError>,
) -> Result<Json<TxResponse>, ApiError> {
    let LenientJson(req) = body.map_err(|e| e.with_shape(ErrorShape::Message))?;
    state
        .campus
        .transfer(req)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, ErrorShape::Message))
}

/// Every user → merchant payment on record.
///
/// Scans the full `Transfer` history on each call.
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "Payments",
    responses(
        (status = 200, description = "Payment history", body = TransactionListResponse),
        (status = 500, description = "Failed to fetch transactions")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<Json<TransactionListResponse>, ApiError> {
    state
        .campus
        .list_transactions()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, ErrorShape::Message))
}
