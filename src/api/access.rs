// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card reader endpoints.

use axum::{extract::State, Json};

use super::LenientJson;
use crate::{
    error::{ApiError, ErrorShape},
    models::{
        AttendanceResponse, IncrementAttendanceRequest, ValidateAccessRequest,
        ValidateAccessResponse,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/incrementAttendance",
    tag = "Access",
    request_body = IncrementAttendanceRequest,
    responses(
        (status = 200, description = "Attendance incremented", body = AttendanceResponse),
        (status = 400, description = "Student ID is required"),
        (status = 404, description = "Student ID not found"),
        (status = 500, description = "Failed to increment attendance")
    )
)]
pub async fn increment_attendance(
    State(state): State<AppState>,
    body: Result<LenientJson<IncrementAttendanceRequest>, ApiError>,
) -> Result<Json<AttendanceResponse>, ApiError> {
    let LenientJson(req) = body.map_err(|e| e.with_shape(ErrorShape::Status))?;
    state
        .campus
        .increment_attendance(req)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, ErrorShape::Status))
}

/// Check a card for door, ticket or student id access.
#[utoipa::path(
    post,
    path = "/validateAccess",
    tag = "Access",
    request_body = ValidateAccessRequest,
    responses(
        (status = 200, description = "Access decision", body = ValidateAccessResponse),
        (status = 400, description = "Missing fields or unknown verification type"),
        (status = 404, description = "Student ID not registered"),
        (status = 500, description = "Failed to validate access")
    )
)]
pub async fn validate_access(
    State(state): State<AppState>,
    body: Result<LenientJson<ValidateAccessRequest>, ApiError>,
) -> Result<Json<ValidateAccessResponse>, ApiError> {
    let LenientJson(req) = body.map_err(|e| e.with_shape(ErrorShape::Access))?;
    state
        .campus
        .validate_access(req)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_service(e, ErrorShape::Access))
}
