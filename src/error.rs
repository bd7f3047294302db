// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::service::ServiceError;

/// JSON layout of an error body.
///
/// Each endpoint family keeps the body shape its clients already parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    /// `{"error": ..., "details"?: ...}`
    Error,
    /// `{"success": false, "message": ..., "details"?: ...}`
    Message,
    /// `{"status": "error", "message": ..., "details"?: ...}`
    Status,
    /// `{"valid": false, "message": ..., "details"?: ...}`
    Access,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
    pub shape: ErrorShape,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            shape: ErrorShape::Error,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_shape(mut self, shape: ErrorShape) -> Self {
        self.shape = shape;
        self
    }

    /// Map an operation failure onto a response in the given shape.
    pub fn from_service(err: ServiceError, shape: ErrorShape) -> Self {
        let status = err.status_code();
        let details = err.details();
        let error = Self::new(status, err.to_string()).with_shape(shape);
        match details {
            Some(details) => error.with_details(details),
            None => error,
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        match self.shape {
            ErrorShape::Error => {
                body.insert("error".into(), json!(self.message));
            }
            ErrorShape::Message => {
                body.insert("success".into(), json!(false));
                body.insert("message".into(), json!(self.message));
            }
            ErrorShape::Status => {
                body.insert("status".into(), json!("error"));
                body.insert("message".into(), json!(self.message));
            }
            ErrorShape::Access => {
                body.insert("valid".into(), json!(false));
                body.insert("message".into(), json!(self.message));
            }
        }
        if let Some(details) = &self.details {
            body.insert("details".into(), json!(details));
        }
        Value::Object(body)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::from_service(err, ErrorShape::Error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(self.body());
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use axum::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");
        assert_eq!(nf.shape, ErrorShape::Error);

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let unauth = ApiError::unauthorized("no");
        assert_eq!(unauth.status, StatusCode::UNAUTHORIZED);

        let internal = ApiError::internal("boom");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }

    #[tokio::test]
    async fn shapes_render_their_own_fields() {
        let (_, message) =
            body_of(ApiError::bad_request("Insufficient Funds").with_shape(ErrorShape::Message))
                .await;
        assert_eq!(message, json!({"success": false, "message": "Insufficient Funds"}));

        let (_, status) =
            body_of(ApiError::not_found("Student ID not found").with_shape(ErrorShape::Status))
                .await;
        assert_eq!(status, json!({"status": "error", "message": "Student ID not found"}));

        let (_, access) = body_of(
            ApiError::internal("Failed to validate access")
                .with_shape(ErrorShape::Access)
                .with_details("rpc down"),
        )
        .await;
        assert_eq!(
            access,
            json!({"valid": false, "message": "Failed to validate access", "details": "rpc down"})
        );
    }

    #[tokio::test]
    async fn ledger_failures_carry_details() {
        let err = ServiceError::Ledger {
            action: "Transfer failed",
            source: LedgerError::Reverted("ERC20: transfer amount exceeds balance".into()),
        };

        let (status, body) = body_of(ApiError::from_service(err, ErrorShape::Message)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Transfer failed");
        assert_eq!(
            body["details"],
            "execution reverted: ERC20: transfer amount exceeds balance"
        );
    }
}
