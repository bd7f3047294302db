// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the session token.
//!
//! The token is the second space-separated part of the `Authorization`
//! header, so both `Bearer <token>` and any `<scheme> <token>` are accepted.
//!
//! ```rust,ignore
//! async fn logout(BearerToken(token): BearerToken) -> impl IntoResponse {
//!     // token is the raw session token
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;

/// Extractor that requires an `Authorization` header.
///
/// A header without a token part yields an empty token, which no session
/// matches.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.split(' ').nth(1))
            .unwrap_or_default();

        Ok(BearerToken(token.to_string()))
    }
}

/// Optional token extractor.
///
/// Returns `None` when there is no header or no token part, instead of
/// rejecting.
pub struct OptionalBearer(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalBearer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match BearerToken::from_request_parts(parts, state).await {
            Ok(BearerToken(token)) if !token.is_empty() => Ok(OptionalBearer(Some(token))),
            _ => Ok(OptionalBearer(None)),
        }
    }
}
