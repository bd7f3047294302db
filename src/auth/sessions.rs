// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 session tokens and the active session set.
//!
//! A token is accepted only while it verifies, is unexpired and is still in
//! the active set. Logout is the only way a token leaves the set: expired
//! tokens stay until the process restarts, so the set grows without bound.

use std::collections::HashSet;
use std::sync::RwLock;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;
use super::AuthError;

/// Issues, verifies and revokes session tokens.
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
    active: RwLock<HashSet<String>>,
}

impl SessionManager {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
            active: RwLock::new(HashSet::new()),
        }
    }

    /// Sign a token for `username` and mark it active.
    pub fn issue(&self, username: &str, address: &str) -> Result<String, AuthError> {
        self.issue_at(username, address, now_secs())
    }

    fn issue_at(&self, username: &str, address: &str, issued_at: u64) -> Result<String, AuthError> {
        let claims = SessionClaims::new(username, address, issued_at, self.ttl_secs);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;

        self.active
            .write()
            .map_err(|_| AuthError::SigningFailed("session set poisoned".to_string()))?
            .insert(token.clone());
        Ok(token)
    }

    /// Verify signature, expiry and active membership.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?
            .claims;

        if !self.is_active(token) {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Remove a token from the active set.
    pub fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let removed = self
            .active
            .write()
            .map(|mut active| active.remove(token))
            .unwrap_or(false);

        if removed {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }

    pub fn is_active(&self, token: &str) -> bool {
        self.active
            .read()
            .map(|active| active.contains(token))
            .unwrap_or(false)
    }
}

fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
