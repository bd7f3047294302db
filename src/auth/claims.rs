// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims.

use serde::{Deserialize, Serialize};

/// Claims signed into every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Application username
    pub username: String,

    /// User's wallet address
    pub address: String,

    /// Issued at timestamp
    pub iat: u64,

    /// Expiration timestamp
    pub exp: u64,
}

impl SessionClaims {
    pub fn new(username: &str, address: &str, issued_at: u64, ttl_secs: u64) -> Self {
        Self {
            username: username.to_string(),
            address: address.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }
}
