// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Module
//!
//! Signed session tokens for the campus card API.
//!
//! ## Session Flow
//!
//! 1. `POST /createUser` or `POST /login` issues an HS256 token carrying
//!    `{username, address, iat, exp}` and adds it to the active set
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. `GET /authenticateUser` reports `{valid, username}` for the token
//! 4. `POST /logout` removes the token from the active set
//!
//! ## Known weaknesses
//!
//! - Credentials are compared verbatim at login
//! - The active set is never swept; expired tokens linger until restart

pub mod claims;
pub mod error;
pub mod extractor;
pub mod sessions;

pub use claims::SessionClaims;
pub use error::AuthError;
pub use extractor::{BearerToken, OptionalBearer};
pub use sessions::SessionManager;
