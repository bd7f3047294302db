// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Campus Card Operations
//!
//! [`CampusService`] resolves usernames and student cards through the
//! [`AccountRegistry`], calls the [`Ledger`], and returns response models.
//! Handlers only choose the error body shape.
//!
//! Partial failures are not rolled back: a signup whose credential write
//! fails keeps its registration and funding.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::auth::{AuthError, SessionManager};
use crate::ledger::{Ledger, LedgerError, UnitsError};
use crate::storage::{AccountRegistry, RegistrationError, StoreError};

pub mod access;
pub mod accounts;
pub mod assets;
pub mod payments;

pub use access::VerificationType;

/// Outcome of a failed operation.
///
/// The `Display` text is the client-facing message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or conflicting input
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid amount")]
    InvalidAmount(#[source] UnitsError),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    /// A ledger call failed; `action` names the failed operation.
    #[error("{action}")]
    Ledger {
        action: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("Internal storage error")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] AuthError),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) | ServiceError::InvalidAmount(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Ledger { .. } | ServiceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Session(err) => err.status_code(),
        }
    }

    /// Underlying error text echoed to the client as `details`.
    pub fn details(&self) -> Option<String> {
        match self {
            ServiceError::InvalidAmount(source) => Some(source.to_string()),
            ServiceError::Ledger { source, .. } => Some(source.to_string()),
            ServiceError::Store(source) => Some(source.to_string()),
            _ => None,
        }
    }
}

impl From<RegistrationError> for ServiceError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Store(source) => ServiceError::Store(source),
            conflict => ServiceError::BadRequest(conflict.to_string()),
        }
    }
}

/// Attach an operation name to a ledger failure.
pub(crate) trait LedgerContext<T> {
    fn during(self, action: &'static str) -> Result<T, ServiceError>;
}

impl<T> LedgerContext<T> for Result<T, LedgerError> {
    fn during(self, action: &'static str) -> Result<T, ServiceError> {
        self.map_err(|source| {
            tracing::error!(action, error = %source, "ledger call failed");
            ServiceError::Ledger { action, source }
        })
    }
}

/// Result type for campus operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Campus card operations over a ledger, a registry and the session set.
pub struct CampusService {
    ledger: Arc<dyn Ledger>,
    registry: AccountRegistry,
    sessions: SessionManager,
}

impl CampusService {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        registry: AccountRegistry,
        sessions: SessionManager,
    ) -> Self {
        Self {
            ledger,
            registry,
            sessions,
        }
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Probe the registry and the ledger for the readiness check.
    pub async fn check_ledger(&self) -> Result<(), LedgerError> {
        self.ledger
            .token_balance(alloy::primitives::Address::ZERO)
            .await
            .map(|_| ())
    }

    pub fn check_registry(&self) -> Result<(), StoreError> {
        self.registry.merchants().map(|_| ())
    }
}

/// Required string field: absent and `""` both count as missing.
pub(crate) fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
