// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup, login, sessions and the bootstrap merchant.

use chrono::Utc;

use super::{required, CampusService, LedgerContext, ServiceError, ServiceResult};
use crate::auth::AuthError;
use crate::ledger::{
    generate_wallet, parse_ether, MERCHANT_BRB_FUNDING, MERCHANT_ETH_FUNDING, USER_BRB_FUNDING,
    USER_ETH_FUNDING,
};
use crate::models::{
    AuthenticateResponse, CreateUserRequest, CreateUserResponse, LoginRequest, LoginResponse,
    SuccessResponse, UserListResponse, UserSummary,
};
use crate::storage::{Merchant, UserRecord};

/// Id and name of the merchant created at startup.
pub const BOOTSTRAP_MERCHANT_ID: u32 = 0;
pub const BOOTSTRAP_MERCHANT_NAME: &str = "submart";

impl CampusService {
    /// Register a user, fund a fresh wallet, store credentials and open a session.
    pub async fn create_user(&self, req: CreateUserRequest) -> ServiceResult<CreateUserResponse> {
        let (Some(username), Some(email), Some(encrypted_password)) = (
            required(&req.username),
            required(&req.email),
            required(&req.encrypted_password),
        ) else {
            return Err(ServiceError::BadRequest(
                "username, email, and encryptedPassword are required".to_string(),
            ));
        };

        let wallet = generate_wallet();
        let user = UserRecord {
            username: username.to_string(),
            email: email.to_string(),
            address: wallet.address.clone().into(),
            private_key: wallet.private_key,
            created_at: Utc::now(),
        };
        let address = user
            .ledger_address()
            .during("Failed to fund wallet")?;
        self.registry.register(user)?;

        tracing::info!(username, address = %address, "user registered");

        self.ledger
            .fund(address, ether(USER_ETH_FUNDING)?)
            .await
            .during("Failed to fund wallet")?;
        self.ledger
            .mint(address, ether(USER_BRB_FUNDING)?)
            .await
            .during("Failed to fund wallet")?;

        self.ledger
            .set_user_credentials(address, email, encrypted_password)
            .await
            .during("Failed to store credentials")?;

        let token = self.sessions.issue(username, &wallet.address)?;
        Ok(CreateUserResponse {
            address: wallet.address,
            token,
        })
    }

    /// Check credentials stored on the ledger and open a session.
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<LoginResponse> {
        let (Some(email), Some(encrypted_password)) =
            (required(&req.email), required(&req.encrypted_password))
        else {
            return Err(ServiceError::BadRequest(
                "Email and encryptedPassword are required".to_string(),
            ));
        };

        let user = match self.registry.username_for_email(email)? {
            Some(username) => self.registry.user(&username)?,
            None => None,
        }
        .ok_or(ServiceError::NotFound("User not found"))?;

        let address = user
            .ledger_address()
            .during("Failed to verify credentials")?;
        let stored = self
            .ledger
            .user_credentials(address)
            .await
            .during("Failed to verify credentials")?;

        if stored.email != email || stored.encrypted_password != encrypted_password {
            tracing::info!(username = %user.username, "login rejected");
            return Err(ServiceError::Unauthorized("Invalid credentials"));
        }

        let token = self.sessions.issue(&user.username, &user.address.0)?;
        Ok(LoginResponse { token })
    }

    /// Soft check: any failure is reported as `{valid: false}`.
    pub fn authenticate(&self, token: Option<&str>) -> AuthenticateResponse {
        match token.map(|t| self.sessions.authenticate(t)) {
            Some(Ok(claims)) => AuthenticateResponse {
                valid: true,
                username: Some(claims.username),
            },
            Some(Err(err)) => {
                tracing::debug!(error_code = err.error_code(), "session check failed");
                AuthenticateResponse {
                    valid: false,
                    username: None,
                }
            }
            None => AuthenticateResponse {
                valid: false,
                username: None,
            },
        }
    }

    pub fn logout(&self, token: &str) -> Result<SuccessResponse, AuthError> {
        self.sessions.revoke(token)?;
        Ok(SuccessResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        })
    }

    /// Every registered user, without keys.
    pub fn list_users(&self) -> ServiceResult<UserListResponse> {
        let users = self
            .registry
            .users()?
            .into_iter()
            .map(|user| UserSummary {
                username: user.username,
                address: user.address.0,
                email: user.email,
            })
            .collect();

        Ok(UserListResponse {
            success: true,
            users,
        })
    }

    /// Create and fund merchant 0, or reuse it when the registry already has it.
    pub async fn bootstrap_merchant(&self) -> ServiceResult<Merchant> {
        if let Some(existing) = self.registry.merchant(BOOTSTRAP_MERCHANT_ID)? {
            tracing::info!(
                merchant_id = existing.id,
                name = %existing.name,
                address = %existing.address,
                "reusing persisted merchant"
            );
            return Ok(existing);
        }

        let wallet = generate_wallet();
        let merchant = Merchant {
            id: BOOTSTRAP_MERCHANT_ID,
            name: BOOTSTRAP_MERCHANT_NAME.to_string(),
            address: wallet.address.into(),
            private_key: wallet.private_key,
        };
        let address = merchant
            .ledger_address()
            .during("Failed to fund wallet")?;

        self.ledger
            .fund(address, ether(MERCHANT_ETH_FUNDING)?)
            .await
            .during("Failed to fund wallet")?;
        self.ledger
            .mint(address, ether(MERCHANT_BRB_FUNDING)?)
            .await
            .during("Failed to fund wallet")?;
        self.registry.add_merchant(merchant.clone())?;

        tracing::info!(
            merchant_id = merchant.id,
            name = %merchant.name,
            address = %merchant.address,
            "merchant wallet created"
        );
        Ok(merchant)
    }
}

fn ether(amount: &str) -> ServiceResult<alloy::primitives::U256> {
    parse_ether(amount).map_err(ServiceError::InvalidAmount)
}
