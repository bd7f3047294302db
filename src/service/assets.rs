// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balances, card fields and BRB purchases.

use alloy::primitives::{Address, U256};

use super::{required, CampusService, LedgerContext, ServiceError, ServiceResult};
use crate::ledger::{format_ether, parse_ether, LedgerError, UserAssets};
use crate::models::{
    BalancesResponse, BuyBearBucksRequest, BuyBearBucksResponse, TxResponse,
    UpdateUserAssetsRequest, UserAssetsResponse,
};
use crate::storage::UserRecord;

use super::accounts::BOOTSTRAP_MERCHANT_ID;

/// Username that resolves to the bootstrap merchant in balance lookups.
const MERCHANT_ALIAS: &str = "merchant";

impl CampusService {
    fn find_user(&self, username: Option<&str>) -> ServiceResult<UserRecord> {
        let user = match username {
            Some(username) => self.registry.user(username)?,
            None => None,
        };
        user.ok_or(ServiceError::NotFound("User not found"))
    }

    /// ETH and BRB balances of a user, or of the merchant for `merchant`.
    pub async fn balances(&self, username: &str) -> ServiceResult<BalancesResponse> {
        const ACTION: &str = "Failed to fetch balances";

        let resolved = if username == MERCHANT_ALIAS {
            self.registry
                .merchant(BOOTSTRAP_MERCHANT_ID)?
                .ok_or(ServiceError::NotFound("Merchant not found"))?
                .ledger_address()
        } else {
            self.find_user(Some(username))?.ledger_address()
        };
        let address = resolved.during(ACTION)?;

        let (eth, brb) = self.raw_balances(address).await.during(ACTION)?;
        Ok(BalancesResponse {
            eth: format_ether(eth),
            brb: format_ether(brb),
        })
    }

    /// Overwrite all four card fields, then index the student id.
    ///
    /// The index is only touched after the ledger write confirmed.
    pub async fn update_user_assets(
        &self,
        req: UpdateUserAssetsRequest,
    ) -> ServiceResult<TxResponse> {
        const ACTION: &str = "Failed to update user assets";

        let user = self.find_user(req.username.as_deref())?;
        let address = user.ledger_address().during(ACTION)?;

        let assets = UserAssets {
            student_id: req.student_id.clone().unwrap_or_default(),
            ticket_access: req.ticket_access.unwrap_or(false),
            door_access: req.door_access.unwrap_or(false),
            attendance: req.attendance.unwrap_or(0),
        };
        let tx_hash = self
            .ledger
            .set_user_assets(address, &assets)
            .await
            .during(ACTION)?;

        if let Some(student_id) = required(&req.student_id) {
            let previous = self.registry.assign_student_id(student_id, &user.username)?;
            if let Some(previous) = previous.filter(|p| *p != user.username) {
                tracing::warn!(
                    student_id,
                    previous_owner = %previous,
                    new_owner = %user.username,
                    "student id reassigned"
                );
            }
        }

        tracing::info!(username = %user.username, tx_hash = %tx_hash, "user assets updated");
        Ok(TxResponse {
            success: true,
            tx_hash: tx_hash.to_string(),
        })
    }

    /// Card fields plus formatted balances.
    pub async fn get_user_assets(&self, username: &str) -> ServiceResult<UserAssetsResponse> {
        const ACTION: &str = "Failed to fetch user assets";

        let address = self.find_user(Some(username))?.ledger_address().during(ACTION)?;
        let assets = self.ledger.user_assets(address).await.during(ACTION)?;
        let (eth, brb) = self.raw_balances(address).await.during(ACTION)?;

        Ok(UserAssetsResponse {
            assets,
            eth_balance: format_ether(eth),
            brb_balance: format_ether(brb),
        })
    }

    async fn raw_balances(&self, address: Address) -> Result<(U256, U256), LedgerError> {
        let eth = self.ledger.native_balance(address).await?;
        let brb = self.ledger.token_balance(address).await?;
        Ok((eth, brb))
    }

    /// Mint BRB to a user with the admin key.
    pub async fn buy_bearbucks(
        &self,
        req: BuyBearBucksRequest,
    ) -> ServiceResult<BuyBearBucksResponse> {
        const ACTION: &str = "Failed to buy BearBucks";

        let (Some(username), Some(amount)) = (required(&req.username), required(&req.amount))
        else {
            return Err(ServiceError::BadRequest(
                "Username and amount are required".to_string(),
            ));
        };

        let user = self.find_user(Some(username))?;
        let amount = parse_ether(amount).map_err(ServiceError::InvalidAmount)?;
        let address = user.ledger_address().during(ACTION)?;

        let tx_hash = self.ledger.mint(address, amount).await.during(ACTION)?;

        tracing::info!(
            username,
            amount = %format_ether(amount),
            tx_hash = %tx_hash,
            "BearBucks purchased"
        );
        Ok(BuyBearBucksResponse {
            success: true,
            message: "BearBucks purchased successfully".to_string(),
            tx_hash: tx_hash.to_string(),
        })
    }
}
