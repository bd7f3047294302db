// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card payments and the transaction history derived from the event log.

use std::collections::HashMap;

use alloy::primitives::Address;

use super::{required, CampusService, LedgerContext, ServiceError, ServiceResult};
use crate::ledger::{format_ether, parse_ether, signer_from_hex};
use crate::models::{TransactionListResponse, TransactionView, TransferRequest, TxResponse};

impl CampusService {
    /// Pay a merchant from the wallet behind a student card.
    ///
    /// The balance is checked first so an overdraft never reaches the ledger.
    pub async fn transfer(&self, req: TransferRequest) -> ServiceResult<TxResponse> {
        const ACTION: &str = "Transfer failed";

        let student_id = required(&req.student_id)
            .ok_or_else(|| ServiceError::BadRequest("Student ID is required".to_string()))?;

        let user = self
            .registry
            .user_by_student_id(student_id)?
            .ok_or(ServiceError::NotFound("Unauthorized Card"))?;

        let merchant_id = req
            .merchant_id
            .as_deref()
            .and_then(|id| id.trim().parse::<u32>().ok());
        let merchant = match merchant_id {
            Some(id) => self.registry.merchant(id)?,
            None => None,
        }
        .ok_or(ServiceError::NotFound("Merchant not found"))?;

        let amount = parse_ether(req.amount.as_deref().unwrap_or_default())
            .map_err(ServiceError::InvalidAmount)?;

        let from = user.ledger_address().during(ACTION)?;
        let to = merchant.ledger_address().during(ACTION)?;

        let balance = self.ledger.token_balance(from).await.during(ACTION)?;
        if balance < amount {
            tracing::info!(
                username = %user.username,
                balance = %format_ether(balance),
                requested = %format_ether(amount),
                "transfer declined"
            );
            return Err(ServiceError::BadRequest("Insufficient Funds".to_string()));
        }

        let signer = signer_from_hex(&user.private_key).during(ACTION)?;
        let tx_hash = self.ledger.transfer(&signer, to, amount).await.during(ACTION)?;

        tracing::info!(
            username = %user.username,
            merchant = %merchant.name,
            amount = %format_ether(amount),
            tx_hash = %tx_hash,
            "card payment confirmed"
        );
        Ok(TxResponse {
            success: true,
            tx_hash: tx_hash.to_string(),
        })
    }

    /// User → merchant payments, rebuilt from every `Transfer` event.
    pub async fn list_transactions(&self) -> ServiceResult<TransactionListResponse> {
        let events = self
            .ledger
            .transfer_events()
            .await
            .during("Failed to fetch transactions")?;

        let users: HashMap<Address, String> = self
            .registry
            .users()?
            .into_iter()
            .filter_map(|u| Some((u.ledger_address().ok()?, u.username)))
            .collect();
        let merchants: HashMap<Address, String> = self
            .registry
            .merchants()?
            .into_iter()
            .filter_map(|m| Some((m.ledger_address().ok()?, m.name)))
            .collect();

        let transactions = events
            .into_iter()
            .filter_map(|event| {
                let from = users.get(&event.from)?;
                let merchant = merchants.get(&event.to)?;
                Some(TransactionView {
                    from: from.clone(),
                    merchant: merchant.clone(),
                    amount: format_ether(event.value),
                })
            })
            .collect();

        Ok(TransactionListResponse {
            success: true,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, Ledger, LedgerOp};
    use crate::models::{CreateUserRequest, UpdateUserAssetsRequest};
    use crate::service::testing::service;
    use axum::http::StatusCode;

    /// alice holds card S1 with 5 BRB; merchant 0 exists.
    async fn setup() -> (CampusService, std::sync::Arc<InMemoryLedger>) {
        let (campus, ledger) = service();
        campus.bootstrap_merchant().await.unwrap();
        campus
            .create_user(CreateUserRequest {
                username: Some("alice".into()),
                email: Some("a@x.com".into()),
                encrypted_password: Some("pw1".into()),
            })
            .await
            .unwrap();
        campus
            .update_user_assets(UpdateUserAssetsRequest {
                username: Some("alice".into()),
                student_id: Some("S1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        (campus, ledger)
    }

    fn pay(student_id: &str, merchant_id: &str, amount: &str) -> TransferRequest {
        TransferRequest {
            student_id: Some(student_id.into()),
            merchant_id: Some(merchant_id.into()),
            amount: Some(amount.into()),
        }
    }

    #[tokio::test]
    async fn transfer_pays_merchant() {
        let (campus, _) = setup().await;

        let paid = campus.transfer(pay("S1", "0", "2")).await.unwrap();
        assert!(paid.success);

        assert_eq!(campus.balances("alice").await.unwrap().brb, "3.0");
        assert_eq!(campus.balances("merchant").await.unwrap().brb, "102.0");
    }

    #[tokio::test]
    async fn overdraft_is_declined_without_mutation() {
        let (campus, ledger) = setup().await;
        let before = ledger.block_number();

        let err = campus.transfer(pay("S1", "0", "6")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Insufficient Funds");
        assert_eq!(ledger.block_number(), before);
    }

    #[tokio::test]
    async fn unknown_card_and_merchant_are_not_found() {
        let (campus, _) = setup().await;

        let card = campus.transfer(pay("S9", "0", "1")).await.unwrap_err();
        assert_eq!(card.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(card.to_string(), "Unauthorized Card");

        let merchant = campus.transfer(pay("S1", "7", "1")).await.unwrap_err();
        assert_eq!(merchant.to_string(), "Merchant not found");

        let garbage = campus.transfer(pay("S1", "abc", "1")).await.unwrap_err();
        assert_eq!(garbage.to_string(), "Merchant not found");

        let missing = campus
            .transfer(TransferRequest::default())
            .await
            .unwrap_err();
        assert_eq!(missing.to_string(), "Student ID is required");
    }

    #[tokio::test]
    async fn ledger_failure_is_transfer_failed() {
        let (campus, ledger) = setup().await;
        ledger.fail(LedgerOp::Transfer);

        let err = campus.transfer(pay("S1", "0", "1")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Transfer failed");
    }

    #[tokio::test]
    async fn history_only_lists_user_to_merchant_payments() {
        let (campus, ledger) = setup().await;
        campus.transfer(pay("S1", "0", "1.5")).await.unwrap();

        // Merchant paying a stranger is not a card payment.
        let merchant = campus.registry().merchant(0).unwrap().unwrap();
        let merchant_signer = signer_from_hex(&merchant.private_key).unwrap();
        let stranger = alloy::signers::local::PrivateKeySigner::random().address();
        ledger
            .transfer(&merchant_signer, stranger, parse_ether("1").unwrap())
            .await
            .unwrap();

        // Neither party known.
        let outsider = alloy::signers::local::PrivateKeySigner::random();
        ledger.mint(outsider.address(), parse_ether("3").unwrap()).await.unwrap();
        ledger
            .transfer(&outsider, stranger, parse_ether("1").unwrap())
            .await
            .unwrap();

        // User to user is not a merchant payment either.
        let bob = campus
            .create_user(CreateUserRequest {
                username: Some("bob".into()),
                email: Some("b@x.com".into()),
                encrypted_password: Some("pw2".into()),
            })
            .await
            .unwrap();
        let alice = campus.registry().user("alice").unwrap().unwrap();
        let alice_signer = signer_from_hex(&alice.private_key).unwrap();
        ledger
            .transfer(&alice_signer, bob.address.parse().unwrap(), parse_ether("0.5").unwrap())
            .await
            .unwrap();

        let history = campus.list_transactions().await.unwrap();
        assert_eq!(
            history.transactions,
            vec![TransactionView {
                from: "alice".into(),
                merchant: "submart".into(),
                amount: "1.5".into(),
            }]
        );
    }

    #[tokio::test]
    async fn history_read_failure_is_reported() {
        let (campus, ledger) = setup().await;
        ledger.fail(LedgerOp::ReadEvents);

        let err = campus.list_transactions().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch transactions");
    }
}
