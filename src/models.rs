// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the campus card API. Field names are
//! camelCase on the wire to match the mobile and admin clients.
//!
//! Request fields are mostly `Option` so that a missing field produces the
//! endpoint's own 400 body instead of a generic JSON rejection.
//!
//! ## Model Categories
//!
//! - **Accounts**: signup, login, sessions, user listing
//! - **Assets**: card fields and balances
//! - **Payments**: card transfers, purchases, transaction history
//! - **Access**: attendance and access validation

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::ledger::UserAssets;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes), checksummed
/// when generated by the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Loose Inputs
// =============================================================================

/// Deserialize a field that clients send either as a JSON string or number.
///
/// Amounts (`"5"` or `5`) and merchant ids (`0` or `"0"`) both arrive in
/// either form; `null` maps to `None`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Loose>::deserialize(deserializer)?.map(|value| match value {
        Loose::Text(text) => text,
        Loose::Number(number) => number.to_string(),
    }))
}

// =============================================================================
// Account Models
// =============================================================================

/// Signup request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Client-side encrypted password, compared verbatim at login
    pub encrypted_password: Option<String>,
}

/// Signup response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    /// Generated wallet address
    pub address: String,
    /// Session token
    pub token: String,
}

/// Login request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub encrypted_password: Option<String>,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Result of `GET /authenticateUser`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Generic success acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Public view of a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub username: String,
    pub address: String,
    pub email: String,
}

/// Response of `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}

// =============================================================================
// Asset Models
// =============================================================================

/// ETH and BRB balances as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BalancesResponse {
    pub eth: String,
    pub brb: String,
}

/// Request to overwrite a user's card fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserAssetsRequest {
    pub username: Option<String>,
    pub student_id: Option<String>,
    pub ticket_access: Option<bool>,
    pub door_access: Option<bool>,
    pub attendance: Option<u64>,
}

/// Body of the admin proxy's `updateUserAssets/{username}` route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetFieldsRequest {
    pub student_id: Option<String>,
    pub ticket_access: Option<bool>,
    pub door_access: Option<bool>,
    pub attendance: Option<u64>,
}

/// Ledger write acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub success: bool,
    pub tx_hash: String,
}

/// Card fields plus formatted balances.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAssetsResponse {
    #[serde(flatten)]
    pub assets: UserAssets,
    pub eth_balance: String,
    pub brb_balance: String,
}

/// Request to mint BRB for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BuyBearBucksRequest {
    pub username: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>)]
    pub amount: Option<String>,
}

/// Mint acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyBearBucksResponse {
    pub success: bool,
    pub message: String,
    pub tx_hash: String,
}

// =============================================================================
// Payment Models
// =============================================================================

/// Card payment to a merchant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = Option<u32>)]
    pub merchant_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>)]
    pub amount: Option<String>,
}

/// A user → merchant payment reconstructed from the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransactionView {
    /// Paying username
    pub from: String,
    /// Receiving merchant name
    pub merchant: String,
    /// BRB amount as a decimal string
    pub amount: String,
}

/// Response of `GET /transactions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionListResponse {
    pub success: bool,
    pub transactions: Vec<TransactionView>,
}

// =============================================================================
// Access Models
// =============================================================================

/// Attendance bump for a card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncrementAttendanceRequest {
    pub student_id: Option<String>,
}

/// Attendance acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub status: String,
    pub message: String,
    pub tx_hash: String,
}

/// Access check for a card.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccessRequest {
    pub student_id: Option<String>,
    /// One of `door`, `ticket`, `studentId`
    pub verification_type: Option<String>,
}

/// Access decision.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccessResponse {
    pub valid: bool,
    pub message: String,
    pub student_id: String,
    pub verification_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_from_and_into_string() {
        let from_str: WalletAddress = "abc".into();
        assert_eq!(from_str.0, "abc");

        let to_string: String = WalletAddress("ghi".into()).into();
        assert_eq!(to_string, "ghi");
    }

    #[test]
    fn transfer_accepts_numbers_or_strings() {
        let numeric: TransferRequest =
            serde_json::from_str(r#"{"studentId":"S1","merchantId":0,"amount":2.5}"#).unwrap();
        assert_eq!(numeric.merchant_id.as_deref(), Some("0"));
        assert_eq!(numeric.amount.as_deref(), Some("2.5"));

        let textual: TransferRequest =
            serde_json::from_str(r#"{"studentId":"S1","merchantId":"0","amount":"1"}"#).unwrap();
        assert_eq!(textual.merchant_id.as_deref(), Some("0"));

        let missing: TransferRequest = serde_json::from_str(r#"{"amount":null}"#).unwrap();
        assert!(missing.student_id.is_none());
        assert!(missing.merchant_id.is_none());
        assert!(missing.amount.is_none());
    }

    #[test]
    fn assets_response_is_flat_camel_case() {
        let body = UserAssetsResponse {
            assets: UserAssets {
                student_id: "S1".into(),
                ticket_access: true,
                door_access: false,
                attendance: 0,
            },
            eth_balance: "10.0".into(),
            brb_balance: "5.0".into(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["studentId"], "S1");
        assert_eq!(json["ticketAccess"], true);
        assert_eq!(json["doorAccess"], false);
        assert_eq!(json["attendance"], 0);
        assert_eq!(json["ethBalance"], "10.0");
        assert_eq!(json["brbBalance"], "5.0");
    }
}
