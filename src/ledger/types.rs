// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types, unit conversion and funding constants.

use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Transaction hash returned by confirmed ledger writes.
pub type TxHash = B256;

/// Decimals used by both ETH and BRB.
pub const ETHER_DECIMALS: u8 = 18;

/// ETH sent to every new user wallet.
pub const USER_ETH_FUNDING: &str = "10";

/// BRB minted to every new user wallet.
pub const USER_BRB_FUNDING: &str = "5";

/// ETH sent to the bootstrap merchant wallet.
pub const MERCHANT_ETH_FUNDING: &str = "10";

/// BRB minted to the bootstrap merchant wallet.
pub const MERCHANT_BRB_FUNDING: &str = "100";

/// Per-user card fields stored by the BearBucks contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAssets {
    /// Physical card identifier ("" when never assigned)
    pub student_id: String,
    /// Event ticket flag
    pub ticket_access: bool,
    /// Building door flag
    pub door_access: bool,
    /// Attendance counter
    pub attendance: u64,
}

/// Credentials written on-chain at signup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub encrypted_password: String,
}

/// A decoded `Transfer(from, to, value)` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: alloy::primitives::Address,
    pub to: alloy::primitives::Address,
    pub value: U256,
    pub tx_hash: Option<TxHash>,
    pub block_number: Option<u64>,
}

/// Errors raised when converting decimal strings to ledger units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount: {0}")]
    Malformed(String),

    #[error("too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("amount overflow")]
    Overflow,
}

/// Parse a human-readable decimal amount into the smallest unit.
///
/// Accepts `"1"`, `"1.5"`, `".5"` and `"5."`. Signs, exponents and
/// separators are rejected.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() || amount == "." {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(UnitsError::Malformed(amount.to_string()));
    }

    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals(decimals));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let padded = format!("{:0<width$}", fraction, width = decimals as usize);

    let whole: U256 = whole
        .parse()
        .map_err(|_| UnitsError::Malformed(amount.to_string()))?;
    let fraction: U256 = if padded.is_empty() {
        U256::ZERO
    } else {
        padded
            .parse()
            .map_err(|_| UnitsError::Malformed(amount.to_string()))?
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(UnitsError::Overflow)
}

/// Parse an 18-decimal amount.
pub fn parse_ether(amount: &str) -> Result<U256, UnitsError> {
    parse_units(amount, ETHER_DECIMALS)
}

/// Format a value in the smallest unit as a decimal string.
///
/// Always keeps at least one fractional digit: `10.0`, `0.5`, `0.0`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    let decimal_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Format an 18-decimal value.
pub fn format_ether(value: U256) -> String {
    format_units(value, ETHER_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn parse_whole_and_decimal_amounts() {
        assert_eq!(parse_ether("1").unwrap(), U256::from(ONE));
        assert_eq!(parse_ether("1.5").unwrap(), U256::from(ONE + ONE / 2));
        assert_eq!(parse_ether(".5").unwrap(), U256::from(ONE / 2));
        assert_eq!(parse_ether("5.").unwrap(), U256::from(5 * ONE));
        assert_eq!(parse_ether(" 2 ").unwrap(), U256::from(2 * ONE));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(parse_ether(""), Err(UnitsError::Empty));
        assert_eq!(parse_ether("."), Err(UnitsError::Empty));
        assert!(matches!(parse_ether("-1"), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_ether("1e3"), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_ether("1.2.3"), Err(UnitsError::Malformed(_))));
        assert_eq!(
            parse_units("1.1234567", 6),
            Err(UnitsError::TooManyDecimals(6))
        );
    }

    #[test]
    fn parse_small_decimals() {
        assert_eq!(parse_units("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_units("3", 0).unwrap(), U256::from(3u64));
    }

    #[test]
    fn format_keeps_one_fractional_digit() {
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(U256::from(10 * ONE)), "10.0");
        assert_eq!(format_ether(U256::from(ONE / 2)), "0.5");
        assert_eq!(
            format_ether(U256::from(1_234_567_890_123_456_789u64)),
            "1.234567890123456789"
        );
    }
}
