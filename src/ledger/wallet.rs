// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet generation and key parsing.
//!
//! User and merchant wallets are generated server-side at signup and kept
//! as `0x`-prefixed hex private keys in the account registry. Signers are
//! rebuilt from that hex whenever a wallet must sign a transfer.

use alloy::signers::local::PrivateKeySigner;

use super::client::LedgerError;

/// A freshly generated keypair.
#[derive(Debug, Clone)]
pub struct GeneratedWallet {
    /// Checksummed `0x` address
    pub address: String,
    /// `0x`-prefixed hex private key
    pub private_key: String,
}

/// Generate a random secp256k1 wallet.
pub fn generate_wallet() -> GeneratedWallet {
    let signer = PrivateKeySigner::random();
    GeneratedWallet {
        address: signer.address().to_string(),
        private_key: alloy::hex::encode_prefixed(signer.to_bytes()),
    }
}

/// Create a signer from a hex private key (with or without `0x`).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim())
        .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known local development account #0.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn generated_key_recovers_same_address() {
        let wallet = generate_wallet();
        assert!(wallet.address.starts_with("0x"));
        assert_eq!(wallet.private_key.len(), 66);

        let signer = signer_from_hex(&wallet.private_key).unwrap();
        assert_eq!(signer.address().to_string(), wallet.address);
    }

    #[test]
    fn dev_key_parses_with_and_without_prefix() {
        let with = signer_from_hex(DEV_KEY).unwrap();
        let without = signer_from_hex(DEV_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with.address(), without.address());
        assert_eq!(
            with.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn garbage_key_is_rejected() {
        assert!(matches!(
            signer_from_hex("not-a-key"),
            Err(LedgerError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            signer_from_hex("0x1234"),
            Err(LedgerError::InvalidPrivateKey(_))
        ));
    }
}
