// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature verification (EIP-191 `personal_sign`).
//!
//! The signer address is recovered from the prefixed message hash and
//! compared byte-wise with the claimed address, so checksum casing plays no
//! role. Any decoding or recovery problem counts as a failed verification.

use std::str::FromStr;

use alloy::primitives::{Address, Signature};
use thiserror::Error;

/// Decides whether `signature` over `message` was produced by `address`.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool;
}

#[derive(Debug, Error)]
enum RecoveryError {
    #[error("invalid wallet address: {0}")]
    Address(String),

    #[error("invalid signature encoding: {0}")]
    Encoding(String),

    #[error("signature recovery failed: {0}")]
    Recovery(String),
}

/// Verifier for signatures produced by wallets' `personal_sign`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Eip191SignatureVerifier;

impl Eip191SignatureVerifier {
    /// Recover the address that signed `message`.
    fn recover_signer(message: &str, signature: &str) -> Result<Address, RecoveryError> {
        let bytes = alloy::hex::decode(signature.trim())
            .map_err(|e| RecoveryError::Encoding(e.to_string()))?;

        let signature = Signature::from_raw(&bytes)
            .map_err(|e| RecoveryError::Encoding(e.to_string()))?;

        signature
            .recover_address_from_msg(message.as_bytes())
            .map_err(|e| RecoveryError::Recovery(e.to_string()))
    }

    fn check(address: &str, message: &str, signature: &str) -> Result<bool, RecoveryError> {
        let expected = Address::from_str(address.trim())
            .map_err(|e| RecoveryError::Address(e.to_string()))?;
        let recovered = Self::recover_signer(message, signature)?;
        Ok(recovered == expected)
    }
}

impl SignatureVerifier for Eip191SignatureVerifier {
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool {
        match Self::check(address, message, signature) {
            Ok(matches) => {
                if !matches {
                    tracing::debug!(
                        wallet_address = %address.to_lowercase(),
                        "Recovered signer does not match claimed address"
                    );
                }
                matches
            }
            Err(e) => {
                tracing::debug!(
                    wallet_address = %address.to_lowercase(),
                    error = %e,
                    "Signature verification failed"
                );
                false
            }
        }
    }
}
