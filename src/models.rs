// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the authentication endpoints. Each
//! endpoint gets its own type carrying exactly the fields it exchanges; JSON
//! field names are camelCase to match what browser clients send.
//!
//! ## Wallet Address Type
//!
//! [`WalletAddress`] holds an EVM-style address normalized to lower case.
//! It is the key of the nonce store and the identity inside session tokens,
//! so `0xABC..` and `0xabc..` always refer to the same owner.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Lower-cased wallet address.
///
/// No format validation happens here; a malformed address simply never
/// matches a recovered signer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(raw: &str) -> Self {
        WalletAddress(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress::new(value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Challenge Models
// =============================================================================

/// Query parameters for `GET /auth/nonce`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NonceQuery {
    /// Wallet address requesting a challenge.
    pub wallet_address: Option<String>,
}

/// A freshly issued challenge.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct NonceResponse {
    /// Nonce to embed in `Authenticate to <AppName>: <nonce>`.
    pub nonce: String,
}

// =============================================================================
// Session Models
// =============================================================================

/// Body of `POST /auth/login`.
///
/// All fields are optional at the parsing layer so a missing field yields the
/// dedicated `missing_fields` error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Address claimed by the client.
    pub wallet_address: Option<String>,
    /// 65-byte hex `personal_sign` signature.
    pub signature: Option<String>,
    /// The exact message that was signed.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    /// Authenticated wallet, lower-cased.
    pub wallet_address: String,
    /// Session lifetime label.
    pub expires_in: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Result of `GET /auth/check`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl SessionCheckResponse {
    pub fn authenticated(wallet_address: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            wallet_address: Some(wallet_address.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            wallet_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_is_normalized() {
        let upper = WalletAddress::new("  0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266 ");
        let lower = WalletAddress::from("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn login_request_uses_camel_case() {
        let req: LoginRequest = serde_json::from_str(
            r#"{"walletAddress":"0xabc","signature":"0x01","message":"hi"}"#,
        )
        .unwrap();
        assert_eq!(req.wallet_address.as_deref(), Some("0xabc"));
        assert_eq!(req.signature.as_deref(), Some("0x01"));
        assert_eq!(req.message.as_deref(), Some("hi"));

        let partial: LoginRequest = serde_json::from_str(r#"{"signature":"0x01"}"#).unwrap();
        assert!(partial.wallet_address.is_none());
    }

    #[test]
    fn anonymous_check_omits_wallet() {
        let json = serde_json::to_string(&SessionCheckResponse::anonymous()).unwrap();
        assert_eq!(json, r#"{"authenticated":false}"#);

        let json = serde_json::to_string(&SessionCheckResponse::authenticated("0xabc")).unwrap();
        assert_eq!(json, r#"{"authenticated":true,"walletAddress":"0xabc"}"#);
    }

    #[test]
    fn login_response_shape() {
        let json = serde_json::to_value(LoginResponse {
            success: true,
            wallet_address: "0xabc".to_string(),
            expires_in: "24h".to_string(),
        })
        .unwrap();
        assert_eq!(json["walletAddress"], "0xabc");
        assert_eq!(json["expiresIn"], "24h");
    }
}
