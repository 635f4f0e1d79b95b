// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated wallet representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::session::SessionClaims;

/// Wallet behind a verified session cookie.
///
/// Inserted into request extensions by the session gate and read by the
/// `Auth` extractor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedWallet {
    /// Lower-cased wallet address
    pub wallet_address: String,

    /// Token id of the session
    pub session_id: String,

    pub issued_at: Option<DateTime<Utc>>,

    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthenticatedWallet {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            wallet_address: claims.wallet_address,
            session_id: claims.jti,
        }
    }
}
