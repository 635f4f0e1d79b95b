// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session tokens and the cookie that carries them.
//!
//! Tokens are HS256 JWTs signed with the server's session secret. The
//! signature and structure are checked by `jsonwebtoken`; expiry is checked
//! against the injected [`Clock`] so it follows the same notion of "now" as
//! the rest of the login flow.
//!
//! There is no server-side revocation: a token stays valid until `exp`.
//! Logging out only replaces the cookie with an expired one.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::models::WalletAddress;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "authToken";

/// Session lifetime in seconds (24 hours).
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Label returned to clients alongside a fresh session.
pub const SESSION_TTL_LABEL: &str = "24h";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated wallet, lower-cased.
    #[serde(rename = "walletAddress")]
    pub wallet_address: String,
    /// Challenge consumed by the login that produced this token.
    pub nonce: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expires at (Unix seconds).
    pub exp: i64,
    /// Token id.
    pub jti: String,
}

impl SessionClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Why a token could not be issued or was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("session token is malformed")]
    Malformed,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token has expired")]
    Expired,

    #[error("failed to encode session token: {0}")]
    Encoding(String),
}

/// A freshly signed token together with its claims.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl SessionTokenCodec {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        }
    }

    /// Sign a 24-hour token for `wallet_address` bound to `nonce`.
    pub fn issue(
        &self,
        wallet_address: &str,
        nonce: &str,
    ) -> Result<IssuedSession, SessionTokenError> {
        let now = self.clock.now();
        let claims = SessionClaims {
            wallet_address: WalletAddress::new(wallet_address).into(),
            nonce: nonce.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(SESSION_TTL_SECS)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionTokenError::Encoding(e.to_string()))?;

        Ok(IssuedSession { token, claims })
    }

    /// Check signature, structure and expiry; return the claims if all pass.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionTokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against our own clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    SessionTokenError::InvalidSignature
                }
                _ => SessionTokenError::Malformed,
            },
        )?;

        let claims = data.claims;
        if self.clock.now().timestamp() >= claims.exp {
            return Err(SessionTokenError::Expired);
        }

        Ok(claims)
    }
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .path("/")
        .build()
}

/// Cookie that overwrites the session cookie and expires immediately.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .path("/")
        .build()
}
