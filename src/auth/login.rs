// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login flow: turn a signed challenge into a session token.
//!
//! ## Stages
//!
//! ```text
//! Start ─► NonceValidated ─► SignatureVerified ─► SessionIssued
//!   │            │                   │
//!   └────────────┴───────────────────┴──► Rejected
//! ```
//!
//! Everything up to `NonceValidated` is string work and a map lookup. Signature
//! recovery only runs for requests that passed all of it. A rejected attempt
//! leaves no trace: no token is issued and the challenge stays in the store,
//! so the client may retry until it expires. Rejections are logged as
//! `Rejected` together with the last stage that passed.
//!
//! The challenge must still be present in the nonce store and younger than
//! [`NONCE_TTL_SECS`]. A nonce that was never issued, already consumed, or
//! evicted is refused even when its embedded timestamp is fresh. After the
//! signature checks out the challenge is consumed with a compare-and-remove,
//! so of two concurrent logins with the same signed challenge only one gets a
//! session.

use super::challenge::{embedded_timestamp, is_well_formed_nonce};
use super::nonce_store::{NonceStore, NONCE_TTL_SECS};
use super::session::{IssuedSession, SessionTokenCodec};
use super::signature::SignatureVerifier;
use super::AuthError;
use crate::clock::Clock;
use crate::models::{LoginRequest, WalletAddress};

/// Maximum age of a challenge, measured from its embedded timestamp.
pub const MAX_CHALLENGE_AGE_SECS: i64 = 300;

/// Progress of a single login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    Start,
    NonceValidated,
    SignatureVerified,
    SessionIssued,
    Rejected,
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub wallet_address: WalletAddress,
    pub session: IssuedSession,
}

/// Runs one login attempt against the shared components.
pub struct LoginOrchestrator<'a> {
    message_prefix: String,
    clock: &'a dyn Clock,
    nonce_store: &'a dyn NonceStore,
    verifier: &'a dyn SignatureVerifier,
    sessions: &'a SessionTokenCodec,
}

impl<'a> LoginOrchestrator<'a> {
    pub fn new(
        app_name: &str,
        clock: &'a dyn Clock,
        nonce_store: &'a dyn NonceStore,
        verifier: &'a dyn SignatureVerifier,
        sessions: &'a SessionTokenCodec,
    ) -> Self {
        Self {
            message_prefix: format!("Authenticate to {app_name}: "),
            clock,
            nonce_store,
            verifier,
            sessions,
        }
    }

    /// The message a wallet must sign for `nonce`.
    pub fn challenge_message(&self, nonce: &str) -> String {
        format!("{}{nonce}", self.message_prefix)
    }

    /// Pull the nonce out of `Authenticate to <AppName>: <nonce>`.
    pub fn extract_nonce<'m>(&self, message: &'m str) -> Option<&'m str> {
        let nonce = message.strip_prefix(self.message_prefix.as_str())?;
        if nonce.is_empty() || nonce.chars().any(char::is_whitespace) {
            return None;
        }
        Some(nonce)
    }

    pub fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        let mut stage = LoginStage::Start;
        match self.run(request, &mut stage) {
            Ok(outcome) => {
                tracing::info!(
                    wallet_address = %outcome.wallet_address,
                    session_id = %outcome.session.claims.jti,
                    "Wallet signed in"
                );
                Ok(outcome)
            }
            Err(err) => {
                let wallet = request
                    .wallet_address
                    .as_deref()
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                let (stage, last_stage) = (LoginStage::Rejected, stage);
                if let AuthError::Internal(_) = err {
                    tracing::error!(
                        wallet_address = %wallet,
                        stage = ?stage,
                        last_stage = ?last_stage,
                        error = %err,
                        "Login failed"
                    );
                } else {
                    tracing::warn!(
                        wallet_address = %wallet,
                        stage = ?stage,
                        last_stage = ?last_stage,
                        error = %err,
                        "Login rejected"
                    );
                }
                Err(err)
            }
        }
    }

    fn run(&self, request: &LoginRequest, stage: &mut LoginStage) -> Result<LoginOutcome, AuthError> {
        let present = |field: &Option<String>| {
            field
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(ToString::to_string)
        };
        let (Some(wallet_address), Some(signature), Some(message)) = (
            present(&request.wallet_address),
            present(&request.signature),
            present(&request.message),
        ) else {
            return Err(AuthError::MissingFields);
        };
        let wallet = WalletAddress::new(&wallet_address);

        let nonce = self.extract_nonce(&message).ok_or(AuthError::MalformedMessage)?;
        self.validate_nonce(wallet.as_str(), nonce)?;
        *stage = LoginStage::NonceValidated;

        let signed_message = self.challenge_message(nonce);
        if !self
            .verifier
            .verify(wallet.as_str(), &signed_message, signature.trim())
        {
            return Err(AuthError::InvalidSignature);
        }
        *stage = LoginStage::SignatureVerified;

        // Another request may have consumed the challenge since the lookup.
        if !self.nonce_store.consume(wallet.as_str(), nonce) {
            return Err(AuthError::ChallengeNotFound);
        }

        let session = self
            .sessions
            .issue(wallet.as_str(), nonce)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        *stage = LoginStage::SessionIssued;

        Ok(LoginOutcome {
            wallet_address: wallet,
            session,
        })
    }

    /// Format, freshness and store checks. No cryptography.
    fn validate_nonce(&self, wallet: &str, nonce: &str) -> Result<(), AuthError> {
        if !is_well_formed_nonce(nonce) {
            return Err(AuthError::InvalidChallengeFormat);
        }
        let issued_at = embedded_timestamp(nonce).ok_or(AuthError::InvalidChallengeFormat)?;

        let age = self.clock.now().timestamp() - issued_at;
        if age > MAX_CHALLENGE_AGE_SECS {
            return Err(AuthError::ChallengeExpired);
        }
        if age < 0 {
            return Err(AuthError::InvalidTimestamp);
        }

        let challenge = self
            .nonce_store
            .lookup(wallet)
            .filter(|c| c.value == nonce)
            .ok_or(AuthError::ChallengeNotFound)?;

        // The store's timers may lag behind the clock.
        let stored_for = (self.clock.now() - challenge.created_at).num_seconds();
        if stored_for > NONCE_TTL_SECS as i64 {
            return Err(AuthError::ChallengeExpired);
        }
        Ok(())
    }
}
