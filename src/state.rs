// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{
    ChallengeIssuer, Eip191SignatureVerifier, InMemoryNonceStore, LoginOrchestrator, NonceStore,
    SessionTokenCodec, SignatureVerifier,
};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub nonce_store: Arc<dyn NonceStore>,
    pub signature_verifier: Arc<dyn SignatureVerifier>,
    pub sessions: Arc<SessionTokenCodec>,
}

impl AppState {
    /// Wire the default components: wall clock, in-memory nonce store and
    /// EIP-191 verification.
    pub fn new(config: AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            nonce_store: Arc::new(InMemoryNonceStore::new(clock.clone())),
            signature_verifier: Arc::new(Eip191SignatureVerifier),
            sessions: Arc::new(SessionTokenCodec::new(&config.session_secret, clock.clone())),
            config: Arc::new(config),
            clock,
        }
    }

    /// Replace the clock.
    ///
    /// Rebuilds the in-memory nonce store and the token codec around the new
    /// clock, so call this before `with_nonce_store`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.nonce_store = Arc::new(InMemoryNonceStore::new(clock.clone()));
        self.sessions = Arc::new(SessionTokenCodec::new(
            &self.config.session_secret,
            clock.clone(),
        ));
        self.clock = clock;
        self
    }

    pub fn with_nonce_store(mut self, store: Arc<dyn NonceStore>) -> Self {
        self.nonce_store = store;
        self
    }

    pub fn with_signature_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.signature_verifier = verifier;
        self
    }

    pub fn challenge_issuer(&self) -> ChallengeIssuer {
        ChallengeIssuer::new(self.nonce_store.clone(), self.clock.clone())
    }

    pub fn login_orchestrator(&self) -> LoginOrchestrator<'_> {
        LoginOrchestrator::new(
            &self.config.app_name,
            self.clock.as_ref(),
            self.nonce_store.as_ref(),
            self.signature_verifier.as_ref(),
            &self.sessions,
        )
    }
}
