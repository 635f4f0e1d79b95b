// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet sign-in by signed challenge.
//!
//! ## Auth Flow
//!
//! 1. Client asks `GET /auth/nonce?walletAddress=0x...` for a challenge
//! 2. Wallet signs `Authenticate to <AppName>: <nonce>` with `personal_sign`
//! 3. Client posts address, signature and message to `POST /auth/login`
//! 4. Server checks the challenge, recovers the signer and sets the
//!    `authToken` cookie (HS256 JWT, 24 hours)
//! 5. Protected routes read the cookie through [`require_session`] or [`Auth`]
//!
//! ## Security
//!
//! - A challenge is consumed atomically on login and accepted for at most
//!   60 seconds after it was stored
//! - Only syntactically valid addresses are given a challenge
//! - Challenges older than 5 minutes by their embedded timestamp are refused
//! - Signature recovery only runs after all cheap checks pass
//! - The cookie is `HttpOnly`, `Secure` and `SameSite=Strict`

pub mod challenge;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod login;
pub mod middleware;
pub mod nonce_store;
pub mod session;
pub mod signature;

pub use challenge::ChallengeIssuer;
pub use claims::AuthenticatedWallet;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use login::{LoginOrchestrator, LoginOutcome, LoginStage};
pub use middleware::require_session;
pub use nonce_store::{InMemoryNonceStore, NonceStore};
pub use session::{SessionClaims, SessionTokenCodec};
pub use signature::{Eip191SignatureVerifier, SignatureVerifier};
