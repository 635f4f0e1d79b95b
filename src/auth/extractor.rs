// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the signed-in wallet.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(wallet): Auth) -> impl IntoResponse {
//!     // wallet is AuthenticatedWallet
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::authenticate;
use super::{AuthError, AuthenticatedWallet};
use crate::state::AppState;

/// Requires a valid session.
///
/// Uses the wallet attached by `require_session` when present, otherwise
/// verifies the session cookie itself.
pub struct Auth(pub AuthenticatedWallet);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(wallet) = parts.extensions.get::<AuthenticatedWallet>().cloned() {
            return Ok(Auth(wallet));
        }

        let wallet = authenticate(&state.sessions, &parts.headers)?;
        Ok(Auth(wallet))
    }
}

/// Like [`Auth`], but yields `None` instead of rejecting.
pub struct OptionalAuth(pub Option<AuthenticatedWallet>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(wallet)) => Ok(OptionalAuth(Some(wallet))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
