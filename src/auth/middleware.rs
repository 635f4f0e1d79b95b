// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session gate for protected routes.
//!
//! Apply with `route_layer` so unknown paths still fall through to the 404
//! handler:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/v1/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_session));
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::session::{SessionTokenCodec, SESSION_COOKIE_NAME};
use super::{AuthError, AuthenticatedWallet};
use crate::state::AppState;

/// Resolve the session cookie in `headers` to a wallet.
///
/// A missing or empty cookie is `MissingSession`; anything the codec refuses
/// is `InvalidSession`.
pub fn authenticate(
    sessions: &SessionTokenCodec,
    headers: &HeaderMap,
) -> Result<AuthenticatedWallet, AuthError> {
    let jar = CookieJar::from_headers(headers);
    let token = jar
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingSession)?;

    let claims = sessions.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session cookie");
        AuthError::InvalidSession
    })?;

    Ok(AuthenticatedWallet::from_claims(claims))
}

/// Reject requests without a valid session; otherwise attach the wallet to
/// the request extensions and continue.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.sessions, request.headers()) {
        Ok(wallet) => {
            request.extensions_mut().insert(wallet);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                path = %request.uri().path(),
                error_code = e.error_code(),
                "Blocked unauthenticated request"
            );
            e.into_response()
        }
    }
}
