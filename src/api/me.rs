// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session-protected endpoints.

use axum::Json;

use crate::auth::{Auth, AuthenticatedWallet};
use crate::error::ErrorBody;

/// Get the wallet behind the current session.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Session",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Signed-in wallet", body = AuthenticatedWallet),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
    )
)]
pub async fn get_current_wallet(Auth(wallet): Auth) -> Json<AuthenticatedWallet> {
    Json(wallet)
}
