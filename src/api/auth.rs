// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge, login, logout and session check endpoints.

use std::str::FromStr;

use alloy::primitives::Address;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::session::{expired_session_cookie, session_cookie, SESSION_TTL_LABEL};
use crate::auth::{AuthError, OptionalAuth};
use crate::error::ErrorBody;
use crate::models::{
    LoginRequest, LoginResponse, LogoutResponse, NonceQuery, NonceResponse, SessionCheckResponse,
};
use crate::state::AppState;

/// Issue a login challenge for a wallet.
///
/// Any earlier challenge for the same wallet is replaced. Only well-formed
/// addresses get a store entry.
#[utoipa::path(
    get,
    path = "/auth/nonce",
    tag = "Auth",
    params(NonceQuery),
    responses(
        (status = 200, description = "Challenge issued", body = NonceResponse),
        (status = 400, description = "walletAddress missing or not an address", body = ErrorBody)
    )
)]
pub async fn issue_nonce(
    State(state): State<AppState>,
    Query(query): Query<NonceQuery>,
) -> Result<Json<NonceResponse>, AuthError> {
    let wallet_address = query
        .wallet_address
        .filter(|a| !a.trim().is_empty())
        .ok_or(AuthError::MissingWalletAddress)?;
    if Address::from_str(wallet_address.trim()).is_err() {
        return Err(AuthError::InvalidWalletAddress);
    }

    let nonce = state.challenge_issuer().issue(&wallet_address);
    Ok(Json(NonceResponse { nonce }))
}

/// Exchange a signed challenge for a session cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; sets the authToken cookie", body = LoginResponse),
        (status = 400, description = "Missing fields or malformed challenge", body = ErrorBody),
        (status = 401, description = "Challenge expired or unknown, or signature invalid", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unreadable login body");
        AuthError::MissingFields
    })?;

    let outcome = state.login_orchestrator().login(&request)?;

    let jar = jar.add(session_cookie(outcome.session.token));
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            wallet_address: outcome.wallet_address.into(),
            expires_in: SESSION_TTL_LABEL.to_string(),
        }),
    ))
}

/// Clear the session cookie. Succeeds with or without a session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Cookie cleared", body = LogoutResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.add(expired_session_cookie()),
        Json(LogoutResponse { success: true }),
    )
}

/// Report whether the request carries a valid session.
#[utoipa::path(
    get,
    path = "/auth/check",
    tag = "Auth",
    responses(
        (status = 200, description = "Session is valid", body = SessionCheckResponse),
        (status = 401, description = "No valid session", body = SessionCheckResponse)
    )
)]
pub async fn check(OptionalAuth(wallet): OptionalAuth) -> (StatusCode, Json<SessionCheckResponse>) {
    match wallet {
        Some(wallet) => (
            StatusCode::OK,
            Json(SessionCheckResponse::authenticated(wallet.wallet_address)),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionCheckResponse::anonymous()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
            Method, Request, Response, StatusCode,
        },
        Router,
    };
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::router;
    use crate::clock::FakeClock;
    use crate::testing::{
        challenge_message, sign_message, test_state, TEST_KEY_1, TEST_KEY_1_ADDRESS, TEST_KEY_2,
    };

    async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// `name=value` part of the first Set-Cookie header.
    fn cookie_pair(response: &Response<Body>) -> String {
        let header = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        header.split(';').next().unwrap().to_string()
    }

    async fn fetch_nonce(app: &Router, wallet: &str) -> String {
        let response = send(app, get(&format!("/auth/nonce?walletAddress={wallet}"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["nonce"].as_str().unwrap().to_string()
    }

    fn login_body(key: &str, wallet: &str, nonce: &str) -> Value {
        let message = challenge_message(nonce);
        json!({
            "walletAddress": wallet,
            "signature": sign_message(key, &message),
            "message": message,
        })
    }

    fn app() -> (Router, Arc<FakeClock>) {
        let (state, clock) = test_state();
        (router(state), clock)
    }

    #[tokio::test]
    async fn full_session_lifecycle() {
        let (app, _clock) = app();

        let nonce = fetch_nonce(&app, TEST_KEY_1_ADDRESS).await;
        let response = send(
            &app,
            post_json("/auth/login", &login_body(TEST_KEY_1, TEST_KEY_1_ADDRESS, &nonce)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));
        let cookie = cookie_pair(&response);

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["walletAddress"], TEST_KEY_1_ADDRESS.to_lowercase());
        assert_eq!(body["expiresIn"], "24h");

        let response = send(&app, get("/auth/check", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["walletAddress"], TEST_KEY_1_ADDRESS.to_lowercase());

        let response = send(&app, get("/v1/me", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["walletAddress"],
            TEST_KEY_1_ADDRESS.to_lowercase()
        );

        let response = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/auth/logout")
                .header(COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = cookie_pair(&response);
        assert_eq!(cleared, "authToken=");
        assert_eq!(json_body(response).await["success"], true);

        let response = send(&app, get("/auth/check", Some(&cleared))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({ "authenticated": false }));
    }

    #[tokio::test]
    async fn nonce_requires_wallet_address() {
        let (app, _clock) = app();

        for uri in ["/auth/nonce", "/auth/nonce?walletAddress=", "/auth/nonce?walletAddress=%20"] {
            let response = send(&app, get(uri, None)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(json_body(response).await["error_code"], "missing_wallet_address");
        }
    }

    #[tokio::test]
    async fn nonce_rejects_malformed_wallet_address() {
        let (state, _clock) = test_state();
        let app = router(state.clone());
        let oversized = format!("0x{}", "a".repeat(4096));

        for wallet in [
            "not-a-wallet",
            "0x1234",
            "0xzz9Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            oversized.as_str(),
        ] {
            let response = send(&app, get(&format!("/auth/nonce?walletAddress={wallet}"), None)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{wallet}");
            assert_eq!(json_body(response).await["error_code"], "invalid_wallet_address");
            assert!(state.nonce_store.lookup(wallet).is_none());
        }
    }

    #[tokio::test]
    async fn replayed_login_is_rejected() {
        let (app, _clock) = app();
        let nonce = fetch_nonce(&app, TEST_KEY_1_ADDRESS).await;
        let body = login_body(TEST_KEY_1, TEST_KEY_1_ADDRESS, &nonce);

        assert_eq!(send(&app, post_json("/auth/login", &body)).await.status(), StatusCode::OK);

        let response = send(&app, post_json("/auth/login", &body)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "challenge_not_found");
    }

    #[tokio::test]
    async fn stale_challenge_is_expired() {
        let (app, clock) = app();
        let nonce = fetch_nonce(&app, TEST_KEY_1_ADDRESS).await;
        clock.advance(Duration::seconds(301));

        let response = send(
            &app,
            post_json("/auth/login", &login_body(TEST_KEY_1, TEST_KEY_1_ADDRESS, &nonce)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body = json_body(response).await;
        assert_eq!(body["error"], "Challenge expired");
        assert_eq!(body["error_code"], "challenge_expired");
    }

    #[tokio::test]
    async fn signature_from_other_key_is_rejected() {
        let (app, _clock) = app();
        let nonce = fetch_nonce(&app, TEST_KEY_1_ADDRESS).await;

        let response = send(
            &app,
            post_json("/auth/login", &login_body(TEST_KEY_2, TEST_KEY_1_ADDRESS, &nonce)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(json_body(response).await["error_code"], "invalid_signature");
    }

    #[tokio::test]
    async fn missing_fields_and_bad_json_are_bad_requests() {
        let (app, _clock) = app();

        let response = send(
            &app,
            post_json("/auth/login", &json!({ "walletAddress": TEST_KEY_1_ADDRESS })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "missing_fields");

        let response = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/auth/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "missing_fields");
    }

    #[tokio::test]
    async fn malformed_message_is_bad_request() {
        let (app, _clock) = app();
        let nonce = fetch_nonce(&app, TEST_KEY_1_ADDRESS).await;
        let message = format!("Sign in please: {nonce}");

        let response = send(
            &app,
            post_json(
                "/auth/login",
                &json!({
                    "walletAddress": TEST_KEY_1_ADDRESS,
                    "signature": sign_message(TEST_KEY_1, &message),
                    "message": message,
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "malformed_message");
    }

    #[tokio::test]
    async fn logout_without_session_still_succeeds() {
        let (app, _clock) = app();

        let response = send(
            &app,
            Request::builder()
                .method(Method::POST)
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn check_rejects_expired_session() {
        let (app, clock) = app();
        let nonce = fetch_nonce(&app, TEST_KEY_1_ADDRESS).await;
        let response = send(
            &app,
            post_json("/auth/login", &login_body(TEST_KEY_1, TEST_KEY_1_ADDRESS, &nonce)),
        )
        .await;
        let cookie = cookie_pair(&response);

        clock.advance(Duration::hours(24));

        let response = send(&app, get("/auth/check", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["authenticated"], false);
    }
}
