// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::error::ApiError;

/// Every way a challenge request, login attempt or session check can fail.
///
/// Client input problems map to 400, authentication failures to 401 and
/// anything unexpected to 500 with a generic body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("walletAddress query parameter is required")]
    MissingWalletAddress,

    #[error("walletAddress must be a 20-byte hex address")]
    InvalidWalletAddress,

    #[error("walletAddress, signature and message are required")]
    MissingFields,

    #[error("Message does not match the expected authentication template")]
    MalformedMessage,

    #[error("Invalid challenge format")]
    InvalidChallengeFormat,

    #[error("Challenge expired")]
    ChallengeExpired,

    #[error("Invalid challenge timestamp")]
    InvalidTimestamp,

    #[error("Challenge not found or already used")]
    ChallengeNotFound,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Authentication required")]
    MissingSession,

    #[error("Session expired or invalid, please sign in again")]
    InvalidSession,

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingWalletAddress => "missing_wallet_address",
            AuthError::InvalidWalletAddress => "invalid_wallet_address",
            AuthError::MissingFields => "missing_fields",
            AuthError::MalformedMessage => "malformed_message",
            AuthError::InvalidChallengeFormat => "invalid_challenge_format",
            AuthError::ChallengeExpired => "challenge_expired",
            AuthError::InvalidTimestamp => "invalid_timestamp",
            AuthError::ChallengeNotFound => "challenge_not_found",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::MissingSession => "missing_session",
            AuthError::InvalidSession => "invalid_session",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingWalletAddress
            | AuthError::InvalidWalletAddress
            | AuthError::MissingFields
            | AuthError::MalformedMessage
            | AuthError::InvalidChallengeFormat => StatusCode::BAD_REQUEST,
            AuthError::ChallengeExpired
            | AuthError::InvalidTimestamp
            | AuthError::ChallengeNotFound
            | AuthError::InvalidSignature
            | AuthError::MissingSession
            | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(detail) => {
                tracing::error!(error = %detail, "Authentication failed with an internal error");
                ApiError::internal()
            }
            other => ApiError::new(other.status_code(), other.error_code(), other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
