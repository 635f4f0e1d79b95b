// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Auth Server - challenge-response sign-in for Ethereum wallets
//!
//! A wallet proves control of its address by signing a short-lived challenge
//! with `personal_sign`; the server answers with an HttpOnly session cookie
//! that gates the protected API.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Challenges, signature recovery, session tokens and the session gate
//! - `clock` - Injectable time source
//! - `config` - Environment-driven configuration
//! - `error` - JSON error envelope

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod state;

#[cfg(test)]
mod testing;
