// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.
//!
//! The keys are the well-known Hardhat/Anvil development accounts; they must
//! never hold real funds.

use std::str::FromStr;
use std::sync::Arc;

use alloy::signers::{local::PrivateKeySigner, SignerSync};

use crate::clock::FakeClock;
use crate::config::AppConfig;
use crate::state::AppState;

pub const TEST_KEY_1: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_KEY_1_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const TEST_KEY_2: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const TEST_KEY_2_ADDRESS: &str = "0x70997970C51812dc3a010C7d01b50e0d17dc79C8";

/// `personal_sign` `message` with `private_key`, hex-encoded with `0x`.
pub fn sign_message(private_key: &str, message: &str) -> String {
    let signer = PrivateKeySigner::from_str(private_key).expect("valid test key");
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .expect("signing succeeds");
    alloy::hex::encode_prefixed(signature.as_bytes())
}

/// Challenge message in the format the server expects.
pub fn challenge_message(nonce: &str) -> String {
    format!("Authenticate to {}: {nonce}", crate::config::DEFAULT_APP_NAME)
}

/// Application state driven by a fake clock.
pub fn test_state() -> (AppState, Arc<FakeClock>) {
    let clock = Arc::new(FakeClock::starting_now());
    let state = AppState::new(AppConfig::for_tests()).with_clock(clock.clone());
    (state, clock)
}
