// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge (nonce) generation and format helpers.
//!
//! A nonce is a random alphanumeric body followed by its creation time as
//! eight lowercase hex digits of Unix seconds, e.g.
//! `Zk3pQ0aLr7WbN2cVx9TfHs4u` + `69a1c2f0`. Carrying the timestamp inside the
//! value lets login reject stale challenges with a string check alone.

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;

use super::nonce_store::NonceStore;
use crate::clock::Clock;

/// Length of the random part of a nonce.
pub const NONCE_RANDOM_LEN: usize = 24;

/// Length of the hex timestamp suffix.
pub const NONCE_TIMESTAMP_LEN: usize = 8;

static NONCE_FORMAT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z0-9]{20,40}$").unwrap());

/// Build a nonce stamped with `now`.
pub fn generate_nonce(now: DateTime<Utc>) -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_RANDOM_LEN)
        .map(char::from)
        .collect();

    // Unix seconds fit in 8 hex digits until 2106.
    let timestamp = u32::try_from(now.timestamp()).unwrap_or(u32::MAX);
    format!("{random}{timestamp:08x}")
}

/// Syntactic check: 20-40 ASCII alphanumerics.
pub fn is_well_formed_nonce(nonce: &str) -> bool {
    NONCE_FORMAT_REGEX.is_match(nonce)
}

/// Decode the Unix timestamp carried in the last eight characters.
///
/// Returns `None` unless the suffix is exactly eight lowercase hex digits.
pub fn embedded_timestamp(nonce: &str) -> Option<i64> {
    let split = nonce.len().checked_sub(NONCE_TIMESTAMP_LEN)?;
    let suffix = nonce.get(split..)?;
    if !suffix
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    u32::from_str_radix(suffix, 16).ok().map(i64::from)
}

/// Creates challenges and registers them with the nonce store.
#[derive(Clone)]
pub struct ChallengeIssuer {
    store: Arc<dyn NonceStore>,
    clock: Arc<dyn Clock>,
}

impl ChallengeIssuer {
    pub fn new(store: Arc<dyn NonceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Issue a new challenge for `owner`, replacing any outstanding one.
    pub fn issue(&self, owner: &str) -> String {
        let nonce = generate_nonce(self.clock.now());
        self.store.store(owner, &nonce);

        tracing::debug!(wallet_address = %owner.to_lowercase(), "Issued login challenge");
        nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::nonce_store::InMemoryNonceStore;
    use crate::clock::FakeClock;
    use chrono::TimeZone;

    #[test]
    fn generated_nonce_has_expected_shape() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let nonce = generate_nonce(now);

        assert_eq!(nonce.len(), NONCE_RANDOM_LEN + NONCE_TIMESTAMP_LEN);
        assert!(is_well_formed_nonce(&nonce));
        assert_eq!(embedded_timestamp(&nonce), Some(now.timestamp()));
        assert_eq!(&nonce[NONCE_RANDOM_LEN..], format!("{:08x}", now.timestamp()));
    }

    #[test]
    fn nonces_are_unique() {
        let now = Utc::now();
        assert_ne!(generate_nonce(now), generate_nonce(now));
    }

    #[test]
    fn format_check_enforces_length_and_charset() {
        assert!(is_well_formed_nonce(&"a".repeat(20)));
        assert!(is_well_formed_nonce(&"Z9".repeat(20)));
        assert!(!is_well_formed_nonce(&"a".repeat(19)));
        assert!(!is_well_formed_nonce(&"a".repeat(41)));
        assert!(!is_well_formed_nonce("abcdefghij-klmnopqrstuv"));
        assert!(!is_well_formed_nonce("abcdefghij klmnopqrstuv"));
        assert!(!is_well_formed_nonce(""));
    }

    #[test]
    fn embedded_timestamp_requires_lowercase_hex() {
        assert_eq!(embedded_timestamp("abcdefghijklmnop0000000a"), Some(10));
        assert_eq!(embedded_timestamp("abcdefghijklmnop0000000A"), None);
        assert_eq!(embedded_timestamp("abcdefghijklmnop0000000z"), None);
        assert_eq!(embedded_timestamp("short"), None);
    }

    #[tokio::test]
    async fn issue_registers_nonce_for_owner() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FakeClock::new(now));
        let store = Arc::new(InMemoryNonceStore::new(clock.clone()));
        let issuer = ChallengeIssuer::new(store.clone(), clock);

        let nonce = issuer.issue("0xAAA1");
        let stored = store.lookup("0xaaa1").unwrap();
        assert_eq!(stored.value, nonce);
        assert_eq!(stored.created_at, now);
        assert_eq!(embedded_timestamp(&nonce), Some(now.timestamp()));

        let newer = issuer.issue("0xaaa1");
        assert_ne!(newer, nonce);
        assert_eq!(store.lookup("0xAAA1").unwrap().value, newer);
    }
}
