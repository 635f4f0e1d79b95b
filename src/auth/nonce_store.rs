// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outstanding login challenges, one per wallet.
//!
//! Entries remove themselves after [`NONCE_EVICTION_DELAY`]. The eviction task
//! only deletes the entry it was scheduled for: if the owner requested a newer
//! challenge in the meantime, the stale timer finds a different value and
//! leaves it alone. [`NonceStore::consume`] applies the same rule to logins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::models::WalletAddress;

/// Lifetime of a stored challenge in seconds.
pub const NONCE_TTL_SECS: u64 = 60;

/// Time after which a stored challenge is dropped.
pub const NONCE_EVICTION_DELAY: Duration = Duration::from_secs(NONCE_TTL_SECS);

/// A challenge waiting to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Lower-cased wallet address.
    pub owner: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

/// Storage for outstanding challenges.
///
/// Owners are normalized to lower case by implementations. None of the
/// operations fail: absence is a normal answer.
pub trait NonceStore: Send + Sync {
    /// Register `nonce` for `owner`, replacing any previous challenge.
    fn store(&self, owner: &str, nonce: &str);

    fn lookup(&self, owner: &str) -> Option<Challenge>;

    fn remove(&self, owner: &str);

    /// Remove the challenge for `owner` if it is still `nonce`.
    ///
    /// Returns `true` for exactly one caller per stored challenge.
    fn consume(&self, owner: &str, nonce: &str) -> bool;
}

/// Process-local store backed by a mutex-guarded map.
///
/// Suitable for a single server instance. Expiry uses one tokio timer per
/// stored challenge.
#[derive(Clone)]
pub struct InMemoryNonceStore {
    entries: Arc<Mutex<HashMap<String, Challenge>>>,
    clock: Arc<dyn Clock>,
    eviction_delay: Duration,
}

impl InMemoryNonceStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            eviction_delay: NONCE_EVICTION_DELAY,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn schedule_eviction(&self, key: String, nonce: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                wallet_address = %key,
                "No async runtime available, challenge will not auto-expire"
            );
            return;
        };

        let entries = Arc::clone(&self.entries);
        let delay = self.eviction_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if remove_if_matches(&entries, &key, &nonce) {
                tracing::debug!(wallet_address = %key, "Challenge expired and was evicted");
            }
        });
    }
}

/// Remove `key` only while it still maps to `nonce`, under a single lock.
fn remove_if_matches(entries: &Mutex<HashMap<String, Challenge>>, key: &str, nonce: &str) -> bool {
    let Ok(mut map) = entries.lock() else {
        return false;
    };
    if map.get(key).is_some_and(|c| c.value == nonce) {
        map.remove(key);
        true
    } else {
        false
    }
}

impl NonceStore for InMemoryNonceStore {
    fn store(&self, owner: &str, nonce: &str) {
        let key = WalletAddress::new(owner).to_string();
        let challenge = Challenge {
            owner: key.clone(),
            value: nonce.to_string(),
            created_at: self.clock.now(),
        };

        if let Ok(mut map) = self.entries.lock() {
            map.insert(key.clone(), challenge);
        }

        self.schedule_eviction(key, nonce.to_string());
    }

    fn lookup(&self, owner: &str) -> Option<Challenge> {
        let key = WalletAddress::new(owner);
        let map = self.entries.lock().ok()?;
        map.get(key.as_str()).cloned()
    }

    fn remove(&self, owner: &str) {
        let key = WalletAddress::new(owner);
        if let Ok(mut map) = self.entries.lock() {
            map.remove(key.as_str());
        }
    }

    fn consume(&self, owner: &str, nonce: &str) -> bool {
        let key = WalletAddress::new(owner);
        remove_if_matches(&self.entries, key.as_str(), nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;

    fn store() -> InMemoryNonceStore {
        InMemoryNonceStore::new(Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn store_and_lookup_are_case_insensitive() {
        let store = store();
        store.store("0xABCD", "nonce-1");

        let challenge = store.lookup("0xabcd").unwrap();
        assert_eq!(challenge.owner, "0xabcd");
        assert_eq!(challenge.value, "nonce-1");
        assert!(store.lookup("0xAbCd").is_some());
    }

    #[tokio::test]
    async fn newer_challenge_replaces_older() {
        let store = store();
        store.store("0xabcd", "first");
        store.store("0xABCD", "second");

        assert_eq!(store.lookup("0xabcd").unwrap().value, "second");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn remove_deletes_entry() {
        let store = store();
        store.store("0xabcd", "nonce-1");
        store.remove("0xABCD");
        assert!(store.lookup("0xabcd").is_none());

        // Removing an absent owner is fine.
        store.remove("0xdead");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn consume_succeeds_once() {
        let store = store();
        store.store("0xabcd", "nonce-1");

        assert!(store.consume("0xABCD", "nonce-1"));
        assert!(!store.consume("0xabcd", "nonce-1"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn consume_with_other_value_keeps_entry() {
        let store = store();
        store.store("0xabcd", "second");

        assert!(!store.consume("0xabcd", "first"));
        assert_eq!(store.lookup("0xabcd").unwrap().value, "second");
        assert!(!store.consume("0xdead", "second"));
    }

    #[test]
    fn concurrent_consumers_have_one_winner() {
        let store = store();
        store.store("0xabcd", "nonce-1");

        let winners: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| store.consume("0xabcd", "nonce-1")))
                .collect();
            handles
                .into_iter()
                .map(|h| usize::from(h.join().unwrap()))
                .sum()
        });
        assert_eq!(winners, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn challenge_is_evicted_after_delay() {
        let store = store();
        store.store("0xabcd", "nonce-1");

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(store.lookup("0xabcd").is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.lookup("0xabcd").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_remove_newer_challenge() {
        let store = store();
        store.store("0xabcd", "first");

        tokio::time::sleep(Duration::from_secs(30)).await;
        store.store("0xabcd", "second");

        // The first timer fires here and must leave "second" alone.
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(store.lookup("0xabcd").unwrap().value, "second");

        // The second timer fires here.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(store.lookup("0xabcd").is_none());
    }

    #[test]
    fn works_without_runtime() {
        let store = store();
        store.store("0xabcd", "nonce-1");
        assert_eq!(store.lookup("0xabcd").unwrap().value, "nonce-1");
    }
}
