/// Time-boxed memoization of fetched tables.
///
/// An explicit cache component: a map from query key to `{table,
/// expires_at}` with a fixed TTL, injected into the fetch layer. Entries
/// are recomputed synchronously on the next request after expiry; there
/// is no cross-caller deduplication; a race recomputes the same
/// deterministic result, which is redundant but never incorrect.
///
/// # Clock injection
/// The lookup and insert primitives take a `now: DateTime<Utc>` parameter
/// rather than calling `Utc::now()` internally, so expiry is purely
/// deterministic in tests. The `get`/`insert` wrappers use the real clock.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::model::ObservationTable;

struct CacheEntry {
    table: ObservationTable,
    expires_at: DateTime<Utc>,
}

pub struct TtlCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl TtlCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            entries: HashMap::new(),
        }
    }

    /// Number of entries, including any not yet evicted after expiry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key at the given instant. An entry is live while
    /// `now <= expires_at`; strictly past that it is removed and the
    /// lookup misses.
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<ObservationTable> {
        match self.entries.get(key) {
            Some(entry) if now <= entry.expires_at => Some(entry.table.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a table under a key, expiring one TTL after `now`.
    /// Overwrites any previous entry for the key.
    pub fn insert_at(&mut self, key: &str, table: ObservationTable, now: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                table,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Convenience wrapper using the real clock. Use `get_at` in tests.
    pub fn get(&mut self, key: &str) -> Option<ObservationTable> {
        self.get_at(key, Utc::now())
    }

    /// Convenience wrapper using the real clock. Use `insert_at` in tests.
    pub fn insert(&mut self, key: &str, table: ObservationTable) {
        self.insert_at(key, table, Utc::now())
    }
}
