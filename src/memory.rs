// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of CacheLock.
//
// CacheLock is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// CacheLock is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with CacheLock. If not, see <https://www.gnu.org/licenses/>.

//! In-memory cache pool implementation (for testing).

use crate::pool::{CacheItem, CachePool};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory [`CachePool`] (for testing and single-process use).
///
/// ## Limitations
/// - Not persistent (records lost on restart)
/// - Not distributed (single process only)
/// - No TTL cleanup (expired records linger until accessed, and read as
///   misses once expired)
/// - A record persisted without a staged TTL never expires on its own; the
///   lock protocol stamps a TTL at the first renewal
///
/// ## Persist semantics
/// `persist` is a conditional write: it compares the current record against
/// the value observed when the item was fetched and refuses the write if
/// anything changed in between. That makes the `false` verdict a real
/// lost-race signal, the same thing a networked backend's conditional
/// write reports.
#[derive(Clone, Default)]
pub struct MemoryCachePool {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCachePool {
    /// Create a new empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    async fn live_value(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.live_at(now))
            .map(|entry| entry.value.clone())
    }
}

#[async_trait]
impl CachePool for MemoryCachePool {
    async fn item(&self, key: &str) -> Box<dyn CacheItem> {
        let snapshot = self.live_value(key, Utc::now()).await;
        Box::new(MemoryCacheItem {
            entries: self.entries.clone(),
            key: key.to_string(),
            snapshot,
            staged_value: None,
            staged_ttl_secs: None,
        })
    }

    async fn delete_item(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Item handle over one record of a [`MemoryCachePool`].
struct MemoryCacheItem {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    key: String,
    /// Live value observed when the handle was fetched.
    snapshot: Option<String>,
    staged_value: Option<String>,
    staged_ttl_secs: Option<u64>,
}

#[async_trait]
impl CacheItem for MemoryCacheItem {
    fn is_miss(&self) -> bool {
        self.snapshot.is_none()
    }

    fn value(&self) -> Option<&str> {
        self.staged_value.as_deref().or(self.snapshot.as_deref())
    }

    fn set_value(&mut self, value: String) {
        self.staged_value = Some(value);
    }

    fn set_ttl(&mut self, ttl_secs: u64) {
        self.staged_ttl_secs = Some(ttl_secs);
    }

    async fn persist(&mut self) -> bool {
        let staged = match self.staged_value.clone() {
            Some(value) => value,
            // Nothing staged, nothing to write.
            None => return false,
        };

        let now = Utc::now();
        let mut entries = self.entries.write().await;

        // Conditional write: refuse if the record changed after our fetch.
        let current = entries
            .get(&self.key)
            .filter(|entry| entry.live_at(now))
            .map(|entry| entry.value.clone());
        if current != self.snapshot {
            return false;
        }

        let expires_at = self
            .staged_ttl_secs
            .map(|secs| now + ChronoDuration::seconds(secs as i64));
        entries.insert(
            self.key.clone(),
            Entry {
                value: staged.clone(),
                expires_at,
            },
        );

        // Later persists on this handle compare against what we wrote.
        self.snapshot = Some(staged);
        true
    }
}
