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

//! Cache pool abstraction consumed by the lock store.
//!
//! Models the minimal item-oriented contract of a key-value cache: fetch a
//! handle for a key, inspect presence and value, stage a value and TTL, and
//! persist with a boolean verdict. The backend guarantees atomicity for a
//! single read or a single write, never for a read-write pair, so the
//! persist verdict is the one authoritative lost-race signal.
//!
//! Backends keep this seam infallible: a read error surfaces as a miss and
//! a write error as a rejected persist. Callers therefore reason about
//! presence and the persist verdict alone.

use async_trait::async_trait;

/// Handle to the cache record at one key.
///
/// `set_value` and `set_ttl` stage changes locally; nothing reaches the
/// backend until [`persist`](CacheItem::persist).
#[async_trait]
pub trait CacheItem: Send {
    /// True when no live record existed at fetch time.
    fn is_miss(&self) -> bool;

    /// The staged value if one was set, otherwise the fetched value.
    /// `None` on a miss with nothing staged.
    fn value(&self) -> Option<&str>;

    /// Stage a value for the next persist.
    fn set_value(&mut self, value: String);

    /// Stage a TTL, in whole seconds, for the next persist. An item
    /// persisted without a staged TTL falls back to backend defaults.
    fn set_ttl(&mut self, ttl_secs: u64);

    /// Write the staged state. `true` means durably written; `false` means
    /// the backend rejected the write, typically after losing a race.
    async fn persist(&mut self) -> bool;
}

/// Shared cache pool. Pools outlive every store that borrows them and are
/// shared freely across stores and tasks; per-key write semantics are the
/// backend's responsibility.
#[async_trait]
pub trait CachePool: Send + Sync {
    /// Fetch a handle for `key`, hit or miss.
    async fn item(&self, key: &str) -> Box<dyn CacheItem>;

    /// Drop the record at `key`, if any.
    async fn delete_item(&self, key: &str);
}
