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

//! # CacheLock
//!
//! ## Purpose
//! Non-blocking, TTL-based mutual exclusion on top of a shared cache item
//! pool. The cache offers no compare-and-swap and no notifications, so
//! ownership is reconstructed from read/write pairs: a per-process random
//! token proves ownership, the backend's persist verdict settles races, and
//! the TTL bounds how long a crashed holder can wedge a key.
//!
//! ## Architecture Context
//! Intended for schedulers, cron-style workers, and other components that
//! need best-effort mutual exclusion over an existing cache deployment.
//! The store decides a single attempt; retry and backoff policy belongs to
//! a higher-level caller.
//!
//! ## Design Decisions
//! - **Optimistic read-then-write**: the persist verdict, never the earlier
//!   read, is the authority on whether a write won
//! - **Token per (key, store type)**: 32 random bytes stashed on the key,
//!   so unrelated stores sharing one key instance cannot collide
//! - **Silent release**: releasing a lock you no longer own is a no-op,
//!   making cleanup paths unconditionally safe
//! - **Backend-agnostic**: any key-value cache fits behind [`CachePool`];
//!   the store itself never blocks and never waits
//!
//! ## Backend Support
//!
//! - **Memory**: HashMap-based, lazy expiration (feature `memory-pool`, on
//!   by default; for testing and single-process use)
//!
//! ## Examples
//!
//! ```rust,no_run
//! use cachelock::{CacheLockStore, LockKey, LockStore, MemoryCachePool};
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = Arc::new(MemoryCachePool::new());
//! let store = CacheLockStore::new(pool);
//!
//! let key = LockKey::new("reports:nightly");
//!
//! // Acquire, keep alive, check, and hand back.
//! store.acquire(&key).await?;
//! store.renew(&key, Duration::from_secs(30)).await?;
//! assert!(store.is_held(&key).await);
//! store.release(&key).await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod key;
pub mod pool;
pub mod store;

#[cfg(feature = "memory-pool")]
pub mod memory;

pub use error::{LockError, LockResult};
pub use key::LockKey;
pub use pool::{CacheItem, CachePool};
pub use store::{CacheLockStore, LockStore};

#[cfg(feature = "memory-pool")]
pub use memory::MemoryCachePool;
