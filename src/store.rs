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

//! Lock store protocol over a generic cache pool.
//!
//! The cache offers no compare-and-swap, so every guarantee here is
//! reconstructed from read-then-write pairs: a window remains between the
//! read and the write in which another holder can slip in, and the
//! backend's persist verdict — not the earlier read — settles who won.
//! Accepting the occasional spurious rejection of a legitimate renewal is
//! the price of never trusting a stale read.

use crate::error::{LockError, LockResult};
use crate::key::LockKey;
use crate::pool::CachePool;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use std::any::type_name;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for TTL-based, non-blocking lock stores.
///
/// ## Purpose
/// Turns acquire/renew/release/check requests on a [`LockKey`] into durable
/// ownership state, with a per-process random token as the proof of
/// ownership.
///
/// ## Behavior
/// - **Acquire**: non-blocking; an occupied key resolves through renewal so
///   a holder's repeated acquires succeed
/// - **Renew**: extends the TTL only while ownership can be confirmed
/// - **Release**: conditional delete, silent in every non-owning case
/// - **No queuing**: between racing callers, at most one observes a
///   successful persist per TTL epoch; the other gets a conflict
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Attempt non-blocking acquisition of the lock named by `key`.
    ///
    /// ## Returns
    /// - `Ok(())`: lock acquired (or re-acquired by its current holder)
    /// - `Err(LockError::Conflict)`: another owner holds the key
    async fn acquire(&self, key: &LockKey) -> LockResult<()>;

    /// Acquire, waiting for the lock to become free.
    ///
    /// Stores without a notification primitive fail immediately with
    /// [`LockError::BlockingUnsupported`] and never touch the cache.
    async fn acquire_blocking(&self, key: &LockKey) -> LockResult<()>;

    /// Extend the TTL of a lock the caller believes it owns.
    ///
    /// Fractional seconds round up to the next whole second.
    ///
    /// ## Returns
    /// - `Ok(())`: the key is owned by the caller with the new TTL
    /// - `Err(LockError::InvalidTtl)`: `ttl` below one second; the cache
    ///   was not touched
    /// - `Err(LockError::Conflict)`: a foreign token was observed, or the
    ///   backend rejected the write
    async fn renew(&self, key: &LockKey, ttl: Duration) -> LockResult<()>;

    /// Release the lock if — and only if — the caller still owns it.
    ///
    /// Infallible by contract: an absent record and a foreign owner are
    /// both silent no-ops, so cleanup paths may call this unconditionally.
    async fn release(&self, key: &LockKey);

    /// Whether the caller currently owns the lock (not merely whether some
    /// lock exists at the key). Pure read.
    async fn is_held(&self, key: &LockKey) -> bool;
}

/// Lock store backed by a shared cache item pool.
///
/// Stateless with respect to individual locks: durable state lives in the
/// pool, the ownership token lives on the [`LockKey`]. One store instance
/// serves any number of keys.
pub struct CacheLockStore {
    pool: Arc<dyn CachePool>,
    initial_ttl: Duration,
}

impl CacheLockStore {
    /// TTL stamped onto a lock when its holder re-acquires it through
    /// [`acquire`](LockStore::acquire).
    pub const DEFAULT_INITIAL_TTL: Duration = Duration::from_secs(300);

    /// Floor for every TTL, construction-time and renewal-time.
    const MIN_TTL: Duration = Duration::from_secs(1);

    /// Create a store with [`DEFAULT_INITIAL_TTL`](Self::DEFAULT_INITIAL_TTL).
    pub fn new(pool: Arc<dyn CachePool>) -> Self {
        Self {
            pool,
            initial_ttl: Self::DEFAULT_INITIAL_TTL,
        }
    }

    /// Create a store with a custom first-acquisition TTL.
    ///
    /// ## Returns
    /// - `Err(LockError::InvalidTtl)`: `initial_ttl` below one second
    pub fn with_initial_ttl(pool: Arc<dyn CachePool>, initial_ttl: Duration) -> LockResult<Self> {
        if initial_ttl < Self::MIN_TTL {
            return Err(LockError::InvalidTtl(initial_ttl));
        }
        Ok(Self { pool, initial_ttl })
    }

    /// Namespace under which this store type stashes tokens on a key.
    ///
    /// Keyed by type, not by instance: every `CacheLockStore` sharing a key
    /// instance shares its token, while unrelated store types get their own
    /// slot.
    fn state_namespace() -> &'static str {
        type_name::<Self>()
    }

    /// Resolve the key's ownership token, generating it on first use.
    ///
    /// 32 random bytes, base64-encoded. Stable for the key's lifetime;
    /// never touches the cache.
    fn token(&self, key: &LockKey) -> String {
        match key.state(Self::state_namespace()) {
            Some(token) => token,
            None => {
                let mut bytes = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut bytes);
                let token = general_purpose::STANDARD.encode(bytes);
                key.set_state(Self::state_namespace(), token.clone());
                token
            }
        }
    }
}

#[async_trait]
impl LockStore for CacheLockStore {
    #[instrument(skip(self, key), fields(key = %key))]
    async fn acquire(&self, key: &LockKey) -> LockResult<()> {
        let mut item = self.pool.item(key.resource()).await;

        if item.is_miss() {
            // First write carries no TTL override; backend defaults apply
            // until the first renewal stamps one.
            item.set_value(self.token(key));
            if item.persist().await {
                debug!("lock acquired");
                return Ok(());
            }
        }

        // A record exists, or our write lost a race. It may still be our
        // own lock; renewing settles it either way.
        debug!("record present or write rejected, renewing");
        self.renew(key, self.initial_ttl).await
    }

    async fn acquire_blocking(&self, _key: &LockKey) -> LockResult<()> {
        Err(LockError::BlockingUnsupported(type_name::<Self>()))
    }

    #[instrument(skip(self, key, ttl), fields(key = %key, ttl_secs = ttl.as_secs()))]
    async fn renew(&self, key: &LockKey, ttl: Duration) -> LockResult<()> {
        if ttl < Self::MIN_TTL {
            return Err(LockError::InvalidTtl(ttl));
        }

        let token = self.token(key);
        let mut item = self.pool.item(key.resource()).await;

        if !item.is_miss() && item.value() != Some(token.as_str()) {
            debug!("renewal rejected: foreign token");
            return Err(LockError::Conflict(key.resource().to_string()));
        }

        item.set_value(token);
        item.set_ttl(ceil_secs(ttl));

        if !item.persist().await {
            // The read said the lock was ours (or free); the write is the
            // authority and says someone slipped in between.
            debug!("renewal rejected: persist refused");
            return Err(LockError::Conflict(key.resource().to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn release(&self, key: &LockKey) {
        let item = self.pool.item(key.resource()).await;

        if item.is_miss() {
            return;
        }

        if item.value() != Some(self.token(key).as_str()) {
            // Not our lock anymore; leave the new owner alone.
            debug!("release skipped: foreign token");
            return;
        }

        self.pool.delete_item(key.resource()).await;
        debug!("lock released");
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn is_held(&self, key: &LockKey) -> bool {
        let item = self.pool.item(key.resource()).await;
        !item.is_miss() && item.value() == Some(self.token(key).as_str())
    }
}

/// Whole seconds, rounding any fractional remainder up.
fn ceil_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
