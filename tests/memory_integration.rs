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

//! Memory pool integration tests.
//!
//! These tests verify:
//! - Lock acquisition, renewal, and release through the public API
//! - Ownership handoff between competing workers
//! - TTL expiration freeing a key
//! - Single-winner behavior under concurrent acquisition
//! - Silent release semantics after losing ownership

#[cfg(feature = "memory-pool")]
mod tests {
    use cachelock::{CacheLockStore, LockError, LockKey, LockStore, MemoryCachePool};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn create_store(pool: &Arc<MemoryCachePool>) -> CacheLockStore {
        CacheLockStore::new(pool.clone())
    }

    #[tokio::test]
    async fn lock_handoff_between_workers() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);

        // Worker one takes "foo".
        let first = LockKey::new("foo");
        store.acquire(&first).await.unwrap();
        assert!(store.is_held(&first).await);

        // Worker two races for the same resource and loses.
        let second = LockKey::new("foo");
        let result = store.acquire(&second).await;
        assert!(matches!(result, Err(LockError::Conflict(_))));
        assert!(store.is_held(&first).await);
        assert!(!store.is_held(&second).await);

        // Worker one hands the resource back; worker two now succeeds.
        store.release(&first).await;
        assert!(!store.is_held(&first).await);

        store.acquire(&second).await.unwrap();
        assert!(store.is_held(&second).await);
        assert!(!store.is_held(&first).await);
    }

    #[tokio::test]
    async fn reacquire_by_the_holder_renews() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);
        let key = LockKey::new("job");

        store.acquire(&key).await.unwrap();
        // Same key, same token: the occupied record resolves as a renewal.
        store.acquire(&key).await.unwrap();
        assert!(store.is_held(&key).await);
    }

    #[tokio::test]
    async fn renew_on_absent_key_takes_the_lock() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);
        let key = LockKey::new("job");

        store.renew(&key, Duration::from_secs(30)).await.unwrap();
        assert!(store.is_held(&key).await);
    }

    #[tokio::test]
    async fn renew_against_a_foreign_owner_fails() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);

        let owner = LockKey::new("job");
        store.acquire(&owner).await.unwrap();

        let intruder = LockKey::new("job");
        let result = store.renew(&intruder, Duration::from_secs(30)).await;
        assert!(matches!(result, Err(LockError::Conflict(_))));

        // The owner's record is untouched.
        assert!(store.is_held(&owner).await);
    }

    #[tokio::test]
    async fn expired_lock_is_free_for_the_taking() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);

        let first = LockKey::new("lease");
        store.acquire(&first).await.unwrap();
        store.renew(&first, Duration::from_secs(1)).await.unwrap();

        // Let the lease lapse.
        sleep(Duration::from_millis(1500)).await;
        assert!(!store.is_held(&first).await);

        let second = LockKey::new("lease");
        store.acquire(&second).await.unwrap();
        assert!(store.is_held(&second).await);
    }

    #[tokio::test]
    async fn renew_fails_after_losing_the_lock_to_expiry() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);

        let first = LockKey::new("lease");
        store.acquire(&first).await.unwrap();
        store.renew(&first, Duration::from_secs(1)).await.unwrap();

        sleep(Duration::from_millis(1500)).await;

        let second = LockKey::new("lease");
        store.acquire(&second).await.unwrap();

        // The original holder comes back too late.
        let result = store.renew(&first, Duration::from_secs(10)).await;
        assert!(matches!(result, Err(LockError::Conflict(_))));
        assert!(store.is_held(&second).await);
    }

    #[tokio::test]
    async fn release_after_losing_the_lock_leaves_the_new_owner_alone() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);

        let first = LockKey::new("lease");
        store.acquire(&first).await.unwrap();
        store.renew(&first, Duration::from_secs(1)).await.unwrap();

        sleep(Duration::from_millis(1500)).await;

        let second = LockKey::new("lease");
        store.acquire(&second).await.unwrap();

        // Late cleanup by the evicted holder must not disturb anything.
        store.release(&first).await;
        assert!(store.is_held(&second).await);
    }

    #[tokio::test]
    async fn release_of_an_absent_key_is_silent() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);
        let key = LockKey::new("never-acquired");

        store.release(&key).await;
        assert!(!store.is_held(&key).await);
    }

    #[tokio::test]
    async fn concurrent_acquirers_have_a_single_winner() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = Arc::new(create_store(&pool));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let key = LockKey::new("contended");
                store.acquire(&key).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn custom_initial_ttl_applies_on_reacquire() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = CacheLockStore::with_initial_ttl(pool.clone(), Duration::from_secs(1)).unwrap();
        let key = LockKey::new("short-lease");

        store.acquire(&key).await.unwrap();
        // The occupied-key path renews with the store's initial TTL.
        store.acquire(&key).await.unwrap();

        sleep(Duration::from_millis(1500)).await;
        assert!(!store.is_held(&key).await);
    }

    #[tokio::test]
    async fn sub_second_initial_ttl_is_rejected() {
        let pool = Arc::new(MemoryCachePool::new());
        let result = CacheLockStore::with_initial_ttl(pool.clone(), Duration::from_millis(500));
        assert!(matches!(result, Err(LockError::InvalidTtl(_))));
    }

    #[tokio::test]
    async fn blocking_acquisition_is_unsupported() {
        let pool = Arc::new(MemoryCachePool::new());
        let store = create_store(&pool);
        let key = LockKey::new("foo");

        let result = store.acquire_blocking(&key).await;
        assert!(matches!(result, Err(LockError::BlockingUnsupported(_))));
    }
}
