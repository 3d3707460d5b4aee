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

//! Lock identity: a resource name plus per-process ephemeral state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Names a lockable resource and carries this process's ownership tokens.
///
/// The resource name doubles as the cache key (exposed through
/// [`fmt::Display`] and [`resource`](LockKey::resource)). The ephemeral
/// state map holds one opaque value per owner namespace, so unrelated
/// stores sharing a key instance stash their tokens without collision.
///
/// Instances are deliberately not `Clone`: a key's token proves ownership
/// for exactly one worker, so each worker creates its own.
pub struct LockKey {
    resource: String,
    state: Mutex<HashMap<String, String>>,
}

impl LockKey {
    /// Create a key for the named resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            state: Mutex::new(HashMap::new()),
        }
    }

    /// The stable resource name used as the cache key.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Whether any state is stashed under `namespace`.
    pub fn has_state(&self, namespace: &str) -> bool {
        self.state.lock().unwrap().contains_key(namespace)
    }

    /// The state stashed under `namespace`, if any.
    pub fn state(&self, namespace: &str) -> Option<String> {
        self.state.lock().unwrap().get(namespace).cloned()
    }

    /// Stash `value` under `namespace`, replacing any previous value.
    pub fn set_state(&self, namespace: &str, value: String) {
        self.state
            .lock()
            .unwrap()
            .insert(namespace.to_string(), value);
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)
    }
}

impl fmt::Debug for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockKey")
            .field("resource", &self.resource)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_resource_name() {
        let key = LockKey::new("jobs:nightly-report");
        assert_eq!(key.to_string(), "jobs:nightly-report");
        assert_eq!(key.resource(), "jobs:nightly-report");
    }

    #[test]
    fn state_is_namespaced() {
        let key = LockKey::new("foo");
        assert!(!key.has_state("store-a"));

        key.set_state("store-a", "token-a".to_string());
        key.set_state("store-b", "token-b".to_string());

        assert!(key.has_state("store-a"));
        assert_eq!(key.state("store-a").as_deref(), Some("token-a"));
        assert_eq!(key.state("store-b").as_deref(), Some("token-b"));
        assert_eq!(key.state("store-c"), None);
    }

    #[test]
    fn set_state_replaces_previous_value() {
        let key = LockKey::new("foo");
        key.set_state("ns", "first".to_string());
        key.set_state("ns", "second".to_string());
        assert_eq!(key.state("ns").as_deref(), Some("second"));
    }
}
