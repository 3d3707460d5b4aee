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

//! Error types for lock store operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for lock store operations.
pub type LockResult<T> = Result<T, LockError>;

/// Errors surfaced by lock store operations.
///
/// None of these are retried internally; retry and backoff policy belongs
/// to the caller. Note that `release` has no error channel at all — every
/// non-owning branch of it is a silent no-op.
#[derive(Error, Debug)]
pub enum LockError {
    /// TTL below the one-second floor, rejected before any cache access.
    #[error("expected a TTL of at least one second, got {0:?}")]
    InvalidTtl(Duration),

    /// Ownership could not be established or kept: the cache holds a
    /// foreign token, or the backend rejected a persist after the read.
    /// The one error that reflects a genuine concurrency outcome; callers
    /// treat it as "did not acquire" or retry.
    #[error("lock conflict on \"{0}\": held by another owner or lost a write race")]
    Conflict(String),

    /// The store has no blocking primitive; acquisition cannot wait.
    #[error("store \"{0}\" does not support blocking lock acquisition")]
    BlockingUnsupported(&'static str),
}
