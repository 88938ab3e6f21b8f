// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Stacker Data
//!
//! The in-memory state of the stacking cache: stack records, the per-kind
//! live caches with their chunk index, the overflow caches holding minimal
//! state for unloaded regions, and the [`StackStore`] owning all of them.
//!
//! Each kind gets its own locks. The four kinds are never mutated together
//! atomically, so a global lock would only add contention.

#![warn(missing_docs)]

mod chunk_index;
mod live;
mod overflow;
mod record;
mod store;

pub use chunk_index::ChunkIndex;
pub use live::LiveCache;
pub use overflow::{OverflowCache, OverflowEntry};
pub use record::{StackRecord, StackVariant};
pub use store::{KindCache, KindStats, StackStats, StackStore};

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panic while holding a cache lock leaves plain data behind; keep serving it.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
