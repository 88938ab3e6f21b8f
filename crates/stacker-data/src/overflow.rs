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

//! Minimal state for stacked objects whose region is not loaded.

use crate::lock;
use serde::{Deserialize, Serialize};
use stacker_core::{ChunkPos, ContainerPayload, PersistedRow, SpawnCause, StackKey};
use std::collections::HashMap;
use std::sync::Mutex;

/// The persisted state of an evicted stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowEntry {
    /// The stack amount.
    pub amount: u32,
    /// The spawn cause, for creatures.
    pub cause: Option<SpawnCause>,
    /// The held item, for containers.
    pub payload: Option<ContainerPayload>,
    /// The last region a mobile object was seen in. Block keys carry their
    /// own region and leave this empty, as do rows read back from the store.
    pub chunk: Option<ChunkPos>,
}

impl OverflowEntry {
    /// Creates an entry with only an amount.
    pub fn new(amount: u32) -> Self {
        Self {
            amount,
            cause: None,
            payload: None,
            chunk: None,
        }
    }

    /// Sets the spawn cause.
    pub fn with_cause(mut self, cause: SpawnCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Sets the container payload.
    pub fn with_payload(mut self, payload: ContainerPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Sets the last known region.
    pub fn in_chunk(mut self, chunk: ChunkPos) -> Self {
        self.chunk = Some(chunk);
        self
    }

    /// Rebuilds an entry from a durable row.
    pub fn from_row(row: &PersistedRow) -> Self {
        Self {
            amount: row.amount,
            cause: row.cause,
            payload: row.payload.clone(),
            chunk: None,
        }
    }

    /// Converts the entry into a durable row for `key`.
    pub fn into_row(self, key: StackKey) -> PersistedRow {
        PersistedRow {
            key,
            amount: self.amount,
            cause: self.cause,
            payload: self.payload,
        }
    }

    /// Returns `true` if the entry's key lies in `chunk`.
    ///
    /// Block keys are tested by coordinate; entity keys by their last known
    /// region, and never match when that is unknown.
    pub fn resolves_into(&self, key: &StackKey, chunk: &ChunkPos) -> bool {
        match key {
            StackKey::Block(pos) => pos.chunk() == *chunk,
            StackKey::Entity(_) => self.chunk.as_ref() == Some(chunk),
        }
    }
}

/// One kind's overflow mapping.
///
/// Every removal goes through a single lock acquisition, so when two paths
/// race for the same entry exactly one of them gets it.
#[derive(Debug, Default)]
pub struct OverflowCache {
    entries: Mutex<HashMap<StackKey, OverflowEntry>>,
}

impl OverflowCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, returning the previous one.
    pub fn insert(&self, key: StackKey, entry: OverflowEntry) -> Option<OverflowEntry> {
        lock(&self.entries).insert(key, entry)
    }

    /// Removes and returns the entry for `key`.
    pub fn take(&self, key: &StackKey) -> Option<OverflowEntry> {
        lock(&self.entries).remove(key)
    }

    /// Returns a copy of the entry for `key` without removing it.
    pub fn peek(&self, key: &StackKey) -> Option<OverflowEntry> {
        lock(&self.entries).get(key).cloned()
    }

    /// Returns `true` if an entry exists for `key`.
    pub fn contains(&self, key: &StackKey) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// Removes and returns every entry lying in `chunk`.
    pub fn take_chunk(&self, chunk: &ChunkPos) -> Vec<(StackKey, OverflowEntry)> {
        self.drain_matching(|key, entry| entry.resolves_into(key, chunk))
    }

    /// Removes and returns every entry for which `matches` returns `true`.
    pub fn drain_matching(
        &self,
        mut matches: impl FnMut(&StackKey, &OverflowEntry) -> bool,
    ) -> Vec<(StackKey, OverflowEntry)> {
        let mut entries = lock(&self.entries);
        let keys: Vec<StackKey> = entries
            .iter()
            .filter(|(key, entry)| matches(key, entry))
            .map(|(key, _)| key.clone())
            .collect();
        keys.into_iter()
            .filter_map(|key| entries.remove(&key).map(|entry| (key, entry)))
            .collect()
    }

    /// Keeps only the entries for which `keep` returns `true`.
    /// Returns the number of entries removed.
    pub fn retain(&self, mut keep: impl FnMut(&StackKey, &OverflowEntry) -> bool) -> usize {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|key, entry| keep(key, entry));
        before - entries.len()
    }

    /// A copy of every entry.
    pub fn snapshot(&self) -> Vec<(StackKey, OverflowEntry)> {
        lock(&self.entries)
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns `true` if the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacker_core::BlockPos;
    use uuid::Uuid;

    #[test]
    fn test_take_removes_on_first_touch() {
        let cache = OverflowCache::new();
        let key = StackKey::Entity(Uuid::new_v4());
        cache.insert(key.clone(), OverflowEntry::new(4));

        assert_eq!(cache.peek(&key).map(|e| e.amount), Some(4));
        assert_eq!(cache.take(&key).map(|e| e.amount), Some(4));
        assert!(cache.take(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_take_chunk_is_scoped_by_coordinate() {
        let cache = OverflowCache::new();
        let here = ChunkPos::new("w", 0, 0);
        let there = ChunkPos::new("w", 1, 0);

        let block_here = StackKey::Block(BlockPos::new("w", 3, 64, 3));
        let block_there = StackKey::Block(BlockPos::new("w", 20, 64, 3));
        let mob_here = StackKey::Entity(Uuid::new_v4());
        let mob_unknown = StackKey::Entity(Uuid::new_v4());

        cache.insert(block_here.clone(), OverflowEntry::new(2));
        cache.insert(block_there.clone(), OverflowEntry::new(2));
        cache.insert(mob_here.clone(), OverflowEntry::new(2).in_chunk(here.clone()));
        cache.insert(mob_unknown.clone(), OverflowEntry::new(2));

        let mut taken: Vec<StackKey> = cache
            .take_chunk(&here)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        taken.sort();

        let mut expected = vec![block_here, mob_here];
        expected.sort();
        assert_eq!(taken, expected);
        assert!(cache.contains(&block_there));
        assert!(cache.contains(&mob_unknown));
        assert_eq!(cache.take_chunk(&there).len(), 1);
    }

    #[test]
    fn test_retain_reports_removed_count() {
        let cache = OverflowCache::new();
        for amount in 1..=4 {
            cache.insert(StackKey::Entity(Uuid::new_v4()), OverflowEntry::new(amount));
        }
        let removed = cache.retain(|_, entry| entry.amount > 1);
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 3);
    }
}
