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

//! Secondary mapping from region to the keys of live records inside it.

use stacker_core::{ChunkPos, StackKey};
use std::collections::{HashMap, HashSet};

/// Maps each chunk to the set of live keys indexed under it.
///
/// Maintained incrementally by [`LiveCache`](crate::LiveCache); empty sets are
/// dropped so the number of tracked chunks stays bounded by the live records.
#[derive(Debug, Default, Clone)]
pub struct ChunkIndex {
    by_chunk: HashMap<ChunkPos, HashSet<StackKey>>,
}

impl ChunkIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` under `chunk`. Returns `false` if it was already there.
    pub fn insert(&mut self, chunk: ChunkPos, key: StackKey) -> bool {
        self.by_chunk.entry(chunk).or_default().insert(key)
    }

    /// Removes `key` from `chunk`. Returns `false` if it was not there.
    pub fn remove(&mut self, chunk: &ChunkPos, key: &StackKey) -> bool {
        let Some(keys) = self.by_chunk.get_mut(chunk) else {
            return false;
        };
        let removed = keys.remove(key);
        if keys.is_empty() {
            self.by_chunk.remove(chunk);
        }
        removed
    }

    /// Removes and returns every key under `chunk`.
    pub fn take(&mut self, chunk: &ChunkPos) -> HashSet<StackKey> {
        self.by_chunk.remove(chunk).unwrap_or_default()
    }

    /// The keys under `chunk`.
    pub fn keys_in(&self, chunk: &ChunkPos) -> Vec<StackKey> {
        self.by_chunk
            .get(chunk)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `key` is indexed under `chunk`.
    pub fn contains(&self, chunk: &ChunkPos, key: &StackKey) -> bool {
        self.by_chunk
            .get(chunk)
            .is_some_and(|keys| keys.contains(key))
    }

    /// The number of chunks with at least one key.
    pub fn chunk_count(&self) -> usize {
        self.by_chunk.len()
    }

    /// The total number of indexed keys.
    pub fn len(&self) -> usize {
        self.by_chunk.values().map(HashSet::len).sum()
    }

    /// Returns `true` if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.by_chunk.is_empty()
    }

    /// Rebuilds the whole index from `(chunk, key)` pairs.
    ///
    /// Only used as a recovery fallback; normal operation is incremental.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (ChunkPos, StackKey)>) {
        self.by_chunk.clear();
        for (chunk, key) in entries {
            self.insert(chunk, key);
        }
    }
}
