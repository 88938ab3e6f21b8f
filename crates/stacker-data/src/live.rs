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

//! The live cache of one object kind.

use crate::chunk_index::ChunkIndex;
use crate::record::StackRecord;
use crate::{read, write};
use stacker_core::{ChunkPos, StackKey};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Segment {
    records: HashMap<StackKey, Arc<StackRecord>>,
    index: ChunkIndex,
}

impl Segment {
    fn detach(&mut self, key: &StackKey) -> Option<Arc<StackRecord>> {
        let record = self.records.remove(key)?;
        self.index.remove(&record.chunk(), key);
        Some(record)
    }

    fn attach(&mut self, record: Arc<StackRecord>) -> Option<Arc<StackRecord>> {
        let key = record.key().clone();
        let previous = self.detach(&key);
        self.index.insert(record.chunk(), key.clone());
        self.records.insert(key, record);
        previous
    }
}

/// Maps keys to live records, with a chunk index kept in the same lock.
///
/// Holding the mapping and its index under one lock means the index can never
/// be observed out of step: every key in the mapping is indexed under exactly
/// the chunk its record reports, and nothing else is indexed.
#[derive(Debug, Default)]
pub struct LiveCache {
    segment: RwLock<Segment>,
}

impl LiveCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `key`, if any.
    pub fn get(&self, key: &StackKey) -> Option<Arc<StackRecord>> {
        read(&self.segment).records.get(key).cloned()
    }

    /// Returns `true` if a record exists for `key`.
    pub fn contains(&self, key: &StackKey) -> bool {
        read(&self.segment).records.contains_key(key)
    }

    /// Inserts a record, replacing and returning any previous one.
    pub fn insert(&self, record: Arc<StackRecord>) -> Option<Arc<StackRecord>> {
        write(&self.segment).attach(record)
    }

    /// Inserts `record` unless another record already holds its key.
    ///
    /// `stale` names a record the caller already saw and decided to replace;
    /// finding exactly that record does not block the insert. Returns the
    /// record that ends up in the cache. When that is not the record passed
    /// in, the caller lost a race and should merge into the returned one.
    pub fn insert_or_keep(
        &self,
        record: Arc<StackRecord>,
        stale: Option<&Arc<StackRecord>>,
    ) -> Arc<StackRecord> {
        let mut segment = write(&self.segment);
        if let Some(existing) = segment.records.get(record.key()) {
            if !stale.is_some_and(|stale| Arc::ptr_eq(stale, existing)) {
                return Arc::clone(existing);
            }
        }
        segment.attach(Arc::clone(&record));
        record
    }

    /// Removes and returns the record for `key`.
    pub fn remove(&self, key: &StackKey) -> Option<Arc<StackRecord>> {
        write(&self.segment).detach(key)
    }

    /// Removes the record for `key` only if it is still `expected`.
    ///
    /// Background passes work on snapshots; this keeps them from evicting a
    /// record that replaced the one they inspected.
    pub fn remove_if_same(&self, expected: &Arc<StackRecord>) -> bool {
        let mut segment = write(&self.segment);
        match segment.records.get(expected.key()) {
            Some(current) if Arc::ptr_eq(current, expected) => {
                segment.detach(expected.key());
                true
            }
            _ => false,
        }
    }

    /// Moves a record to a new chunk. Returns `false` if the key is unknown.
    pub fn relocate(&self, key: &StackKey, chunk: ChunkPos) -> bool {
        let mut segment = write(&self.segment);
        let Some(record) = segment.records.get(key).cloned() else {
            return false;
        };
        let old = record.chunk();
        if old == chunk {
            return true;
        }
        segment.index.remove(&old, key);
        record.set_chunk(chunk.clone());
        segment.index.insert(chunk, key.clone());
        true
    }

    /// The records indexed under `chunk`.
    pub fn in_chunk(&self, chunk: &ChunkPos) -> Vec<Arc<StackRecord>> {
        let segment = read(&self.segment);
        segment
            .index
            .keys_in(chunk)
            .iter()
            .filter_map(|key| segment.records.get(key).cloned())
            .collect()
    }

    /// The keys indexed under `chunk`.
    pub fn chunk_keys(&self, chunk: &ChunkPos) -> Vec<StackKey> {
        read(&self.segment).index.keys_in(chunk)
    }

    /// Removes and returns every record indexed under `chunk`.
    pub fn take_chunk(&self, chunk: &ChunkPos) -> Vec<Arc<StackRecord>> {
        let mut segment = write(&self.segment);
        let keys = segment.index.take(chunk);
        keys.iter()
            .filter_map(|key| segment.records.remove(key))
            .collect()
    }

    /// A copy of every record handle.
    pub fn snapshot(&self) -> Vec<Arc<StackRecord>> {
        read(&self.segment).records.values().cloned().collect()
    }

    /// The number of live records.
    pub fn len(&self) -> usize {
        read(&self.segment).records.len()
    }

    /// Returns `true` if the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        read(&self.segment).records.is_empty()
    }

    /// The number of chunks with at least one record.
    pub fn chunk_count(&self) -> usize {
        read(&self.segment).index.chunk_count()
    }

    /// Checks that the index matches the mapping exactly.
    pub fn verify_index(&self) -> bool {
        let segment = read(&self.segment);
        segment.index.len() == segment.records.len()
            && segment
                .records
                .iter()
                .all(|(key, record)| segment.index.contains(&record.chunk(), key))
    }

    /// Rebuilds the index from the mapping.
    pub fn rebuild_index(&self) {
        let mut segment = write(&self.segment);
        let entries: Vec<(ChunkPos, StackKey)> = segment
            .records
            .iter()
            .map(|(key, record)| (record.chunk(), key.clone()))
            .collect();
        segment.index.rebuild(entries);
        log::debug!(
            "Rebuilt chunk index: {} records across {} chunks",
            segment.records.len(),
            segment.index.chunk_count()
        );
    }
}
