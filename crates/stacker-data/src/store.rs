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

use crate::live::LiveCache;
use crate::lock;
use crate::overflow::OverflowCache;
use stacker_core::ObjectKind;
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

/// The live and overflow caches of one kind.
#[derive(Debug, Default)]
pub struct KindCache {
    /// Records whose region is loaded.
    pub live: LiveCache,
    /// Minimal state for records whose region is not loaded.
    pub overflow: OverflowCache,
}

/// Owns every cache of the stacking system.
///
/// Created once by the engine and shared with its workers.
#[derive(Debug, Default)]
pub struct StackStore {
    kinds: [KindCache; 4],
    dead_creatures: Mutex<HashSet<Uuid>>,
}

impl StackStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The caches of one kind.
    pub fn cache(&self, kind: ObjectKind) -> &KindCache {
        &self.kinds[kind.index()]
    }

    /// The live cache of one kind.
    pub fn live(&self, kind: ObjectKind) -> &LiveCache {
        &self.cache(kind).live
    }

    /// The overflow cache of one kind.
    pub fn overflow(&self, kind: ObjectKind) -> &OverflowCache {
        &self.cache(kind).overflow
    }

    /// Records that the creature behind `id` died while its stack was in
    /// overflow. The next record built for it starts with its dead flag set.
    pub fn mark_dead(&self, id: Uuid) -> bool {
        lock(&self.dead_creatures).insert(id)
    }

    /// Removes `id` from the dead set, returning whether it was there.
    pub fn take_dead(&self, id: &Uuid) -> bool {
        lock(&self.dead_creatures).remove(id)
    }

    /// Returns `true` if `id` is in the dead set.
    pub fn is_marked_dead(&self, id: &Uuid) -> bool {
        lock(&self.dead_creatures).contains(id)
    }

    /// Counts the records currently held.
    pub fn stats(&self) -> StackStats {
        let mut stats = StackStats::default();
        for kind in ObjectKind::ALL {
            let cache = self.cache(kind);
            stats.kinds[kind.index()] = KindStats {
                live: cache.live.len(),
                overflow: cache.overflow.len(),
            };
        }
        stats.dead_creatures = lock(&self.dead_creatures).len();
        stats
    }
}

/// Record counts of one kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindStats {
    /// Live records.
    pub live: usize,
    /// Overflow entries.
    pub overflow: usize,
}

/// Record counts across every kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StackStats {
    kinds: [KindStats; 4],
    /// Creatures marked dead while in overflow.
    pub dead_creatures: usize,
}

impl StackStats {
    /// The counts of one kind.
    pub fn kind(&self, kind: ObjectKind) -> KindStats {
        self.kinds[kind.index()]
    }

    /// The counts summed over every kind.
    pub fn total(&self) -> KindStats {
        self.kinds.iter().fold(KindStats::default(), |acc, k| KindStats {
            live: acc.live + k.live,
            overflow: acc.overflow + k.overflow,
        })
    }
}

impl fmt::Display for StackStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in ObjectKind::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let stats = self.kind(*kind);
            write!(f, "{kind}: {}/{}", stats.live, stats.overflow)?;
        }
        Ok(())
    }
}
