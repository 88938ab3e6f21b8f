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

//! The counted handle wrapped around every stacked object.

use crate::overflow::OverflowEntry;
use crate::{read, write};
use stacker_core::{
    ChunkPos, ContainerPayload, ObjectHandle, ObjectKind, PersistedRow, SpawnCause, StackKey,
};
use std::sync::RwLock;

/// Kind-specific state carried by a [`StackRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum StackVariant {
    /// A stacked creature.
    Creature {
        /// The entity type.
        entity_type: String,
        /// Why the creature was spawned.
        spawn_cause: SpawnCause,
        /// Set once the death of this stack has been handled.
        dead_flag: bool,
    },
    /// A stacked dropped item.
    Item {
        /// The item material.
        material: String,
    },
    /// A stacked spawner block.
    Spawner {
        /// The entity type the spawner produces.
        spawned_type: String,
    },
    /// A stacked container block.
    Container {
        /// The item held by the container.
        payload: ContainerPayload,
    },
}

impl StackVariant {
    /// The kind this variant belongs to.
    pub fn kind(&self) -> ObjectKind {
        match self {
            StackVariant::Creature { .. } => ObjectKind::Creature,
            StackVariant::Item { .. } => ObjectKind::Item,
            StackVariant::Spawner { .. } => ObjectKind::Spawner,
            StackVariant::Container { .. } => ObjectKind::Container,
        }
    }

    /// Builds the initial variant for a freshly observed object.
    pub fn from_handle(handle: &ObjectHandle) -> Self {
        match handle.kind {
            ObjectKind::Creature => StackVariant::Creature {
                entity_type: handle.type_name.clone(),
                spawn_cause: handle.spawn_cause.unwrap_or_default(),
                dead_flag: false,
            },
            ObjectKind::Item => StackVariant::Item {
                material: handle.type_name.clone(),
            },
            ObjectKind::Spawner => StackVariant::Spawner {
                spawned_type: handle.type_name.clone(),
            },
            ObjectKind::Container => StackVariant::Container {
                payload: handle
                    .payload
                    .clone()
                    .unwrap_or_else(|| ContainerPayload::new(handle.type_name.clone())),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct RecordState {
    amount: u32,
    chunk: ChunkPos,
    variant: StackVariant,
}

/// A live stacked object.
///
/// The record owns only the object's key and its stacking state. It is shared
/// between the live cache and callers as an `Arc<StackRecord>`; the state sits
/// behind a lock so the stacking logic may adjust the amount from any thread.
///
/// The chunk a record is indexed under is only changed through
/// [`LiveCache::relocate`](crate::LiveCache::relocate), which keeps the chunk
/// index in step.
#[derive(Debug)]
pub struct StackRecord {
    key: StackKey,
    kind: ObjectKind,
    state: RwLock<RecordState>,
}

impl StackRecord {
    /// Creates a record with an amount of 1.
    pub fn new(key: StackKey, chunk: ChunkPos, variant: StackVariant) -> Self {
        Self {
            key,
            kind: variant.kind(),
            state: RwLock::new(RecordState {
                amount: 1,
                chunk,
                variant,
            }),
        }
    }

    /// The default constructor: reads the kind-specific initial state off the handle.
    pub fn from_handle(handle: &ObjectHandle) -> Self {
        Self::new(
            handle.key.clone(),
            handle.chunk.clone(),
            StackVariant::from_handle(handle),
        )
    }

    /// The identity of this record.
    pub fn key(&self) -> &StackKey {
        &self.key
    }

    /// The kind of this record.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// The current stack amount, always at least 1.
    pub fn amount(&self) -> u32 {
        read(&self.state).amount
    }

    /// Sets the stack amount. Values below 1 are clamped to 1.
    pub fn set_amount(&self, amount: u32) {
        write(&self.state).amount = amount.max(1);
    }

    /// The chunk the record is indexed under.
    pub fn chunk(&self) -> ChunkPos {
        read(&self.state).chunk.clone()
    }

    pub(crate) fn set_chunk(&self, chunk: ChunkPos) {
        write(&self.state).chunk = chunk;
    }

    /// A copy of the kind-specific state.
    pub fn variant(&self) -> StackVariant {
        read(&self.state).variant.clone()
    }

    /// The spawn cause of a creature; `None` for every other kind.
    pub fn spawn_cause(&self) -> Option<SpawnCause> {
        match &read(&self.state).variant {
            StackVariant::Creature { spawn_cause, .. } => Some(*spawn_cause),
            _ => None,
        }
    }

    /// Sets the spawn cause. Ignored for non-creatures.
    pub fn set_spawn_cause(&self, cause: SpawnCause) {
        if let StackVariant::Creature { spawn_cause, .. } = &mut write(&self.state).variant {
            *spawn_cause = cause;
        }
    }

    /// Whether the death of this creature has already been handled.
    pub fn has_dead_flag(&self) -> bool {
        matches!(
            read(&self.state).variant,
            StackVariant::Creature {
                dead_flag: true,
                ..
            }
        )
    }

    /// Sets the dead flag. Ignored for non-creatures.
    pub fn set_dead_flag(&self, flag: bool) {
        if let StackVariant::Creature { dead_flag, .. } = &mut write(&self.state).variant {
            *dead_flag = flag;
        }
    }

    /// The item held by a container.
    pub fn payload(&self) -> Option<ContainerPayload> {
        match &read(&self.state).variant {
            StackVariant::Container { payload } => Some(payload.clone()),
            _ => None,
        }
    }

    /// Applies an overflow entry as-is. This is a restore, not a stacking
    /// merge: amount, cause and payload are overwritten.
    pub fn restore(&self, entry: &OverflowEntry) {
        let mut state = write(&self.state);
        state.amount = entry.amount.max(1);
        match &mut state.variant {
            StackVariant::Creature { spawn_cause, .. } => {
                if let Some(cause) = entry.cause {
                    *spawn_cause = cause;
                }
            }
            StackVariant::Container { payload } => {
                if let Some(stored) = &entry.payload {
                    *payload = stored.clone();
                }
            }
            StackVariant::Item { .. } | StackVariant::Spawner { .. } => {}
        }
    }

    /// Applies an overflow entry only if it carries a larger amount.
    ///
    /// Used when two paths claimed the same key and the live record won.
    pub fn restore_max(&self, entry: &OverflowEntry) {
        if entry.amount > self.amount() {
            self.restore(entry);
        }
    }

    /// The minimal state kept for this record while its region is unloaded.
    pub fn to_overflow(&self) -> OverflowEntry {
        let state = read(&self.state);
        let mut entry = OverflowEntry::new(state.amount);
        match &state.variant {
            StackVariant::Creature { spawn_cause, .. } => entry.cause = Some(*spawn_cause),
            StackVariant::Container { payload } => entry.payload = Some(payload.clone()),
            StackVariant::Item { .. } | StackVariant::Spawner { .. } => {}
        }
        if !self.kind.is_fixed() {
            entry.chunk = Some(state.chunk.clone());
        }
        entry
    }

    /// The durable row for this record.
    pub fn to_row(&self) -> PersistedRow {
        self.to_overflow().into_row(self.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacker_core::BlockPos;
    use uuid::Uuid;

    fn chunk() -> ChunkPos {
        ChunkPos::new("world", 0, 0)
    }

    #[test]
    fn test_from_handle_reads_spawn_cause() {
        let handle = ObjectHandle::creature(Uuid::new_v4(), "ZOMBIE", chunk())
            .with_cause(SpawnCause::Spawner);
        let record = StackRecord::from_handle(&handle);

        assert_eq!(record.kind(), ObjectKind::Creature);
        assert_eq!(record.amount(), 1);
        assert_eq!(record.spawn_cause(), Some(SpawnCause::Spawner));
        assert!(!record.has_dead_flag());
    }

    #[test]
    fn test_amount_never_drops_below_one() {
        let record = StackRecord::from_handle(&ObjectHandle::item(
            Uuid::new_v4(),
            "DIAMOND",
            chunk(),
        ));
        record.set_amount(0);
        assert_eq!(record.amount(), 1);
        record.set_amount(64);
        assert_eq!(record.amount(), 64);
    }

    #[test]
    fn test_restore_overwrites_and_restore_max_keeps_larger() {
        let handle = ObjectHandle::creature(Uuid::new_v4(), "COW", chunk());
        let record = StackRecord::from_handle(&handle);
        record.set_amount(9);

        record.restore_max(&OverflowEntry::new(4).with_cause(SpawnCause::Breeding));
        assert_eq!(record.amount(), 9);
        assert_eq!(record.spawn_cause(), Some(SpawnCause::Natural));

        record.restore(&OverflowEntry::new(4).with_cause(SpawnCause::Breeding));
        assert_eq!(record.amount(), 4);
        assert_eq!(record.spawn_cause(), Some(SpawnCause::Breeding));
    }

    #[test]
    fn test_to_overflow_carries_kind_specific_state() {
        let pos = BlockPos::new("world", 5, 60, 5);
        let container = StackRecord::from_handle(&ObjectHandle::container(
            pos,
            ContainerPayload::new("IRON_INGOT"),
        ));
        container.set_amount(3);
        let entry = container.to_overflow();
        assert_eq!(entry.amount, 3);
        assert_eq!(entry.payload, Some(ContainerPayload::new("IRON_INGOT")));
        assert!(entry.chunk.is_none());

        let item = StackRecord::from_handle(&ObjectHandle::item(Uuid::new_v4(), "STONE", chunk()));
        assert_eq!(item.to_overflow().chunk, Some(chunk()));
        assert!(item.to_overflow().cause.is_none());
    }

    #[test]
    fn test_creature_only_setters_ignore_other_kinds() {
        let spawner =
            StackRecord::from_handle(&ObjectHandle::spawner(BlockPos::new("w", 0, 0, 0), "PIG"));
        spawner.set_dead_flag(true);
        spawner.set_spawn_cause(SpawnCause::Custom);
        assert!(!spawner.has_dead_flag());
        assert_eq!(spawner.spawn_cause(), None);
    }
}
