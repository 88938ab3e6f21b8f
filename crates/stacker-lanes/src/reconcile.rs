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

//! Moves records between the live and overflow caches.
//!
//! The live and overflow caches of a kind are guarded by separate locks, so
//! the passes here are not atomic across the two. Two rules keep them
//! consistent anyway: an overflow entry is removed by whichever path touches
//! it first, and when two paths would insert the same key the record already
//! in the live cache wins and absorbs the larger amount.

use crate::context::LaneContext;
use crate::KindCounts;
use stacker_core::{ChunkPos, ObjectHandle, ObjectKind, StackKey};
use stacker_data::{OverflowEntry, StackRecord, StackStore};
use std::collections::HashSet;
use std::sync::Arc;

/// The result of [`ReconciliationLane::get_or_create`].
#[derive(Debug, Clone)]
pub struct Lookup {
    /// The record to use for the object.
    pub record: Arc<StackRecord>,
    /// `true` if the record was built by this call.
    pub created: bool,
    /// `true` if the record is held by the live cache.
    pub cached: bool,
    /// `true` if an overflow entry was applied to the record.
    pub adopted: bool,
}

/// What a region load did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Overflow entries restored into the live cache, per kind.
    pub restored: KindCounts,
    /// Overflow entries discarded because their object is gone, per kind.
    pub discarded: KindCounts,
    /// Creatures whose nerf status was refreshed.
    pub refreshed: usize,
    /// Unstacked containers whose leftover display was removed.
    pub orphaned_displays: usize,
}

impl LoadOutcome {
    /// Entries restored for one kind.
    pub fn restored(&self, kind: ObjectKind) -> usize {
        self.restored[kind.index()]
    }

    /// Entries discarded for one kind.
    pub fn discarded(&self, kind: ObjectKind) -> usize {
        self.discarded[kind.index()]
    }
}

/// What a region unload did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnloadOutcome {
    /// Live records moved to overflow, per kind.
    pub stored: KindCounts,
    /// Live records dropped as not worth keeping, per kind.
    pub dropped: KindCounts,
    /// Mobile records moved to the region the world reports them in.
    pub rehomed: usize,
}

impl UnloadOutcome {
    /// Records moved to overflow for one kind.
    pub fn stored(&self, kind: ObjectKind) -> usize {
        self.stored[kind.index()]
    }

    /// Records dropped for one kind.
    pub fn dropped(&self, kind: ObjectKind) -> usize {
        self.dropped[kind.index()]
    }
}

/// The lane handling get-or-create and region transitions.
#[derive(Debug, Default)]
pub struct ReconciliationLane;

impl ReconciliationLane {
    /// Creates a new `ReconciliationLane`.
    pub fn new() -> Self {
        Self
    }

    /// Returns the record for an observed object, building it if needed.
    ///
    /// A live record whose object still resolves is returned untouched.
    /// Otherwise `construct` builds a fresh record, which adopts any overflow
    /// entry for the key and, for creatures, the confirmed-dead mark. The
    /// record only enters the live cache if the object is cacheable; a
    /// rejected object gets a transient record on every call and leaves the
    /// overflow entry in place.
    ///
    /// `construct` must return a record carrying the handle's key.
    pub fn get_or_create(
        &self,
        ctx: &LaneContext<'_>,
        handle: &ObjectHandle,
        construct: impl FnOnce(&ObjectHandle) -> StackRecord,
    ) -> Lookup {
        let kind = handle.kind;
        let key = &handle.key;
        let live = ctx.store.live(kind);

        let stale = live.get(key);
        if let Some(existing) = &stale {
            if ctx.world.resolve(kind, key).is_some() {
                return Lookup {
                    record: Arc::clone(existing),
                    created: false,
                    cached: true,
                    adopted: false,
                };
            }
        }

        let record = Arc::new(construct(handle));
        debug_assert_eq!(record.key(), key);

        let cached = ctx.policy.is_cacheable(handle);
        let overflow = ctx.store.overflow(kind);
        let adopted = if cached {
            overflow.take(key)
        } else {
            overflow.peek(key)
        };
        if let Some(entry) = &adopted {
            record.restore(entry);
        }
        if kind == ObjectKind::Creature {
            if let Some(id) = key.as_entity() {
                let dead = if cached {
                    ctx.store.take_dead(&id)
                } else {
                    ctx.store.is_marked_dead(&id)
                };
                if dead {
                    record.set_dead_flag(true);
                }
            }
        }

        if !cached {
            log::trace!("{kind} {key} ({}) is not cacheable", handle.type_name);
            return Lookup {
                record,
                created: true,
                cached: false,
                adopted: adopted.is_some(),
            };
        }

        let winner = live.insert_or_keep(Arc::clone(&record), stale.as_ref());
        if !Arc::ptr_eq(&winner, &record) {
            if let Some(entry) = &adopted {
                winner.restore_max(entry);
            }
            return Lookup {
                record: winner,
                created: false,
                cached: true,
                adopted: adopted.is_some(),
            };
        }

        Lookup {
            record,
            created: true,
            cached: true,
            adopted: adopted.is_some(),
        }
    }

    /// Removes the live record for `key`. Never touches overflow.
    pub fn remove(
        &self,
        store: &StackStore,
        kind: ObjectKind,
        key: &StackKey,
    ) -> Option<Arc<StackRecord>> {
        store.live(kind).remove(key)
    }

    /// Restores the overflow entries of a region that just loaded.
    ///
    /// Block entries match by coordinate. Entity entries match by the region
    /// they were stored from or by the world listing the entity in `chunk`.
    /// Every visited entry leaves overflow, restored or not.
    pub fn load_region(&self, ctx: &LaneContext<'_>, chunk: &ChunkPos) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        let handles = ctx.world.handles_in_chunk(chunk);
        let present: HashSet<&StackKey> = handles
            .iter()
            .filter(|handle| !handle.kind.is_fixed())
            .map(|handle| &handle.key)
            .collect();

        for kind in ObjectKind::ALL {
            let entries = ctx.store.overflow(kind).drain_matching(|key, entry| {
                entry.resolves_into(key, chunk) || present.contains(key)
            });

            for (key, entry) in entries {
                match restorable(ctx, kind, &key) {
                    Some(handle) => {
                        restore_into_live(ctx, &handle, &entry);
                        outcome.restored[kind.index()] += 1;
                    }
                    None => {
                        log::trace!("Discarding overflow {kind} {key}: object is gone");
                        outcome.discarded[kind.index()] += 1;
                    }
                }
            }
        }

        for record in ctx.store.live(ObjectKind::Creature).in_chunk(chunk) {
            ctx.notifier.refresh_nerf(record.key());
            outcome.refreshed += 1;
        }

        // A display left standing over a container that is no longer stacked.
        let containers = ctx.store.live(ObjectKind::Container);
        for handle in handles
            .iter()
            .filter(|handle| handle.kind == ObjectKind::Container)
        {
            if !containers.contains(&handle.key) {
                ctx.notifier.remove_display(&handle.key);
                outcome.orphaned_displays += 1;
            }
        }

        log::debug!(
            "Region {chunk} loaded: restored {:?}, discarded {:?}",
            outcome.restored,
            outcome.discarded
        );
        outcome
    }

    /// Evicts the live records of a region that is unloading.
    ///
    /// Eligible records become overflow entries; the rest are dropped.
    /// Spawners and containers tear down their decorations first. Mobile
    /// records whose object the world lists in `chunk` are evicted with it,
    /// wherever they were indexed. Those whose object is reported in another
    /// loaded region are re-homed there instead.
    pub fn unload_region(&self, ctx: &LaneContext<'_>, chunk: &ChunkPos) -> UnloadOutcome {
        let mut outcome = UnloadOutcome::default();
        let present: Vec<ObjectHandle> = ctx
            .world
            .handles_in_chunk(chunk)
            .into_iter()
            .filter(|handle| !handle.kind.is_fixed())
            .collect();

        for kind in ObjectKind::ALL {
            let live = ctx.store.live(kind);

            if !kind.is_fixed() {
                // Objects that walked in since the last sweep leave with this region.
                for handle in present.iter().filter(|handle| handle.kind == kind) {
                    let moved = live
                        .get(&handle.key)
                        .is_some_and(|record| record.chunk() != *chunk);
                    if moved && live.relocate(&handle.key, chunk.clone()) {
                        outcome.rehomed += 1;
                    }
                }
                for record in live.in_chunk(chunk) {
                    let Some(handle) = ctx.world.resolve(kind, record.key()) else {
                        continue;
                    };
                    if handle.chunk != *chunk
                        && ctx.world.is_chunk_loaded(&handle.chunk)
                        && live.relocate(record.key(), handle.chunk)
                    {
                        outcome.rehomed += 1;
                    }
                }
            }

            let overflow = ctx.store.overflow(kind);
            for record in live.take_chunk(chunk) {
                let key = record.key();
                match kind {
                    ObjectKind::Spawner if record.amount() > 1 => ctx.notifier.delete_label(key),
                    ObjectKind::Container => {
                        ctx.notifier.delete_label(key);
                        ctx.notifier.remove_display(key);
                    }
                    _ => {}
                }

                if ctx.rules.record_is_eligible(&record) {
                    overflow.insert(key.clone(), record.to_overflow());
                    outcome.stored[kind.index()] += 1;
                } else {
                    outcome.dropped[kind.index()] += 1;
                }
            }
        }

        log::debug!(
            "Region {chunk} unloaded: stored {:?}, dropped {:?}",
            outcome.stored,
            outcome.dropped
        );
        outcome
    }
}

// The live object behind an overflow key, if it can take the entry back.
fn restorable(ctx: &LaneContext<'_>, kind: ObjectKind, key: &StackKey) -> Option<ObjectHandle> {
    ctx.world
        .resolve(kind, key)
        .filter(|handle| !handle.dead && ctx.policy.is_cacheable(handle))
}

fn restore_into_live(ctx: &LaneContext<'_>, handle: &ObjectHandle, entry: &OverflowEntry) {
    let kind = handle.kind;
    let record = Arc::new(StackRecord::from_handle(handle));
    record.restore(entry);
    if let Some(id) = handle.key.as_entity() {
        if kind == ObjectKind::Creature && ctx.store.take_dead(&id) {
            record.set_dead_flag(true);
        }
    }

    let winner = ctx.store.live(kind).insert_or_keep(Arc::clone(&record), None);
    if !Arc::ptr_eq(&winner, &record) {
        winner.restore_max(entry);
    }
    if kind == ObjectKind::Container {
        ctx.notifier.create_display(&handle.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, Note};
    use stacker_core::{BlockPos, ContainerPayload, SpawnCause};
    use uuid::Uuid;

    fn region() -> ChunkPos {
        ChunkPos::new("world", 0, 0)
    }

    #[test]
    fn test_get_or_create_returns_resolvable_live_hit() {
        // Arrange
        let fx = Fixture::default();
        let handle = ObjectHandle::creature(Uuid::new_v4(), "ZOMBIE", region());
        fx.world.put(handle.clone());
        let lane = ReconciliationLane::new();
        let first = lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);
        first.record.set_amount(7);

        // Act
        let second = lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        // Assert
        assert!(first.created && first.cached);
        assert!(!second.created);
        assert!(Arc::ptr_eq(&first.record, &second.record));
        assert_eq!(second.record.amount(), 7);
    }

    #[test]
    fn test_get_or_create_replaces_unresolvable_live_hit() {
        let fx = Fixture::default();
        let handle = ObjectHandle::item(Uuid::new_v4(), "STONE", region());
        let lane = ReconciliationLane::new();
        let first = lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        let second = lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        assert!(second.created);
        assert!(!Arc::ptr_eq(&first.record, &second.record));
        let live = fx.store.live(ObjectKind::Item).get(&handle.key);
        assert!(live.is_some_and(|record| Arc::ptr_eq(&record, &second.record)));
    }

    #[test]
    fn test_get_or_create_adopts_overflow_and_dead_mark() {
        // Arrange
        let fx = Fixture::default();
        let id = Uuid::new_v4();
        let handle = ObjectHandle::creature(id, "SKELETON", region());
        fx.world.put(handle.clone());
        fx.store.overflow(ObjectKind::Creature).insert(
            handle.key.clone(),
            OverflowEntry::new(6).with_cause(SpawnCause::Spawner),
        );
        fx.store.mark_dead(id);

        // Act
        let lookup =
            ReconciliationLane::new().get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        // Assert
        assert!(lookup.adopted);
        assert_eq!(lookup.record.amount(), 6);
        assert_eq!(lookup.record.spawn_cause(), Some(SpawnCause::Spawner));
        assert!(lookup.record.has_dead_flag());
        assert!(fx.store.overflow(ObjectKind::Creature).is_empty());
        assert!(!fx.store.is_marked_dead(&id));
    }

    #[test]
    fn test_rejected_object_is_transient_and_keeps_overflow() {
        let mut fx = Fixture::default();
        fx.policy.items.blacklist.insert("DIRT".to_string());
        let handle = ObjectHandle::item(Uuid::new_v4(), "DIRT", region());
        fx.store
            .overflow(ObjectKind::Item)
            .insert(handle.key.clone(), OverflowEntry::new(3));

        let lookup =
            ReconciliationLane::new().get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        assert!(!lookup.cached);
        assert_eq!(lookup.record.amount(), 3);
        assert!(fx.store.live(ObjectKind::Item).is_empty());
        assert!(fx.store.overflow(ObjectKind::Item).contains(&handle.key));
    }

    #[test]
    fn test_get_or_create_uses_caller_constructor() {
        let fx = Fixture::default();
        let handle = ObjectHandle::creature(Uuid::new_v4(), "COW", region());

        let lookup = ReconciliationLane::new().get_or_create(&fx.ctx(), &handle, |h| {
            let record = StackRecord::from_handle(h);
            record.set_spawn_cause(SpawnCause::Breeding);
            record
        });

        assert_eq!(lookup.record.spawn_cause(), Some(SpawnCause::Breeding));
    }

    #[test]
    fn test_unload_then_load_round_trips_a_creature() {
        // Arrange
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let handle = ObjectHandle::creature(Uuid::new_v4(), "ZOMBIE", region())
            .with_cause(SpawnCause::Spawner);
        fx.world.put(handle.clone());
        let lookup = lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);
        lookup.record.set_amount(4);

        // Act
        let unloaded = lane.unload_region(&fx.ctx(), &region());

        // Assert
        assert_eq!(unloaded.stored(ObjectKind::Creature), 1);
        assert!(fx.store.live(ObjectKind::Creature).is_empty());
        let entry = fx.store.overflow(ObjectKind::Creature).peek(&handle.key);
        assert_eq!(entry.as_ref().map(|e| e.amount), Some(4));

        let loaded = lane.load_region(&fx.ctx(), &region());
        assert_eq!(loaded.restored(ObjectKind::Creature), 1);
        let record = fx.store.live(ObjectKind::Creature).get(&handle.key);
        assert_eq!(record.as_ref().map(|r| r.amount()), Some(4));
        assert_eq!(
            record.and_then(|r| r.spawn_cause()),
            Some(SpawnCause::Spawner)
        );
        assert!(fx.store.overflow(ObjectKind::Creature).is_empty());
        assert!(fx
            .notifier
            .notes()
            .contains(&Note::RefreshNerf(handle.key.clone())));
    }

    #[test]
    fn test_unload_drops_singletons() {
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let item = ObjectHandle::item(Uuid::new_v4(), "STONE", region());
        fx.world.put(item.clone());
        lane.get_or_create(&fx.ctx(), &item, StackRecord::from_handle);

        let outcome = lane.unload_region(&fx.ctx(), &region());

        assert_eq!(outcome.dropped(ObjectKind::Item), 1);
        assert!(fx.store.overflow(ObjectKind::Item).is_empty());
    }

    #[test]
    fn test_unload_tears_down_block_decorations() {
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let spawner = ObjectHandle::spawner(BlockPos::new("world", 1, 64, 1), "PIG");
        let single = ObjectHandle::spawner(BlockPos::new("world", 2, 64, 1), "PIG");
        let barrel = ObjectHandle::container(
            BlockPos::new("world", 3, 64, 1),
            ContainerPayload::new("WHEAT"),
        );
        for handle in [&spawner, &single, &barrel] {
            fx.world.put(handle.clone());
            lane.get_or_create(&fx.ctx(), handle, StackRecord::from_handle);
        }
        if let Some(record) = fx.store.live(ObjectKind::Spawner).get(&spawner.key) {
            record.set_amount(3);
        }

        lane.unload_region(&fx.ctx(), &region());

        let notes = fx.notifier.notes();
        assert!(notes.contains(&Note::DeleteLabel(spawner.key.clone())));
        assert!(!notes.contains(&Note::DeleteLabel(single.key.clone())));
        assert!(notes.contains(&Note::DeleteLabel(barrel.key.clone())));
        assert!(notes.contains(&Note::RemoveDisplay(barrel.key.clone())));
        assert!(fx.store.overflow(ObjectKind::Spawner).contains(&spawner.key));
        assert!(!fx.store.overflow(ObjectKind::Spawner).contains(&single.key));
    }

    #[test]
    fn test_load_discards_entries_without_a_matching_object() {
        let fx = Fixture::default();
        let pos = BlockPos::new("world", 4, 70, 4);
        let key = StackKey::Block(pos.clone());
        fx.store
            .overflow(ObjectKind::Spawner)
            .insert(key.clone(), OverflowEntry::new(5));
        fx.world.load(&region());

        let outcome = ReconciliationLane::new().load_region(&fx.ctx(), &region());

        assert_eq!(outcome.discarded(ObjectKind::Spawner), 1);
        assert!(fx.store.overflow(ObjectKind::Spawner).is_empty());
        assert!(fx.store.live(ObjectKind::Spawner).is_empty());
    }

    #[test]
    fn test_load_restores_container_display() {
        let fx = Fixture::default();
        let barrel = ObjectHandle::container(
            BlockPos::new("world", 8, 60, 8),
            ContainerPayload::new("IRON_INGOT"),
        );
        fx.world.put(barrel.clone());
        fx.store.overflow(ObjectKind::Container).insert(
            barrel.key.clone(),
            OverflowEntry::new(12).with_payload(ContainerPayload::new("IRON_INGOT")),
        );

        ReconciliationLane::new().load_region(&fx.ctx(), &region());

        let record = fx.store.live(ObjectKind::Container).get(&barrel.key);
        assert_eq!(record.map(|r| r.amount()), Some(12));
        assert!(fx
            .notifier
            .notes()
            .contains(&Note::CreateDisplay(barrel.key.clone())));
    }

    #[test]
    fn test_live_record_wins_a_load_race_with_max_amount() {
        // Arrange: a get-or-create already inserted the key with amount 2.
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let handle = ObjectHandle::item(Uuid::new_v4(), "GOLD_INGOT", region());
        fx.world.put(handle.clone());
        let live = Arc::new(StackRecord::from_handle(&handle));
        live.set_amount(2);
        fx.store.live(ObjectKind::Item).insert(Arc::clone(&live));
        fx.store.overflow(ObjectKind::Item).insert(
            handle.key.clone(),
            OverflowEntry::new(9).in_chunk(region()),
        );

        // Act
        lane.load_region(&fx.ctx(), &region());

        // Assert
        let record = fx.store.live(ObjectKind::Item).get(&handle.key);
        assert!(record.as_ref().is_some_and(|r| Arc::ptr_eq(r, &live)));
        assert_eq!(live.amount(), 9);
        assert!(fx.store.overflow(ObjectKind::Item).is_empty());
    }

    #[test]
    fn test_unload_rehomes_moved_entities() {
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let other = ChunkPos::new("world", 1, 0);
        let handle = ObjectHandle::creature(Uuid::new_v4(), "PIG", region());
        fx.world.put(handle.clone());
        lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        let mut moved = handle.clone();
        moved.chunk = other.clone();
        fx.world.put(moved);
        let outcome = lane.unload_region(&fx.ctx(), &region());

        assert_eq!(outcome.rehomed, 1);
        assert_eq!(
            fx.store.live(ObjectKind::Creature).chunk_keys(&other),
            vec![handle.key.clone()]
        );
        assert!(fx.store.live(ObjectKind::Creature).verify_index());
    }

    #[test]
    fn test_unload_evicts_entities_that_walked_in() {
        // Arrange: indexed in another region, but the world now reports it here.
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let other = ChunkPos::new("world", 1, 0);
        let handle = ObjectHandle::creature(Uuid::new_v4(), "ZOMBIE", other.clone())
            .with_cause(SpawnCause::Spawner);
        fx.world.put(handle.clone());
        lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle)
            .record
            .set_amount(5);
        let mut moved = handle.clone();
        moved.chunk = region();
        fx.world.put(moved);

        // Act
        let outcome = lane.unload_region(&fx.ctx(), &region());

        // Assert
        assert_eq!(outcome.rehomed, 1);
        assert_eq!(outcome.stored(ObjectKind::Creature), 1);
        assert!(!fx.store.live(ObjectKind::Creature).contains(&handle.key));
        let entry = fx.store.overflow(ObjectKind::Creature).peek(&handle.key);
        assert_eq!(entry.map(|e| e.amount), Some(5));
        assert!(fx.store.live(ObjectKind::Creature).chunk_keys(&other).is_empty());
    }

    #[test]
    fn test_load_removes_displays_over_unstacked_containers() {
        let fx = Fixture::default();
        let stacked = ObjectHandle::container(
            BlockPos::new("world", 1, 60, 1),
            ContainerPayload::new("WHEAT"),
        );
        let orphan = ObjectHandle::container(
            BlockPos::new("world", 2, 60, 1),
            ContainerPayload::new("WHEAT"),
        );
        for handle in [&stacked, &orphan] {
            fx.world.put(handle.clone());
        }
        fx.store.overflow(ObjectKind::Container).insert(
            stacked.key.clone(),
            OverflowEntry::new(6).with_payload(ContainerPayload::new("WHEAT")),
        );

        let outcome = ReconciliationLane::new().load_region(&fx.ctx(), &region());

        assert_eq!(outcome.orphaned_displays, 1);
        let notes = fx.notifier.notes();
        assert!(notes.contains(&Note::RemoveDisplay(orphan.key.clone())));
        assert!(!notes.contains(&Note::RemoveDisplay(stacked.key.clone())));
    }

    #[test]
    fn test_unload_leaves_other_regions_alone() {
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let other = ChunkPos::new("world", 0, 1);
        let here = ObjectHandle::item(Uuid::new_v4(), "STONE", region());
        let there = ObjectHandle::item(Uuid::new_v4(), "STONE", other.clone());
        for handle in [&here, &there] {
            fx.world.put(handle.clone());
            lane.get_or_create(&fx.ctx(), handle, StackRecord::from_handle)
                .record
                .set_amount(5);
        }
        fx.world.unload(&region());

        lane.unload_region(&fx.ctx(), &region());

        let survivor = fx.store.live(ObjectKind::Item).get(&there.key);
        assert_eq!(survivor.map(|r| r.amount()), Some(5));
        assert!(!fx.store.live(ObjectKind::Item).contains(&here.key));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let fx = Fixture::default();
        let lane = ReconciliationLane::new();
        let handle = ObjectHandle::item(Uuid::new_v4(), "STONE", region());
        fx.world.put(handle.clone());
        lane.get_or_create(&fx.ctx(), &handle, StackRecord::from_handle);

        assert!(lane.remove(&fx.store, ObjectKind::Item, &handle.key).is_some());
        assert!(lane.remove(&fx.store, ObjectKind::Item, &handle.key).is_none());
        assert!(fx.store.live(ObjectKind::Item).chunk_keys(&region()).is_empty());
    }
}
