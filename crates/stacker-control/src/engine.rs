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

//! The lifecycle object owning every cache of the stacking system.

use crate::config::StackerConfig;
use stacker_core::{
    BlockPos, ChunkPos, DurableSink, ObjectHandle, ObjectKind, SinkResult, StackKey,
    StackNotifier, WorldView,
};
use stacker_data::{OverflowEntry, StackRecord, StackStats, StackStore};
use stacker_lanes::{
    DeferredQueue, DeferredTask, EligibilityRules, LaneContext, LoadOutcome, PersistLane,
    PersistPlan, PersistReport, ReconciliationLane, SweepLane, SweepReport, UnloadOutcome,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// The stacking cache engine.
///
/// Constructed once at startup and shared between the host's main thread and
/// the background workers of a [`StackerService`](crate::StackerService). The
/// host reports observed objects through [`get_or_create`](Self::get_or_create),
/// region transitions through [`on_chunk_load`](Self::on_chunk_load) and
/// [`on_chunk_unload`](Self::on_chunk_unload), and calls [`tick`](Self::tick)
/// once per simulation tick to fire deferred checks.
///
/// No operation surfaces an error to the host except the persistence calls,
/// whose failure leaves the caches untouched for the next attempt.
pub struct StackEngine {
    config: StackerConfig,
    store: StackStore,
    world: Arc<dyn WorldView>,
    notifier: Arc<dyn StackNotifier>,
    sink: Arc<dyn DurableSink>,
    rules: EligibilityRules,
    reconcile: ReconciliationLane,
    sweep: SweepLane,
    persist: PersistLane,
    deferred: Mutex<DeferredQueue>,
    now: AtomicU64,
    // Only one plan may be written to the sink at a time.
    write_lock: Mutex<()>,
}

impl StackEngine {
    /// Creates an engine with empty caches.
    pub fn new(
        config: StackerConfig,
        world: Arc<dyn WorldView>,
        notifier: Arc<dyn StackNotifier>,
        sink: Arc<dyn DurableSink>,
    ) -> Self {
        let persist = PersistLane::new(config.store);
        Self {
            config,
            store: StackStore::new(),
            world,
            notifier,
            sink,
            rules: EligibilityRules::default(),
            reconcile: ReconciliationLane::new(),
            sweep: SweepLane::new(),
            persist,
            deferred: Mutex::new(DeferredQueue::new()),
            now: AtomicU64::new(0),
            write_lock: Mutex::new(()),
        }
    }

    /// Replaces the persistence eligibility rules.
    pub fn with_eligibility(mut self, rules: EligibilityRules) -> Self {
        self.rules = rules;
        self
    }

    fn ctx(&self) -> LaneContext<'_> {
        LaneContext {
            store: &self.store,
            world: self.world.as_ref(),
            notifier: self.notifier.as_ref(),
            policy: &self.config.policy,
            rules: &self.rules,
        }
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, DeferredQueue> {
        self.deferred.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The configuration the engine runs with.
    pub fn config(&self) -> &StackerConfig {
        &self.config
    }

    /// Direct access to the caches.
    pub fn store(&self) -> &StackStore {
        &self.store
    }

    /// The last tick passed to [`tick`](Self::tick).
    pub fn current_tick(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }

    /// The number of deferred tasks not yet fired.
    pub fn pending_tasks(&self) -> usize {
        self.queue().len()
    }

    // --- Main-context operations ---

    /// Returns the record for an observed object, building it with the
    /// default constructor if needed.
    pub fn get_or_create(&self, handle: &ObjectHandle) -> Arc<StackRecord> {
        self.get_or_create_with(handle, StackRecord::from_handle)
    }

    /// Returns the record for an observed object, building it with
    /// `construct` if needed.
    ///
    /// A freshly cached record schedules an existence check and, for
    /// containers, the creation of its display.
    pub fn get_or_create_with(
        &self,
        handle: &ObjectHandle,
        construct: impl FnOnce(&ObjectHandle) -> StackRecord,
    ) -> Arc<StackRecord> {
        let lookup = self.reconcile.get_or_create(&self.ctx(), handle, construct);
        if lookup.created && lookup.cached {
            let now = self.current_tick();
            let mut queue = self.queue();
            queue.schedule(
                now + self.config.existence_check_delay_ticks,
                DeferredTask::ExistenceCheck {
                    kind: handle.kind,
                    key: handle.key.clone(),
                },
            );
            if handle.kind == ObjectKind::Container {
                queue.schedule(
                    now + self.config.display_delay_ticks,
                    DeferredTask::CreateDisplay {
                        key: handle.key.clone(),
                    },
                );
            }
        }
        lookup.record
    }

    /// Removes the live record for `key`. Idempotent; never touches overflow.
    pub fn remove(&self, kind: ObjectKind, key: &StackKey) -> bool {
        self.reconcile.remove(&self.store, kind, key).is_some()
    }

    /// Removes the live record of a stacked object.
    pub fn remove_record(&self, record: &StackRecord) -> bool {
        self.remove(record.kind(), record.key())
    }

    /// Handles a region load notification.
    pub fn on_chunk_load(&self, chunk: &ChunkPos) -> LoadOutcome {
        self.reconcile.load_region(&self.ctx(), chunk)
    }

    /// Handles a region unload notification.
    pub fn on_chunk_unload(&self, chunk: &ChunkPos) -> UnloadOutcome {
        self.reconcile.unload_region(&self.ctx(), chunk)
    }

    /// Advances the simulation clock and fires every task now due.
    pub fn tick(&self, now: u64) -> usize {
        self.now.fetch_max(now, Ordering::AcqRel);
        let due = self.queue().pop_due(now);
        let fired = due.len();
        for task in due {
            self.fire(task);
        }
        fired
    }

    fn fire(&self, task: DeferredTask) {
        match task {
            DeferredTask::ExistenceCheck { kind, key } => {
                // Gone from the live cache means an unload or removal already
                // handled it.
                let Some(record) = self.store.live(kind).get(&key) else {
                    return;
                };
                if !self.world.is_chunk_loaded(&record.chunk()) {
                    return;
                }
                let gone = self
                    .world
                    .resolve(kind, &key)
                    .map_or(true, |handle| handle.dead);
                if gone && self.store.live(kind).remove_if_same(&record) {
                    log::trace!("{kind} {key} was gone or dead at its existence check");
                }
            }
            DeferredTask::CreateDisplay { key } => {
                let kind = ObjectKind::Container;
                if self.store.live(kind).contains(&key) && self.world.resolve(kind, &key).is_some()
                {
                    self.notifier.create_display(&key);
                }
            }
        }
    }

    /// Re-homes a mobile record after its object crossed into another region.
    ///
    /// Returns `false` for unknown keys and for fixed kinds, whose region
    /// never changes.
    pub fn relocate(&self, kind: ObjectKind, key: &StackKey, chunk: ChunkPos) -> bool {
        !kind.is_fixed() && self.store.live(kind).relocate(key, chunk)
    }

    /// Records that a creature died while its stack sat in overflow.
    pub fn mark_dead_overflow(&self, id: Uuid) {
        self.store.mark_dead(id);
    }

    // --- Background passes ---

    /// Runs one sweep over every live cache.
    pub fn sweep(&self) -> SweepReport {
        self.sweep.run(&self.ctx())
    }

    /// Merges the caches into one snapshot per kind. Does not touch the sink.
    pub fn plan_persist(&self) -> PersistPlan {
        self.persist.plan(&self.store, &self.rules)
    }

    /// Writes a plan to the sink, serialized against every other write.
    pub fn write_plan(&self, plan: &PersistPlan) -> SinkResult<PersistReport> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.persist.execute(self.sink.as_ref(), plan)
    }

    /// Plans and writes one persistence pass.
    pub fn persist(&self) -> SinkResult<PersistReport> {
        let plan = self.plan_persist();
        self.write_plan(&plan)
    }

    /// Seeds the overflow caches from the durable store.
    ///
    /// Keys already live are skipped. Returns the number of entries seeded.
    pub fn restore_from_sink(&self) -> SinkResult<usize> {
        let mut seeded = 0;
        for kind in ObjectKind::ALL {
            let rows = self.sink.load_table(kind)?;
            let live = self.store.live(kind);
            let overflow = self.store.overflow(kind);
            for row in &rows {
                if live.contains(&row.key) {
                    continue;
                }
                let entry = OverflowEntry::from_row(row);
                match overflow.peek(&row.key) {
                    Some(existing) if existing.amount >= entry.amount => {}
                    _ => {
                        overflow.insert(row.key.clone(), entry);
                        seeded += 1;
                    }
                }
            }
        }
        log::info!("Restored {seeded} stacks from the durable store.");
        Ok(seeded)
    }

    /// Runs the final persistence pass before the engine is dropped.
    pub fn shutdown(&self) -> SinkResult<PersistReport> {
        log::info!("Stack engine shutting down, flushing caches.");
        let result = self.persist();
        if let Err(e) = &result {
            log::error!("Final flush failed: {e}");
        }
        result
    }

    // --- Queries ---

    /// The live record for `key`, if any.
    pub fn get(&self, kind: ObjectKind, key: &StackKey) -> Option<Arc<StackRecord>> {
        self.store.live(kind).get(key)
    }

    /// Returns `true` if a live spawner at `pos` stacks more than one.
    pub fn is_stacked_spawner(&self, pos: &BlockPos) -> bool {
        self.is_stacked(ObjectKind::Spawner, pos)
    }

    /// Returns `true` if a live container at `pos` stacks more than one.
    pub fn is_stacked_container(&self, pos: &BlockPos) -> bool {
        self.is_stacked(ObjectKind::Container, pos)
    }

    fn is_stacked(&self, kind: ObjectKind, pos: &BlockPos) -> bool {
        self.store
            .live(kind)
            .get(&StackKey::Block(pos.clone()))
            .is_some_and(|record| record.amount() > 1)
    }

    /// Every live record of a kind.
    pub fn records(&self, kind: ObjectKind) -> Vec<Arc<StackRecord>> {
        self.store.live(kind).snapshot()
    }

    /// The live records of a kind inside one region.
    pub fn records_in_chunk(&self, kind: ObjectKind, chunk: &ChunkPos) -> Vec<Arc<StackRecord>> {
        self.store.live(kind).in_chunk(chunk)
    }

    /// Live and overflow counts per kind.
    pub fn stats(&self) -> StackStats {
        self.store.stats()
    }
}

impl std::fmt::Debug for StackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackEngine")
            .field("config", &self.config)
            .field("stats", &self.store.stats())
            .field("now", &self.current_tick())
            .finish_non_exhaustive()
    }
}
