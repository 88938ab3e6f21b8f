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

//! Drives a small simulated world through loads, unloads, sweeps and saves.
//!
//! Usage: `sandbox [data-dir]`. Tables are written as RON under `data-dir`
//! (default `./stacker-data`), and `stacker.ron` in that directory is read as
//! configuration if present. Running twice shows the warm restart.

use anyhow::{Context as _, Result};
use stacker_control::{StackEngine, StackerConfig, StackerService};
use stacker_core::{
    BlockPos, ChunkPos, ContainerPayload, ObjectHandle, ObjectKind, SpawnCause, StackKey,
    StackNotifier, WorldView,
};
use stacker_io::RonFileStore;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// The host simulation: objects by key and the set of loaded regions.
#[derive(Default)]
struct SimWorld {
    objects: Mutex<HashMap<StackKey, ObjectHandle>>,
    loaded: Mutex<HashSet<ChunkPos>>,
}

impl SimWorld {
    fn spawn(&self, handle: ObjectHandle) -> ObjectHandle {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.key.clone(), handle.clone());
        handle
    }

    fn despawn(&self, key: &StackKey) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn set_loaded(&self, chunk: &ChunkPos, loaded: bool) {
        let mut set = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if loaded {
            set.insert(chunk.clone());
        } else {
            set.remove(chunk);
        }
    }
}

impl WorldView for SimWorld {
    fn is_chunk_loaded(&self, chunk: &ChunkPos) -> bool {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(chunk)
    }

    fn resolve(&self, kind: ObjectKind, key: &StackKey) -> Option<ObjectHandle> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|handle| handle.kind == kind)
            .cloned()
    }

    fn handles_in_chunk(&self, chunk: &ChunkPos) -> Vec<ObjectHandle> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|handle| handle.chunk == *chunk)
            .cloned()
            .collect()
    }
}

/// Prints decoration calls instead of drawing holograms.
struct LogNotifier;

impl StackNotifier for LogNotifier {
    fn create_display(&self, key: &StackKey) {
        log::info!("display created above {key}");
    }

    fn remove_display(&self, key: &StackKey) {
        log::info!("display removed above {key}");
    }

    fn delete_label(&self, key: &StackKey) {
        log::info!("label deleted for {key}");
    }
}

// Stable ids so a second run finds the creatures it saved.
const PIG_ID: Uuid = Uuid::from_u128(0x5ac4_e12a_0000_4000_8000_0000_0000_0001);
const ZOMBIE_ID: Uuid = Uuid::from_u128(0x5ac4_e12a_0000_4000_8000_0000_0000_0002);

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let data_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("stacker-data"));
    let config = StackerConfig::load_or_default(data_dir.join("stacker.ron"))?;
    let store = RonFileStore::open(&data_dir)
        .with_context(|| format!("failed to open table store at {}", data_dir.display()))?;

    let world = Arc::new(SimWorld::default());
    let engine = Arc::new(StackEngine::new(
        config,
        Arc::clone(&world) as Arc<dyn WorldView>,
        Arc::new(LogNotifier),
        Arc::new(store),
    ));
    let seeded = engine.restore_from_sink()?;
    log::info!("Warm restart seeded {seeded} overflow entries.");

    let mut service = StackerService::new(Arc::clone(&engine));
    service.start();

    let home = ChunkPos::new("world", 0, 0);
    let farm = ChunkPos::new("world", 1, 0);
    world.set_loaded(&home, true);
    world.set_loaded(&farm, true);

    let pig = world.spawn(
        ObjectHandle::creature(PIG_ID, "PIG", home.clone()).with_cause(SpawnCause::Breeding),
    );
    let zombie = world.spawn(
        ObjectHandle::creature(ZOMBIE_ID, "ZOMBIE", farm.clone())
            .with_cause(SpawnCause::Spawner),
    );
    let spawner_pos = BlockPos::new("world", 20, 40, 4);
    let spawner = world.spawn(ObjectHandle::spawner(spawner_pos.clone(), "ZOMBIE"));
    let barrel = world.spawn(ObjectHandle::container(
        BlockPos::new("world", 3, 64, 3),
        ContainerPayload::new("WHEAT"),
    ));
    let stray = world.spawn(ObjectHandle::item(Uuid::new_v4(), "STICK", home.clone()));

    for chunk in [&home, &farm] {
        let outcome = engine.on_chunk_load(chunk);
        log::info!("Loaded {chunk}: {:?} restored", outcome.restored);
    }

    for handle in [&pig, &zombie, &spawner, &barrel, &stray] {
        let record = engine.get_or_create(handle);
        if record.amount() == 1 && handle.kind != ObjectKind::Item {
            record.set_amount(3);
        }
    }
    log::info!("After discovery: {}", engine.stats());

    // Fire the display and existence checks.
    for tick in 1..=12 {
        engine.tick(tick);
    }

    world.despawn(&stray.key);
    let sweep = engine.sweep();
    log::info!("Sweep evicted {} stale records.", sweep.total_evicted());

    let unloaded = engine.on_chunk_unload(&farm);
    world.set_loaded(&farm, false);
    log::info!(
        "Unloaded {farm}: {} stored, {} dropped",
        unloaded.stored.iter().sum::<usize>(),
        unloaded.dropped.iter().sum::<usize>()
    );
    log::info!("While {farm} is unloaded: {}", engine.stats());

    world.set_loaded(&farm, true);
    let loaded = engine.on_chunk_load(&farm);
    log::info!(
        "Reloaded {farm}: {} restored",
        loaded.restored.iter().sum::<usize>()
    );
    log::info!(
        "Spawner at {} stacked: {}",
        spawner.key,
        engine.is_stacked_spawner(&spawner_pos)
    );

    service.stop().context("final save failed")?;
    log::info!("Final state: {}", engine.stats());
    Ok(())
}
