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

//! Shared harness for the engine integration tests.

#![allow(dead_code)]

use stacker_control::{StackEngine, StackerConfig};
use stacker_core::{ChunkPos, ObjectHandle, ObjectKind, StackKey, StackNotifier, WorldView};
use stacker_io::MemoryStore;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A simulated world: a bag of objects plus the set of loaded regions.
#[derive(Default)]
pub struct MockWorld {
    objects: Mutex<HashMap<StackKey, ObjectHandle>>,
    loaded: Mutex<HashSet<ChunkPos>>,
}

impl MockWorld {
    /// Spawns an object and loads its region.
    pub fn spawn(&self, handle: ObjectHandle) -> ObjectHandle {
        self.loaded.lock().unwrap().insert(handle.chunk.clone());
        self.objects
            .lock()
            .unwrap()
            .insert(handle.key.clone(), handle.clone());
        handle
    }

    /// Removes an object from the world.
    pub fn despawn(&self, key: &StackKey) {
        self.objects.lock().unwrap().remove(key);
    }

    /// Marks an object as dead without removing it.
    pub fn kill(&self, key: &StackKey) {
        if let Some(handle) = self.objects.lock().unwrap().get_mut(key) {
            handle.dead = true;
        }
    }

    /// Moves a mobile object into another region.
    pub fn move_to(&self, key: &StackKey, chunk: ChunkPos) {
        if let Some(handle) = self.objects.lock().unwrap().get_mut(key) {
            handle.chunk = chunk;
        }
    }

    pub fn load(&self, chunk: &ChunkPos) {
        self.loaded.lock().unwrap().insert(chunk.clone());
    }

    pub fn unload(&self, chunk: &ChunkPos) {
        self.loaded.lock().unwrap().remove(chunk);
    }
}

impl WorldView for MockWorld {
    fn is_chunk_loaded(&self, chunk: &ChunkPos) -> bool {
        self.loaded.lock().unwrap().contains(chunk)
    }

    fn resolve(&self, kind: ObjectKind, key: &StackKey) -> Option<ObjectHandle> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .filter(|handle| handle.kind == kind)
            .cloned()
    }

    fn handles_in_chunk(&self, chunk: &ChunkPos) -> Vec<ObjectHandle> {
        self.objects
            .lock()
            .unwrap()
            .values()
            .filter(|handle| handle.chunk == *chunk)
            .cloned()
            .collect()
    }
}

/// One decoration call observed by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    CreateDisplay(StackKey),
    RemoveDisplay(StackKey),
    DeleteLabel(StackKey),
    RefreshNerf(StackKey),
}

#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Decoration>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> Vec<Decoration> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl StackNotifier for RecordingNotifier {
    fn create_display(&self, key: &StackKey) {
        self.calls
            .lock()
            .unwrap()
            .push(Decoration::CreateDisplay(key.clone()));
    }

    fn remove_display(&self, key: &StackKey) {
        self.calls
            .lock()
            .unwrap()
            .push(Decoration::RemoveDisplay(key.clone()));
    }

    fn delete_label(&self, key: &StackKey) {
        self.calls
            .lock()
            .unwrap()
            .push(Decoration::DeleteLabel(key.clone()));
    }

    fn refresh_nerf(&self, key: &StackKey) {
        self.calls
            .lock()
            .unwrap()
            .push(Decoration::RefreshNerf(key.clone()));
    }
}

/// An engine wired to a mock world, a recording notifier and an in-memory
/// sink.
pub struct Harness {
    pub world: Arc<MockWorld>,
    pub notifier: Arc<RecordingNotifier>,
    pub sink: Arc<MemoryStore>,
    pub engine: StackEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(StackerConfig::default())
    }

    pub fn with_config(config: StackerConfig) -> Self {
        Self::with_sink(config, Arc::new(MemoryStore::new()))
    }

    /// Shares an existing sink, as a restarted host would.
    pub fn with_sink(config: StackerConfig, sink: Arc<MemoryStore>) -> Self {
        let world = Arc::new(MockWorld::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = StackEngine::new(
            config,
            Arc::clone(&world) as Arc<dyn WorldView>,
            Arc::clone(&notifier) as Arc<dyn StackNotifier>,
            Arc::clone(&sink) as Arc<dyn stacker_core::DurableSink>,
        );
        Self {
            world,
            notifier,
            sink,
            engine,
        }
    }

    pub fn with_rules(self, rules: stacker_control::EligibilityRules) -> Self {
        Self {
            engine: self.engine.with_eligibility(rules),
            ..self
        }
    }

    /// Unloads a region the way a host does: notify first, then drop it.
    pub fn unload(&self, chunk: &ChunkPos) -> stacker_control::UnloadOutcome {
        let outcome = self.engine.on_chunk_unload(chunk);
        self.world.unload(chunk);
        outcome
    }

    /// Loads a region the way a host does: load it, then notify.
    pub fn load(&self, chunk: &ChunkPos) -> stacker_control::LoadOutcome {
        self.world.load(chunk);
        self.engine.on_chunk_load(chunk)
    }

    /// Returns `true` if `key` is in the live cache.
    pub fn is_live(&self, kind: ObjectKind, key: &StackKey) -> bool {
        self.engine.get(kind, key).is_some()
    }

    /// Returns `true` if `key` is in the overflow cache.
    pub fn is_overflow(&self, kind: ObjectKind, key: &StackKey) -> bool {
        self.engine.store().overflow(kind).contains(key)
    }
}

pub fn chunk(x: i32, z: i32) -> ChunkPos {
    ChunkPos::new("world", x, z)
}
