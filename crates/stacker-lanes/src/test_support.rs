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

//! Shared fixtures for the lane unit tests.

use crate::{EligibilityRules, LaneContext};
use stacker_core::{
    CachePolicy, ChunkPos, ObjectHandle, ObjectKind, StackKey, StackNotifier, WorldView,
};
use stacker_data::StackStore;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct TestWorld {
    objects: Mutex<HashMap<StackKey, ObjectHandle>>,
    loaded: Mutex<HashSet<ChunkPos>>,
}

impl TestWorld {
    pub(crate) fn put(&self, handle: ObjectHandle) {
        self.loaded.lock().unwrap().insert(handle.chunk.clone());
        self.objects
            .lock()
            .unwrap()
            .insert(handle.key.clone(), handle);
    }

    pub(crate) fn take(&self, key: &StackKey) {
        self.objects.lock().unwrap().remove(key);
    }

    pub(crate) fn load(&self, chunk: &ChunkPos) {
        self.loaded.lock().unwrap().insert(chunk.clone());
    }

    pub(crate) fn unload(&self, chunk: &ChunkPos) {
        self.loaded.lock().unwrap().remove(chunk);
    }
}

impl WorldView for TestWorld {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Note {
    CreateDisplay(StackKey),
    RemoveDisplay(StackKey),
    DeleteLabel(StackKey),
    RefreshNerf(StackKey),
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notes: Mutex<Vec<Note>>,
}

impl RecordingNotifier {
    pub(crate) fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }
}

impl StackNotifier for RecordingNotifier {
    fn create_display(&self, key: &StackKey) {
        self.notes
            .lock()
            .unwrap()
            .push(Note::CreateDisplay(key.clone()));
    }

    fn remove_display(&self, key: &StackKey) {
        self.notes
            .lock()
            .unwrap()
            .push(Note::RemoveDisplay(key.clone()));
    }

    fn delete_label(&self, key: &StackKey) {
        self.notes.lock().unwrap().push(Note::DeleteLabel(key.clone()));
    }

    fn refresh_nerf(&self, key: &StackKey) {
        self.notes.lock().unwrap().push(Note::RefreshNerf(key.clone()));
    }
}

#[derive(Default)]
pub(crate) struct Fixture {
    pub(crate) store: StackStore,
    pub(crate) world: TestWorld,
    pub(crate) notifier: RecordingNotifier,
    pub(crate) policy: CachePolicy,
    pub(crate) rules: EligibilityRules,
}

impl Fixture {
    pub(crate) fn ctx(&self) -> LaneContext<'_> {
        LaneContext {
            store: &self.store,
            world: &self.world,
            notifier: &self.notifier,
            policy: &self.policy,
            rules: &self.rules,
        }
    }
}
