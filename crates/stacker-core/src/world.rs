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

//! Defines the [`WorldView`] trait, the read-only window onto the host simulation.

use crate::cause::SpawnCause;
use crate::key::{BlockPos, ChunkPos, ObjectKind, StackKey};
use crate::sink::ContainerPayload;
use uuid::Uuid;

/// A transient description of a simulation object, as reported by the host.
///
/// Handles are never stored by the cache. A stack record only keeps the key
/// and resolves a fresh handle through [`WorldView::resolve`] whenever it
/// needs to know whether its object still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHandle {
    /// The kind of object.
    pub kind: ObjectKind,
    /// The object's identity.
    pub key: StackKey,
    /// Entity type, item material, spawned type or container item type.
    pub type_name: String,
    /// The chunk the object currently occupies.
    pub chunk: ChunkPos,
    /// Whether the object reports itself dead.
    pub dead: bool,
    /// Whether the object is a player.
    pub player: bool,
    /// The spawn cause tagged on a creature, if any.
    pub spawn_cause: Option<SpawnCause>,
    /// The item held by a container.
    pub payload: Option<ContainerPayload>,
}

impl ObjectHandle {
    fn base(kind: ObjectKind, key: StackKey, type_name: String, chunk: ChunkPos) -> Self {
        Self {
            kind,
            key,
            type_name,
            chunk,
            dead: false,
            player: false,
            spawn_cause: None,
            payload: None,
        }
    }

    /// A living creature handle.
    pub fn creature(id: Uuid, entity_type: impl Into<String>, chunk: ChunkPos) -> Self {
        Self::base(ObjectKind::Creature, id.into(), entity_type.into(), chunk)
    }

    /// A dropped item handle.
    pub fn item(id: Uuid, material: impl Into<String>, chunk: ChunkPos) -> Self {
        Self::base(ObjectKind::Item, id.into(), material.into(), chunk)
    }

    /// A spawner block handle.
    pub fn spawner(pos: BlockPos, spawned_type: impl Into<String>) -> Self {
        let chunk = pos.chunk();
        Self::base(ObjectKind::Spawner, pos.into(), spawned_type.into(), chunk)
    }

    /// A container block handle.
    pub fn container(pos: BlockPos, payload: ContainerPayload) -> Self {
        let chunk = pos.chunk();
        let type_name = payload.item_type.clone();
        let mut handle = Self::base(ObjectKind::Container, pos.into(), type_name, chunk);
        handle.payload = Some(payload);
        handle
    }

    /// Tags the handle with a spawn cause.
    pub fn with_cause(mut self, cause: SpawnCause) -> Self {
        self.spawn_cause = Some(cause);
        self
    }

    /// Marks the handle as dead.
    pub fn dead(mut self) -> Self {
        self.dead = true;
        self
    }

    /// Marks the handle as a player.
    pub fn player(mut self) -> Self {
        self.player = true;
        self
    }

    /// The world the object lives in.
    pub fn world(&self) -> &str {
        &self.chunk.world
    }
}

/// Read-only access to the host simulation.
///
/// Implementations must be callable from background workers: they answer
/// from whatever thread-safe view the host maintains and never mutate the
/// simulation.
pub trait WorldView: Send + Sync {
    /// Returns `true` if the chunk is currently loaded.
    fn is_chunk_loaded(&self, chunk: &ChunkPos) -> bool;

    /// Resolves a key to the object currently behind it.
    ///
    /// For mobile kinds, returns `None` once the entity no longer exists. For
    /// fixed kinds, returns `None` when the block at the position no longer
    /// matches the expected kind.
    fn resolve(&self, kind: ObjectKind, key: &StackKey) -> Option<ObjectHandle>;

    /// Lists the objects currently inside a chunk.
    fn handles_in_chunk(&self, chunk: &ChunkPos) -> Vec<ObjectHandle>;
}
