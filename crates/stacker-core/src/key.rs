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

//! Identity keys and region coordinates for stacked objects.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// Number of bits a block coordinate is shifted by to obtain its chunk coordinate.
pub const CHUNK_SHIFT: u32 = 4;

/// The four kinds of objects the stacking cache tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A living, mobile creature keyed by its UUID.
    Creature,
    /// A dropped item entity keyed by its UUID.
    Item,
    /// A spawner block keyed by its world coordinate.
    Spawner,
    /// A container block keyed by its world coordinate.
    Container,
}

impl ObjectKind {
    /// Every kind, in the order passes visit them.
    pub const ALL: [ObjectKind; 4] = [
        ObjectKind::Creature,
        ObjectKind::Item,
        ObjectKind::Spawner,
        ObjectKind::Container,
    ];

    /// Returns `true` for block-backed kinds whose key is a world coordinate.
    pub fn is_fixed(self) -> bool {
        matches!(self, ObjectKind::Spawner | ObjectKind::Container)
    }

    /// The name of the durable table holding rows of this kind.
    pub fn table_name(self) -> &'static str {
        match self {
            ObjectKind::Creature => "entities",
            ObjectKind::Item => "items",
            ObjectKind::Spawner => "spawners",
            ObjectKind::Container => "barrels",
        }
    }

    /// A dense index usable for per-kind arrays.
    pub fn index(self) -> usize {
        match self {
            ObjectKind::Creature => 0,
            ObjectKind::Item => 1,
            ObjectKind::Spawner => 2,
            ObjectKind::Container => 3,
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Creature => "creature",
            ObjectKind::Item => "item",
            ObjectKind::Spawner => "spawner",
            ObjectKind::Container => "container",
        };
        f.write_str(name)
    }
}

/// A region of a world: the unit of load/unload notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    /// The name of the world the chunk belongs to.
    pub world: String,
    /// Chunk x coordinate.
    pub x: i32,
    /// Chunk z coordinate.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a new `ChunkPos`.
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }
}

impl Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {}]", self.world, self.x, self.z)
    }
}

/// An absolute block coordinate inside a named world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// The name of the world the block belongs to.
    pub world: String,
    /// Block x coordinate.
    pub x: i32,
    /// Block y coordinate.
    pub y: i32,
    /// Block z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Creates a new `BlockPos`.
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Returns the chunk this block lies in.
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::new(
            self.world.clone(),
            self.x >> CHUNK_SHIFT,
            self.z >> CHUNK_SHIFT,
        )
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {}, {})", self.world, self.x, self.y, self.z)
    }
}

/// The identity of a stacked object.
///
/// Mobile objects (creatures, items) are identified by their UUID, fixed
/// objects (spawners, containers) by the coordinate of their block. A key never
/// changes once a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StackKey {
    /// The UUID of a creature or item entity.
    Entity(Uuid),
    /// The coordinate of a spawner or container block.
    Block(BlockPos),
}

impl StackKey {
    /// Returns the UUID if this is an entity key.
    pub fn as_entity(&self) -> Option<Uuid> {
        match self {
            StackKey::Entity(id) => Some(*id),
            StackKey::Block(_) => None,
        }
    }

    /// Returns the block coordinate if this is a block key.
    pub fn as_block(&self) -> Option<&BlockPos> {
        match self {
            StackKey::Block(pos) => Some(pos),
            StackKey::Entity(_) => None,
        }
    }

    /// Returns the chunk of a block key. Entity keys carry no position.
    pub fn fixed_chunk(&self) -> Option<ChunkPos> {
        self.as_block().map(BlockPos::chunk)
    }
}

impl From<Uuid> for StackKey {
    fn from(id: Uuid) -> Self {
        StackKey::Entity(id)
    }
}

impl From<BlockPos> for StackKey {
    fn from(pos: BlockPos) -> Self {
        StackKey::Block(pos)
    }
}

impl Display for StackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKey::Entity(id) => write!(f, "{id}"),
            StackKey::Block(pos) => write!(f, "{pos}"),
        }
    }
}
