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

//! Spawn causes recorded on creatures.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Why a creature came into existence.
///
/// The durable store keeps the cause by its upper-case name
/// (e.g. `"SPAWNER"`, `"CHUNK_GEN"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpawnCause {
    /// Spawned naturally by the world.
    #[default]
    Natural,
    /// Created together with a freshly generated chunk.
    ChunkGen,
    /// Spawned by a spawner block.
    Spawner,
    /// Spawned from a spawn egg used on a spawner.
    SpawnerEgg,
    /// Spawned by a plugin or command.
    Custom,
    /// Born from two breeding parents.
    Breeding,
    /// Hatched from a thrown egg.
    Egg,
    /// Created by a lightning strike.
    Lightning,
    /// Spawned as a mount or rider.
    Jockey,
    /// Called in as reinforcements.
    Reinforcements,
    /// Converted by an infection.
    Infection,
    /// Cured from an infected state.
    Cured,
    /// Built by a player (golems, withers).
    BuildStructure,
}

impl SpawnCause {
    /// Every known cause.
    pub const ALL: [SpawnCause; 13] = [
        SpawnCause::Natural,
        SpawnCause::ChunkGen,
        SpawnCause::Spawner,
        SpawnCause::SpawnerEgg,
        SpawnCause::Custom,
        SpawnCause::Breeding,
        SpawnCause::Egg,
        SpawnCause::Lightning,
        SpawnCause::Jockey,
        SpawnCause::Reinforcements,
        SpawnCause::Infection,
        SpawnCause::Cured,
        SpawnCause::BuildStructure,
    ];

    /// Returns `true` when a singleton creature with this cause is still worth
    /// persisting. Natural and chunk-generation spawns are rediscovered for free.
    pub fn is_persistence_eligible(self) -> bool {
        !matches!(self, SpawnCause::Natural | SpawnCause::ChunkGen)
    }

    /// The upper-case name used by the durable store.
    pub fn name(self) -> &'static str {
        match self {
            SpawnCause::Natural => "NATURAL",
            SpawnCause::ChunkGen => "CHUNK_GEN",
            SpawnCause::Spawner => "SPAWNER",
            SpawnCause::SpawnerEgg => "SPAWNER_EGG",
            SpawnCause::Custom => "CUSTOM",
            SpawnCause::Breeding => "BREEDING",
            SpawnCause::Egg => "EGG",
            SpawnCause::Lightning => "LIGHTNING",
            SpawnCause::Jockey => "JOCKEY",
            SpawnCause::Reinforcements => "REINFORCEMENTS",
            SpawnCause::Infection => "INFECTION",
            SpawnCause::Cured => "CURED",
            SpawnCause::BuildStructure => "BUILD_STRUCTURE",
        }
    }
}

impl Display for SpawnCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a cause name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown spawn cause '{0}'")]
pub struct UnknownSpawnCause(pub String);

impl FromStr for SpawnCause {
    type Err = UnknownSpawnCause;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        SpawnCause::ALL
            .into_iter()
            .find(|cause| cause.name() == normalized)
            .ok_or_else(|| UnknownSpawnCause(s.to_string()))
    }
}
