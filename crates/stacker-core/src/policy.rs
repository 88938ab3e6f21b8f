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

//! Cacheability and storage policies, read from configuration.

use crate::key::ObjectKind;
use crate::world::ObjectHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stacking policy for a single object kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindPolicy {
    /// Master switch for stacking this kind.
    pub stacking_enabled: bool,
    /// Types allowed to stack. Empty means every type.
    pub whitelist: HashSet<String>,
    /// Types never stacked.
    pub blacklist: HashSet<String>,
    /// Worlds in which this kind never stacks.
    pub disabled_worlds: HashSet<String>,
}

impl Default for KindPolicy {
    fn default() -> Self {
        Self {
            stacking_enabled: true,
            whitelist: HashSet::new(),
            blacklist: HashSet::new(),
            disabled_worlds: HashSet::new(),
        }
    }
}

impl KindPolicy {
    /// Returns `true` if the type passes the whitelist.
    pub fn is_whitelisted(&self, type_name: &str) -> bool {
        self.whitelist.is_empty() || self.whitelist.contains(type_name)
    }

    /// Returns `true` if the type is blacklisted.
    pub fn is_blacklisted(&self, type_name: &str) -> bool {
        self.blacklist.contains(type_name)
    }

    /// Returns `true` if stacking is disabled in the world.
    pub fn is_world_disabled(&self, world: &str) -> bool {
        self.disabled_worlds.contains(world)
    }

    /// Returns `true` if the object may be stacked under this policy.
    pub fn allows(&self, handle: &ObjectHandle) -> bool {
        self.stacking_enabled
            && self.is_whitelisted(&handle.type_name)
            && !self.is_blacklisted(&handle.type_name)
            && !self.is_world_disabled(handle.world())
    }
}

fn default_excluded_entity_types() -> HashSet<String> {
    HashSet::from(["ARMOR_STAND".to_string()])
}

/// Decides which observed objects enter the live cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Policy for creatures.
    pub creatures: KindPolicy,
    /// Policy for dropped items.
    pub items: KindPolicy,
    /// Policy for spawner blocks.
    pub spawners: KindPolicy,
    /// Policy for container blocks.
    pub containers: KindPolicy,
    /// Decoration entity types that are never cached.
    pub excluded_entity_types: HashSet<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            creatures: KindPolicy::default(),
            items: KindPolicy::default(),
            spawners: KindPolicy::default(),
            containers: KindPolicy::default(),
            excluded_entity_types: default_excluded_entity_types(),
        }
    }
}

impl CachePolicy {
    /// Returns the policy for a kind.
    pub fn for_kind(&self, kind: ObjectKind) -> &KindPolicy {
        match kind {
            ObjectKind::Creature => &self.creatures,
            ObjectKind::Item => &self.items,
            ObjectKind::Spawner => &self.spawners,
            ObjectKind::Container => &self.containers,
        }
    }

    /// Returns a mutable reference to the policy for a kind.
    pub fn for_kind_mut(&mut self, kind: ObjectKind) -> &mut KindPolicy {
        match kind {
            ObjectKind::Creature => &mut self.creatures,
            ObjectKind::Item => &mut self.items,
            ObjectKind::Spawner => &mut self.spawners,
            ObjectKind::Container => &mut self.containers,
        }
    }

    /// Returns `true` if the object should be inserted into the live cache.
    pub fn is_cacheable(&self, handle: &ObjectHandle) -> bool {
        if handle.player {
            return false;
        }
        if handle.kind == ObjectKind::Creature
            && self.excluded_entity_types.contains(&handle.type_name)
        {
            return false;
        }
        self.for_kind(handle.kind).allows(handle)
    }
}

/// Which kinds the persistence pass writes to the durable store.
///
/// A disabled kind still has its table cleared on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreFlags {
    /// Persist creatures.
    pub creatures: bool,
    /// Persist dropped items.
    pub items: bool,
    /// Persist spawners.
    pub spawners: bool,
    /// Persist containers.
    pub containers: bool,
}

impl Default for StoreFlags {
    fn default() -> Self {
        Self {
            creatures: true,
            items: true,
            spawners: true,
            containers: true,
        }
    }
}

impl StoreFlags {
    /// Returns `true` if the kind is persisted.
    pub fn stores(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Creature => self.creatures,
            ObjectKind::Item => self.items,
            ObjectKind::Spawner => self.spawners,
            ObjectKind::Container => self.containers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{BlockPos, ChunkPos};
    use uuid::Uuid;

    fn zombie() -> ObjectHandle {
        ObjectHandle::creature(Uuid::new_v4(), "ZOMBIE", ChunkPos::new("world", 0, 0))
    }

    #[test]
    fn test_default_policy_caches_regular_objects() {
        let policy = CachePolicy::default();
        assert!(policy.is_cacheable(&zombie()));
        assert!(policy.is_cacheable(&ObjectHandle::spawner(
            BlockPos::new("world", 1, 2, 3),
            "PIG"
        )));
    }

    #[test]
    fn test_players_and_decorations_are_never_cached() {
        let policy = CachePolicy::default();
        assert!(!policy.is_cacheable(&zombie().player()));
        let stand =
            ObjectHandle::creature(Uuid::new_v4(), "ARMOR_STAND", ChunkPos::new("world", 0, 0));
        assert!(!policy.is_cacheable(&stand));
    }

    #[test]
    fn test_whitelist_blacklist_and_worlds() {
        let mut policy = CachePolicy::default();
        policy.creatures.whitelist.insert("COW".to_string());
        assert!(!policy.is_cacheable(&zombie()));

        policy.creatures.whitelist.clear();
        policy.creatures.blacklist.insert("ZOMBIE".to_string());
        assert!(!policy.is_cacheable(&zombie()));

        policy.creatures.blacklist.clear();
        policy.creatures.disabled_worlds.insert("world".to_string());
        assert!(!policy.is_cacheable(&zombie()));

        policy.creatures.disabled_worlds.clear();
        policy.creatures.stacking_enabled = false;
        assert!(!policy.is_cacheable(&zombie()));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let policy: CachePolicy =
            ron::from_str("(items: (stacking_enabled: false))").expect("valid policy");
        assert!(!policy.items.stacking_enabled);
        assert!(policy.creatures.stacking_enabled);
        assert!(policy.excluded_entity_types.contains("ARMOR_STAND"));
    }
}
