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

//! # Stacker Core
//!
//! Foundational crate containing the identity keys, object kinds, and the
//! interface contracts through which the stacking cache talks to the host
//! simulation, the durable store, and the decoration layer.

#![warn(missing_docs)]

pub mod cause;
pub mod key;
pub mod notify;
pub mod policy;
pub mod sink;
pub mod world;

pub use cause::SpawnCause;
pub use key::{BlockPos, ChunkPos, ObjectKind, StackKey};
pub use notify::{NoopNotifier, StackNotifier};
pub use policy::{CachePolicy, KindPolicy, StoreFlags};
pub use sink::{ContainerPayload, DurableSink, PersistedRow, SinkError, SinkResult};
pub use world::{ObjectHandle, WorldView};
