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

//! Fire-and-forget notifications toward the decoration layer.

use crate::key::StackKey;

/// Receives side-effect notifications produced by the cache.
///
/// Every method is fire-and-forget; the cache never waits for or inspects an
/// acknowledgement. Implementations that touch the simulation must marshal
/// the work onto the host's main thread themselves.
pub trait StackNotifier: Send + Sync {
    /// A container's display block should be created.
    fn create_display(&self, _key: &StackKey) {}

    /// A container's display block should be torn down.
    fn remove_display(&self, _key: &StackKey) {}

    /// The floating label of an object should be deleted.
    fn delete_label(&self, _key: &StackKey) {}

    /// A creature's nerf status should be recomputed.
    fn refresh_nerf(&self, _key: &StackKey) {}
}

/// A notifier that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl StackNotifier for NoopNotifier {}
