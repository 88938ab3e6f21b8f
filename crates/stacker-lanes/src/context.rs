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

use crate::eligibility::EligibilityRules;
use stacker_core::{CachePolicy, StackNotifier, WorldView};
use stacker_data::StackStore;

/// Everything a lane needs to run one pass.
#[derive(Clone, Copy)]
pub struct LaneContext<'a> {
    /// The caches being reconciled.
    pub store: &'a StackStore,
    /// Read-only view of the host simulation.
    pub world: &'a dyn WorldView,
    /// Sink for decoration side effects.
    pub notifier: &'a dyn StackNotifier,
    /// Which objects may enter the live cache.
    pub policy: &'a CachePolicy,
    /// Which records are worth keeping across unloads and restarts.
    pub rules: &'a EligibilityRules,
}
