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

//! # Stacker Lanes
//!
//! The passes that move state between the caches: get-or-create and the
//! region transitions ([`ReconciliationLane`]), the global consistency pass
//! ([`SweepLane`]) and the durable flush ([`PersistLane`]).
//!
//! Lanes hold no state of their own. Every pass receives a [`LaneContext`]
//! bundling the store with its collaborators, so the same lane can be driven
//! from the host's main thread or from a background worker.

#![warn(missing_docs)]

mod context;
mod deferred;
mod eligibility;
mod persist;
mod reconcile;
mod sweep;

#[cfg(test)]
mod test_support;

pub use context::LaneContext;
pub use deferred::{DeferredQueue, DeferredTask};
pub use eligibility::{EligibilityRules, PersistencePredicate};
pub use persist::{PersistLane, PersistPlan, PersistReport, TableSnapshot};
pub use reconcile::{LoadOutcome, Lookup, ReconciliationLane, UnloadOutcome};
pub use sweep::{SweepLane, SweepReport};

/// Per-kind counters shared by the pass reports.
pub type KindCounts = [usize; 4];
