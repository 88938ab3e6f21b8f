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

//! # Stacker Control
//!
//! The host-facing layer of the stacking cache.
//!
//! - [`StackEngine`] owns the caches and exposes every operation the host
//!   calls from its main thread: get-or-create, removal, region transitions
//!   and the per-tick drain of deferred checks.
//! - [`StackerService`] runs the sweep and the periodic persistence on
//!   background threads, and flushes the caches when stopped.
//! - [`StackerConfig`] holds intervals and policies, loadable from RON.

#![warn(missing_docs)]

mod config;
mod engine;
mod service;

pub use config::StackerConfig;
pub use engine::StackEngine;
pub use service::StackerService;

pub use stacker_lanes::{
    EligibilityRules, LoadOutcome, PersistPlan, PersistReport, PersistencePredicate,
    SweepReport, UnloadOutcome,
};
