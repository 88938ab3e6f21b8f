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

//! # Stacker IO
//!
//! Implementations of [`DurableSink`](stacker_core::DurableSink):
//!
//! - [`MemoryStore`]: tables held in memory, with an operation log and
//!   failure injection. Used by tests and by hosts that only want the cache.
//! - [`RonFileStore`]: one human-readable RON file per table, replaced
//!   atomically on every write.

#![warn(missing_docs)]

mod file;
mod memory;

pub use file::RonFileStore;
pub use memory::{MemoryStore, SinkOp};
