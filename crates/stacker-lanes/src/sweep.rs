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

//! A lane for evicting live records whose object is gone.

use crate::context::LaneContext;
use crate::KindCounts;
use stacker_core::ObjectKind;

/// What a sweep did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Records evicted, per kind.
    pub evicted: KindCounts,
    /// Records left alone because their region is not loaded.
    pub skipped: usize,
    /// Mobile records moved to the region their object now occupies.
    pub rehomed: usize,
    /// Living creatures whose nerf status was refreshed.
    pub refreshed: usize,
}

impl SweepReport {
    /// Records evicted for one kind.
    pub fn evicted(&self, kind: ObjectKind) -> usize {
        self.evicted[kind.index()]
    }

    /// Records evicted across every kind.
    pub fn total_evicted(&self) -> usize {
        self.evicted.iter().sum()
    }
}

/// The global consistency pass over every live cache.
///
/// Works on a snapshot of each kind. A record is only evicted if it is still
/// the one the snapshot saw, so a record replaced mid-pass survives.
#[derive(Debug, Default)]
pub struct SweepLane;

impl SweepLane {
    /// Creates a new `SweepLane`.
    pub fn new() -> Self {
        Self
    }

    /// Runs one sweep.
    pub fn run(&self, ctx: &LaneContext<'_>) -> SweepReport {
        let mut report = SweepReport::default();

        for kind in ObjectKind::ALL {
            let live = ctx.store.live(kind);
            for record in live.snapshot() {
                let chunk = record.chunk();
                if !ctx.world.is_chunk_loaded(&chunk) {
                    report.skipped += 1;
                    continue;
                }

                let resolved = ctx.world.resolve(kind, record.key());
                let stale = match &resolved {
                    None => true,
                    // Blocks resolve to nothing once they stop matching.
                    Some(_) if kind.is_fixed() => false,
                    Some(handle) => handle.dead && !record.has_dead_flag(),
                };

                if stale {
                    if live.remove_if_same(&record) {
                        report.evicted[kind.index()] += 1;
                        if kind == ObjectKind::Container {
                            ctx.notifier.remove_display(record.key());
                        }
                    }
                    continue;
                }

                let Some(handle) = resolved else { continue };
                if kind.is_fixed() {
                    continue;
                }
                if handle.chunk != chunk
                    && ctx.world.is_chunk_loaded(&handle.chunk)
                    && live.relocate(record.key(), handle.chunk.clone())
                {
                    report.rehomed += 1;
                }
                if kind == ObjectKind::Creature && !handle.dead {
                    ctx.notifier.refresh_nerf(record.key());
                    report.refreshed += 1;
                }
            }
        }

        log::debug!(
            "Sweep evicted {:?} (skipped {}, rehomed {})",
            report.evicted,
            report.skipped,
            report.rehomed
        );
        report
    }
}
