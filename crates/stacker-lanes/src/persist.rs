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

//! A lane for flushing the caches to the durable sink.
//!
//! A pass has two halves. [`PersistLane::plan`] merges live and overflow
//! state into one snapshot per kind and runs wherever it is convenient.
//! [`PersistLane::execute`] writes a plan as clear-then-insert per table and
//! must be serialized against other executions by the caller.

use crate::eligibility::EligibilityRules;
use crate::KindCounts;
use stacker_core::{DurableSink, ObjectKind, PersistedRow, SinkResult, StackKey, StoreFlags};
use stacker_data::StackStore;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// The merged rows of one durable table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// The kind the table holds.
    pub kind: ObjectKind,
    /// Whether rows are written. A disabled table is still cleared.
    pub enabled: bool,
    /// The rows, ordered by key.
    pub rows: Vec<PersistedRow>,
}

/// One snapshot per kind, ready to be written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistPlan {
    /// The tables, in [`ObjectKind::ALL`] order.
    pub tables: Vec<TableSnapshot>,
    /// Ineligible live records removed while planning, per kind.
    pub dropped_live: KindCounts,
    /// Ineligible overflow entries removed while planning, per kind.
    pub dropped_overflow: KindCounts,
}

impl PersistPlan {
    /// The snapshot of one kind.
    pub fn table(&self, kind: ObjectKind) -> Option<&TableSnapshot> {
        self.tables.iter().find(|table| table.kind == kind)
    }

    /// The number of rows across every table.
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|table| table.rows.len()).sum()
    }
}

/// What a written plan did to the sink.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PersistReport {
    /// Rows inserted, per kind.
    pub written: KindCounts,
    /// Tables cleared.
    pub cleared: usize,
}

impl PersistReport {
    /// Rows inserted for one kind.
    pub fn rows(&self, kind: ObjectKind) -> usize {
        self.written[kind.index()]
    }

    /// Rows inserted across every kind.
    pub fn total_rows(&self) -> usize {
        self.written.iter().sum()
    }
}

/// The persistence pass.
#[derive(Debug, Default, Clone)]
pub struct PersistLane {
    flags: StoreFlags,
}

impl PersistLane {
    /// Creates a lane writing the kinds enabled in `flags`.
    pub fn new(flags: StoreFlags) -> Self {
        Self { flags }
    }

    /// Merges live and overflow state into one snapshot per kind.
    ///
    /// Eligible live records seed the snapshot. Eligible overflow entries are
    /// folded in, keeping the larger amount when a key appears on both sides.
    /// Ineligible records and entries are removed from the caches as a side
    /// effect. Overflow entries that survive stay in overflow.
    pub fn plan(&self, store: &StackStore, rules: &EligibilityRules) -> PersistPlan {
        let mut plan = PersistPlan::default();

        for kind in ObjectKind::ALL {
            let cache = store.cache(kind);
            let mut merged: BTreeMap<StackKey, PersistedRow> = BTreeMap::new();

            for record in cache.live.snapshot() {
                if rules.record_is_eligible(&record) {
                    merged.insert(record.key().clone(), record.to_row());
                } else if cache.live.remove_if_same(&record) {
                    plan.dropped_live[kind.index()] += 1;
                }
            }

            plan.dropped_overflow[kind.index()] = cache
                .overflow
                .retain(|_, entry| rules.entry_is_eligible(kind, entry));

            for (key, entry) in cache.overflow.snapshot() {
                match merged.entry(key) {
                    Entry::Occupied(mut slot) => {
                        if entry.amount > slot.get().amount {
                            let key = slot.key().clone();
                            slot.insert(entry.into_row(key));
                        }
                    }
                    Entry::Vacant(slot) => {
                        let key = slot.key().clone();
                        slot.insert(entry.into_row(key));
                    }
                }
            }

            plan.tables.push(TableSnapshot {
                kind,
                enabled: self.flags.stores(kind),
                rows: merged.into_values().collect(),
            });
        }

        plan
    }

    /// Writes a plan: every table is cleared, then enabled non-empty tables
    /// receive their rows in one batch.
    ///
    /// The first sink error aborts the rest of the plan.
    pub fn execute(
        &self,
        sink: &dyn DurableSink,
        plan: &PersistPlan,
    ) -> SinkResult<PersistReport> {
        let mut report = PersistReport::default();
        for table in &plan.tables {
            sink.clear_table(table.kind)?;
            report.cleared += 1;
            if table.enabled && !table.rows.is_empty() {
                sink.batch_insert(table.kind, &table.rows)?;
                report.written[table.kind.index()] = table.rows.len();
            }
        }
        log::info!(
            "Persisted {} rows across {} tables {:?}",
            report.total_rows(),
            report.cleared,
            report.written
        );
        Ok(report)
    }
}
