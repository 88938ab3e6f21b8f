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

use stacker_core::{DurableSink, ObjectKind, PersistedRow, SinkError, SinkResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError, RwLock};

/// One call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    /// `clear_table(kind)`.
    Clear(ObjectKind),
    /// `batch_insert(kind, rows)` with the number of rows.
    Insert(ObjectKind, usize),
}

/// In-memory durable sink using `RwLock<HashMap>`.
///
/// Every accepted call is appended to an operation log. Kinds marked with
/// [`reject`](Self::reject) fail their inserts with [`SinkError::Rejected`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<ObjectKind, Vec<PersistedRow>>>,
    ops: Mutex<Vec<SinkOp>>,
    rejecting: Mutex<HashSet<ObjectKind>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills a table without logging an operation.
    pub fn seed(&self, kind: ObjectKind, rows: Vec<PersistedRow>) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, rows);
    }

    /// The rows currently in a table.
    pub fn rows(&self, kind: ObjectKind) -> Vec<PersistedRow> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// The operations accepted so far, oldest first.
    pub fn ops(&self) -> Vec<SinkOp> {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forgets the operation log.
    pub fn clear_ops(&self) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Makes inserts into a table fail.
    pub fn reject(&self, kind: ObjectKind) {
        self.rejecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind);
    }

    /// Undoes [`reject`](Self::reject).
    pub fn accept(&self, kind: ObjectKind) {
        self.rejecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind);
    }

    fn log(&self, op: SinkOp) {
        self.ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }
}

impl DurableSink for MemoryStore {
    fn clear_table(&self, kind: ObjectKind) -> SinkResult<()> {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind);
        self.log(SinkOp::Clear(kind));
        Ok(())
    }

    fn batch_insert(&self, kind: ObjectKind, rows: &[PersistedRow]) -> SinkResult<()> {
        let rejected = self
            .rejecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&kind);
        if rejected {
            return Err(SinkError::Rejected {
                table: kind.table_name(),
                reason: "table is rejecting writes".to_string(),
            });
        }
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .extend_from_slice(rows);
        self.log(SinkOp::Insert(kind, rows.len()));
        Ok(())
    }

    fn load_table(&self, kind: ObjectKind) -> SinkResult<Vec<PersistedRow>> {
        Ok(self.rows(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacker_core::{BlockPos, StackKey};

    fn row(x: i32, amount: u32) -> PersistedRow {
        PersistedRow::new(StackKey::Block(BlockPos::new("w", x, 64, 0)), amount)
    }

    #[test]
    fn test_clear_then_insert_replaces_the_table() {
        // Arrange
        let store = MemoryStore::new();
        store.seed(ObjectKind::Spawner, vec![row(1, 2), row(2, 3)]);

        // Act
        store.clear_table(ObjectKind::Spawner).unwrap();
        store.batch_insert(ObjectKind::Spawner, &[row(3, 6)]).unwrap();

        // Assert
        assert_eq!(store.rows(ObjectKind::Spawner), vec![row(3, 6)]);
        assert_eq!(
            store.ops(),
            vec![
                SinkOp::Clear(ObjectKind::Spawner),
                SinkOp::Insert(ObjectKind::Spawner, 1)
            ]
        );
    }

    #[test]
    fn test_rejected_insert_leaves_table_untouched() {
        let store = MemoryStore::new();
        store.reject(ObjectKind::Item);

        let result = store.batch_insert(ObjectKind::Item, &[row(1, 2)]);

        assert!(matches!(result, Err(SinkError::Rejected { table: "items", .. })));
        assert!(store.rows(ObjectKind::Item).is_empty());
        assert!(store.ops().is_empty());

        store.accept(ObjectKind::Item);
        assert!(store.batch_insert(ObjectKind::Item, &[row(1, 2)]).is_ok());
    }
}
