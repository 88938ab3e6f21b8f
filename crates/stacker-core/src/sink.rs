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

//! The contract of the durable store the persistence pass flushes into.

use crate::cause::SpawnCause;
use crate::key::{ObjectKind, StackKey};
use serde::{Deserialize, Serialize};

/// The item a stacked container holds, carried through unload and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPayload {
    /// The item type stored in the container.
    pub item_type: String,
    /// Opaque serialized item data owned by the host.
    #[serde(default)]
    pub data: Vec<u8>,
}

impl ContainerPayload {
    /// Creates a payload for an item type with no extra data.
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            data: Vec::new(),
        }
    }
}

/// One row of a durable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRow {
    /// The identity of the stacked object.
    pub key: StackKey,
    /// The stack amount.
    pub amount: u32,
    /// The spawn cause, present for creatures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<SpawnCause>,
    /// The held item, present for containers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<ContainerPayload>,
}

impl PersistedRow {
    /// Creates a row without cause or payload.
    pub fn new(key: StackKey, amount: u32) -> Self {
        Self {
            key,
            amount,
            cause: None,
            payload: None,
        }
    }
}

/// An error raised by a durable sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The underlying storage could not be read or written.
    #[error("I/O error on table '{table}': {source}")]
    Io {
        /// The table being accessed.
        table: &'static str,
        /// The originating error.
        #[source]
        source: std::io::Error,
    },
    /// Rows could not be encoded for storage.
    #[error("failed to encode table '{table}': {message}")]
    Encode {
        /// The table being written.
        table: &'static str,
        /// A description of the failure.
        message: String,
    },
    /// Stored rows could not be decoded.
    #[error("failed to decode table '{table}': {message}")]
    Decode {
        /// The table being read.
        table: &'static str,
        /// A description of the failure.
        message: String,
    },
    /// The sink refused the batch.
    #[error("batch rejected for table '{table}': {reason}")]
    Rejected {
        /// The table the batch was destined for.
        table: &'static str,
        /// Why it was refused.
        reason: String,
    },
}

/// A specialized `Result` type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// An opaque batched store with one table per [`ObjectKind`].
///
/// The persistence pass only ever issues `clear_table` followed by at most
/// one `batch_insert` per kind, so a table always mirrors a single snapshot.
/// No partial-failure semantics are assumed: a failed call aborts the pass,
/// which is retried on the next period.
pub trait DurableSink: Send + Sync {
    /// Removes every row of the kind's table.
    fn clear_table(&self, kind: ObjectKind) -> SinkResult<()>;

    /// Inserts all rows into the kind's table in one batch.
    fn batch_insert(&self, kind: ObjectKind, rows: &[PersistedRow]) -> SinkResult<()>;

    /// Reads back every row of the kind's table. Used for warm restarts.
    fn load_table(&self, kind: ObjectKind) -> SinkResult<Vec<PersistedRow>>;
}
