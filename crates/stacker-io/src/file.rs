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

//! A durable sink storing each table as a RON file.

use stacker_core::{DurableSink, ObjectKind, PersistedRow, SinkError, SinkResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Stores each table in `<dir>/<table>.ron`.
///
/// Files are rewritten through a temporary file and a rename, so a crash in
/// the middle of a write leaves the previous version intact. A missing file
/// reads as an empty table.
#[derive(Debug)]
pub struct RonFileStore {
    dir: PathBuf,
    // Serializes read-modify-write sequences on the files.
    guard: Mutex<()>,
}

impl RonFileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::debug!("Opened RON table store at {}", dir.display());
        Ok(Self {
            dir,
            guard: Mutex::new(()),
        })
    }

    /// The directory holding the table files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file backing a table.
    pub fn table_path(&self, kind: ObjectKind) -> PathBuf {
        self.dir.join(format!("{}.ron", kind.table_name()))
    }

    fn read_rows(&self, kind: ObjectKind) -> SinkResult<Vec<PersistedRow>> {
        let table = kind.table_name();
        let text = match fs::read_to_string(self.table_path(kind)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(SinkError::Io { table, source }),
        };
        ron::de::from_str(&text).map_err(|e| SinkError::Decode {
            table,
            message: e.to_string(),
        })
    }

    fn write_rows(&self, kind: ObjectKind, rows: &[PersistedRow]) -> SinkResult<()> {
        let table = kind.table_name();
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        let text = ron::ser::to_string_pretty(&rows, pretty_config).map_err(|e| {
            SinkError::Encode {
                table,
                message: e.to_string(),
            }
        })?;

        let path = self.table_path(kind);
        let staging = path.with_extension("ron.tmp");
        fs::write(&staging, text)
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|source| SinkError::Io { table, source })
    }
}

impl DurableSink for RonFileStore {
    fn clear_table(&self, kind: ObjectKind) -> SinkResult<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_rows(kind, &[])
    }

    fn batch_insert(&self, kind: ObjectKind, rows: &[PersistedRow]) -> SinkResult<()> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = self.read_rows(kind)?;
        table.extend_from_slice(rows);
        self.write_rows(kind, &table)
    }

    fn load_table(&self, kind: ObjectKind) -> SinkResult<Vec<PersistedRow>> {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_rows(kind)
    }
}
