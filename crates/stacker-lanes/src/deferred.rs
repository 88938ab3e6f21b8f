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

//! One-shot callbacks keyed by simulation tick.

use stacker_core::{ObjectKind, StackKey};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Work scheduled to run on the main context at a later tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Remove the live record for `key` if its object no longer exists.
    ExistenceCheck {
        /// The record's kind.
        kind: ObjectKind,
        /// The record's key.
        key: StackKey,
    },
    /// Create the display block of a container that still exists.
    CreateDisplay {
        /// The container's key.
        key: StackKey,
    },
}

#[derive(Debug)]
struct Scheduled {
    deadline: u64,
    seq: u64,
    task: DeferredTask,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: the heap pops the earliest deadline, then the earliest insert.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A priority queue of `(deadline, task)` drained by the host tick.
///
/// There is no cancellation. A task whose target has gone away by the time
/// it fires simply finds nothing to do.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl DeferredQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: u64, task: DeferredTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            deadline,
            seq,
            task,
        });
    }

    /// Removes and returns every task due at or before `now`, in firing order.
    pub fn pop_due(&mut self, now: u64) -> Vec<DeferredTask> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|next| next.deadline <= now) {
            if let Some(scheduled) = self.heap.pop() {
                due.push(scheduled.task);
            }
        }
        due
    }

    /// The deadline of the next task, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|next| next.deadline)
    }

    /// The number of pending tasks.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
