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

//! Decides which stacks survive an unload or a persistence pass.

use stacker_core::{ObjectKind, SpawnCause};
use stacker_data::{OverflowEntry, StackRecord};
use std::fmt;

/// A per-kind threshold deciding whether a stack is worth persisting.
///
/// Singleton stacks cost nothing to rediscover, so the usual rule is to keep
/// only stacks with more than one member. Any closure with the matching
/// signature is a predicate.
pub trait PersistencePredicate: Send + Sync {
    /// Returns `true` if a stack of `amount` spawned for `cause` is kept.
    fn is_eligible(&self, amount: u32, cause: Option<SpawnCause>) -> bool;
}

impl<F> PersistencePredicate for F
where
    F: Fn(u32, Option<SpawnCause>) -> bool + Send + Sync,
{
    fn is_eligible(&self, amount: u32, cause: Option<SpawnCause>) -> bool {
        self(amount, cause)
    }
}

fn stacked_only(amount: u32, _cause: Option<SpawnCause>) -> bool {
    amount > 1
}

fn stacked_or_tracked_cause(amount: u32, cause: Option<SpawnCause>) -> bool {
    amount > 1 || cause.is_some_and(SpawnCause::is_persistence_eligible)
}

/// One [`PersistencePredicate`] per object kind.
pub struct EligibilityRules {
    predicates: [Box<dyn PersistencePredicate>; 4],
}

impl Default for EligibilityRules {
    fn default() -> Self {
        Self {
            predicates: [
                Box::new(stacked_or_tracked_cause),
                Box::new(stacked_only),
                Box::new(stacked_only),
                Box::new(stacked_only),
            ],
        }
    }
}

impl fmt::Debug for EligibilityRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EligibilityRules").finish_non_exhaustive()
    }
}

impl EligibilityRules {
    /// Replaces the predicate of one kind.
    pub fn with_predicate(
        mut self,
        kind: ObjectKind,
        predicate: impl PersistencePredicate + 'static,
    ) -> Self {
        self.predicates[kind.index()] = Box::new(predicate);
        self
    }

    /// Applies the predicate of `kind`.
    pub fn is_eligible(&self, kind: ObjectKind, amount: u32, cause: Option<SpawnCause>) -> bool {
        self.predicates[kind.index()].is_eligible(amount, cause)
    }

    /// Applies the predicate to a live record.
    pub fn record_is_eligible(&self, record: &StackRecord) -> bool {
        self.is_eligible(record.kind(), record.amount(), record.spawn_cause())
    }

    /// Applies the predicate to an overflow entry.
    pub fn entry_is_eligible(&self, kind: ObjectKind, entry: &OverflowEntry) -> bool {
        self.is_eligible(kind, entry.amount, entry.cause)
    }
}
