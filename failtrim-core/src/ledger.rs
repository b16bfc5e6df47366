// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookkeeping for how often each failure identity has been seen during a run.

use crate::{errors::LedgerError, identity::FailureIdentity};
use failtrim_metadata::FailureKind;
use indexmap::IndexMap;
use serde::Deserialize;
use std::num::NonZeroUsize;

/// A table mapping each failure identity to the number of times it has occurred.
///
/// Counts only ever go up. The table is emptied by [`reset`](Self::reset).
#[derive(Clone, Debug, Default)]
pub struct OccurrenceLedger {
    // Ordered by first occurrence.
    counts: IndexMap<FailureIdentity, NonZeroUsize>,
}

impl OccurrenceLedger {
    /// Creates a new, empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an occurrence of `identity`, returning true if this is its first occurrence.
    pub fn record_and_check(&mut self, identity: &FailureIdentity) -> bool {
        match self.counts.get_mut(identity) {
            Some(count) => {
                *count = count.saturating_add(1);
                false
            }
            None => {
                self.counts.insert(identity.clone(), NonZeroUsize::MIN);
                true
            }
        }
    }

    /// Returns the number of occurrences of `identity` recorded so far.
    ///
    /// Returns an error if `identity` was never recorded.
    pub fn count_of(&self, identity: &FailureIdentity) -> Result<NonZeroUsize, LedgerError> {
        self.counts
            .get(identity)
            .copied()
            .ok_or_else(|| LedgerError::UnknownIdentity {
                identity: identity.clone(),
            })
    }

    /// Returns the number of distinct identities recorded.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the total number of occurrences across all identities.
    pub fn total(&self) -> usize {
        self.counts.values().map(|count| count.get()).sum()
    }

    /// Iterates over identities and their counts, in order of first occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (&FailureIdentity, NonZeroUsize)> + '_ {
        self.counts.iter().map(|(identity, count)| (identity, *count))
    }

    /// Forgets all recorded occurrences.
    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

/// Whether errors and failures share an occurrence ledger.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LedgerScope {
    /// One ledger for both buckets: an error and a failure with the same identity suppress each
    /// other.
    #[default]
    Shared,

    /// Independent ledgers for errors and failures.
    PerBucket,
}

/// The occurrence ledgers for a single test run.
///
/// This is owned by the caller and lent to a
/// [`FailureCollector`](crate::collector::FailureCollector) for the duration of a run.
#[derive(Clone, Debug, Default)]
pub struct RunLedger {
    scope: LedgerScope,
    // With `LedgerScope::Shared`, only `errors` is used.
    errors: OccurrenceLedger,
    failures: OccurrenceLedger,
}

impl RunLedger {
    /// Creates a new, empty run ledger with the given scope.
    pub fn new(scope: LedgerScope) -> Self {
        Self {
            scope,
            errors: OccurrenceLedger::new(),
            failures: OccurrenceLedger::new(),
        }
    }

    /// Returns the scope of this ledger.
    pub fn scope(&self) -> LedgerScope {
        self.scope
    }

    /// Returns the ledger that tracks the given bucket.
    pub fn ledger(&self, kind: FailureKind) -> &OccurrenceLedger {
        match (self.scope, kind) {
            (LedgerScope::Shared, _) | (LedgerScope::PerBucket, FailureKind::Error) => &self.errors,
            (LedgerScope::PerBucket, FailureKind::Failure) => &self.failures,
        }
    }

    /// Returns the ledger that tracks the given bucket, mutably.
    pub fn ledger_mut(&mut self, kind: FailureKind) -> &mut OccurrenceLedger {
        match (self.scope, kind) {
            (LedgerScope::Shared, _) | (LedgerScope::PerBucket, FailureKind::Error) => {
                &mut self.errors
            }
            (LedgerScope::PerBucket, FailureKind::Failure) => &mut self.failures,
        }
    }

    /// Records an occurrence of `identity` in the given bucket, returning true if this is its
    /// first occurrence there.
    pub fn record_and_check(&mut self, kind: FailureKind, identity: &FailureIdentity) -> bool {
        self.ledger_mut(kind).record_and_check(identity)
    }

    /// Returns the number of occurrences of `identity` in the given bucket.
    pub fn count_of(
        &self,
        kind: FailureKind,
        identity: &FailureIdentity,
    ) -> Result<NonZeroUsize, LedgerError> {
        self.ledger(kind).count_of(identity)
    }

    /// Returns the total number of failing occurrences recorded across all buckets.
    pub fn total(&self) -> usize {
        self.errors.total() + self.failures.total()
    }

    /// Forgets all recorded occurrences, in preparation for a new run.
    pub fn reset(&mut self) {
        self.errors.reset();
        self.failures.reset();
    }
}
