// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collecting test outcomes and suppressing repeated failures.
//!
//! A test driver reports outcomes through the [`OutcomeListener`] trait. The
//! [`FailureCollector`] implementation keeps a full [`RecordedEntry`] for the first occurrence
//! of each failure identity and reports every later occurrence back to the driver as
//! [suppressed](Disposition::Suppressed), so the driver can still count it without printing a
//! duplicate body.

use crate::{
    config::TrimConfig,
    errors::{CollectorCallback, CollectorError},
    identity::{FailureIdentity, FrameClassifier},
    ledger::RunLedger,
    reporter::ReportFormatter,
};
use failtrim_metadata::{FailureEvent, FailureKind};
use std::fmt;
use tracing::{debug, trace};

/// An interface through which a test driver reports outcomes, in the order tests complete.
///
/// Callbacks must be serialized by the driver.
pub trait OutcomeListener {
    /// Called when a test run starts. Resets all state from previous runs.
    fn on_run_start(&mut self);

    /// Called when a test passes.
    fn on_success(&mut self, test_id: &str) -> Result<(), CollectorError>;

    /// Called when a test raises an unexpected exception.
    fn on_error(&mut self, event: FailureEvent) -> Result<Disposition, CollectorError>;

    /// Called when a test fails an assertion.
    fn on_failure(&mut self, event: FailureEvent) -> Result<Disposition, CollectorError>;

    /// Called when a test run finishes. Returns the rendered report.
    fn on_run_end(&mut self) -> Result<String, CollectorError>;
}

/// What happened to a failing outcome reported to an [`OutcomeListener`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// This was the first occurrence of its identity; a full entry was recorded.
    Recorded,

    /// The same failure was already seen. The driver should treat this outcome as skipped.
    Suppressed(SuppressReason),
}

impl Disposition {
    /// Returns true if the outcome was suppressed.
    pub fn is_suppressed(self) -> bool {
        matches!(self, Disposition::Suppressed(_))
    }
}

/// The reason a failing outcome was suppressed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SuppressReason {
    /// A failure with the same identity was already recorded.
    AlreadySeen,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressReason::AlreadySeen => write!(f, "error already seen"),
        }
    }
}

/// The first occurrence of a failure identity within a bucket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedEntry {
    /// The bucket this entry belongs to.
    pub kind: FailureKind,

    /// The test that produced this failure.
    pub test_id: String,

    /// The test's description, as shown in the report header.
    pub description: String,

    /// The trace as rendered by the driver.
    pub rendered_trace: String,

    /// Output captured while the test ran.
    pub captured_output: Option<String>,

    /// The identity this entry was recorded under.
    pub identity: FailureIdentity,
}

/// Statistics for a test run.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// The number of tests that passed.
    pub passed: usize,

    /// The number of failures recorded in full.
    pub failed: usize,

    /// The number of errors recorded in full.
    pub errored: usize,

    /// The number of failing outcomes that were suppressed as duplicates.
    pub suppressed: usize,
}

impl RunStats {
    /// Returns the total number of failing outcomes, including suppressed ones.
    pub fn failing_count(&self) -> usize {
        self.failed + self.errored + self.suppressed
    }

    /// Returns true if this run is considered a success.
    ///
    /// Suppressed duplicates are still failures: a run is only successful if nothing failed.
    pub fn is_success(&self) -> bool {
        self.failing_count() == 0
    }
}

/// Collects failing outcomes for a run, recording each distinct failure once.
///
/// The collector borrows a caller-owned [`RunLedger`] for its lifetime. The ledger is reset by
/// [`on_run_start`](OutcomeListener::on_run_start), and may be inspected after the run ends.
pub struct FailureCollector<'a> {
    ledger: &'a mut RunLedger,
    classifier: &'a dyn FrameClassifier,
    formatter: ReportFormatter,
    run: Option<RunState>,
    last_stats: Option<RunStats>,
}

#[derive(Debug, Default)]
struct RunState {
    errors: Vec<RecordedEntry>,
    failures: Vec<RecordedEntry>,
    stats: RunStats,
}

impl RunState {
    fn bucket_mut(&mut self, kind: FailureKind) -> &mut Vec<RecordedEntry> {
        match kind {
            FailureKind::Error => &mut self.errors,
            FailureKind::Failure => &mut self.failures,
        }
    }
}

impl<'a> FailureCollector<'a> {
    /// Creates a new collector using the given config and ledger.
    pub fn new(config: &'a TrimConfig, ledger: &'a mut RunLedger) -> Self {
        Self {
            ledger,
            classifier: config.frame_classifier(),
            formatter: ReportFormatter::new(config.report()),
            run: None,
            last_stats: None,
        }
    }

    /// Uses a custom classifier to recognize library frames.
    pub fn with_classifier(mut self, classifier: &'a dyn FrameClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Colorizes the rendered report.
    pub fn colorize(&mut self) {
        self.formatter.colorize();
    }

    /// Returns the ledger backing this collector.
    pub fn ledger(&self) -> &RunLedger {
        &*self.ledger
    }

    /// Returns statistics for the current run, or for the last finished run if none is in
    /// progress.
    pub fn stats(&self) -> Option<RunStats> {
        match &self.run {
            Some(run) => Some(run.stats),
            None => self.last_stats,
        }
    }

    /// Returns the entries recorded so far in the given bucket, if a run is in progress.
    pub fn entries(&self, kind: FailureKind) -> Option<&[RecordedEntry]> {
        self.run.as_ref().map(|run| match kind {
            FailureKind::Error => run.errors.as_slice(),
            FailureKind::Failure => run.failures.as_slice(),
        })
    }

    fn record(
        &mut self,
        kind: FailureKind,
        event: FailureEvent,
        callback: CollectorCallback,
    ) -> Result<Disposition, CollectorError> {
        let run = self
            .run
            .as_mut()
            .ok_or(CollectorError::RunNotStarted { callback })?;

        let identity =
            FailureIdentity::classify(&event.exception_type, &event.stack, self.classifier);
        if !self.ledger.record_and_check(kind, &identity) {
            run.stats.suppressed += 1;
            debug!(
                "suppressing {kind} for `{}`: {identity} already seen",
                event.test_id
            );
            return Ok(Disposition::Suppressed(SuppressReason::AlreadySeen));
        }

        match kind {
            FailureKind::Error => run.stats.errored += 1,
            FailureKind::Failure => run.stats.failed += 1,
        }
        trace!("recording {kind} for `{}` as {identity}", event.test_id);

        let description = event.description().to_owned();
        let FailureEvent {
            test_id,
            rendered_trace,
            captured_output,
            ..
        } = event;
        run.bucket_mut(kind).push(RecordedEntry {
            kind,
            test_id,
            description,
            rendered_trace,
            captured_output,
            identity,
        });
        Ok(Disposition::Recorded)
    }
}

impl OutcomeListener for FailureCollector<'_> {
    fn on_run_start(&mut self) {
        if self.run.is_some() {
            debug!("run restarted before it finished, discarding recorded failures");
        }
        self.ledger.reset();
        self.run = Some(RunState::default());
        self.last_stats = None;
        debug!("run started, occurrence ledger reset");
    }

    fn on_success(&mut self, _test_id: &str) -> Result<(), CollectorError> {
        let run = self.run.as_mut().ok_or(CollectorError::RunNotStarted {
            callback: CollectorCallback::Success,
        })?;
        run.stats.passed += 1;
        Ok(())
    }

    fn on_error(&mut self, event: FailureEvent) -> Result<Disposition, CollectorError> {
        self.record(FailureKind::Error, event, CollectorCallback::Error)
    }

    fn on_failure(&mut self, event: FailureEvent) -> Result<Disposition, CollectorError> {
        self.record(FailureKind::Failure, event, CollectorCallback::Failure)
    }

    fn on_run_end(&mut self) -> Result<String, CollectorError> {
        let run = self.run.take().ok_or(CollectorError::RunNotStarted {
            callback: CollectorCallback::RunEnd,
        })?;
        self.last_stats = Some(run.stats);
        debug!(
            "run finished: {} distinct failures, {} suppressed",
            run.errors.len() + run.failures.len(),
            run.stats.suppressed,
        );

        self.formatter
            .render(&run.errors, &run.failures, &*self.ledger)
            .map_err(CollectorError::Report)
    }
}
