// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driving an [`OutcomeListener`] from a serialized outcome stream.
//!
//! The stream is JSON lines: one [`OutcomeEvent`] per line, blank lines ignored. This lets a
//! driver written in any language record its outcomes and have them deduplicated after the
//! fact.

use crate::{
    collector::{Disposition, OutcomeListener, SuppressReason},
    errors::ReplayError,
};
use failtrim_metadata::OutcomeEvent;
use std::io::BufRead;
use tracing::debug;

/// The result of replaying an outcome stream.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReplayOutcome {
    /// The rendered report for each run that finished, in stream order.
    pub reports: Vec<String>,

    /// Failing outcomes that were suppressed as duplicates, in stream order.
    pub suppressed: Vec<SuppressedOutcome>,
}

/// A failing outcome the listener suppressed, which the driver reports as skipped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuppressedOutcome {
    /// The test whose outcome was suppressed.
    pub test_id: String,

    /// Why it was suppressed.
    pub reason: SuppressReason,
}

/// Replays the outcome events in `reader` into `listener`.
pub fn replay_outcomes(
    reader: impl BufRead,
    listener: &mut dyn OutcomeListener,
) -> Result<ReplayOutcome, ReplayError> {
    let mut outcome = ReplayOutcome::default();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(ReplayError::Read)?;
        if line.trim().is_empty() {
            continue;
        }

        let event: OutcomeEvent = serde_json::from_str(&line)
            .map_err(|err| ReplayError::Parse { line_number, err })?;
        let wrap = |err| ReplayError::Listener { line_number, err };

        match event {
            OutcomeEvent::RunStarted => listener.on_run_start(),
            OutcomeEvent::Passed { test_id } => listener.on_success(&test_id).map_err(wrap)?,
            OutcomeEvent::Failed(event) => {
                let test_id = event.test_id.clone();
                let disposition = listener.on_failure(event).map_err(wrap)?;
                note_disposition(&mut outcome, test_id, disposition);
            }
            OutcomeEvent::Errored(event) => {
                let test_id = event.test_id.clone();
                let disposition = listener.on_error(event).map_err(wrap)?;
                note_disposition(&mut outcome, test_id, disposition);
            }
            OutcomeEvent::RunFinished => {
                let report = listener.on_run_end().map_err(wrap)?;
                outcome.reports.push(report);
            }
        }
    }

    Ok(outcome)
}

fn note_disposition(outcome: &mut ReplayOutcome, test_id: String, disposition: Disposition) {
    if let Disposition::Suppressed(reason) = disposition {
        debug!("{test_id} skipped: {reason}");
        outcome
            .suppressed
            .push(SuppressedOutcome { test_id, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collector::FailureCollector, config::TrimConfig, errors::CollectorError};
    use indoc::indoc;
    use std::io::Cursor;

    #[test]
    fn test_replay() {
        let input = indoc! {r#"
            {"type": "run-started"}
            {"type": "passed", "test-id": "t0"}
            {"type": "errored", "test-id": "t1", "exception-type": "ValueError", "stack": [{"file": "app/a.py", "line": 3}]}

            {"type": "errored", "test-id": "t2", "exception-type": "ValueError", "stack": [{"file": "app/a.py", "line": 3}]}
            {"type": "run-finished"}
        "#};

        let config = TrimConfig::default();
        let mut ledger = config.new_ledger();
        let mut collector = FailureCollector::new(&config, &mut ledger);
        let outcome = replay_outcomes(Cursor::new(input), &mut collector).unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert!(outcome.reports[0].contains("ERROR: t1"));
        assert!(outcome.reports[0].contains("+ 1 more"));
        assert_eq!(
            outcome.suppressed,
            [SuppressedOutcome {
                test_id: "t2".to_owned(),
                reason: SuppressReason::AlreadySeen,
            }]
        );
        let stats = collector.stats().unwrap();
        assert_eq!((stats.passed, stats.errored, stats.suppressed), (1, 1, 1));
    }

    #[test]
    fn test_replay_parse_error() {
        let input = "{\"type\": \"run-started\"}\nnot json\n";
        let config = TrimConfig::default();
        let mut ledger = config.new_ledger();
        let mut collector = FailureCollector::new(&config, &mut ledger);

        let err = replay_outcomes(Cursor::new(input), &mut collector).expect_err("bad line");
        assert!(
            matches!(err, ReplayError::Parse { line_number: 2, .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_replay_without_run_start() {
        let input = r#"{"type": "failed", "test-id": "t1", "exception-type": "AssertionError"}"#;
        let config = TrimConfig::default();
        let mut ledger = config.new_ledger();
        let mut collector = FailureCollector::new(&config, &mut ledger);

        let err = replay_outcomes(Cursor::new(input), &mut collector).expect_err("not started");
        assert!(
            matches!(
                err,
                ReplayError::Listener {
                    line_number: 1,
                    err: CollectorError::RunNotStarted { .. }
                }
            ),
            "unexpected error: {err:?}"
        );
    }
}
