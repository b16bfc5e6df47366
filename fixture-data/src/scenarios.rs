// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical outcome streams, with the entries they're expected to produce under the default
//! (shared) ledger scope.

use crate::models::{ExpectedEntry, ScenarioFixture, failure_at};
use failtrim_metadata::{FailureEvent, FailureKind, OutcomeEvent};
use std::sync::LazyLock;

/// Two identical assertion errors and one distinct value error.
pub static REPEATED_ASSERTION: LazyLock<ScenarioFixture> = LazyLock::new(|| {
    ScenarioFixture::new("repeated-assertion")
        .with_events([
            OutcomeEvent::Errored(failure_at("tests.test_a1", "AssertionError", "app/x.py", 10)),
            OutcomeEvent::Errored(failure_at("tests.test_a2", "AssertionError", "app/x.py", 10)),
            OutcomeEvent::Errored(failure_at("tests.test_a3", "ValueError", "app/y.py", 20)),
        ])
        .expect(ExpectedEntry::new(FailureKind::Error, "tests.test_a3", 0))
        .expect(ExpectedEntry::new(FailureKind::Error, "tests.test_a1", 1))
});

/// A single failure with no stack information.
pub static EMPTY_STACK: LazyLock<ScenarioFixture> = LazyLock::new(|| {
    ScenarioFixture::new("empty-stack")
        .with_event(OutcomeEvent::Failed(
            FailureEvent::new("tests.test_b", "AssertionError").with_rendered_trace("AssertionError"),
        ))
        .expect(ExpectedEntry::new(FailureKind::Failure, "tests.test_b", 0))
});

/// A core component breaks and takes 58 tests down with it.
pub static BROKEN_CORE: LazyLock<ScenarioFixture> = LazyLock::new(|| {
    ScenarioFixture::new("broken-core")
        .with_events((0..58).map(|i| {
            OutcomeEvent::Errored(failure_at(
                format!("tests.deep_inside.mymodule.test_{i:02}"),
                "AttributeError",
                "app/module_a.py",
                42,
            ))
        }))
        .expect(ExpectedEntry::new(
            FailureKind::Error,
            "tests.deep_inside.mymodule.test_00",
            57,
        ))
});

/// The same exception type raised from two different lines.
pub static DISTINCT_LINES: LazyLock<ScenarioFixture> = LazyLock::new(|| {
    ScenarioFixture::new("distinct-lines")
        .with_events([
            OutcomeEvent::Failed(failure_at("tests.test_d2", "KeyError", "app/z.py", 6)),
            OutcomeEvent::Failed(failure_at("tests.test_d1", "KeyError", "app/z.py", 5)),
        ])
        .expect(ExpectedEntry::new(FailureKind::Failure, "tests.test_d1", 0))
        .expect(ExpectedEntry::new(FailureKind::Failure, "tests.test_d2", 0))
});

/// Failures and errors sharing an identity, interleaved with passing tests.
pub static MIXED_BUCKETS: LazyLock<ScenarioFixture> = LazyLock::new(|| {
    ScenarioFixture::new("mixed-buckets")
        .with_events([
            OutcomeEvent::Passed {
                test_id: "tests.test_e0".to_owned(),
            },
            OutcomeEvent::Failed(failure_at("tests.test_e1", "TypeError", "app/w.py", 1)),
            OutcomeEvent::Errored(failure_at("tests.test_e2", "TypeError", "app/w.py", 1)),
            OutcomeEvent::Failed(failure_at("tests.test_e3", "TypeError", "app/w.py", 2)),
        ])
        .expect(ExpectedEntry::new(FailureKind::Failure, "tests.test_e3", 0))
        .expect(ExpectedEntry::new(FailureKind::Failure, "tests.test_e1", 1))
});

/// All scenarios.
pub static ALL_SCENARIOS: LazyLock<Vec<&'static ScenarioFixture>> = LazyLock::new(|| {
    vec![
        &*REPEATED_ASSERTION,
        &*EMPTY_STACK,
        &*BROKEN_CORE,
        &*DISTINCT_LINES,
        &*MIXED_BUCKETS,
    ]
});
