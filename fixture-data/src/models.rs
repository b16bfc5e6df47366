// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data models for fixture information.

use failtrim_metadata::{FailureEvent, FailureKind, OutcomeEvent, StackFrame};

/// A named outcome stream along with the report entries it's expected to produce.
#[derive(Clone, Debug)]
pub struct ScenarioFixture {
    pub name: &'static str,
    pub events: Vec<OutcomeEvent>,
    pub expected: Vec<ExpectedEntry>,
}

impl ScenarioFixture {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            events: Vec::new(),
            expected: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: OutcomeEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = OutcomeEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Adds an expected entry. Entries are listed in report order.
    pub fn expect(mut self, entry: ExpectedEntry) -> Self {
        self.expected.push(entry);
        self
    }

    /// Returns the failing events in this scenario, with their kinds.
    pub fn failures(&self) -> impl Iterator<Item = (FailureKind, &FailureEvent)> + '_ {
        self.events.iter().filter_map(OutcomeEvent::as_failure)
    }

    /// Serializes the events as JSON lines, bracketed by run start and finish events.
    pub fn to_json_lines(&self) -> String {
        let mut out = String::new();
        let events = std::iter::once(&OutcomeEvent::RunStarted)
            .chain(&self.events)
            .chain(std::iter::once(&OutcomeEvent::RunFinished));
        for event in events {
            out.push_str(&serde_json::to_string(event).expect("outcome events always serialize"));
            out.push('\n');
        }
        out
    }
}

/// A report entry a scenario is expected to produce.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpectedEntry {
    pub kind: FailureKind,
    pub test_id: &'static str,
    /// The number of suppressed occurrences, i.e. the `N` in `+ N more`.
    pub more: usize,
}

impl ExpectedEntry {
    pub fn new(kind: FailureKind, test_id: &'static str, more: usize) -> Self {
        Self {
            kind,
            test_id,
            more,
        }
    }
}

/// Builds a failure event raised from `file:line` inside a test, underneath the usual
/// assertion-library frames.
pub fn failure_at(
    test_id: impl Into<String>,
    exception_type: &str,
    file: &str,
    line: u32,
) -> FailureEvent {
    let test_id = test_id.into();
    let trace = format!(
        "Traceback (most recent call last):\n  File \"{file}\", line {line}, in {test_id}\n{exception_type}"
    );
    FailureEvent::new(test_id, exception_type)
        .with_stack([
            StackFrame::library("unittest/case.py", 59),
            StackFrame::library("unittest/case.py", 605),
            StackFrame::new("tests/test_suite.py", 12),
            StackFrame::new(file, line),
        ])
        .with_rendered_trace(trace)
}
