// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::StackFrame;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// The bucket a failing outcome belongs to.
///
/// This mirrors the way test drivers separate errors (an unexpected exception) from failures (an
/// assertion that did not hold).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The test raised an unexpected exception.
    Error,

    /// An assertion within the test failed.
    Failure,
}

impl FailureKind {
    /// All known kinds, in the order they are reported.
    pub const REPORT_ORDER: [FailureKind; 2] = [FailureKind::Failure, FailureKind::Error];

    /// The label used for this kind in report headers.
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Error => "ERROR",
            FailureKind::Failure => "FAIL",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single failing test outcome, as captured by the test driver.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FailureEvent {
    /// A unique identifier for the test, e.g. `tests.deep.module.test_thing`.
    pub test_id: String,

    /// The name of the exception type, e.g. `AttributeError`.
    pub exception_type: SmolStr,

    /// The call stack, outermost call first.
    #[serde(default)]
    pub stack: Vec<StackFrame>,

    /// A human-readable description of the test. Defaults to the test ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The trace as the driver rendered it.
    #[serde(default)]
    pub rendered_trace: String,

    /// Output captured while the test ran, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_output: Option<String>,
}

impl FailureEvent {
    /// Creates a new event with an empty stack and trace.
    pub fn new(test_id: impl Into<String>, exception_type: impl Into<SmolStr>) -> Self {
        Self {
            test_id: test_id.into(),
            exception_type: exception_type.into(),
            stack: Vec::new(),
            description: None,
            rendered_trace: String::new(),
            captured_output: None,
        }
    }

    /// Sets the call stack for this event.
    pub fn with_stack(mut self, stack: impl IntoIterator<Item = StackFrame>) -> Self {
        self.stack = stack.into_iter().collect();
        self
    }

    /// Sets the description for this event.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the rendered trace for this event.
    pub fn with_rendered_trace(mut self, rendered_trace: impl Into<String>) -> Self {
        self.rendered_trace = rendered_trace.into();
        self
    }

    /// Sets the captured output for this event.
    pub fn with_captured_output(mut self, captured_output: impl Into<String>) -> Self {
        self.captured_output = Some(captured_output.into());
        self
    }

    /// Returns the description, falling back to the test ID.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.test_id)
    }
}

/// An event in the ordered outcome stream produced by a test driver.
///
/// Serialized as JSON objects tagged by `type`, one per line.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum OutcomeEvent {
    /// A test run started.
    RunStarted,

    /// A test passed.
    Passed {
        /// The identifier of the test that passed.
        test_id: String,
    },

    /// A test failed an assertion.
    Failed(FailureEvent),

    /// A test raised an unexpected exception.
    Errored(FailureEvent),

    /// The test run finished.
    RunFinished,
}

impl OutcomeEvent {
    /// Returns the failure kind and event, if this is a failing outcome.
    pub fn as_failure(&self) -> Option<(FailureKind, &FailureEvent)> {
        match self {
            OutcomeEvent::Failed(event) => Some((FailureKind::Failure, event)),
            OutcomeEvent::Errored(event) => Some((FailureKind::Error, event)),
            OutcomeEvent::RunStarted | OutcomeEvent::Passed { .. } | OutcomeEvent::RunFinished => {
                None
            }
        }
    }
}
