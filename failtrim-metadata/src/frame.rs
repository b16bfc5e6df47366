// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single call site within a failure's stack.
///
/// Stacks are ordered outermost call first, so the last frame in a stack is the one where the
/// failure was raised.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StackFrame {
    /// The source file this frame belongs to.
    pub file: Utf8PathBuf,

    /// The 1-based line number within `file`.
    pub line: u32,

    /// True if this frame belongs to the test-execution or assertion machinery rather than the
    /// code under test.
    ///
    /// This is supplied by whatever walked the stack; failtrim does not redefine it.
    #[serde(default)]
    pub is_library: bool,
}

impl StackFrame {
    /// Creates a new frame belonging to the code under test.
    pub fn new(file: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            is_library: false,
        }
    }

    /// Creates a new frame belonging to library machinery.
    pub fn library(file: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            is_library: true,
        }
    }

    /// Returns the file this frame belongs to.
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
