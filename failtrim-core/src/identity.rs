// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deriving a stable identity for a failure from its exception type and call stack.
//!
//! Two failures are considered the same if they raised the same exception type from the same
//! application-level source location. Frames that belong to test or assertion machinery are
//! skipped: they wrap the real call site and would otherwise collapse unrelated failures
//! together.

use camino::{Utf8Path, Utf8PathBuf};
use failtrim_metadata::StackFrame;
use globset::GlobSet;
use smol_str::SmolStr;
use std::fmt;

/// The equivalence key used to decide whether two failures are the same.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FailureIdentity {
    /// No application frame was found in the stack, so only the exception type is known.
    TypeOnly {
        /// The exception type.
        exception_type: SmolStr,
    },

    /// The exception type along with the deepest application frame in the stack.
    Located {
        /// The exception type.
        exception_type: SmolStr,

        /// The source file of the deepest application frame.
        file: Utf8PathBuf,

        /// The line of the deepest application frame.
        line: u32,
    },
}

impl FailureIdentity {
    /// Derives an identity, treating frames as library frames according to their own
    /// `is_library` flag.
    pub fn from_stack(exception_type: &str, stack: &[StackFrame]) -> Self {
        Self::classify(exception_type, stack, &LibraryFlag)
    }

    /// Derives an identity using the given classifier to recognize library frames.
    ///
    /// The stack is scanned outermost to innermost and the last application frame wins.
    pub fn classify(
        exception_type: &str,
        stack: &[StackFrame],
        classifier: &dyn FrameClassifier,
    ) -> Self {
        let origin = stack
            .iter()
            .rfind(|frame| !classifier.is_library_frame(frame));

        match origin {
            Some(frame) => FailureIdentity::Located {
                exception_type: exception_type.into(),
                file: frame.file.clone(),
                line: frame.line,
            },
            None => FailureIdentity::TypeOnly {
                exception_type: exception_type.into(),
            },
        }
    }

    /// Returns the exception type.
    pub fn exception_type(&self) -> &str {
        match self {
            FailureIdentity::TypeOnly { exception_type }
            | FailureIdentity::Located { exception_type, .. } => exception_type,
        }
    }

    /// Returns the source location, if an application frame was found.
    pub fn location(&self) -> Option<(&Utf8Path, u32)> {
        match self {
            FailureIdentity::TypeOnly { .. } => None,
            FailureIdentity::Located { file, line, .. } => Some((file, *line)),
        }
    }
}

impl fmt::Display for FailureIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureIdentity::TypeOnly { exception_type } => write!(f, "{exception_type}"),
            FailureIdentity::Located {
                exception_type,
                file,
                line,
            } => write!(f, "{exception_type} at {file}:{line}"),
        }
    }
}

/// Decides whether a stack frame belongs to test or assertion machinery.
///
/// This is a boundary supplied by the integration: the identity algorithm only asks the question.
pub trait FrameClassifier {
    /// Returns true if `frame` is a library frame.
    fn is_library_frame(&self, frame: &StackFrame) -> bool;
}

/// Classifies frames using the `is_library` flag set by the stack walker.
#[derive(Copy, Clone, Debug, Default)]
pub struct LibraryFlag;

impl FrameClassifier for LibraryFlag {
    #[inline]
    fn is_library_frame(&self, frame: &StackFrame) -> bool {
        frame.is_library
    }
}

/// Classifies frames as library frames if they're flagged, or if their file matches one of a set
/// of glob patterns.
///
/// Constructed through [`TrimConfig`](crate::config::TrimConfig).
#[derive(Clone, Debug)]
pub struct LibraryPathMatcher {
    globs: GlobSet,
}

impl LibraryPathMatcher {
    pub(crate) fn new(globs: GlobSet) -> Self {
        Self { globs }
    }

    /// Returns true if no patterns were configured, in which case this behaves exactly like
    /// [`LibraryFlag`].
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }
}

impl FrameClassifier for LibraryPathMatcher {
    fn is_library_frame(&self, frame: &StackFrame) -> bool {
        frame.is_library || self.globs.is_match(frame.file.as_std_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};
    use test_case::test_case;

    fn located(exception_type: &str, file: &str, line: u32) -> FailureIdentity {
        FailureIdentity::Located {
            exception_type: exception_type.into(),
            file: file.into(),
            line,
        }
    }

    fn type_only(exception_type: &str) -> FailureIdentity {
        FailureIdentity::TypeOnly {
            exception_type: exception_type.into(),
        }
    }

    #[test_case(
        vec![],
        type_only("AttributeError") ; "empty stack"
    )]
    #[test_case(
        vec![StackFrame::library("unittest/case.py", 59), StackFrame::library("unittest/case.py", 605)],
        type_only("AttributeError") ; "library frames only"
    )]
    #[test_case(
        vec![StackFrame::new("tests/test_a.py", 10)],
        located("AttributeError", "tests/test_a.py", 10) ; "single application frame"
    )]
    #[test_case(
        vec![
            StackFrame::library("unittest/case.py", 59),
            StackFrame::new("tests/test_a.py", 10),
            StackFrame::new("app/module_a.py", 42),
        ],
        located("AttributeError", "app/module_a.py", 42) ; "deepest application frame wins"
    )]
    #[test_case(
        vec![
            StackFrame::new("tests/test_a.py", 10),
            StackFrame::new("app/module_a.py", 42),
            StackFrame::library("unittest/case.py", 800),
            StackFrame::library("unittest/case.py", 820),
        ],
        located("AttributeError", "app/module_a.py", 42) ; "trailing library frames are skipped"
    )]
    fn test_from_stack(stack: Vec<StackFrame>, expected: FailureIdentity) {
        assert_eq!(
            FailureIdentity::from_stack("AttributeError", &stack),
            expected
        );
    }

    #[test]
    fn test_exception_type_is_part_of_identity() {
        let stack = [StackFrame::new("app/module_a.py", 42)];
        let attr = FailureIdentity::from_stack("AttributeError", &stack);
        let key = FailureIdentity::from_stack("KeyError", &stack);
        assert_ne!(attr, key);
        assert_eq!(attr.location(), key.location());
    }

    #[test]
    fn test_path_matcher() {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("**/site-packages/**").unwrap());
        let matcher = LibraryPathMatcher::new(builder.build().unwrap());
        assert!(!matcher.is_empty());

        let stack = [
            StackFrame::new("tests/test_a.py", 10),
            StackFrame::new("venv/lib/site-packages/pytest/runner.py", 3),
            StackFrame::library("unittest/case.py", 59),
        ];
        assert_eq!(
            FailureIdentity::classify("ValueError", &stack, &matcher),
            located("ValueError", "tests/test_a.py", 10)
        );
        // Without the path matcher, the unflagged site-packages frame is the origin.
        assert_eq!(
            FailureIdentity::from_stack("ValueError", &stack),
            located("ValueError", "venv/lib/site-packages/pytest/runner.py", 3)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(type_only("KeyError").to_string(), "KeyError");
        assert_eq!(
            located("KeyError", "app/a.py", 7).to_string(),
            "KeyError at app/a.py:7"
        );
    }
}
