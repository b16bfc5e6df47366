// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by failtrim.

use crate::identity::FailureIdentity;
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::{fmt, io};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse failtrim config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
///
/// Returned by [`ConfigParseError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// A library path pattern could not be parsed.
    #[error("invalid library path pattern `{pattern}`")]
    InvalidLibraryPath {
        /// The pattern that failed to parse.
        pattern: String,

        /// The underlying error.
        #[source]
        err: globset::Error,
    },

    /// The separator width was zero.
    #[error("separator-width must be greater than 0")]
    InvalidSeparatorWidth,
}

/// An error returned by the occurrence ledger.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LedgerError {
    /// A count was requested for an identity that was never recorded during this run.
    #[error("no occurrences recorded for `{identity}`")]
    UnknownIdentity {
        /// The identity that was requested.
        identity: FailureIdentity,
    },
}

/// An error that occurred while rendering the final report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// A recorded entry had no matching ledger count.
    #[error("recorded entry for test `{test_id}` has no ledger count")]
    MissingCount {
        /// The test the entry was recorded for.
        test_id: String,

        /// The underlying ledger error.
        #[source]
        err: LedgerError,
    },

    /// Writing the report failed.
    #[error("error writing report")]
    Write(#[source] io::Error),
}

/// An error returned by the failure collector.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectorError {
    /// An outcome was reported before the run was started.
    #[error("{callback} called before the run was started")]
    RunNotStarted {
        /// The callback that was invoked.
        callback: CollectorCallback,
    },

    /// Rendering the final report failed.
    #[error("failed to render report")]
    Report(#[source] ReportError),
}

/// A callback on the outcome listener, used for error reporting.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CollectorCallback {
    /// `on_success`.
    Success,
    /// `on_error`.
    Error,
    /// `on_failure`.
    Failure,
    /// `on_run_end`.
    RunEnd,
}

impl fmt::Display for CollectorCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectorCallback::Success => "on_success",
            CollectorCallback::Error => "on_error",
            CollectorCallback::Failure => "on_failure",
            CollectorCallback::RunEnd => "on_run_end",
        };
        f.write_str(name)
    }
}

/// An error that occurred while replaying a serialized outcome stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReplayError {
    /// Reading from the input failed.
    #[error("error reading outcome stream")]
    Read(#[source] io::Error),

    /// A line could not be parsed as an outcome event.
    #[error("error parsing outcome event on line {line_number}")]
    Parse {
        /// The 1-based line number.
        line_number: usize,

        /// The underlying error.
        #[source]
        err: serde_json::Error,
    },

    /// The listener rejected an event.
    #[error("error processing outcome event on line {line_number}")]
    Listener {
        /// The 1-based line number.
        line_number: usize,

        /// The underlying error.
        #[source]
        err: CollectorError,
    },
}
