// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for failtrim: deduplicating repeated test failures by origin.
//!
//! The basic flow is:
//!
//! 1. A test driver calls into an [`OutcomeListener`](collector::OutcomeListener), typically a
//!    [`FailureCollector`](collector::FailureCollector), once per test outcome.
//! 2. For each failing outcome the collector derives a
//!    [`FailureIdentity`](identity::FailureIdentity) from the exception type and the deepest
//!    application frame in its stack, and records it in a caller-owned
//!    [`RunLedger`](ledger::RunLedger).
//! 3. Only the first occurrence of each identity is kept. Later occurrences are counted and
//!    reported back to the driver as suppressed.
//! 4. At the end of the run, the [`ReportFormatter`](reporter::ReportFormatter) renders each
//!    distinct failure once, annotated with how many more occurrences were seen.

pub mod collector;
pub mod config;
pub mod errors;
pub mod identity;
pub mod ledger;
pub mod replay;
pub mod reporter;
pub mod write_str;
