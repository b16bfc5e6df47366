// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Serializable data model for test outcomes consumed by failtrim.
//!
//! A test driver produces an ordered stream of [`OutcomeEvent`]s. Failing outcomes carry a
//! [`FailureEvent`], which in turn carries the call stack as a sequence of [`StackFrame`]s.
//! These types are deliberately free of logic: deduplication and reporting live in
//! `failtrim-core`.

mod frame;
mod outcome;

pub use frame::*;
pub use outcome::*;
