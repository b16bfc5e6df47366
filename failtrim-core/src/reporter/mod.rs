// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering the final, deduplicated failure report.
//!
//! The main type here is [`ReportFormatter`].

mod formatter;
mod helpers;

pub use formatter::*;
