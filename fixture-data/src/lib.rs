// Copyright (c) The failtrim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixture data for failtrim tests.

pub mod models;
pub mod scenarios;
