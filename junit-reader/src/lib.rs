// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit/XUnit XML reports into flat test case records.
//!
//! JUnit XML is produced by a wide range of test runners (Surefire, JUnit, pytest, minitest and
//! others), each with slightly different conventions. This crate reads all of them into a single
//! record type, [`JunitTestCase`], one per `<testcase>` element, including the Surefire-style
//! `flakyFailure`, `flakyError`, `rerunFailure` and `rerunError` elements.
//!
//! The reader is lenient about text: invalid UTF-8 and invalid character references
//! are replaced rather than rejected. Only structurally malformed XML is an error.

mod errors;
mod read;
mod testcase;

pub use errors::*;
pub use read::{read_bytes, read_file, read_str};
pub use testcase::*;
