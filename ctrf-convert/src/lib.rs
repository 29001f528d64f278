// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core conversion logic for junit-to-ctrf.
//!
//! The conversion pipeline is:
//!
//! 1. [`discovery`] expands input patterns into JUnit report files, which
//!    [`junit_reader`] reads into [`JunitTestCase`](junit_reader::JunitTestCase) records.
//! 2. [`retry`] reconciles each record's flaky and rerun attempts into a final status.
//! 3. [`report`] assembles the reconciled records into a CTRF [`Report`](report::Report),
//!    passing all free text through [`sanitize`].
//! 4. [`write`] serializes the report and writes it out atomically.
//!
//! Steps 2 and 3 are pure and never fail.

pub mod config;
pub mod discovery;
pub mod errors;
pub mod report;
pub mod retry;
pub mod sanitize;
pub mod serialize;
pub mod write;
