// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Convert JUnit XML test reports into Common Test Report Format (CTRF) JSON.
//!
//! This crate contains the `junit-to-ctrf` command-line interface. The conversion itself lives in
//! [`ctrf_convert`].

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

pub use dispatch::JunitToCtrfApp;
pub use errors::ExpectedError;
pub use exit_codes::ConvertExitCode;
pub use output::{OutputContext, StderrStyles};
