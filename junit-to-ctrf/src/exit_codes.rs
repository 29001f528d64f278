// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `junit-to-ctrf` failures.
///
/// Unknown/unexpected failures will always result in exit code 1. Invalid command-line arguments
/// result in exit code 2.
pub enum ConvertExitCode {}

impl ConvertExitCode {
    /// A report was written.
    pub const OK: i32 = 0;

    /// The inputs contained no test cases, so no report was written.
    pub const NO_TEST_CASES: i32 = 4;

    /// A problem with the configuration, such as an invalid config file or input pattern.
    pub const SETUP_ERROR: i32 = 96;

    /// An input file could not be read, or was not well-formed XML.
    pub const INPUT_ERROR: i32 = 97;

    /// The report could not be written.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
