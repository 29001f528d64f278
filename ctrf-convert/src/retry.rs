// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation of retried test cases.
//!
//! A JUnit testcase records retries in up to four lists: `flakyFailure` and `flakyError` for a
//! test that failed before eventually passing, and `rerunFailure` and `rerunError` for a test that
//! was rerun but never passed. [`reconcile`] turns these into a numbered attempt history and a
//! final status.
//!
//! Attempts are numbered in list order: flaky failures, flaky errors, rerun failures, rerun
//! errors. When no flaky attempts were recorded, rerun numbering starts at 2: slot 1 belongs to
//! the original run, which has no record of its own.

use crate::{
    report::{RetryAttempt, TestStatus},
    sanitize::{sanitize, to_lines},
};
use junit_reader::{JunitTestCase, TestRerun};

/// The outcome of reconciling a testcase's retries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledResult {
    /// The retry attempts, in order.
    pub attempts: Vec<RetryAttempt>,

    /// The final status of the test.
    pub status: TestStatus,

    /// Whether the test failed at least once before passing.
    pub flaky: bool,
}

impl ReconciledResult {
    /// Returns the number of retry attempts.
    pub fn retries(&self) -> usize {
        self.attempts.len()
    }
}

/// Reconciles the retry lists of `test_case` into an attempt history and final status.
///
/// The final status is decided in this order:
///
/// 1. Any flaky attempt: `passed`. Flaky attempts take priority even if reruns were also recorded.
/// 2. Any rerun attempt: `failed`, whatever the testcase's own failure and error flags say.
/// 3. A `<failure>` or `<error>` on the testcase: `failed`.
/// 4. A `<skipped>` on the testcase: `skipped`.
/// 5. Otherwise: `passed`.
pub fn reconcile(test_case: &JunitTestCase) -> ReconciledResult {
    let mut attempts = Vec::new();
    let mut next_attempt = 1;

    push_attempts(&mut attempts, &mut next_attempt, &test_case.flaky_failures);
    push_attempts(&mut attempts, &mut next_attempt, &test_case.flaky_errors);
    let has_flaky = !test_case.flaky_failures.is_empty() || !test_case.flaky_errors.is_empty();

    if !has_flaky {
        next_attempt = 2;
    }
    push_attempts(&mut attempts, &mut next_attempt, &test_case.rerun_failures);
    push_attempts(&mut attempts, &mut next_attempt, &test_case.rerun_errors);
    let has_rerun = !test_case.rerun_failures.is_empty() || !test_case.rerun_errors.is_empty();

    let status = if has_flaky {
        TestStatus::Passed
    } else if has_rerun || test_case.has_failure() || test_case.has_error() {
        TestStatus::Failed
    } else if test_case.skipped {
        TestStatus::Skipped
    } else {
        TestStatus::Passed
    };

    ReconciledResult {
        attempts,
        status,
        flaky: has_flaky,
    }
}

fn push_attempts(attempts: &mut Vec<RetryAttempt>, next_attempt: &mut usize, reruns: &[TestRerun]) {
    for rerun in reruns {
        attempts.push(RetryAttempt {
            attempt: *next_attempt,
            status: TestStatus::Failed,
            message: sanitize(rerun.message.as_deref()),
            trace: sanitize(rerun.stack_trace.as_deref()),
            stdout: to_lines(rerun.system_out.as_deref()),
            stderr: to_lines(rerun.system_err.as_deref()),
        });
        *next_attempt += 1;
    }
}
