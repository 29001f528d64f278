// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The CTRF data model, and assembly of reports from JUnit test cases.

use crate::{
    retry::reconcile,
    sanitize::{sanitize, to_lines},
};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use junit_reader::JunitTestCase;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value of `reportFormat` in every report.
pub const REPORT_FORMAT: &str = "CTRF";

/// The CTRF specification version reports conform to.
pub const SPEC_VERSION: &str = "0.0.0";

/// The name of this generator, recorded as `generatedBy` and used as the default tool name.
pub const GENERATOR: &str = "junit-to-ctrf";

/// The name given to tests that have no name in the JUnit report.
pub const UNNAMED_TEST: &str = "Unnamed Test";

/// The root of a CTRF report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Always [`REPORT_FORMAT`].
    pub report_format: String,

    /// Always [`SPEC_VERSION`].
    pub spec_version: String,

    /// Always [`GENERATOR`].
    pub generated_by: String,

    /// When the report was generated, in RFC 3339 format with millisecond precision.
    pub timestamp: String,

    /// The report contents.
    pub results: Results,
}

/// The `results` block of a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    /// The tool that produced the test results.
    pub tool: Tool,

    /// Counts of tests by status.
    pub summary: Summary,

    /// The tests, in input order.
    pub tests: Vec<CtrfTest>,

    /// Environment properties. Omitted if there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<IndexMap<String, String>>,
}

/// The tool that produced the test results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// The tool name.
    pub name: String,
}

/// Counts of tests by status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// The total number of tests.
    pub tests: usize,
    /// The number of passed tests, including flaky tests.
    pub passed: usize,
    /// The number of failed tests.
    pub failed: usize,
    /// The number of skipped tests.
    pub skipped: usize,
    /// The number of pending tests. JUnit cannot express this status, so this is always 0.
    pub pending: usize,
    /// The number of tests with some other status. Always 0 for JUnit input.
    pub other: usize,
    /// The number of flaky tests. Present only if non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flaky: Option<usize>,
    /// The start of the run. Not recorded by JUnit, so always 0.
    pub start: u64,
    /// The end of the run. Not recorded by JUnit, so always 0.
    pub stop: u64,
}

impl Summary {
    /// Computes the summary for a list of tests.
    pub fn from_tests(tests: &[CtrfTest]) -> Self {
        let mut summary = Summary {
            tests: tests.len(),
            ..Summary::default()
        };
        let mut flaky = 0;
        for test in tests {
            let count = match test.status {
                TestStatus::Passed => &mut summary.passed,
                TestStatus::Failed => &mut summary.failed,
                TestStatus::Skipped => &mut summary.skipped,
                TestStatus::Pending => &mut summary.pending,
                TestStatus::Other => &mut summary.other,
            };
            *count += 1;
            if test.flaky == Some(true) {
                flaky += 1;
            }
        }
        summary.flaky = (flaky > 0).then_some(flaky);
        summary
    }
}

/// The status of a test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// The test passed, possibly after retries.
    Passed,
    /// The test failed.
    Failed,
    /// The test was skipped.
    Skipped,
    /// The test has not run yet.
    Pending,
    /// Any other status.
    Other,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
            TestStatus::Pending => "pending",
            TestStatus::Other => "other",
        };
        f.write_str(s)
    }
}

/// A single test in a CTRF report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtrfTest {
    /// The test name, optionally prefixed with its suite.
    pub name: String,

    /// The final status.
    pub status: TestStatus,

    /// The duration in milliseconds.
    pub duration: u64,

    /// The source file the test is defined in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// The line the test is defined on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,

    /// The failure or error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The failure or error stack trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,

    /// The name of the suite the test belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,

    /// The number of retries. Present only if the test was retried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<usize>,

    /// The retry attempts. Present only if the test was retried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<Vec<RetryAttempt>>,

    /// `true` if the test is flaky, otherwise absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flaky: Option<bool>,

    /// Lines of standard output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<Vec<String>>,

    /// Lines of standard error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<Vec<String>>,
}

/// One retried attempt of a test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryAttempt {
    /// The 1-based attempt number.
    pub attempt: usize,

    /// The status of the attempt. Always [`TestStatus::Failed`].
    pub status: TestStatus,

    /// The failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The stack trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,

    /// Lines of standard output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<Vec<String>>,

    /// Lines of standard error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<Vec<String>>,
}

/// Assembles CTRF reports from JUnit test cases.
#[derive(Clone, Debug, Default)]
pub struct ReportBuilder {
    tool_name: Option<String>,
    environment: IndexMap<String, String>,
    use_suite_name: bool,
}

impl ReportBuilder {
    /// Creates a new builder with the default tool name, no environment, and unqualified test
    /// names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tool name. An empty name is treated as unset.
    pub fn set_tool_name(&mut self, tool_name: impl Into<String>) -> &mut Self {
        let tool_name = tool_name.into();
        self.tool_name = (!tool_name.is_empty()).then_some(tool_name);
        self
    }

    /// Adds an environment property. Later values for the same key replace earlier ones.
    pub fn add_env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Adds several environment properties.
    pub fn add_envs(
        &mut self,
        envs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> &mut Self {
        for (key, value) in envs {
            self.add_env(key, value);
        }
        self
    }

    /// Sets whether test names are prefixed with their suite name.
    pub fn set_use_suite_name(&mut self, use_suite_name: bool) -> &mut Self {
        self.use_suite_name = use_suite_name;
        self
    }

    /// Builds a report timestamped with the current time.
    pub fn build(&self, test_cases: &[JunitTestCase]) -> Report {
        self.build_at(test_cases, Utc::now())
    }

    /// Builds a report with the given timestamp.
    pub fn build_at(&self, test_cases: &[JunitTestCase], timestamp: DateTime<Utc>) -> Report {
        let tests: Vec<CtrfTest> = test_cases.iter().map(|case| self.convert(case)).collect();
        let summary = Summary::from_tests(&tests);
        let environment = (!self.environment.is_empty()).then(|| self.environment.clone());

        Report {
            report_format: REPORT_FORMAT.to_owned(),
            spec_version: SPEC_VERSION.to_owned(),
            generated_by: GENERATOR.to_owned(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            results: Results {
                tool: Tool {
                    name: self.tool_name.as_deref().unwrap_or(GENERATOR).to_owned(),
                },
                summary,
                tests,
                environment,
            },
        }
    }

    fn convert(&self, case: &JunitTestCase) -> CtrfTest {
        let reconciled = reconcile(case);
        let retries = reconciled.retries();
        let (message, trace) = message_and_trace(case);

        CtrfTest {
            name: self.test_name(case),
            status: reconciled.status,
            duration: duration_millis(case.time.as_deref()),
            file_path: sanitize(case.file.as_deref()),
            line: case.line,
            message,
            trace,
            suite: sanitize(case.suite_name.as_deref()),
            retries: (retries > 0).then_some(retries),
            retry_attempts: (retries > 0).then_some(reconciled.attempts),
            flaky: reconciled.flaky.then_some(true),
            stdout: to_lines(case.system_out.as_deref()),
            stderr: to_lines(case.system_err.as_deref()),
        }
    }

    fn test_name(&self, case: &JunitTestCase) -> String {
        let name = sanitize(case.name.as_deref()).unwrap_or_else(|| UNNAMED_TEST.to_owned());
        match sanitize(case.suite_name.as_deref()) {
            Some(suite) if self.use_suite_name => format!("{suite}: {name}"),
            _ => name,
        }
    }
}

/// Builds a report from test cases.
///
/// A convenience wrapper around [`ReportBuilder`]. `use_suite_name` defaults to `false`.
pub fn build_report(
    test_cases: &[JunitTestCase],
    tool_name: Option<&str>,
    environment: Option<&IndexMap<String, String>>,
    use_suite_name: Option<bool>,
) -> Report {
    let mut builder = ReportBuilder::new();
    if let Some(tool_name) = tool_name {
        builder.set_tool_name(tool_name);
    }
    if let Some(environment) = environment {
        builder.add_envs(environment.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    builder.set_use_suite_name(use_suite_name.unwrap_or(false));
    builder.build(test_cases)
}

/// Parses a JUnit `time` attribute (seconds) into whole milliseconds.
///
/// Surefire groups thousands for long tests (`1,234.567`), so `,` separators between groups of
/// three digits are accepted. Absent, unparsable, negative or non-finite values are 0.
pub fn duration_millis(time: Option<&str>) -> u64 {
    let Some(seconds) = time.and_then(parse_seconds) else {
        return 0;
    };
    let millis = (seconds * 1000.0).round();
    if millis.is_finite() && millis > 0.0 {
        // Saturates for absurdly large values.
        millis as u64
    } else {
        0
    }
}

fn parse_seconds(time: &str) -> Option<f64> {
    let time = time.trim();
    if !time.contains(',') {
        return time.parse().ok();
    }

    let (whole, fraction) = match time.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (time, None),
    };
    let mut groups = whole.split(',');
    let leading = groups.next()?;
    let grouped = (1..=3).contains(&leading.len())
        && groups.all(|group| group.len() == 3 && group.bytes().all(|b| b.is_ascii_digit()));
    if !grouped {
        return None;
    }

    let mut ungrouped = whole.replace(',', "");
    if let Some(fraction) = fraction {
        ungrouped.push('.');
        ungrouped.push_str(fraction);
    }
    ungrouped.parse().ok()
}

/// Returns the sanitized message and trace, preferring the failure over the error.
fn message_and_trace(case: &JunitTestCase) -> (Option<String>, Option<String>) {
    let failure = case.failure.as_ref();
    let error = case.error.as_ref();

    let message = sanitize(failure.and_then(|f| f.message.as_deref()))
        .or_else(|| sanitize(error.and_then(|e| e.message.as_deref())));
    let trace = sanitize(failure.and_then(|f| f.trace.as_deref()))
        .or_else(|| sanitize(error.and_then(|e| e.trace.as_deref())));
    (message, trace)
}
