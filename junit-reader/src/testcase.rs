// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

/// A single `<testcase>` read from a JUnit report, flattened together with the name of the
/// testsuite that encloses it.
///
/// All text fields hold the text exactly as it appeared in the report (after XML unescaping).
/// No trimming or sanitization is performed here.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct JunitTestCase {
    /// The name of the innermost `<testsuite>` that contains this testcase.
    pub suite_name: Option<String>,

    /// The "classname" of the testcase.
    ///
    /// Typically, this represents the fully qualified path to the test. In other words,
    /// `classname` + `name` together should uniquely identify and locate a test.
    pub classname: Option<String>,

    /// The name of the testcase.
    pub name: Option<String>,

    /// The time it took to execute this testcase, in seconds, as written in the report.
    ///
    /// This is kept as text because runners disagree on the format. Interpretation is left to
    /// the consumer.
    pub time: Option<String>,

    /// The `<failure>` element, if present.
    pub failure: Option<NonSuccess>,

    /// The `<error>` element, if present.
    pub error: Option<NonSuccess>,

    /// Whether a `<skipped>` element was present.
    pub skipped: bool,

    /// The source file the test is defined in. Written by pytest and some JavaScript reporters.
    pub file: Option<String>,

    /// The line the test is defined on.
    pub line: Option<u64>,

    /// Data written to standard output while the testcase was executed.
    pub system_out: Option<String>,

    /// Data written to standard error while the testcase was executed.
    pub system_err: Option<String>,

    /// Prior failed runs of a test that eventually passed (`<flakyFailure>`).
    pub flaky_failures: Vec<TestRerun>,

    /// Prior errored runs of a test that eventually passed (`<flakyError>`).
    pub flaky_errors: Vec<TestRerun>,

    /// Reruns of a test that failed every time (`<rerunFailure>`).
    pub rerun_failures: Vec<TestRerun>,

    /// Reruns of a test that errored every time (`<rerunError>`).
    pub rerun_errors: Vec<TestRerun>,
}

impl JunitTestCase {
    /// Creates a new testcase with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns true if the testcase has a `<failure>` element.
    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Returns true if the testcase has an `<error>` element.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Sets the name of the enclosing testsuite.
    pub fn set_suite_name(&mut self, suite_name: impl Into<String>) -> &mut Self {
        self.suite_name = Some(suite_name.into());
        self
    }

    /// Sets the classname of the test.
    pub fn set_classname(&mut self, classname: impl Into<String>) -> &mut Self {
        self.classname = Some(classname.into());
        self
    }

    /// Sets the time taken, as text.
    pub fn set_time(&mut self, time: impl Into<String>) -> &mut Self {
        self.time = Some(time.into());
        self
    }

    /// Sets the failure element.
    pub fn set_failure(&mut self, failure: NonSuccess) -> &mut Self {
        self.failure = Some(failure);
        self
    }

    /// Sets the error element.
    pub fn set_error(&mut self, error: NonSuccess) -> &mut Self {
        self.error = Some(error);
        self
    }

    /// Marks the testcase as skipped.
    pub fn set_skipped(&mut self, skipped: bool) -> &mut Self {
        self.skipped = skipped;
        self
    }

    /// Sets the source file and, optionally, the line.
    pub fn set_location(&mut self, file: impl Into<String>, line: Option<u64>) -> &mut Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    /// Sets standard output.
    pub fn set_system_out(&mut self, system_out: impl Into<String>) -> &mut Self {
        self.system_out = Some(system_out.into());
        self
    }

    /// Sets standard error.
    pub fn set_system_err(&mut self, system_err: impl Into<String>) -> &mut Self {
        self.system_err = Some(system_err.into());
        self
    }

    /// Adds a rerun, routing it to the list matching its kind.
    pub fn add_rerun(&mut self, rerun: TestRerun) -> &mut Self {
        self.reruns_mut(rerun.kind).push(rerun);
        self
    }

    /// Adds several reruns.
    pub fn add_reruns(&mut self, reruns: impl IntoIterator<Item = TestRerun>) -> &mut Self {
        for rerun in reruns {
            self.add_rerun(rerun);
        }
        self
    }

    /// Returns the reruns of the given kind.
    pub fn reruns(&self, kind: RerunKind) -> &[TestRerun] {
        match kind {
            RerunKind::FlakyFailure => &self.flaky_failures,
            RerunKind::FlakyError => &self.flaky_errors,
            RerunKind::RerunFailure => &self.rerun_failures,
            RerunKind::RerunError => &self.rerun_errors,
        }
    }

    fn reruns_mut(&mut self, kind: RerunKind) -> &mut Vec<TestRerun> {
        match kind {
            RerunKind::FlakyFailure => &mut self.flaky_failures,
            RerunKind::FlakyError => &mut self.flaky_errors,
            RerunKind::RerunFailure => &mut self.rerun_failures,
            RerunKind::RerunError => &mut self.rerun_errors,
        }
    }
}

/// A `<failure>` or `<error>` element on a testcase.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct NonSuccess {
    /// The failure message.
    pub message: Option<String>,

    /// The "type" of failure that occurred.
    pub ty: Option<String>,

    /// The stack trace or description of the failure.
    ///
    /// This is read from the text node of the element.
    pub trace: Option<String>,
}

impl NonSuccess {
    /// Creates a new, empty `NonSuccess`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the type.
    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the trace.
    pub fn set_trace(&mut self, trace: impl Into<String>) -> &mut Self {
        self.trace = Some(trace.into());
        self
    }
}

/// One observed attempt of a test that was retried.
///
/// Serialized in JUnit XML as `flakyFailure` or `flakyError` for tests that eventually passed, and
/// as `rerunFailure` or `rerunError` for tests that never did.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct TestRerun {
    /// Which of the four retry elements this was read from.
    pub kind: RerunKind,

    /// The failure message.
    pub message: Option<String>,

    /// The "type" of failure that occurred.
    pub ty: Option<String>,

    /// The stack trace, if any.
    ///
    /// Read from the `<stackTrace>` child, or from the element's own text if there is no such
    /// child.
    pub stack_trace: Option<String>,

    /// Data written to standard output while the test rerun was executed.
    pub system_out: Option<String>,

    /// Data written to standard error while the test rerun was executed.
    pub system_err: Option<String>,
}

impl TestRerun {
    /// Creates a new `TestRerun` of the given kind.
    pub fn new(kind: RerunKind) -> Self {
        TestRerun {
            kind,
            message: None,
            ty: None,
            stack_trace: None,
            system_out: None,
            system_err: None,
        }
    }

    /// Sets the message.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the type.
    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        self.ty = Some(ty.into());
        self
    }

    /// Sets the stack trace.
    pub fn set_stack_trace(&mut self, stack_trace: impl Into<String>) -> &mut Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Sets standard output.
    pub fn set_system_out(&mut self, system_out: impl Into<String>) -> &mut Self {
        self.system_out = Some(system_out.into());
        self
    }

    /// Sets standard error.
    pub fn set_system_err(&mut self, system_err: impl Into<String>) -> &mut Self {
        self.system_err = Some(system_err.into());
        self
    }
}

/// The kind of a [`TestRerun`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RerunKind {
    /// A failed attempt of a test that eventually passed.
    FlakyFailure,

    /// An errored attempt of a test that eventually passed.
    FlakyError,

    /// A failed rerun of a test that never passed.
    RerunFailure,

    /// An errored rerun of a test that never passed.
    RerunError,
}

impl RerunKind {
    /// All rerun kinds, in the order their attempts are numbered.
    pub const ALL: [RerunKind; 4] = [
        RerunKind::FlakyFailure,
        RerunKind::FlakyError,
        RerunKind::RerunFailure,
        RerunKind::RerunError,
    ];

    /// Returns the XML element name for this kind.
    pub fn tag_name(self) -> &'static str {
        match self {
            RerunKind::FlakyFailure => "flakyFailure",
            RerunKind::FlakyError => "flakyError",
            RerunKind::RerunFailure => "rerunFailure",
            RerunKind::RerunError => "rerunError",
        }
    }

    /// Looks up a kind by its XML element name.
    pub fn from_tag_name(tag: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag_name().as_bytes() == tag)
    }

    /// Returns true for the kinds recorded on tests that eventually passed.
    pub fn is_flaky(self) -> bool {
        matches!(self, RerunKind::FlakyFailure | RerunKind::FlakyError)
    }
}

impl fmt::Display for RerunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_name())
    }
}
