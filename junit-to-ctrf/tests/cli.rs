// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests that run the `junit-to-ctrf` binary.

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use duct::cmd;
use indoc::indoc;
use junit_to_ctrf::ConvertExitCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::{fmt, process::Output};

const PASSING: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testsuite name="com.example.MathTest" tests="2">
      <testcase classname="com.example.MathTest" name="adds" time="0.010"/>
      <testcase classname="com.example.MathTest" name="flaky" time="0.020">
        <flakyFailure message="expected 4 but was 5" type="AssertionError">
          <stackTrace>at MathTest.flaky(MathTest.java:12)</stackTrace>
        </flakyFailure>
      </testcase>
    </testsuite>
"#};

const FAILING: &str = indoc! {r#"
    <testsuites>
      <testsuite name="integration">
        <testcase name="connects" time="1.5">
          <failure message="connection refused">stack</failure>
          <rerunFailure message="connection refused again"/>
        </testcase>
        <testcase name="later"><skipped/></testcase>
      </testsuite>
    </testsuites>
"#};

struct Project {
    dir: Utf8TempDir,
}

impl Project {
    fn new() -> Self {
        let project = Self {
            dir: camino_tempfile::tempdir().expect("created temp dir"),
        };
        project.write("reports/TEST-math.xml", PASSING);
        project.write("reports/nested/TEST-integration.xml", FAILING);
        project
    }

    fn root(&self) -> &Utf8Path {
        self.dir.path()
    }

    fn write(&self, path: &str, contents: &str) {
        let path = self.root().join(path);
        std::fs::create_dir_all(path.parent().expect("has parent")).expect("created dirs");
        std::fs::write(&path, contents).expect("wrote file");
    }

    fn run<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> CliOutput {
        let args: Vec<&str> = args.into_iter().collect();
        let output = cmd(env!("CARGO_BIN_EXE_junit-to-ctrf"), &args)
            .dir(self.root().as_std_path())
            .env("CARGO_TERM_COLOR", "never")
            .env_remove("JUNIT_TO_CTRF_LOG")
            .env_remove("JUNIT_TO_CTRF_VERBOSE")
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("binary ran");
        CliOutput {
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            output,
        }
    }

    fn read_report(&self, path: &str) -> Value {
        let contents =
            std::fs::read_to_string(self.root().join(path)).expect("report was written");
        serde_json::from_str(&contents).expect("report is valid JSON")
    }

    fn report_path(&self, path: &str) -> Utf8PathBuf {
        self.root().join(path)
    }
}

struct CliOutput {
    args: Vec<String>,
    output: Output,
}

impl CliOutput {
    fn exit_code(&self) -> Option<i32> {
        self.output.status.code()
    }

    fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }
}

// Make Debug output readable in assertion failures.
impl fmt::Debug for CliOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "args: {:?}\nexit code: {:?}\n--- stdout ---\n{}\n--- stderr ---\n{}\n",
            self.args,
            self.exit_code(),
            String::from_utf8_lossy(&self.output.stdout),
            self.stderr(),
        )
    }
}

fn test_names(report: &Value) -> Vec<String> {
    report["results"]["tests"]
        .as_array()
        .expect("tests is an array")
        .iter()
        .map(|test| test["name"].as_str().expect("name is a string").to_owned())
        .collect()
}

#[test]
fn converts_with_defaults() {
    let project = Project::new();
    let output = project.run(["reports/**/*.xml"]);
    assert_eq!(output.exit_code(), Some(ConvertExitCode::OK), "{output:?}");
    assert!(
        output.stderr().contains("info: wrote CTRF report to"),
        "{output:?}"
    );

    let report = project.read_report("ctrf/ctrf-report.json");
    assert_eq!(report["results"]["tool"]["name"], "junit-to-ctrf");
    // Sorted by path: reports/TEST-math.xml before reports/nested/...
    assert_eq!(
        test_names(&report),
        vec![
            "com.example.MathTest: adds",
            "com.example.MathTest: flaky",
            "integration: connects",
            "integration: later",
        ]
    );
    assert_eq!(
        report["results"]["summary"],
        json!({
            "tests": 4,
            "passed": 2,
            "failed": 1,
            "skipped": 1,
            "pending": 0,
            "other": 0,
            "flaky": 1,
            "start": 0,
            "stop": 0,
        })
    );
    assert_eq!(report["results"]["tests"][2]["retries"], 1);
    assert_eq!(report["results"]["tests"][2]["retryAttempts"][0]["attempt"], 2);
    assert!(report["results"].get("environment").is_none());
}

#[test]
fn command_line_options() {
    let project = Project::new();
    let output = project.run([
        "--output",
        "out/report.json",
        "--tool",
        "surefire",
        "-e",
        "BRANCH=main",
        "--env",
        "BUILD=42",
        "--use-suite-name=false",
        "reports/TEST-math.xml",
    ]);
    assert_eq!(output.exit_code(), Some(ConvertExitCode::OK), "{output:?}");
    assert!(!project.report_path("ctrf/ctrf-report.json").exists());

    let report = project.read_report("out/report.json");
    assert_eq!(report["results"]["tool"]["name"], "surefire");
    assert_eq!(
        report["results"]["environment"],
        json!({ "BRANCH": "main", "BUILD": "42" })
    );
    assert_eq!(test_names(&report), vec!["adds", "flaky"]);
}

#[test]
fn config_file_and_overrides() {
    let project = Project::new();
    project.write(
        ".config/junit-to-ctrf.toml",
        indoc! {r#"
            output = "from-config.json"
            tool-name = "gradle"
            use-suite-name = false
            env = ["BRANCH=config", "OS=linux"]
        "#},
    );

    let output = project.run(["reports"]);
    assert_eq!(output.exit_code(), Some(ConvertExitCode::OK), "{output:?}");
    let report = project.read_report("from-config.json");
    assert_eq!(report["results"]["tool"]["name"], "gradle");
    assert_eq!(test_names(&report), vec!["adds", "flaky"]);

    let output = project.run(["-t", "maven", "-e", "BRANCH=cli", "--use-suite-name", "reports"]);
    assert_eq!(output.exit_code(), Some(ConvertExitCode::OK), "{output:?}");
    let report = project.read_report("from-config.json");
    assert_eq!(report["results"]["tool"]["name"], "maven");
    assert_eq!(
        report["results"]["environment"],
        json!({ "BRANCH": "cli", "OS": "linux" })
    );
    assert_eq!(
        test_names(&report),
        vec!["com.example.MathTest: adds", "com.example.MathTest: flaky"]
    );
}

#[test]
fn no_test_cases() {
    let project = Project::new();
    project.write("empty/TEST-empty.xml", r#"<testsuite name="empty" tests="0"/>"#);

    let output = project.run(["empty", "does-not-exist/*.xml"]);
    assert_eq!(
        output.exit_code(),
        Some(ConvertExitCode::NO_TEST_CASES),
        "{output:?}"
    );
    assert!(output.stderr().contains("warning: no test cases found"), "{output:?}");
    assert!(!project.report_path("ctrf/ctrf-report.json").exists());
}

#[test]
fn malformed_input() {
    let project = Project::new();
    project.write("bad/TEST-bad.xml", "<testsuite><testcase name=\"x\"></testsuite>");

    let output = project.run(["bad"]);
    assert_eq!(
        output.exit_code(),
        Some(ConvertExitCode::INPUT_ERROR),
        "{output:?}"
    );
    assert!(output.stderr().contains("error: "), "{output:?}");
    assert!(!project.report_path("ctrf/ctrf-report.json").exists());
}

#[test]
fn setup_errors() {
    let project = Project::new();

    let output = project.run(["reports/[oops.xml"]);
    assert_eq!(
        output.exit_code(),
        Some(ConvertExitCode::SETUP_ERROR),
        "{output:?}"
    );

    project.write(".config/junit-to-ctrf.toml", "use-suite-name = \"sometimes\"\n");
    let output = project.run(["reports"]);
    assert_eq!(
        output.exit_code(),
        Some(ConvertExitCode::SETUP_ERROR),
        "{output:?}"
    );
    assert!(output.stderr().contains("failed to parse config"), "{output:?}");

    let output = project.run(["--config-file", "missing.toml", "reports"]);
    assert_eq!(
        output.exit_code(),
        Some(ConvertExitCode::SETUP_ERROR),
        "{output:?}"
    );
}

#[test]
fn unwritable_output() {
    let project = Project::new();
    project.write("blocker", "");

    let output = project.run(["-o", "blocker/report.json", "reports"]);
    assert_eq!(
        output.exit_code(),
        Some(ConvertExitCode::WRITE_OUTPUT_ERROR),
        "{output:?}"
    );
}

#[test]
fn invalid_arguments() {
    let project = Project::new();
    let output = project.run(["-e", "NOVALUE", "reports"]);
    assert_eq!(output.exit_code(), Some(2), "{output:?}");
    assert!(output.stderr().contains("KEY=VALUE"), "{output:?}");
}
