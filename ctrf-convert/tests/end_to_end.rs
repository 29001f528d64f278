// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use ctrf_convert::{
    discovery::{InputPattern, read_test_cases},
    report::{Report, ReportBuilder, Summary, TestStatus, build_report},
    write::write_report,
};
use indexmap::IndexMap;
use indoc::indoc;
use junit_reader::read_str;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn convert(xml: &str, use_suite_name: bool) -> Report {
    let cases = read_str(xml).expect("valid JUnit XML");
    let mut builder = ReportBuilder::new();
    builder.set_use_suite_name(use_suite_name);
    builder.build(&cases)
}

fn to_value(report: &Report) -> Value {
    serde_json::to_value(report).expect("report serializes")
}

#[test]
fn single_passing_test() {
    let report = convert(
        indoc! {r#"
            <testsuite name="Suite1" tests="1">
              <testcase classname="a.B" name="passes" time="0.5"/>
            </testsuite>
        "#},
        false,
    );
    let value = to_value(&report);
    assert_eq!(
        value["results"]["tests"],
        json!([{ "name": "passes", "status": "passed", "duration": 500, "suite": "Suite1" }])
    );
}

#[test]
fn flaky_test_passes_after_retries() {
    let report = convert(
        indoc! {r#"
            <testsuite name="Suite1">
              <testcase name="sometimes" time="1.0">
                <flakyFailure message="first" type="AssertionError">
                  <stackTrace>at first</stackTrace>
                  <system-out>attempt one</system-out>
                </flakyFailure>
                <flakyFailure message="second" type="AssertionError">
                  <stackTrace>at second</stackTrace>
                </flakyFailure>
              </testcase>
            </testsuite>
        "#},
        false,
    );

    let test = &report.results.tests[0];
    assert_eq!(test.status, TestStatus::Passed);
    assert_eq!(test.flaky, Some(true));
    assert_eq!(test.retries, Some(2));
    let attempts = test.retry_attempts.as_ref().expect("attempts recorded");
    let numbers: Vec<_> = attempts.iter().map(|attempt| attempt.attempt).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(
        to_value(&report)["results"]["tests"][0]["retryAttempts"][0],
        json!({
            "attempt": 1,
            "status": "failed",
            "message": "first",
            "trace": "at first",
            "stdout": ["attempt one"],
        })
    );
    assert_eq!(report.results.summary.flaky, Some(1));
    assert_eq!(report.results.summary.passed, 1);
}

#[test]
fn rerun_test_stays_failed() {
    let report = convert(
        indoc! {r#"
            <testsuite name="Suite1">
              <testcase name="always">
                <failure message="boom">trace</failure>
                <rerunFailure message="boom again"/>
                <rerunError message="crashed"/>
              </testcase>
            </testsuite>
        "#},
        false,
    );

    let test = &report.results.tests[0];
    assert_eq!(test.status, TestStatus::Failed);
    assert_eq!(test.flaky, None);
    assert_eq!(test.retries, Some(2));
    let numbers: Vec<_> = test
        .retry_attempts
        .as_ref()
        .expect("attempts recorded")
        .iter()
        .map(|attempt| attempt.attempt)
        .collect();
    assert_eq!(numbers, vec![2, 3]);
    assert_eq!(test.message.as_deref(), Some("boom"));
    assert_eq!(test.trace.as_deref(), Some("trace"));

    let value = to_value(&report);
    assert!(value["results"]["tests"][0].get("flaky").is_none());
    assert!(value["results"]["summary"].get("flaky").is_none());
}

#[test]
fn empty_input() {
    let report = build_report(&[], None, None, None);
    assert_eq!(
        report.results.summary,
        Summary {
            tests: 0,
            passed: 0,
            failed: 0,
            skipped: 0,
            pending: 0,
            other: 0,
            flaky: None,
            start: 0,
            stop: 0,
        }
    );
    let value = to_value(&report);
    assert_eq!(value["results"]["tests"], json!([]));
    assert!(value["results"]["summary"].get("flaky").is_none());
    assert!(value["results"].get("environment").is_none());
}

#[test]
fn suite_qualified_names() {
    let xml = indoc! {r#"
        <testsuites>
          <testsuite name="Suite1">
            <testcase name="test1"/>
          </testsuite>
          <testcase name="orphan"/>
        </testsuites>
    "#};
    let qualified = convert(xml, true);
    let names: Vec<_> = qualified
        .results
        .tests
        .iter()
        .map(|test| test.name.as_str())
        .collect();
    assert_eq!(names, vec!["Suite1: test1", "orphan"]);

    let plain = convert(xml, false);
    assert_eq!(plain.results.tests[0].name, "test1");
}

#[test]
fn hostile_text_is_sanitized() {
    let report = convert(
        indoc! {r#"
            <testsuite name="Suite1">
              <testcase name="&#xFEFF;weird&#x1B;[0m name" time="abc">
                <error message="&#xD800;bad"><![CDATA[line 1
            line 2]]></error>
                <system-err>&#x7;

                  warn  </system-err>
              </testcase>
            </testsuite>
        "#},
        false,
    );
    let test = &report.results.tests[0];
    assert_eq!(test.name, "weird [0m name");
    assert_eq!(test.duration, 0);
    assert_eq!(test.status, TestStatus::Failed);
    assert_eq!(test.message.as_deref(), Some("\u{FFFD}bad"));
    assert_eq!(test.trace.as_deref(), Some("line 1\nline 2"));
    assert_eq!(test.stderr, Some(vec!["warn".to_owned()]));
}

#[test]
fn files_to_report_on_disk() {
    let dir = camino_tempfile::tempdir().expect("created temp dir");
    let reports = dir.path().join("reports");
    std::fs::create_dir_all(&reports).expect("created dir");
    std::fs::write(
        reports.join("TEST-one.xml"),
        r#"<testsuite name="One"><testcase name="a" time="0.1"/></testsuite>"#,
    )
    .expect("wrote report");
    std::fs::write(
        reports.join("TEST-two.xml"),
        r#"<testsuite name="Two"><testcase name="b"><skipped/></testcase></testsuite>"#,
    )
    .expect("wrote report");

    let pattern = InputPattern::new(&format!("{reports}/TEST-*.xml")).expect("valid glob");
    let cases = read_test_cases(&[pattern]).expect("read reports");

    let mut environment = IndexMap::new();
    environment.insert("CI".to_owned(), "true".to_owned());
    let report = build_report(&cases, Some("surefire"), Some(&environment), Some(true));

    let output = dir.path().join("ctrf/ctrf-report.json");
    write_report(&report, &output).expect("wrote report");

    let contents = std::fs::read_to_string(&output).expect("report exists");
    let value: Value = serde_json::from_str(&contents).expect("valid JSON");
    assert_eq!(value["reportFormat"], "CTRF");
    assert_eq!(value["results"]["tool"], json!({ "name": "surefire" }));
    assert_eq!(value["results"]["environment"], json!({ "CI": "true" }));
    assert_eq!(
        value["results"]["tests"],
        json!([
            { "name": "One: a", "status": "passed", "duration": 100, "suite": "One" },
            { "name": "Two: b", "status": "skipped", "duration": 0, "suite": "Two" },
        ])
    );
    assert_eq!(value["results"]["summary"]["skipped"], 1);
}
