// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON serialization of reports.

use crate::{errors::SerializeReportError, report::Report};
use serde::Serialize;
use tracing::error;

/// Serializes a report to pretty-printed JSON.
///
/// If serialization fails, each section of the report (the summary, the tool, the environment and
/// every test) is serialized on its own to find the ones at fault. Each failing section is logged,
/// and the returned error lists them.
pub fn to_json_pretty(report: &Report) -> Result<String, SerializeReportError> {
    serde_json::to_string_pretty(report)
        .map_err(|error| SerializeReportError::new(failing_sections(report), error))
}

fn failing_sections(report: &Report) -> Vec<String> {
    let results = &report.results;
    let mut failed = Vec::new();

    check_section("summary", &results.summary, &mut failed);
    check_section("tool", &results.tool, &mut failed);
    if let Some(environment) = &results.environment {
        check_section("environment", environment, &mut failed);
    }
    for (index, test) in results.tests.iter().enumerate() {
        check_section(&format!("tests[{index}] ({})", test.name), test, &mut failed);
    }

    failed
}

fn check_section<T: Serialize + ?Sized>(name: &str, value: &T, failed: &mut Vec<String>) {
    if let Err(err) = serde_json::to_string(value) {
        error!("failed to serialize report section {name}: {err}");
        failed.push(name.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportBuilder;
    use chrono::{TimeZone, Utc};
    use junit_reader::JunitTestCase;
    use pretty_assertions::assert_eq;
    use serde::Serializer;

    #[test]
    fn pretty_output() {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp");
        let mut case = JunitTestCase::new("only");
        case.set_time("0.002");
        let report = ReportBuilder::new().build_at(&[case], timestamp);

        let json = to_json_pretty(&report).expect("report serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(
            value,
            serde_json::json!({
                "reportFormat": "CTRF",
                "specVersion": "0.0.0",
                "generatedBy": "junit-to-ctrf",
                "timestamp": "2024-01-02T03:04:05.000Z",
                "results": {
                    "tool": { "name": "junit-to-ctrf" },
                    "summary": {
                        "tests": 1,
                        "passed": 1,
                        "failed": 0,
                        "skipped": 0,
                        "pending": 0,
                        "other": 0,
                        "start": 0,
                        "stop": 0
                    },
                    "tests": [
                        { "name": "only", "status": "passed", "duration": 2 }
                    ]
                }
            })
        );
        assert!(json.contains("\n  \"reportFormat\""), "output is indented");
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[test]
    fn failing_section_is_recorded() {
        let mut failed = Vec::new();
        check_section("good", &1u32, &mut failed);
        check_section("bad", &Unserializable, &mut failed);
        assert_eq!(failed, vec!["bad".to_owned()]);
    }
}
