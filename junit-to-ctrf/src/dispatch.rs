// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ConvertExitCode, ExpectedError,
    errors::Result,
    output::{OutputContext, OutputOpts},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ctrf_convert::{
    config::{ConvertConfig, EnvProperty},
    discovery::{InputPattern, read_test_cases},
    report::{ReportBuilder, Summary},
    write::write_report,
};
use owo_colors::OwoColorize;
use tracing::{debug, info, warn};

/// Convert JUnit XML test reports into Common Test Report Format (CTRF) JSON.
///
/// Test cases from every matched file are merged into a single report, in the order the patterns
/// are given. Settings are read from `.config/junit-to-ctrf.toml` if present, and command-line
/// options override them.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct JunitToCtrfApp {
    /// JUnit XML files, directories, or glob patterns to convert
    ///
    /// A directory means every `*.xml` file directly inside it. Quote glob patterns to keep the
    /// shell from expanding them, e.g. 'target/**/TEST-*.xml'.
    #[arg(required = true, value_name = "PATTERNS")]
    patterns: Vec<String>,

    /// Where to write the report [default: ctrf/ctrf-report.json]
    #[arg(long, short, value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    /// Tool name to record in the report [default: junit-to-ctrf]
    #[arg(long = "tool", short = 't', value_name = "NAME")]
    tool_name: Option<String>,

    /// Environment property to record in the report (may be repeated)
    #[arg(long = "env", short = 'e', value_name = "KEY=VALUE")]
    env: Vec<EnvProperty>,

    /// Prefix test names with their suite name [default: true]
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    use_suite_name: Option<bool>,

    /// Config file [default: .config/junit-to-ctrf.toml in the current directory]
    #[arg(long, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output_opts: OutputOpts,
}

impl JunitToCtrfApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output_opts.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        let cwd = current_dir()?;
        let config = ConvertConfig::from_sources(&cwd, self.config_file.as_deref())?;
        debug!("resolved config: {config:?}");

        let patterns = self
            .patterns
            .iter()
            .map(|pattern| InputPattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        let test_cases = read_test_cases(&patterns)?;
        if test_cases.is_empty() {
            warn!("no test cases found in inputs, not writing a report");
            return Ok(ConvertExitCode::NO_TEST_CASES);
        }

        let mut builder = ReportBuilder::new();
        if let Some(tool_name) = self.tool_name.or(config.tool_name) {
            builder.set_tool_name(tool_name);
        }
        // Command-line properties are added last, so they win over config properties.
        builder.add_envs(
            config
                .env
                .into_iter()
                .chain(self.env)
                .map(|property| (property.key, property.value)),
        );
        builder.set_use_suite_name(self.use_suite_name.unwrap_or(config.use_suite_name));
        let report = builder.build(&test_cases);

        let output_path = resolve_output(&cwd, self.output.unwrap_or(config.output));
        write_report(&report, &output_path)?;

        let styles = output.stderr_styles();
        info!(
            "wrote CTRF report to `{}` ({})",
            output_path.style(styles.bold),
            DisplaySummary {
                summary: &report.results.summary,
                styles: &styles,
            },
        );
        Ok(ConvertExitCode::OK)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|err| ExpectedError::CurrentDirFailed { err })?;
    Utf8PathBuf::try_from(cwd).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })
}

fn resolve_output(cwd: &Utf8Path, output: Utf8PathBuf) -> Utf8PathBuf {
    if output.is_absolute() {
        output
    } else {
        cwd.join(output)
    }
}

struct DisplaySummary<'a> {
    summary: &'a Summary,
    styles: &'a crate::StderrStyles,
}

impl std::fmt::Display for DisplaySummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Summary {
            tests,
            passed,
            failed,
            skipped,
            flaky,
            ..
        } = self.summary;
        let count = self.styles.count;
        write!(
            f,
            "{} {}: {} passed, {} failed, {} skipped",
            tests.style(count),
            if *tests == 1 { "test" } else { "tests" },
            passed.style(count),
            failed.style(count),
            skipped.style(count),
        )?;
        if let Some(flaky) = flaky {
            write!(f, ", {} flaky", flaky.style(count))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn verify_app() {
        JunitToCtrfApp::command().debug_assert();
    }

    #[test_case(&[], None ; "absent")]
    #[test_case(&["--use-suite-name"], Some(true) ; "bare flag")]
    #[test_case(&["--use-suite-name=true"], Some(true) ; "explicit true")]
    #[test_case(&["--use-suite-name=false"], Some(false) ; "explicit false")]
    fn use_suite_name(args: &[&str], expected: Option<bool>) {
        let app = JunitToCtrfApp::try_parse_from(
            ["junit-to-ctrf", "reports"].iter().chain(args),
        )
        .expect("valid arguments");
        assert_eq!(app.use_suite_name, expected);
    }

    #[test]
    fn repeated_env() {
        let app = JunitToCtrfApp::try_parse_from([
            "junit-to-ctrf",
            "-e",
            "CI=true",
            "--env",
            "URL=a=b",
            "a.xml",
            "b/*.xml",
        ])
        .expect("valid arguments");
        assert_eq!(app.patterns, vec!["a.xml".to_owned(), "b/*.xml".to_owned()]);
        let env: Vec<_> = app.env.iter().map(ToString::to_string).collect();
        assert_eq!(env, vec!["CI=true".to_owned(), "URL=a=b".to_owned()]);
    }

    #[test_case(&["junit-to-ctrf"] ; "no patterns")]
    #[test_case(&["junit-to-ctrf", "-e", "NOVALUE", "a.xml"] ; "env without separator")]
    #[test_case(&["junit-to-ctrf", "-e", "=x", "a.xml"] ; "env with empty key")]
    #[test_case(&["junit-to-ctrf", "--use-suite-name=maybe", "a.xml"] ; "bad bool")]
    fn invalid_arguments(args: &[&str]) {
        JunitToCtrfApp::try_parse_from(args).expect_err("arguments are invalid");
    }

    #[test]
    fn output_resolution() {
        let cwd = Utf8Path::new("/work");
        assert_eq!(
            resolve_output(cwd, Utf8PathBuf::from("ctrf/report.json")),
            Utf8PathBuf::from("/work/ctrf/report.json")
        );
        assert_eq!(
            resolve_output(cwd, Utf8PathBuf::from("/tmp/report.json")),
            Utf8PathBuf::from("/tmp/report.json")
        );
    }

    #[test]
    fn summary_display() {
        let summary = Summary {
            tests: 3,
            passed: 2,
            failed: 1,
            flaky: Some(1),
            ..Summary::default()
        };
        let styles = crate::StderrStyles::default();
        assert_eq!(
            DisplaySummary {
                summary: &summary,
                styles: &styles,
            }
            .to_string(),
            "3 tests: 2 passed, 1 failed, 0 skipped, 1 flaky"
        );
    }
}
