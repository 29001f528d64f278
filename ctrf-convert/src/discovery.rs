// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expansion of input patterns into JUnit report files.
//!
//! An input pattern is one of:
//!
//! * a path to a file, which is read as-is whatever its extension;
//! * a path to a directory, meaning every `*.xml` file directly inside it;
//! * a glob such as `target/surefire-reports/*.xml` or `**/TEST-*.xml`. `*` and `?` never match
//!   `/`, and `**` matches any number of directories.

use crate::errors::{CollectError, DiscoveryError};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobMatcher};
use indexmap::IndexSet;
use junit_reader::JunitTestCase;
use std::{fmt, str::FromStr};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A single input pattern.
#[derive(Clone, Debug)]
pub struct InputPattern {
    pattern: String,
    kind: PatternKind,
}

#[derive(Clone, Debug)]
enum PatternKind {
    Literal(Utf8PathBuf),
    Glob {
        base: Utf8PathBuf,
        // Walked paths have the base's `./` prefix stripped before matching.
        strip_dot: bool,
        // None if the pattern contains `**`.
        max_depth: Option<usize>,
        matcher: GlobMatcher,
    },
}

impl InputPattern {
    /// Parses an input pattern.
    ///
    /// Returns an error if the pattern contains glob metacharacters but is not a valid glob.
    pub fn new(pattern: &str) -> Result<Self, DiscoveryError> {
        let kind = if is_glob(pattern) {
            let matcher = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|error| DiscoveryError::InvalidGlob {
                    pattern: pattern.to_owned(),
                    error,
                })?
                .compile_matcher();

            let components: Vec<&str> = pattern.split('/').collect();
            let literal_len = components
                .iter()
                .position(|component| is_glob(component))
                .unwrap_or(components.len());
            let (literal, rest) = components.split_at(literal_len);

            let (base, strip_dot) = match literal.join("/") {
                base if !base.is_empty() => (Utf8PathBuf::from(base), false),
                _ if pattern.starts_with('/') => (Utf8PathBuf::from("/"), false),
                _ => (Utf8PathBuf::from("."), true),
            };
            let max_depth = (!rest.iter().any(|component| component.contains("**")))
                .then_some(rest.len());

            PatternKind::Glob {
                base,
                strip_dot,
                max_depth,
                matcher,
            }
        } else {
            PatternKind::Literal(Utf8PathBuf::from(pattern))
        };

        Ok(Self {
            pattern: pattern.to_owned(),
            kind,
        })
    }

    /// Returns the pattern as it was given.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns the files matched by this pattern, sorted by path.
    ///
    /// Returned paths have `.` components removed, so the same file is spelled the same way
    /// whichever pattern matched it.
    ///
    /// A pattern that matches nothing, including a literal path that does not exist, returns an
    /// empty list.
    pub fn expand(&self) -> Result<Vec<Utf8PathBuf>, DiscoveryError> {
        let mut paths = match &self.kind {
            PatternKind::Literal(path) if path.is_dir() => {
                let walker = WalkDir::new(path).min_depth(1).max_depth(1);
                walk_files(path, walker, |file| {
                    file.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
                })?
            }
            PatternKind::Literal(path) if path.exists() => vec![normalize(path)],
            PatternKind::Literal(path) => {
                warn!("input path `{path}` does not exist");
                Vec::new()
            }
            PatternKind::Glob {
                base,
                strip_dot,
                max_depth,
                matcher,
            } => {
                if !base.is_dir() {
                    debug!("glob base `{base}` for `{}` is not a directory", self.pattern);
                    return Ok(Vec::new());
                }
                let mut walker = WalkDir::new(base).min_depth(1);
                if let Some(max_depth) = max_depth {
                    walker = walker.max_depth(*max_depth);
                }
                let strip_dot = *strip_dot;
                walk_files(base, walker, |file| {
                    let file = if strip_dot {
                        file.strip_prefix(".").unwrap_or(file)
                    } else {
                        file
                    };
                    matcher.is_match(file)
                })?
            }
        };

        paths.sort();
        Ok(paths)
    }
}

impl FromStr for InputPattern {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for InputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Expands all patterns, in order, and reads every matched file.
///
/// A file matched by more than one pattern is read once, at its first position.
pub fn read_test_cases(patterns: &[InputPattern]) -> Result<Vec<JunitTestCase>, CollectError> {
    let mut files = IndexSet::new();
    for pattern in patterns {
        let matched = pattern.expand()?;
        if matched.is_empty() {
            warn!("no files matched input pattern `{pattern}`");
        }
        files.extend(matched);
    }

    let mut test_cases = Vec::new();
    for file in &files {
        test_cases.extend(junit_reader::read_file(file)?);
    }
    Ok(test_cases)
}

/// Removes `.` components, keeping a lone `.` as is.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let normalized: Utf8PathBuf = path
        .components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .collect();
    if normalized.as_str().is_empty() {
        path.to_owned()
    } else {
        normalized
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn walk_files(
    root: &Utf8Path,
    walker: WalkDir,
    mut is_match: impl FnMut(&Utf8Path) -> bool,
) -> Result<Vec<Utf8PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    for entry in walker.follow_links(true) {
        let entry = entry.map_err(|error| DiscoveryError::Walk {
            root: root.to_owned(),
            error,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => {
                if is_match(&path) {
                    files.push(normalize(&path));
                }
            }
            Err(path) => {
                warn!("skipping non-UTF-8 path `{}`", path.display());
            }
        }
    }
    Ok(files)
}
