// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurs while reading a JUnit report.
///
/// Returned by [`read_str`](crate::read_str), [`read_bytes`](crate::read_bytes) and
/// [`read_file`](crate::read_file).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The report file could not be read.
    #[error("error reading JUnit report at `{path}`")]
    Io {
        /// The path that was being read.
        path: Utf8PathBuf,

        /// The underlying I/O error.
        #[source]
        error: std::io::Error,
    },

    /// The report is not well-formed XML.
    #[error("error parsing JUnit report{} at byte {position}", DisplayPath(.path.as_ref()))]
    Xml {
        /// The path to the report, if it was read from a file.
        path: Option<Utf8PathBuf>,

        /// The byte offset at which the error was detected.
        position: usize,

        /// The underlying XML error.
        #[source]
        error: quick_xml::Error,
    },

    /// The report ended while an element was still open.
    #[error(
        "JUnit report{} ended before `<{element}>` was closed",
        DisplayPath(.path.as_ref())
    )]
    Truncated {
        /// The path to the report, if it was read from a file.
        path: Option<Utf8PathBuf>,

        /// The innermost element that was left open.
        element: String,
    },
}

impl ReadError {
    pub(crate) fn with_path(self, new_path: &camino::Utf8Path) -> Self {
        match self {
            Self::Xml {
                position, error, ..
            } => Self::Xml {
                path: Some(new_path.to_owned()),
                position,
                error,
            },
            Self::Truncated { element, .. } => Self::Truncated {
                path: Some(new_path.to_owned()),
                element,
            },
            other @ Self::Io { .. } => other,
        }
    }
}

struct DisplayPath<'a>(Option<&'a Utf8PathBuf>);

impl std::fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(path) => write!(f, " `{path}`"),
            None => Ok(()),
        }
    }
}
