// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ConvertExitCode,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use camino::FromPathBufError;
use ctrf_convert::errors::{CollectError, ConfigParseError, DiscoveryError, WriteReportError};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are short summaries. Errors are shown to users through display_to_stderr,
// which also prints the chain of causes.

/// An expected failure, reported to the user with a documented exit code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpectedError {
    /// The current directory could not be determined.
    #[error("could not determine current directory")]
    CurrentDirFailed {
        /// The underlying error.
        #[source]
        err: std::io::Error,
    },

    /// The current directory is not valid UTF-8.
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        /// The underlying error.
        #[source]
        err: FromPathBufError,
    },

    /// The config could not be parsed.
    #[error("config parse error")]
    ConfigParseError {
        /// The underlying error.
        #[from]
        err: ConfigParseError,
    },

    /// An input pattern was invalid.
    #[error("invalid input pattern")]
    InputPatternError {
        /// The underlying error.
        #[from]
        err: DiscoveryError,
    },

    /// Test cases could not be read from the inputs.
    #[error("error reading inputs")]
    InputReadError {
        /// The underlying error.
        #[from]
        err: CollectError,
    },

    /// The report could not be written.
    #[error("error writing report")]
    WriteReportError {
        /// The underlying error.
        #[from]
        err: WriteReportError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::InputPatternError { .. } => ConvertExitCode::SETUP_ERROR,
            Self::InputReadError { .. } => ConvertExitCode::INPUT_ERROR,
            Self::WriteReportError { .. } => ConvertExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                tracing::error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                tracing::error!(
                    "current directory `{}` is not valid UTF-8",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                tracing::error!(
                    "failed to parse config at `{}`",
                    err.config_file().style(styles.bold)
                );
                err.source()
            }
            Self::InputPatternError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::InputReadError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::WriteReportError { err } => {
                tracing::error!("{err}");
                err.source()
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
