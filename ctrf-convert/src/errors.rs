// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while converting reports.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use junit_reader::ReadError;
use std::io;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing the config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),

    /// An `env` entry was malformed.
    #[error("invalid entry in `env`")]
    InvalidEnvProperty(#[source] EnvPropertyParseError),
}

/// An error returned while parsing a `KEY=VALUE` environment property.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnvPropertyParseError {
    /// The input did not contain `=`.
    #[error("environment property `{input}` must be of the form KEY=VALUE")]
    MissingSeparator {
        /// The input that failed to parse.
        input: String,
    },

    /// The key was empty.
    #[error("environment property `{input}` has an empty key")]
    EmptyKey {
        /// The input that failed to parse.
        input: String,
    },
}

/// An error that occurred while expanding an input pattern into files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// The pattern was not a valid glob.
    #[error("invalid input pattern `{pattern}`")]
    InvalidGlob {
        /// The pattern that failed to parse.
        pattern: String,

        /// The underlying error.
        #[source]
        error: globset::Error,
    },

    /// A directory could not be traversed.
    #[error("error walking directory `{root}`")]
    Walk {
        /// The root of the traversal.
        root: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: walkdir::Error,
    },
}

/// An error that occurred while collecting test cases from input files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectError {
    /// An input pattern could not be expanded.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// An input file could not be read or parsed.
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// An error that occurred while serializing a report.
///
/// Produced only when a section of the report cannot be represented as JSON. Each failing section
/// is logged as it is found.
#[derive(Debug, Error)]
#[error("failed to serialize report (failing sections: {})", .failed_sections.join(", "))]
pub struct SerializeReportError {
    failed_sections: Vec<String>,
    #[source]
    error: serde_json::Error,
}

impl SerializeReportError {
    pub(crate) fn new(failed_sections: Vec<String>, error: serde_json::Error) -> Self {
        Self {
            failed_sections,
            error,
        }
    }

    /// Returns the names of the sections that failed to serialize.
    pub fn failed_sections(&self) -> &[String] {
        &self.failed_sections
    }
}

/// An error that occurred while writing a report to disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// The report could not be serialized.
    #[error(transparent)]
    Serialize(#[from] SerializeReportError),

    /// The output directory could not be created.
    #[error("error creating output directory `{dir}`")]
    CreateDir {
        /// The directory that could not be created.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The report file could not be written.
    #[error("error writing report to `{path}`")]
    Write {
        /// The output path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: atomicwrites::Error<io::Error>,
    },
}
