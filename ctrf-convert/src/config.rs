// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for conversions.
//!
//! Settings are layered: the embedded defaults in `default-config.toml`, then an optional config
//! file. Command-line arguments are applied on top by the caller.

use crate::errors::{ConfigParseError, ConfigParseErrorKind, EnvPropertyParseError};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::{collections::BTreeSet, fmt, str::FromStr};
use tracing::warn;

/// Settings that control a conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Where the report is written.
    pub output: Utf8PathBuf,

    /// The tool name recorded in the report.
    pub tool_name: Option<String>,

    /// Whether test names are prefixed with their suite name.
    pub use_suite_name: bool,

    /// Environment properties recorded in the report, in order.
    pub env: Vec<EnvProperty>,
}

impl ConvertConfig {
    /// The path, relative to the working directory, of the config file.
    pub const CONFIG_PATH: &'static str = ".config/junit-to-ctrf.toml";

    /// The embedded default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config.
    ///
    /// If `config_file` is specified it must exist. Otherwise `.config/junit-to-ctrf.toml` under
    /// `cwd` is read if present, and the defaults are used if not. Unknown keys are reported as
    /// warnings.
    pub fn from_sources(
        cwd: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        Self::from_sources_impl(cwd, config_file, |config_file, unknown| {
            let mut unknown_str = String::new();
            for ignored_key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(ignored_key);
            }
            warn!("ignoring unknown configuration keys in config file {config_file}:{unknown_str}");
        })
    }

    // A custom unknown_callback can be passed in while testing.
    fn from_sources_impl(
        cwd: &Utf8Path,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = cwd.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (deserialized, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;
        if !unknown.is_empty() {
            unknown_callback(&config_file, &unknown);
        }

        let env = deserialized
            .env
            .iter()
            .map(|entry| entry.parse::<EnvProperty>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| {
                ConfigParseError::new(&config_file, ConfigParseErrorKind::InvalidEnvProperty(error))
            })?;

        Ok(Self {
            output: deserialized.output,
            tool_name: deserialized.tool_name,
            use_suite_name: deserialized.use_suite_name,
            env,
        })
    }

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(ConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: ConfigDeserialize =
            serde_path_to_error::deserialize(ignored_de).map_err(|error| {
                // serde_path_to_error already reports the key.
                let path = error.path().clone();
                let error = match error.into_inner() {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigDeserialize {
    output: Utf8PathBuf,
    #[serde(default)]
    tool_name: Option<String>,
    use_suite_name: bool,
    #[serde(default)]
    env: Vec<String>,
}

/// A `KEY=VALUE` environment property recorded in a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvProperty {
    /// The key. Never empty.
    pub key: String,

    /// The value. May be empty.
    pub value: String,
}

impl EnvProperty {
    /// Parses a property, splitting on the first `=`.
    pub fn parse(input: &str) -> Result<Self, EnvPropertyParseError> {
        let Some((key, value)) = input.split_once('=') else {
            return Err(EnvPropertyParseError::MissingSeparator {
                input: input.to_owned(),
            });
        };
        if key.is_empty() {
            return Err(EnvPropertyParseError::EmptyKey {
                input: input.to_owned(),
            });
        }
        Ok(Self {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl FromStr for EnvProperty {
    type Err = EnvPropertyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EnvProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
