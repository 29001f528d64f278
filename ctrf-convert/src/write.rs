// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing reports to disk.

use crate::{errors::WriteReportError, report::Report, serialize::to_json_pretty};
use camino::Utf8Path;
use std::io::Write;
use tracing::debug;

/// The default output path, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "ctrf/ctrf-report.json";

/// Serializes `report` and writes it to `path`, creating parent directories as needed.
///
/// The file is replaced atomically: readers see either the old contents or the full new report.
pub fn write_report(report: &Report, path: &Utf8Path) -> Result<(), WriteReportError> {
    let mut json = to_json_pretty(report)?;
    json.push('\n');

    if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|error| WriteReportError::CreateDir {
            dir: dir.to_owned(),
            error,
        })?;
    }

    atomicwrites::AtomicFile::new(path, atomicwrites::AllowOverwrite)
        .write(|file| file.write_all(json.as_bytes()))
        .map_err(|error| WriteReportError::Write {
            path: path.to_owned(),
            error,
        })?;

    debug!("wrote {} bytes to `{path}`", json.len());
    Ok(())
}
