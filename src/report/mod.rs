// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report generation module

pub mod formatter;
pub mod output;

use anyhow::Result;
use std::fs;
use std::path::Path;

pub use formatter::{findings, group_by_page, print_summary, Finding, PageReport};
pub use output::{InferenceReport, ReportOutputFormat};

/// Save a report to file with the requested format
pub fn save_report<P: AsRef<Path>>(
    report: &InferenceReport,
    path: P,
    format: ReportOutputFormat,
) -> Result<()> {
    // Output format selection is delegated to the formatter enum for consistency.
    let serialized = format.serialize(report)?;
    fs::write(path, serialized)?;
    Ok(())
}
