// SPDX-License-Identifier: PMPL-1.0-or-later

//! Serialization helpers for persisted inference reports

use crate::checkers::SliceResult;
use crate::report::formatter::{Finding, PageReport};
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportOutputFormat {
    Json,
    Yaml,
}

impl ReportOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportOutputFormat::Json => "json",
            ReportOutputFormat::Yaml => "yaml",
        }
    }

    pub fn serialize(&self, report: &InferenceReport) -> Result<String> {
        match self {
            ReportOutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportOutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        }
    }
}

/// Machine-readable summary of one inference run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceReport {
    pub created_at: String,
    pub pages_scanned: usize,
    pub slices: Vec<SliceSummary>,
    pub findings: Vec<FindingRecord>,
    pub pages: Vec<PageSection>,
    pub clean_pages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceSummary {
    pub checker: String,
    pub derived: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingRecord {
    pub checker: String,
    pub message: String,
    pub pages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSection {
    pub url: String,
    pub markup: String,
}

impl InferenceReport {
    pub fn build(
        pages_scanned: usize,
        results: &[SliceResult],
        findings: &[Finding],
        page_reports: &[PageReport],
        clean_pages: &[String],
    ) -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            pages_scanned,
            slices: results
                .iter()
                .map(|result| SliceSummary {
                    checker: result.kind.label().to_string(),
                    derived: result.derived.len(),
                })
                .collect(),
            findings: findings
                .iter()
                .map(|finding| FindingRecord {
                    checker: finding.kind.label().to_string(),
                    message: finding.message.clone(),
                    pages: finding.pages.clone(),
                })
                .collect(),
            pages: page_reports
                .iter()
                .map(|page| PageSection {
                    url: page.url.clone(),
                    markup: page.markup(),
                })
                .collect(),
            clean_pages: clean_pages.to_vec(),
        }
    }

    pub fn total_findings(&self) -> usize {
        self.findings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::CheckerKind;

    #[test]
    fn test_report_serializes_both_formats() {
        let results = vec![SliceResult {
            kind: CheckerKind::DeathBeforeBirth,
            derived: Vec::new(),
        }];
        let report = InferenceReport::build(2, &results, &[], &[], &[]);

        let json = ReportOutputFormat::Json.serialize(&report).unwrap();
        assert!(json.contains("\"pages_scanned\": 2"));

        let yaml = ReportOutputFormat::Yaml.serialize(&report).unwrap();
        assert!(yaml.contains("pages_scanned: 2"));

        let parsed: InferenceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.slices.len(), 1);
        assert_eq!(parsed.slices[0].checker, "death-before-birth");
    }
}
