use std::fmt::Display;

use serde::Serialize;

use crate::config;
use crate::report::{ComplianceReport, ComplianceReportData};
use crate::types::ControlCheckSummary;

pub struct Json {
    result: JsonReport,
}

#[derive(Serialize)]
struct JsonReport {
    name: String,
    #[serde(flatten)]
    report: ComplianceReportData,
}

impl From<ComplianceReport> for JsonReport {
    fn from(value: ComplianceReport) -> Self {
        Self {
            name: value.metadata.name,
            report: value.report,
        }
    }
}

impl Json {
    pub fn new(config: config::Config, mut report: ComplianceReport) -> Self {
        if config.failed_only {
            report
                .report
                .control_checks
                .retain(|control: &ControlCheckSummary| control.fail_total > 0);
        }
        Self {
            result: report.into(),
        }
    }
}

impl Display for Json {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.result) {
            Ok(output) => f.write_str(&output),
            Err(_e) => Err(std::fmt::Error),
        }
    }
}
