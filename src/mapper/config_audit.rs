use serde::Deserialize;
use tracing::warn;

use super::{ToolFamily, ToolResultMapper};
use crate::constants::{self, ReportKind};
use crate::types::{CheckResultMap, RawReport, ResultDetail, Status, ToolCheckResult};

#[derive(Debug, Deserialize)]
struct ConfigAuditReport {
    #[serde(default)]
    checks: Vec<Check>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Check {
    #[serde(rename = "checkID")]
    id: String,
    success: bool,
    #[serde(default)]
    remediation: String,
}

/// Workload configuration audits. There is no native warning state.
pub struct ConfigAudit;

impl ToolResultMapper for ConfigAudit {
    fn family(&self) -> ToolFamily {
        ToolFamily::ConfigAudit
    }

    fn report_kind(&self) -> &'static ReportKind {
        &constants::CONFIG_AUDIT_REPORT
    }

    fn normalize(&self, resource_kind: &str, reports: &[RawReport]) -> Option<CheckResultMap> {
        if reports.is_empty() {
            return None;
        }
        let mut results = CheckResultMap::new();
        for raw in reports {
            let report: ConfigAuditReport = match serde_json::from_value(raw.report.clone()) {
                Ok(report) => report,
                Err(e) => {
                    warn!(report = %raw.name, error = %e, "skipping unreadable config audit");
                    continue;
                }
            };
            for check in report.checks.iter() {
                results
                    .entry(check.id.clone())
                    .or_insert_with(|| ToolCheckResult::new(&check.id, resource_kind))
                    .record(
                        ResultDetail {
                            resource_name: raw.name.clone(),
                            namespace: raw.namespace.clone(),
                            status: Status::from_success(check.success),
                        },
                        &check.remediation,
                    );
            }
        }
        Some(results)
    }
}
