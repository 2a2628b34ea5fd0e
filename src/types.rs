use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::constants;

/// Outcome of one check against one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    pub fn from_success(success: bool) -> Self {
        if success {
            Status::Pass
        } else {
            Status::Fail
        }
    }

    /// Pass and Warn both count as passing.
    pub fn is_passing(self) -> bool {
        !matches!(self, Status::Fail)
    }

    /// Case-insensitive. `info` is informational and never fails a control;
    /// unrecognized values are treated as failures.
    pub fn from_native(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            constants::STATUS_PASS => Status::Pass,
            constants::STATUS_WARN | constants::STATUS_INFO => Status::Warn,
            _ => Status::Fail,
        }
    }
}

/// Tool-native report object for one scanned resource instance.
#[derive(Clone, Debug, PartialEq)]
pub struct RawReport {
    pub name: String,
    pub namespace: Option<String>,
    pub report: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultDetail {
    pub resource_name: String,
    pub namespace: Option<String>,
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCheckResult {
    pub check_id: String,
    pub remediation: String,
    pub object_type: String,
    pub details: Vec<ResultDetail>,
}

impl ToolCheckResult {
    pub fn new(check_id: &str, object_type: &str) -> Self {
        Self {
            check_id: check_id.to_string(),
            remediation: String::new(),
            object_type: object_type.to_string(),
            details: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, detail: ResultDetail, remediation: &str) {
        if self.remediation.is_empty() && !remediation.is_empty() {
            self.remediation = remediation.to_string();
        }
        self.details.push(detail);
    }
}

/// Normalized results of one tool for one resource kind, keyed by check ID.
pub type CheckResultMap = HashMap<String, ToolCheckResult>;

/// Normalized results of one aggregation run.
///
/// Keyed by `(tool, resource kind)` first so that identical check IDs coming
/// from different tools or resource kinds are never merged.
#[derive(Clone, Debug, Default)]
pub struct CheckResults {
    items: BTreeMap<(String, String), CheckResultMap>,
}

impl CheckResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: &str, resource_kind: &str, results: CheckResultMap) {
        self.items
            .insert((tool.to_string(), resource_kind.to_string()), results);
    }

    pub fn get(&self, tool: &str, resource_kind: &str, check_id: &str) -> Option<&ToolCheckResult> {
        self.items
            .get(&(tool.to_string(), resource_kind.to_string()))
            .and_then(|results| results.get(check_id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCheckSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    pub pass_total: u64,
    pub fail_total: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub pass_count: u64,
    pub fail_count: u64,
}
