//! Normalization of tool-native reports into per-check results.

use std::fmt::Display;

use thiserror::Error;

use crate::constants::{self, ReportKind};
use crate::types::{CheckResultMap, RawReport};

mod config_audit;
mod kube_bench;

pub use config_audit::ConfigAudit;
pub use kube_bench::KubeBench;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapperError {
    #[error("unsupported tool kind: {0}")]
    UnsupportedToolKind(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolFamily {
    CisBenchmark,
    ConfigAudit,
}

const TOOL_FAMILIES: [(&str, ToolFamily); 3] = [
    (constants::KUBE_BENCH, ToolFamily::CisBenchmark),
    (constants::CONFIG_AUDIT, ToolFamily::ConfigAudit),
    (constants::CONF_AUDIT, ToolFamily::ConfigAudit),
];

impl ToolFamily {
    pub fn by_tool(tool: &str) -> Result<Self, MapperError> {
        TOOL_FAMILIES
            .iter()
            .find(|(name, _)| *name == tool)
            .map(|(_, family)| *family)
            .ok_or_else(|| MapperError::UnsupportedToolKind(tool.to_string()))
    }

    pub fn mapper(self) -> &'static dyn ToolResultMapper {
        match self {
            ToolFamily::CisBenchmark => &KubeBench,
            ToolFamily::ConfigAudit => &ConfigAudit,
        }
    }
}

impl Display for ToolFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolFamily::CisBenchmark => f.write_str("cis-benchmark"),
            ToolFamily::ConfigAudit => f.write_str("config-audit"),
        }
    }
}

pub trait ToolResultMapper: Send + Sync {
    fn family(&self) -> ToolFamily;

    /// Custom resource holding this tool's raw reports.
    fn report_kind(&self) -> &'static ReportKind;

    /// Groups every check occurrence across `reports` by check ID.
    ///
    /// Returns `None` when there is nothing to normalize.
    fn normalize(&self, resource_kind: &str, reports: &[RawReport]) -> Option<CheckResultMap>;
}
