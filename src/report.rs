//! The published `ClusterComplianceReport` and how a draft is built from a run.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::constants;
use crate::spec::Spec;
use crate::types::{ComplianceSummary, ControlCheckSummary};

/// Labels replaced wholesale by every draft.
const DRAFT_LABELS: [&str; 1] = [constants::LABEL_COMPLIANCE_SPEC];

/// Annotations replaced wholesale by every draft.
const DRAFT_ANNOTATIONS: [&str; 2] = [
    constants::ANNOTATION_GENERATION_INTERVAL,
    constants::ANNOTATION_NEXT_GENERATION_AT,
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportMeta {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    /// Opaque store version of a persisted record; `None` for drafts.
    pub resource_version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportType {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReportData {
    pub update_timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    #[serde(default)]
    pub summary: ComplianceSummary,
    #[serde(rename = "control_check", default)]
    pub control_checks: Vec<ControlCheckSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplianceReport {
    pub metadata: ReportMeta,
    pub report: ComplianceReportData,
}

impl ComplianceReport {
    /// Builds the draft published for `spec` from its control summaries.
    pub fn draft(
        spec: &Spec,
        control_checks: Vec<ControlCheckSummary>,
        now: DateTime<Utc>,
    ) -> Self {
        let name = spec.report_name();
        let mut labels = BTreeMap::new();
        labels.insert(constants::LABEL_COMPLIANCE_SPEC.to_string(), name.clone());

        let mut annotations = BTreeMap::new();
        if let Some(interval) = &spec.generation_interval {
            annotations.insert(
                constants::ANNOTATION_GENERATION_INTERVAL.to_string(),
                interval.to_string(),
            );
            if let Ok(interval) = chrono::Duration::from_std(interval.duration()) {
                if let Some(next) = now.checked_add_signed(interval) {
                    annotations.insert(
                        constants::ANNOTATION_NEXT_GENERATION_AT.to_string(),
                        next.to_rfc3339_opts(SecondsFormat::Secs, true),
                    );
                }
            }
        }

        Self {
            metadata: ReportMeta {
                name,
                labels,
                annotations,
                resource_version: None,
            },
            report: ComplianceReportData {
                update_timestamp: now,
                report_type: ReportType {
                    kind: spec.kind.clone(),
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    version: spec.version.clone(),
                },
                summary: aggregate::summarize(&control_checks),
                control_checks,
            },
        }
    }

    /// `existing` with this draft's body and draft-owned labels and annotations.
    ///
    /// Draft-owned keys absent from the draft are dropped from `existing`.
    pub fn merged_into(&self, existing: &ComplianceReport) -> ComplianceReport {
        let mut metadata = existing.metadata.clone();
        metadata.labels.retain(|k, _| !DRAFT_LABELS.contains(&k.as_str()));
        metadata
            .annotations
            .retain(|k, _| !DRAFT_ANNOTATIONS.contains(&k.as_str()));
        metadata
            .labels
            .extend(self.metadata.labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        metadata.annotations.extend(
            self.metadata
                .annotations
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        ComplianceReport {
            metadata,
            report: self.report.clone(),
        }
    }
}
