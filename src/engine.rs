use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aggregate;
use crate::index::SpecIndex;
use crate::mapper::{MapperError, ToolFamily, ToolResultMapper};
use crate::publish::ReportPublisher;
use crate::report::ComplianceReport;
use crate::spec::Spec;
use crate::store::{ReportRepository, RepositoryError, ResourceStore};
use crate::types::CheckResults;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error("failed to publish compliance report: {0}")]
    Publish(#[from] RepositoryError),
}

/// Turns a [`Spec`] and the cluster's raw tool reports into a published
/// compliance report. Holds no state between runs.
pub struct ComplianceEngine {
    store: Arc<dyn ResourceStore>,
    publisher: ReportPublisher,
}

impl ComplianceEngine {
    pub fn new(store: Arc<dyn ResourceStore>, repository: Arc<dyn ReportRepository>) -> Self {
        Self {
            store,
            publisher: ReportPublisher::new(repository),
        }
    }

    /// Computes the report for `spec` without publishing it.
    pub async fn evaluate(
        &self,
        spec: &Spec,
        now: DateTime<Utc>,
    ) -> Result<ComplianceReport, EngineError> {
        let index = SpecIndex::new(spec);
        let mappers = resolve_mappers(&index)?;

        let mut results = CheckResults::new();
        for (tool, resource_kind) in index.tool_resource_keys() {
            let mapper = mappers[tool.as_str()];
            let reports = match self
                .store
                .list_by_label(mapper.report_kind(), resource_kind)
                .await
            {
                Ok(reports) => reports,
                Err(e) => {
                    warn!(
                        spec = %spec.name,
                        %tool,
                        %resource_kind,
                        error = %e,
                        "no data for resource kind"
                    );
                    continue;
                }
            };
            debug!(
                spec = %spec.name,
                %tool,
                family = %mapper.family(),
                %resource_kind,
                count = reports.len(),
                "raw reports listed"
            );
            if let Some(normalized) = mapper.normalize(resource_kind, &reports) {
                results.insert(tool, resource_kind, normalized);
            }
        }

        let control_checks = aggregate::aggregate(&index, &results);
        let report = ComplianceReport::draft(spec, control_checks, now);
        info!(
            spec = %spec.name,
            pass = report.report.summary.pass_count,
            fail = report.report.summary.fail_count,
            "compliance evaluated"
        );
        Ok(report)
    }

    /// Evaluates `spec` and publishes the result under its report name.
    pub async fn run(
        &self,
        spec: &Spec,
        now: DateTime<Utc>,
    ) -> Result<ComplianceReport, EngineError> {
        let report = self.evaluate(spec, now).await?;
        self.publisher
            .publish(&report.metadata.name, &report)
            .await?;
        Ok(report)
    }
}

/// Resolves every tool named by the spec before any report is fetched.
fn resolve_mappers(
    index: &SpecIndex,
) -> Result<HashMap<&str, &'static dyn ToolResultMapper>, MapperError> {
    index
        .tools()
        .into_iter()
        .map(|tool| ToolFamily::by_tool(tool).map(|family| (tool, family.mapper())))
        .collect()
}
