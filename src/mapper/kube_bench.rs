use serde::Deserialize;
use tracing::warn;

use super::{ToolFamily, ToolResultMapper};
use crate::constants::{self, ReportKind};
use crate::types::{CheckResultMap, RawReport, ResultDetail, Status, ToolCheckResult};

#[derive(Debug, Deserialize)]
struct CisBenchmarkReport {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    tests: Vec<Test>,
}

#[derive(Debug, Deserialize)]
struct Test {
    #[serde(default)]
    results: Vec<TestResult>,
}

#[derive(Debug, Deserialize)]
struct TestResult {
    test_number: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    remediation: String,
}

/// kube-bench style CIS benchmark reports, one per node.
pub struct KubeBench;

impl ToolResultMapper for KubeBench {
    fn family(&self) -> ToolFamily {
        ToolFamily::CisBenchmark
    }

    fn report_kind(&self) -> &'static ReportKind {
        &constants::CIS_KUBE_BENCH_REPORT
    }

    fn normalize(&self, resource_kind: &str, reports: &[RawReport]) -> Option<CheckResultMap> {
        if reports.is_empty() {
            return None;
        }
        let mut results = CheckResultMap::new();
        for raw in reports {
            let report: CisBenchmarkReport = match serde_json::from_value(raw.report.clone()) {
                Ok(report) => report,
                Err(e) => {
                    warn!(report = %raw.name, error = %e, "skipping unreadable kube-bench report");
                    continue;
                }
            };
            let results_iter = report
                .sections
                .iter()
                .flat_map(|section| section.tests.iter())
                .flat_map(|test| test.results.iter());
            for result in results_iter {
                let status = Status::from_native(&result.status);
                results
                    .entry(result.test_number.clone())
                    .or_insert_with(|| ToolCheckResult::new(&result.test_number, resource_kind))
                    .record(
                        ResultDetail {
                            resource_name: raw.name.clone(),
                            namespace: raw.namespace.clone(),
                            status,
                        },
                        &result.remediation,
                    );
            }
        }
        Some(results)
    }
}
