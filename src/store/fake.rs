use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use super::{ReportRepository, RepositoryError, ResourceStore, StoreError};
use crate::constants::ReportKind;
use crate::report::ComplianceReport;
use crate::types::RawReport;

#[derive(Default)]
pub struct FakeResourceStore {
    pub reports: HashMap<(&'static str, String), Vec<RawReport>>,
    pub failing: HashSet<(&'static str, String)>,
    pub list_calls: AtomicUsize,
}

impl FakeResourceStore {
    pub fn with_reports(mut self, kind: &ReportKind, resource_kind: &str, reports: Vec<RawReport>) -> Self {
        self.reports
            .entry((kind.kind, resource_kind.to_string()))
            .or_default()
            .extend(reports);
        self
    }

    pub fn with_failure(mut self, kind: &ReportKind, resource_kind: &str) -> Self {
        self.failing.insert((kind.kind, resource_kind.to_string()));
        self
    }
}

#[async_trait]
impl ResourceStore for FakeResourceStore {
    async fn list_by_label(
        &self,
        kind: &ReportKind,
        resource_kind: &str,
    ) -> Result<Vec<RawReport>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let key = (kind.kind, resource_kind.to_string());
        if self.failing.contains(&key) {
            return Err(StoreError::Unavailable(format!("{}/{}", kind.kind, resource_kind)));
        }
        Ok(self.reports.get(&key).cloned().unwrap_or_default())
    }
}

/// What the next `get` should answer instead of looking at the stored reports.
pub enum GetFailure {
    NotReady,
    Backend,
}

#[derive(Default)]
pub struct FakeReportRepository {
    pub reports: Mutex<BTreeMap<String, ComplianceReport>>,
    pub get_failure: Mutex<Option<GetFailure>>,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    version: AtomicU64,
}

impl FakeReportRepository {
    pub async fn seed(&self, mut report: ComplianceReport) {
        report.metadata.resource_version = Some(self.next_version());
        self.reports
            .lock()
            .await
            .insert(report.metadata.name.clone(), report);
    }

    pub async fn fail_next_get(&self, failure: GetFailure) {
        *self.get_failure.lock().await = Some(failure);
    }

    pub async fn stored(&self, name: &str) -> Option<ComplianceReport> {
        self.reports.lock().await.get(name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.reports.lock().await.len()
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}

#[async_trait]
impl ReportRepository for FakeReportRepository {
    async fn get(&self, name: &str) -> Result<Option<ComplianceReport>, RepositoryError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        match self.get_failure.lock().await.take() {
            Some(GetFailure::NotReady) => {
                return Err(RepositoryError::NotReady("cache not started".to_string()))
            }
            Some(GetFailure::Backend) => {
                return Err(RepositoryError::Backend("connection refused".to_string()))
            }
            None => {}
        }
        Ok(self.stored(name).await)
    }

    async fn create(&self, report: &ComplianceReport) -> Result<(), RepositoryError> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);
        let mut reports = self.reports.lock().await;
        if reports.contains_key(&report.metadata.name) {
            return Err(RepositoryError::AlreadyExists(report.metadata.name.clone()));
        }
        let mut report = report.clone();
        report.metadata.resource_version = Some(self.next_version());
        reports.insert(report.metadata.name.clone(), report);
        Ok(())
    }

    async fn update(&self, report: &ComplianceReport) -> Result<(), RepositoryError> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        let mut reports = self.reports.lock().await;
        let current = reports
            .get(&report.metadata.name)
            .ok_or_else(|| RepositoryError::Backend(format!("{} not found", report.metadata.name)))?;
        if current.metadata.resource_version != report.metadata.resource_version {
            return Err(RepositoryError::Conflict(report.metadata.name.clone()));
        }
        let mut report = report.clone();
        report.metadata.resource_version = Some(self.next_version());
        reports.insert(report.metadata.name.clone(), report);
        Ok(())
    }
}

/// A kube-bench report for `node` with `(test number, status)` results.
pub fn kube_bench_report(node: &str, results: &[(&str, &str)]) -> RawReport {
    let results: Vec<_> = results
        .iter()
        .map(|(id, status)| json!({"test_number": id, "status": status, "remediation": ""}))
        .collect();
    RawReport {
        name: node.to_string(),
        namespace: None,
        report: json!({"sections": [{"id": "1", "tests": [{"section": "1.1", "results": results}]}]}),
    }
}

/// A config audit report for a workload with `(check id, success)` checks.
pub fn config_audit_report(name: &str, namespace: &str, checks: &[(&str, bool)]) -> RawReport {
    let checks: Vec<_> = checks
        .iter()
        .map(|(id, success)| json!({"checkID": id, "success": success}))
        .collect();
    RawReport {
        name: name.to_string(),
        namespace: Some(namespace.to_string()),
        report: json!({"checks": checks}),
    }
}
