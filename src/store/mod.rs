//! Interfaces to the cluster: raw tool reports in, compliance reports out.

use async_trait::async_trait;
use thiserror::Error;

use crate::constants::ReportKind;
use crate::report::ComplianceReport;
use crate::types::RawReport;

#[cfg(test)]
pub(crate) mod fake;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing {kind} failed: {source}")]
    Kube {
        kind: &'static str,
        #[source]
        source: kube::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store cannot answer yet, e.g. while it is starting up.
    #[error("report store not ready: {0}")]
    NotReady(String),

    #[error("report {0} already exists")]
    AlreadyExists(String),

    #[error("report {0} was modified concurrently")]
    Conflict(String),

    #[error("malformed report {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Kube(#[from] kube::Error),

    #[error("report store error: {0}")]
    Backend(String),
}

/// Label-indexed access to raw tool reports.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Reports of `kind` whose resource kind label equals `resource_kind`.
    /// No match is an empty list, not an error.
    async fn list_by_label(
        &self,
        kind: &ReportKind,
        resource_kind: &str,
    ) -> Result<Vec<RawReport>, StoreError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<ComplianceReport>, RepositoryError>;

    async fn create(&self, report: &ComplianceReport) -> Result<(), RepositoryError>;

    async fn update(&self, report: &ComplianceReport) -> Result<(), RepositoryError>;
}
