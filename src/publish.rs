use std::sync::Arc;

use tracing::{debug, info};

use crate::report::ComplianceReport;
use crate::store::{ReportRepository, RepositoryError};

/// Upserts compliance reports, keeping the identity of an existing record.
///
/// There is no version check between the lookup and the write; one writer per
/// report name is assumed.
pub struct ReportPublisher {
    repository: Arc<dyn ReportRepository>,
}

impl ReportPublisher {
    pub fn new(repository: Arc<dyn ReportRepository>) -> Self {
        Self { repository }
    }

    pub async fn publish(
        &self,
        name: &str,
        draft: &ComplianceReport,
    ) -> Result<(), RepositoryError> {
        match self.repository.get(name).await {
            Ok(Some(existing)) => self.update(&existing, draft).await,
            Ok(None) => self.create(name, draft).await,
            Err(RepositoryError::NotReady(reason)) => {
                debug!(report = name, %reason, "report store not ready, creating");
                self.create(name, draft).await
            }
            Err(e) => Err(e),
        }
    }

    async fn create(&self, name: &str, draft: &ComplianceReport) -> Result<(), RepositoryError> {
        match self.repository.create(draft).await {
            Ok(()) => {
                info!(report = name, "compliance report created");
                Ok(())
            }
            // Created since the lookup: take the update path once.
            Err(RepositoryError::AlreadyExists(_)) => match self.repository.get(name).await? {
                Some(existing) => self.update(&existing, draft).await,
                None => Err(RepositoryError::Backend(format!(
                    "report {} reported as existing but not found",
                    name
                ))),
            },
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        existing: &ComplianceReport,
        draft: &ComplianceReport,
    ) -> Result<(), RepositoryError> {
        self.repository.update(&draft.merged_into(existing)).await?;
        info!(report = %existing.metadata.name, "compliance report updated");
        Ok(())
    }
}
