//! Kubernetes-backed [`ResourceStore`] and [`ReportRepository`].

use anyhow::Result;
use async_trait::async_trait;
use http::StatusCode;
use kube::api::{Api, ApiResource, DynamicObject, ListParams, PostParams};
use kube::Client;
use serde_json::json;

use crate::constants::{self, ReportKind};
use crate::report::{ComplianceReport, ReportMeta};
use crate::store::{ReportRepository, RepositoryError, ResourceStore, StoreError};
use crate::types::RawReport;

fn extract_version_group(group_version: &str) -> (Option<String>, Option<String>) {
    let gv = group_version
        .split('/')
        .map(|s| s.to_string())
        .collect::<Vec<String>>();
    if gv.len() > 1 {
        (gv.get(0).cloned(), gv.get(1).cloned())
    } else {
        (None, gv.get(0).cloned())
    }
}

pub fn api_resource(kind: &ReportKind) -> ApiResource {
    let (group, version) = extract_version_group(constants::API_GROUP_VERSION);
    ApiResource {
        group: group.unwrap_or_default(),
        version: version.unwrap_or_default(),
        api_version: constants::API_GROUP_VERSION.to_string(),
        kind: kind.kind.to_string(),
        plural: kind.plural.to_string(),
    }
}

/// Report kinds this tool reads or writes that the cluster does not serve.
pub async fn missing_report_kinds(client: &Client) -> Result<Vec<&'static str>> {
    let served = client
        .list_api_group_resources(constants::API_GROUP_VERSION)
        .await?;
    Ok([
        constants::CIS_KUBE_BENCH_REPORT,
        constants::CONFIG_AUDIT_REPORT,
        constants::CLUSTER_COMPLIANCE_REPORT,
    ]
    .iter()
    .filter(|kind| !served.resources.iter().any(|r| r.name == kind.plural))
    .map(|kind| kind.kind)
    .collect())
}

fn error_code(err: &kube::Error) -> Option<StatusCode> {
    match err {
        kube::Error::Api(response) => StatusCode::from_u16(response.code).ok(),
        _ => None,
    }
}

pub struct KubeResourceStore {
    client: Client,
}

impl KubeResourceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn list_by_label(
        &self,
        kind: &ReportKind,
        resource_kind: &str,
    ) -> Result<Vec<RawReport>, StoreError> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &api_resource(kind));
        let selector = format!("{}={}", constants::LABEL_RESOURCE_KIND, resource_kind);
        let params = ListParams::default().labels(&selector);
        let list = api.list(&params).await.map_err(|source| StoreError::Kube {
            kind: kind.kind,
            source,
        })?;
        Ok(list.items.into_iter().map(raw_report).collect())
    }
}

/// Names the report after the scanned resource, falling back to the object name.
fn raw_report(object: DynamicObject) -> RawReport {
    let owner = object
        .metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(constants::LABEL_RESOURCE_NAME))
        .filter(|name| !name.is_empty())
        .cloned();
    RawReport {
        name: owner.or(object.metadata.name).unwrap_or_default(),
        namespace: object.metadata.namespace,
        report: object
            .data
            .get("report")
            .cloned()
            .unwrap_or(serde_json::Value::Null),
    }
}

/// Compliance reports stored as cluster-scoped `ClusterComplianceReport` objects.
pub struct KubeReportRepository {
    api: Api<DynamicObject>,
    resource: ApiResource,
}

impl KubeReportRepository {
    pub fn new(client: Client) -> Self {
        let resource = api_resource(&constants::CLUSTER_COMPLIANCE_REPORT);
        Self {
            api: Api::all_with(client, &resource),
            resource,
        }
    }
}

#[async_trait]
impl ReportRepository for KubeReportRepository {
    async fn get(&self, name: &str) -> Result<Option<ComplianceReport>, RepositoryError> {
        match self.api.get_opt(name).await {
            Ok(Some(object)) => from_object(object).map(Some),
            Ok(None) => Ok(None),
            Err(e) => match error_code(&e) {
                Some(StatusCode::SERVICE_UNAVAILABLE) | Some(StatusCode::TOO_MANY_REQUESTS) => {
                    Err(RepositoryError::NotReady(e.to_string()))
                }
                _ => Err(e.into()),
            },
        }
    }

    async fn create(&self, report: &ComplianceReport) -> Result<(), RepositoryError> {
        let object = to_object(report, &self.resource)?;
        match self.api.create(&PostParams::default(), &object).await {
            Ok(_) => Ok(()),
            Err(e) if error_code(&e) == Some(StatusCode::CONFLICT) => {
                Err(RepositoryError::AlreadyExists(report.metadata.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, report: &ComplianceReport) -> Result<(), RepositoryError> {
        let object = to_object(report, &self.resource)?;
        match self
            .api
            .replace(&report.metadata.name, &PostParams::default(), &object)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if error_code(&e) == Some(StatusCode::CONFLICT) => {
                Err(RepositoryError::Conflict(report.metadata.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn from_object(object: DynamicObject) -> Result<ComplianceReport, RepositoryError> {
    let name = object.metadata.name.unwrap_or_default();
    let body = object
        .data
        .get("report")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    let report = serde_json::from_value(body).map_err(|source| RepositoryError::Decode {
        name: name.clone(),
        source,
    })?;
    Ok(ComplianceReport {
        metadata: ReportMeta {
            name,
            labels: object.metadata.labels.unwrap_or_default(),
            annotations: object.metadata.annotations.unwrap_or_default(),
            resource_version: object.metadata.resource_version,
        },
        report,
    })
}

fn to_object(
    report: &ComplianceReport,
    resource: &ApiResource,
) -> Result<DynamicObject, RepositoryError> {
    let body = serde_json::to_value(&report.report).map_err(|source| RepositoryError::Decode {
        name: report.metadata.name.clone(),
        source,
    })?;
    let mut object =
        DynamicObject::new(&report.metadata.name, resource).data(json!({ "report": body }));
    let meta = &report.metadata;
    object.metadata.labels = Some(meta.labels.clone()).filter(|l| !l.is_empty());
    object.metadata.annotations = Some(meta.annotations.clone()).filter(|a| !a.is_empty());
    object.metadata.resource_version = meta.resource_version.clone();
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use kube::error::ErrorResponse;

    use crate::index::tests::spec;
    use crate::types::{ComplianceSummary, ControlCheckSummary};

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "Boom".to_string(),
            code,
        })
    }

    #[test]
    fn test_api_resource() {
        let resource = api_resource(&constants::CONFIG_AUDIT_REPORT);
        assert_eq!(resource.group, "aquasecurity.github.io");
        assert_eq!(resource.version, "v1alpha1");
        assert_eq!(resource.plural, "configauditreports");
        assert_eq!(extract_version_group("v1"), (None, Some("v1".to_string())));
    }

    #[test]
    fn test_error_code() {
        assert_eq!(error_code(&api_error(409)), Some(StatusCode::CONFLICT));
        assert_eq!(
            error_code(&api_error(503)),
            Some(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[test]
    fn test_raw_report_takes_report_body() {
        let resource = api_resource(&constants::CIS_KUBE_BENCH_REPORT);
        let object = DynamicObject::new("node-1", &resource)
            .data(json!({"report": {"sections": []}}));
        let raw = raw_report(object);
        assert_eq!(raw.name, "node-1");
        assert_eq!(raw.namespace, None);
        assert_eq!(raw.report, json!({"sections": []}));
    }

    #[test]
    fn test_raw_report_is_named_after_scanned_resource() {
        let resource = api_resource(&constants::CONFIG_AUDIT_REPORT);
        let mut object = DynamicObject::new("replicaset-nginx-6d4cf56db6", &resource)
            .within("default")
            .data(json!({"report": {"checks": []}}));
        object.metadata.labels = Some(
            [
                (constants::LABEL_RESOURCE_KIND, "ReplicaSet"),
                (constants::LABEL_RESOURCE_NAME, "nginx-6d4cf56db6"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );
        let raw = raw_report(object);
        assert_eq!(raw.name, "nginx-6d4cf56db6");
        assert_eq!(raw.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_report_without_summary_decodes() {
        let resource = api_resource(&constants::CLUSTER_COMPLIANCE_REPORT);
        let object = DynamicObject::new("cis-1.5", &resource).data(json!({
            "report": {
                "updateTimestamp": "2024-03-01T12:00:00Z",
                "type": {
                    "kind": "CIS",
                    "name": "CIS-1.5",
                    "description": "CIS Kubernetes Benchmarks",
                    "version": "1.5"
                },
                "control_check": [{
                    "id": "1.1.1",
                    "name": "API server pod specification file permissions",
                    "pass_total": 1,
                    "fail_total": 1,
                    "severity": "HIGH"
                }]
            }
        }));
        let report = from_object(object).unwrap();
        assert_eq!(report.metadata.name, "cis-1.5");
        assert_eq!(report.report.summary, ComplianceSummary::default());
        assert_eq!(report.report.control_checks[0].fail_total, 1);
    }

    #[test]
    fn test_object_conversion_keeps_metadata() {
        let mut report = ComplianceReport::draft(
            &spec("CIS-1.5", vec![]),
            vec![ControlCheckSummary {
                id: "1.1.1".to_string(),
                name: "control".to_string(),
                description: String::new(),
                severity: None,
                pass_total: 1,
                fail_total: 1,
            }],
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        );
        report.metadata.resource_version = Some("7".to_string());
        let resource = api_resource(&constants::CLUSTER_COMPLIANCE_REPORT);

        let object = to_object(&report, &resource).unwrap();
        assert_eq!(object.data["report"]["control_check"][0]["fail_total"], 1);
        assert_eq!(from_object(object).unwrap(), report);
    }

    #[test]
    fn test_malformed_report_is_a_decode_error() {
        let resource = api_resource(&constants::CLUSTER_COMPLIANCE_REPORT);
        let object =
            DynamicObject::new("cis-1.5", &resource).data(json!({"report": {"summary": 1}}));
        assert!(matches!(
            from_object(object),
            Err(RepositoryError::Decode { .. })
        ));
    }

    #[ignore]
    #[tokio::test]
    async fn test_list_kube_bench_reports() -> Result<()> {
        let client = Client::try_default()
            .await
            .expect("Unable to create the kube client");
        let store = KubeResourceStore::new(client);
        let reports = store
            .list_by_label(&constants::CIS_KUBE_BENCH_REPORT, "Node")
            .await?;
        assert!(reports.iter().all(|r| !r.name.is_empty()));
        Ok(())
    }
}
