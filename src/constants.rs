pub const KUBE_BENCH: &str = "kube-bench";
pub const CONFIG_AUDIT: &str = "config-audit";
pub const CONF_AUDIT: &str = "conf-audit";

pub const API_GROUP_VERSION: &str = "aquasecurity.github.io/v1alpha1";

/// Label carried by every raw tool report naming the kind of the scanned resource.
pub const LABEL_RESOURCE_KIND: &str = "starboard.resource.kind";
pub const LABEL_RESOURCE_NAME: &str = "starboard.resource.name";

pub const LABEL_COMPLIANCE_SPEC: &str = "aquasecurity.github.io/compliance-spec";
pub const ANNOTATION_GENERATION_INTERVAL: &str = "aquasecurity.github.io/generation-interval";
pub const ANNOTATION_NEXT_GENERATION_AT: &str = "aquasecurity.github.io/next-generation-at";

pub const STATUS_PASS: &str = "pass";
pub const STATUS_WARN: &str = "warn";
pub const STATUS_INFO: &str = "info";

pub const CIS_KUBE_BENCH_REPORT: ReportKind = ReportKind {
    kind: "CISKubeBenchReport",
    plural: "ciskubebenchreports",
    namespaced: false,
};

pub const CONFIG_AUDIT_REPORT: ReportKind = ReportKind {
    kind: "ConfigAuditReport",
    plural: "configauditreports",
    namespaced: true,
};

pub const CLUSTER_COMPLIANCE_REPORT: ReportKind = ReportKind {
    kind: "ClusterComplianceReport",
    plural: "clustercompliancereports",
    namespaced: false,
};

/// A custom resource kind in the `aquasecurity.github.io/v1alpha1` group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReportKind {
    pub kind: &'static str,
    pub plural: &'static str,
    pub namespaced: bool,
}
