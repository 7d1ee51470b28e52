//! Typed Gateway API and workload resources consumed by the graph builder
//!
//! The shapes mirror the Kubernetes documents they are loaded from
//! (`apiVersion`, `kind`, `metadata`, `spec`) with camelCase field names.
//! Only the fields the coverage analysis reads, plus a few that are useful
//! to carry through for display, are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Namespace assumed when a resource or reference omits one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Label map used by selectors and pod templates
pub type Labels = BTreeMap<String, String>;

/// Returns the string only if it is present and non-empty.
///
/// Empty strings in documents are treated the same as absent fields.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Identity of a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
        }
    }

    /// Namespace of the resource, falling back to `default`
    pub fn namespace_or_default(&self) -> &str {
        non_empty(&self.namespace).unwrap_or(DEFAULT_NAMESPACE)
    }
}

// ============================================================================
// Gateways
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayClass {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: GatewayClassSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayClassSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: GatewaySpec,
}

impl Gateway {
    /// Class name, if one is set and non-empty
    pub fn class_name(&self) -> Option<&str> {
        non_empty(&self.spec.gateway_class_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_class_name: Option<String>,
    #[serde(default)]
    pub listeners: Vec<Listener>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub port: u16,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_routes: Option<AllowedRoutes>,
}

impl Listener {
    /// Key identifying the listener under its gateway: its name, else its port.
    ///
    /// Two unnamed listeners on the same port share a key.
    pub fn key(&self) -> String {
        non_empty(&self.name)
            .map(str::to_string)
            .unwrap_or_else(|| self.port.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedRoutes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<RouteNamespaces>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNamespaces {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

/// Reference from a route to the gateway (and optional listener) it attaches to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ParentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            section_name: None,
            kind: None,
        }
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section_name = Some(section.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Listener the reference targets, if any
    pub fn section(&self) -> Option<&str> {
        non_empty(&self.section_name)
    }
}

/// Reference from a route rule to the backend it forwards to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl BackendRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: None,
            name: name.into(),
            namespace: None,
            port: None,
            weight: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Referenced kind, `Service` when unset
    pub fn kind_or_service(&self) -> &str {
        non_empty(&self.kind).unwrap_or("Service")
    }
}

/// Rule shape shared by TLS, TCP and GRPC routes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendRule {
    #[serde(default)]
    pub backend_refs: Vec<BackendRef>,
}

impl BackendRule {
    pub fn forward_to(backends: impl IntoIterator<Item = BackendRef>) -> Self {
        Self {
            backend_refs: backends.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteRule {
    #[serde(default)]
    pub matches: Vec<HttpRouteMatch>,
    #[serde(default)]
    pub backend_refs: Vec<BackendRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRouteMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<HttpPathMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Vec<HttpHeaderMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpPathMatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeaderMatch {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentRef>,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub rules: Vec<HttpRouteRule>,
}

/// Spec shared by TLS and GRPC routes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostnameRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentRef>,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub rules: Vec<BackendRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpRouteSpec {
    #[serde(default)]
    pub parent_refs: Vec<ParentRef>,
    #[serde(default)]
    pub rules: Vec<BackendRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRoute {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HttpRouteSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsRoute {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HostnameRouteSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpRoute {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TcpRouteSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcRoute {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: HostnameRouteSpec,
}

/// Kind tag of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum RouteKind {
    #[serde(rename = "HTTPRoute")]
    #[strum(serialize = "HTTPRoute")]
    Http,
    #[serde(rename = "TLSRoute")]
    #[strum(serialize = "TLSRoute")]
    Tls,
    #[serde(rename = "TCPRoute")]
    #[strum(serialize = "TCPRoute")]
    Tcp,
    #[serde(rename = "GRPCRoute")]
    #[strum(serialize = "GRPCRoute")]
    Grpc,
}

/// Any of the route kinds, discriminated by the document's `kind` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Route {
    #[serde(rename = "HTTPRoute")]
    Http(HttpRoute),
    #[serde(rename = "TLSRoute")]
    Tls(TlsRoute),
    #[serde(rename = "TCPRoute")]
    Tcp(TcpRoute),
    #[serde(rename = "GRPCRoute")]
    Grpc(GrpcRoute),
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Http(_) => RouteKind::Http,
            Self::Tls(_) => RouteKind::Tls,
            Self::Tcp(_) => RouteKind::Tcp,
            Self::Grpc(_) => RouteKind::Grpc,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Http(r) => &r.metadata,
            Self::Tls(r) => &r.metadata,
            Self::Tcp(r) => &r.metadata,
            Self::Grpc(r) => &r.metadata,
        }
    }

    pub fn parent_refs(&self) -> &[ParentRef] {
        match self {
            Self::Http(r) => &r.spec.parent_refs,
            Self::Tls(r) => &r.spec.parent_refs,
            Self::Tcp(r) => &r.spec.parent_refs,
            Self::Grpc(r) => &r.spec.parent_refs,
        }
    }

    /// All backend references across the route's rules, in rule order
    pub fn backend_refs(&self) -> Box<dyn Iterator<Item = &BackendRef> + '_> {
        match self {
            Self::Http(r) => Box::new(r.spec.rules.iter().flat_map(|rule| &rule.backend_refs)),
            Self::Tls(r) => Box::new(r.spec.rules.iter().flat_map(|rule| &rule.backend_refs)),
            Self::Tcp(r) => Box::new(r.spec.rules.iter().flat_map(|rule| &rule.backend_refs)),
            Self::Grpc(r) => Box::new(r.spec.rules.iter().flat_map(|rule| &rule.backend_refs)),
        }
    }

    /// `"parentRef"` or `"backendRef"` when the route holds a reference without a name
    pub fn unnamed_ref(&self) -> Option<&'static str> {
        first_unnamed_ref(self.parent_refs(), self.backend_refs())
    }
}

fn first_unnamed_ref<'a>(
    parents: &[ParentRef],
    mut backends: impl Iterator<Item = &'a BackendRef>,
) -> Option<&'static str> {
    if parents.iter().any(|p| p.name.trim().is_empty()) {
        Some("parentRef")
    } else if backends.any(|b| b.name.trim().is_empty()) {
        Some("backendRef")
    } else {
        None
    }
}

// ============================================================================
// Services and workloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ServiceSpec,
}

impl Service {
    /// Selector, if present and non-empty
    pub fn selector(&self) -> Option<&Labels> {
        self.spec.selector.as_ref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Labels>,
    #[serde(default)]
    pub ports: Vec<ServicePort>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<IntOrString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Port given either as a number or a named port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMeta {
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodTemplateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TemplateMeta>,
}

/// Spec shared by Deployments, StatefulSets and DaemonSets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

impl WorkloadSpec {
    /// Pod template labels; empty when the template carries none
    pub fn template_labels(&self) -> Labels {
        self.template
            .as_ref()
            .and_then(|t| t.metadata.as_ref())
            .map(|m| m.labels.clone())
            .unwrap_or_default()
    }

    /// Spec whose pod template carries the given labels
    pub fn with_template_labels(labels: Labels) -> Self {
        Self {
            selector: Some(LabelSelector {
                match_labels: labels.clone(),
            }),
            template: Some(PodTemplateSpec {
                metadata: Some(TemplateMeta { labels }),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: WorkloadSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulSet {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: WorkloadSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSet {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: WorkloadSpec,
}

/// Kind of workload backing a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
}

impl WorkloadKind {
    /// Lower-case form used inside node ids
    pub fn id_segment(&self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
            Self::DaemonSet => "daemonset",
        }
    }
}

/// Uniform view over the workload kinds, used for selector matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
}

impl Workload {
    fn new(kind: WorkloadKind, metadata: &ObjectMeta, spec: &WorkloadSpec) -> Self {
        Self {
            kind,
            name: metadata.name.clone(),
            namespace: metadata.namespace_or_default().to_string(),
            labels: spec.template_labels(),
        }
    }

    /// Whether every selector pair is present with an equal value
    pub fn matches(&self, selector: &Labels) -> bool {
        selector
            .iter()
            .all(|(k, v)| self.labels.get(k).is_some_and(|label| label == v))
    }
}

// ============================================================================
// Reference grants
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceGrant {
    #[serde(default)]
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ReferenceGrantSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceGrantSpec {
    #[serde(default)]
    pub from: Vec<GrantFrom>,
    #[serde(default)]
    pub to: Vec<GrantTo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantFrom {
    #[serde(default)]
    pub group: String,
    pub kind: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantTo {
    #[serde(default)]
    pub group: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ============================================================================
// Resource sets
// ============================================================================

/// Any supported resource, discriminated by the document's `kind` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    GatewayClass(GatewayClass),
    Gateway(Gateway),
    #[serde(rename = "HTTPRoute")]
    HttpRoute(HttpRoute),
    #[serde(rename = "TLSRoute")]
    TlsRoute(TlsRoute),
    #[serde(rename = "TCPRoute")]
    TcpRoute(TcpRoute),
    #[serde(rename = "GRPCRoute")]
    GrpcRoute(GrpcRoute),
    Service(Service),
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    ReferenceGrant(ReferenceGrant),
}

impl Resource {
    /// Every `kind` value that maps to a variant
    pub const KINDS: &'static [&'static str] = &[
        "GatewayClass",
        "Gateway",
        "HTTPRoute",
        "TLSRoute",
        "TCPRoute",
        "GRPCRoute",
        "Service",
        "Deployment",
        "StatefulSet",
        "DaemonSet",
        "ReferenceGrant",
    ];

    pub fn is_known_kind(kind: &str) -> bool {
        Self::KINDS.contains(&kind)
    }

    /// The document `kind` this resource was read from
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GatewayClass(_) => "GatewayClass",
            Self::Gateway(_) => "Gateway",
            Self::HttpRoute(_) => "HTTPRoute",
            Self::TlsRoute(_) => "TLSRoute",
            Self::TcpRoute(_) => "TCPRoute",
            Self::GrpcRoute(_) => "GRPCRoute",
            Self::Service(_) => "Service",
            Self::Deployment(_) => "Deployment",
            Self::StatefulSet(_) => "StatefulSet",
            Self::DaemonSet(_) => "DaemonSet",
            Self::ReferenceGrant(_) => "ReferenceGrant",
        }
    }

    /// Same as [`Route::unnamed_ref`] for route documents, `None` for every other kind
    pub fn unnamed_ref(&self) -> Option<&'static str> {
        match self {
            Self::HttpRoute(r) => first_unnamed_ref(
                &r.spec.parent_refs,
                r.spec.rules.iter().flat_map(|rule| &rule.backend_refs),
            ),
            Self::TlsRoute(r) => first_unnamed_ref(
                &r.spec.parent_refs,
                r.spec.rules.iter().flat_map(|rule| &rule.backend_refs),
            ),
            Self::TcpRoute(r) => first_unnamed_ref(
                &r.spec.parent_refs,
                r.spec.rules.iter().flat_map(|rule| &rule.backend_refs),
            ),
            Self::GrpcRoute(r) => first_unnamed_ref(
                &r.spec.parent_refs,
                r.spec.rules.iter().flat_map(|rule| &rule.backend_refs),
            ),
            _ => None,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::GatewayClass(r) => &r.metadata,
            Self::Gateway(r) => &r.metadata,
            Self::HttpRoute(r) => &r.metadata,
            Self::TlsRoute(r) => &r.metadata,
            Self::TcpRoute(r) => &r.metadata,
            Self::GrpcRoute(r) => &r.metadata,
            Self::Service(r) => &r.metadata,
            Self::Deployment(r) => &r.metadata,
            Self::StatefulSet(r) => &r.metadata,
            Self::DaemonSet(r) => &r.metadata,
            Self::ReferenceGrant(r) => &r.metadata,
        }
    }
}

/// Snapshot of every input collection the graph builder reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSet {
    #[serde(default)]
    pub gateways: Vec<Gateway>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub stateful_sets: Vec<StatefulSet>,
    #[serde(default)]
    pub daemon_sets: Vec<DaemonSet>,
    #[serde(default)]
    pub gateway_classes: Vec<GatewayClass>,
    #[serde(default)]
    pub reference_grants: Vec<ReferenceGrant>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files a resource into its collection
    pub fn push(&mut self, resource: Resource) {
        match resource {
            Resource::GatewayClass(gc) => self.gateway_classes.push(gc),
            Resource::Gateway(gw) => self.gateways.push(gw),
            Resource::HttpRoute(r) => self.routes.push(Route::Http(r)),
            Resource::TlsRoute(r) => self.routes.push(Route::Tls(r)),
            Resource::TcpRoute(r) => self.routes.push(Route::Tcp(r)),
            Resource::GrpcRoute(r) => self.routes.push(Route::Grpc(r)),
            Resource::Service(s) => self.services.push(s),
            Resource::Deployment(d) => self.deployments.push(d),
            Resource::StatefulSet(s) => self.stateful_sets.push(s),
            Resource::DaemonSet(d) => self.daemon_sets.push(d),
            Resource::ReferenceGrant(g) => self.reference_grants.push(g),
        }
    }

    /// Deployments, StatefulSets and DaemonSets flattened in that order
    pub fn workloads(&self) -> Vec<Workload> {
        let deployments = self
            .deployments
            .iter()
            .map(|d| Workload::new(WorkloadKind::Deployment, &d.metadata, &d.spec));
        let stateful_sets = self
            .stateful_sets
            .iter()
            .map(|s| Workload::new(WorkloadKind::StatefulSet, &s.metadata, &s.spec));
        let daemon_sets = self
            .daemon_sets
            .iter()
            .map(|d| Workload::new(WorkloadKind::DaemonSet, &d.metadata, &d.spec));

        deployments.chain(stateful_sets).chain(daemon_sets).collect()
    }

    /// Total number of resources across all collections
    pub fn len(&self) -> usize {
        self.gateways.len()
            + self.routes.len()
            + self.services.len()
            + self.deployments.len()
            + self.stateful_sets.len()
            + self.daemon_sets.len()
            + self.gateway_classes.len()
            + self.reference_grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Resource> for ResourceSet {
    fn extend<I: IntoIterator<Item = Resource>>(&mut self, iter: I) {
        for resource in iter {
            self.push(resource);
        }
    }
}

impl FromIterator<Resource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_defaults() {
        assert_eq!(ObjectMeta::new("a", None).namespace_or_default(), "default");
        assert_eq!(ObjectMeta::new("a", Some("")).namespace_or_default(), "default");
        assert_eq!(ObjectMeta::new("a", Some("edge")).namespace_or_default(), "edge");
    }

    #[test]
    fn test_listener_key_falls_back_to_port() {
        let named = Listener {
            name: Some("web".to_string()),
            hostname: None,
            port: 80,
            protocol: "HTTP".to_string(),
            allowed_routes: None,
        };
        let unnamed = Listener {
            name: None,
            ..named.clone()
        };
        assert_eq!(named.key(), "web");
        assert_eq!(unnamed.key(), "80");
    }

    #[test]
    fn test_route_kind_round_trips_through_strings() {
        assert_eq!(RouteKind::Grpc.to_string(), "GRPCRoute");
        assert_eq!("TLSRoute".parse::<RouteKind>().ok(), Some(RouteKind::Tls));
        assert!("UDPRoute".parse::<RouteKind>().is_err());
    }

    #[test]
    fn test_route_dispatches_on_kind_tag() {
        let json = serde_json::json!({
            "kind": "TCPRoute",
            "apiVersion": "gateway.networking.k8s.io/v1alpha2",
            "metadata": { "name": "stream", "namespace": "edge" },
            "spec": {
                "parentRefs": [{ "name": "gw", "sectionName": "tcp" }],
                "rules": [{ "backendRefs": [{ "name": "a" }, { "name": "b", "port": 9000 }] }]
            }
        });
        let route: Route = serde_json::from_value(json).unwrap();
        assert_eq!(route.kind(), RouteKind::Tcp);
        assert_eq!(route.metadata().name, "stream");
        assert_eq!(route.parent_refs()[0].section(), Some("tcp"));
        let names: Vec<_> = route.backend_refs().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_unnamed_ref_detection() {
        let resource = |spec: serde_json::Value| -> Resource {
            serde_json::from_value(serde_json::json!({
                "kind": "HTTPRoute",
                "metadata": { "name": "r" },
                "spec": spec
            }))
            .unwrap()
        };

        let named = resource(serde_json::json!({
            "parentRefs": [{ "name": "gw" }],
            "rules": [{ "backendRefs": [{ "name": "svc" }] }]
        }));
        assert_eq!(named.unnamed_ref(), None);

        let blank_parent = resource(serde_json::json!({ "parentRefs": [{ "name": " " }] }));
        assert_eq!(blank_parent.unnamed_ref(), Some("parentRef"));

        let blank_backend = resource(serde_json::json!({
            "rules": [{ "backendRefs": [{ "name": "svc" }, { "name": "" }] }]
        }));
        assert_eq!(blank_backend.unnamed_ref(), Some("backendRef"));

        let mut set = ResourceSet::new();
        set.push(blank_backend);
        assert_eq!(set.routes[0].unnamed_ref(), Some("backendRef"));

        let service: Resource = serde_json::from_value(serde_json::json!({
            "kind": "Service",
            "metadata": { "name": "svc" }
        }))
        .unwrap();
        assert_eq!(service.unnamed_ref(), None);
    }

    #[test]
    fn test_workload_selector_matching() {
        let labels: Labels = [("app", "demo"), ("tier", "web")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let set = ResourceSet {
            deployments: vec![Deployment {
                api_version: "apps/v1".to_string(),
                metadata: ObjectMeta::new("demo", None),
                spec: WorkloadSpec::with_template_labels(labels),
            }],
            ..Default::default()
        };
        let workload = &set.workloads()[0];

        let mut selector = Labels::new();
        selector.insert("app".to_string(), "demo".to_string());
        assert!(workload.matches(&selector));

        selector.insert("tier".to_string(), "db".to_string());
        assert!(!workload.matches(&selector));
    }

    #[test]
    fn test_workloads_flatten_in_kind_order() {
        let meta = |name: &str| ObjectMeta::new(name, Some("apps"));
        let set = ResourceSet {
            daemon_sets: vec![DaemonSet {
                api_version: String::new(),
                metadata: meta("agent"),
                spec: WorkloadSpec::default(),
            }],
            deployments: vec![Deployment {
                api_version: String::new(),
                metadata: meta("api"),
                spec: WorkloadSpec::default(),
            }],
            stateful_sets: vec![StatefulSet {
                api_version: String::new(),
                metadata: meta("db"),
                spec: WorkloadSpec::default(),
            }],
            ..Default::default()
        };

        let kinds: Vec<_> = set.workloads().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WorkloadKind::Deployment,
                WorkloadKind::StatefulSet,
                WorkloadKind::DaemonSet
            ]
        );
        assert!(set.workloads()[0].labels.is_empty());
    }
}
