//! Coverage graph types produced by the builder
//!
//! Everything here serializes straight to the JSON document the
//! visualization layer consumes (camelCase keys, optional fields omitted).

use crate::resources::RouteKind;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Type of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeType {
    Gateway,
    Listener,
    Route,
    GatewayClass,
    Service,
    Workload,
    ReferenceGrant,
}

/// Type of a graph edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EdgeType {
    Owns,
    Routes,
    ClassOf,
    Backend,
    Serves,
    Grant,
}

/// Optional node metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    /// Route kind or workload kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Set when the node stands in for a referenced resource that is not in the snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl NodeData {
    pub fn kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    pub fn placeholder() -> Self {
        Self {
            placeholder: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: NodeType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type,
            label: label.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether this node was synthesized for an unresolved reference
    pub fn is_placeholder(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d.placeholder)
            .unwrap_or(false)
    }
}

/// Authorization annotations carried by backend and grant edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub cross_namespace: bool,
    pub granted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

impl GraphEdge {
    /// Edge whose id is `<source>-><target>`
    pub fn link(source: &str, target: &str, edge_type: EdgeType) -> Self {
        Self {
            id: format!("{source}->{target}"),
            source: source.to_string(),
            target: target.to_string(),
            edge_type,
            data: None,
        }
    }
}

/// Name and namespace of a referenced resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub name: String,
    pub namespace: String,
}

impl ResourceRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Outcome of resolving one backend reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendResolution {
    /// Service node id the reference points at, whether or not it exists
    pub id: String,
    pub service: String,
    pub namespace: String,
    pub resolved: bool,
    pub cross_namespace: bool,
    pub granted: bool,
}

/// Per-route coverage record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCoverageDetail {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub covered: bool,
    /// Gateway or listener node ids the route attaches to
    pub parent_refs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_parent_refs: Option<Vec<ResourceRef>>,
    pub kind: RouteKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_refs: Option<Vec<BackendResolution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_backends: Option<Vec<ResourceRef>>,
}

impl RouteCoverageDetail {
    pub fn missing_parent_count(&self) -> usize {
        self.missing_parent_refs.as_ref().map_or(0, Vec::len)
    }

    pub fn missing_backend_count(&self) -> usize {
        self.missing_backends.as_ref().map_or(0, Vec::len)
    }
}

/// Aggregate counters over one build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub gateways: usize,
    pub routes: usize,
    pub covered_routes: usize,
    pub uncovered_routes: usize,
    pub coverage_percent: f64,
    pub services: usize,
    pub workloads: usize,
    pub gateway_classes: usize,
    pub reference_grants: usize,
    pub backend_refs: usize,
    pub resolved_backends: usize,
    pub missing_backends: usize,
}

/// The derived graph plus coverage details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub summary: CoverageSummary,
    pub route_coverage: Vec<RouteCoverageDetail>,
}

impl CoverageGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    /// Coverage record of the first route with the given name
    pub fn route(&self, name: &str) -> Option<&RouteCoverageDetail> {
        self.route_coverage.iter().find(|r| r.name == name)
    }

    /// Routes with no parent reference at all
    pub fn uncovered_routes(&self) -> impl Iterator<Item = &RouteCoverageDetail> {
        self.route_coverage.iter().filter(|r| !r.covered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_names() {
        assert_eq!(NodeType::GatewayClass.to_string(), "gatewayclass");
        assert_eq!(NodeType::ReferenceGrant.to_string(), "referencegrant");
        assert_eq!(EdgeType::ClassOf.to_string(), "class-of");
        assert_eq!(
            serde_json::to_value(EdgeType::ClassOf).unwrap(),
            serde_json::json!("class-of")
        );
    }

    #[test]
    fn test_node_serialization_omits_empty_data() {
        let node = GraphNode::new("gateway:default/gw", NodeType::Gateway, "gw");
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::json!({ "id": "gateway:default/gw", "type": "gateway", "label": "gw" })
        );
        assert!(!node.is_placeholder());
        assert!(node.with_data(NodeData::placeholder()).is_placeholder());
    }

    #[test]
    fn test_coverage_detail_uses_camel_case() {
        let detail = RouteCoverageDetail {
            id: "route:default/r".to_string(),
            name: "r".to_string(),
            namespace: "default".to_string(),
            covered: false,
            parent_refs: vec![],
            missing_parent_refs: None,
            kind: RouteKind::Http,
            backend_refs: None,
            missing_backends: Some(vec![ResourceRef::new("svc", "default")]),
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["kind"], "HTTPRoute");
        assert_eq!(value["parentRefs"], serde_json::json!([]));
        assert!(value.get("missingParentRefs").is_none());
        assert_eq!(value["missingBackends"][0]["name"], "svc");
        assert_eq!(detail.missing_backend_count(), 1);
    }
}
