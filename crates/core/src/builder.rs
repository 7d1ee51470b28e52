//! Coverage graph construction
//!
//! [`build_graph`] is a pure function of its [`ResourceSet`]: every call
//! allocates fresh collections and reads no process-wide state, so it can be
//! called repeatedly and concurrently. Broken references are reported as
//! data (`missingParentRefs`, `missingBackends`, `granted: false`), never as
//! errors. The only error is a resource lacking its identity fields.

use crate::error::{Error, Result};
use crate::grants::grant_allows;
use crate::graph::{
    BackendResolution, CoverageGraph, CoverageSummary, EdgeData, EdgeType, GraphEdge, GraphNode,
    NodeData, NodeType, ResourceRef, RouteCoverageDetail,
};
use crate::resources::{non_empty, Gateway, ObjectMeta, ResourceSet, Route, Service, Workload};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Nodes keyed by id in insertion order, plus the edge list.
///
/// The first node inserted under an id wins; later inserts are no-ops.
#[derive(Debug, Default)]
struct GraphBuffer {
    nodes: Vec<GraphNode>,
    positions: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
}

impl GraphBuffer {
    fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Inserts the node unless one with the same id exists. Returns whether it was inserted.
    fn insert_node(&mut self, node: GraphNode) -> bool {
        if self.contains(&node.id) {
            return false;
        }
        self.positions.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn push_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }
}

/// Counters accumulated while resolving routes
#[derive(Debug, Default)]
struct RouteTally {
    covered_routes: usize,
    backend_refs: usize,
    resolved_backends: usize,
    missing_backends: usize,
}

pub fn gateway_class_id(name: &str) -> String {
    format!("gatewayclass:{name}")
}

pub fn gateway_id(namespace: &str, name: &str) -> String {
    format!("gateway:{namespace}/{name}")
}

pub fn listener_id(gateway_id: &str, listener: &str) -> String {
    format!("{gateway_id}:listener:{listener}")
}

pub fn route_id(namespace: &str, name: &str) -> String {
    format!("route:{namespace}/{name}")
}

pub fn service_id(namespace: &str, name: &str) -> String {
    format!("service:{namespace}/{name}")
}

pub fn workload_id(workload: &Workload) -> String {
    format!(
        "workload:{}/{}:{}",
        workload.namespace,
        workload.kind.id_segment(),
        workload.name
    )
}

/// Build the coverage graph for a snapshot of resources
pub fn build_graph(resources: &ResourceSet) -> Result<CoverageGraph> {
    validate(resources)?;

    let workloads = resources.workloads();
    let mut graph = GraphBuffer::default();

    wire_gateways(&mut graph, resources);
    match_workloads(&mut graph, &resources.services, &workloads);
    let (route_coverage, tally) = resolve_routes(&mut graph, resources);

    let summary = summarize(resources, workloads.len(), &tally);
    debug!(
        "Built coverage graph: {} nodes, {} edges, {}/{} routes covered, {} missing backends",
        graph.nodes.len(),
        graph.edges.len(),
        summary.covered_routes,
        summary.routes,
        summary.missing_backends
    );

    Ok(CoverageGraph {
        nodes: graph.nodes,
        edges: graph.edges,
        summary,
        route_coverage,
    })
}

/// Build a graph from gateways and routes alone
pub fn build_coverage_graph(gateways: Vec<Gateway>, routes: Vec<Route>) -> Result<CoverageGraph> {
    build_graph(&ResourceSet {
        gateways,
        routes,
        ..Default::default()
    })
}

// ============================================================================
// Validation
// ============================================================================

fn require_name(kind: &str, metadata: &ObjectMeta) -> Result<()> {
    if metadata.name.trim().is_empty() {
        return Err(Error::invalid_resource(
            kind,
            format!(
                "metadata.name is empty (namespace {})",
                metadata.namespace_or_default()
            ),
        ));
    }
    Ok(())
}

/// Rejects resources and references that would produce malformed node ids
fn validate(resources: &ResourceSet) -> Result<()> {
    for gc in &resources.gateway_classes {
        require_name("GatewayClass", &gc.metadata)?;
    }
    for gw in &resources.gateways {
        require_name("Gateway", &gw.metadata)?;
    }
    for svc in &resources.services {
        require_name("Service", &svc.metadata)?;
    }
    for d in &resources.deployments {
        require_name("Deployment", &d.metadata)?;
    }
    for s in &resources.stateful_sets {
        require_name("StatefulSet", &s.metadata)?;
    }
    for d in &resources.daemon_sets {
        require_name("DaemonSet", &d.metadata)?;
    }
    for g in &resources.reference_grants {
        require_name("ReferenceGrant", &g.metadata)?;
    }
    for route in &resources.routes {
        let kind = route.kind().to_string();
        let meta = route.metadata();
        require_name(&kind, meta)?;

        if let Some(reference) = route.unnamed_ref() {
            return Err(Error::invalid_resource(
                kind,
                format!("{} has a {reference} without a name", meta.name),
            ));
        }
    }
    Ok(())
}

// ============================================================================
// Build phases
// ============================================================================

/// GatewayClass, Gateway and Listener nodes with their `class-of` and `owns` edges
fn wire_gateways(graph: &mut GraphBuffer, resources: &ResourceSet) {
    for gc in &resources.gateway_classes {
        let name = &gc.metadata.name;
        graph.insert_node(GraphNode::new(
            gateway_class_id(name),
            NodeType::GatewayClass,
            name,
        ));
    }

    for gw in &resources.gateways {
        let gw_id = gateway_id(gw.metadata.namespace_or_default(), &gw.metadata.name);
        graph.insert_node(GraphNode::new(&gw_id, NodeType::Gateway, &gw.metadata.name));

        if let Some(class_name) = gw.class_name() {
            let gc_id = gateway_class_id(class_name);
            graph.insert_node(GraphNode::new(&gc_id, NodeType::GatewayClass, class_name));
            graph.push_edge(GraphEdge::link(&gw_id, &gc_id, EdgeType::ClassOf));
        }

        for listener in &gw.spec.listeners {
            let key = listener.key();
            let l_id = listener_id(&gw_id, &key);
            let data = NodeData {
                port: Some(listener.port),
                protocol: Some(listener.protocol.clone()),
                hostname: non_empty(&listener.hostname).map(str::to_string),
                ..Default::default()
            };
            graph.insert_node(GraphNode::new(&l_id, NodeType::Listener, key).with_data(data));
            graph.push_edge(GraphEdge::link(&gw_id, &l_id, EdgeType::Owns));
        }
    }
}

/// Service nodes, and `serves` edges to same-namespace workloads whose labels
/// contain every selector pair
fn match_workloads(graph: &mut GraphBuffer, services: &[Service], workloads: &[Workload]) {
    for svc in services {
        let ns = svc.metadata.namespace_or_default();
        let svc_id = service_id(ns, &svc.metadata.name);
        graph.insert_node(GraphNode::new(&svc_id, NodeType::Service, &svc.metadata.name));

        let Some(selector) = svc.selector() else {
            continue;
        };

        for workload in workloads
            .iter()
            .filter(|w| w.namespace == ns && w.matches(selector))
        {
            let w_id = workload_id(workload);
            graph.insert_node(
                GraphNode::new(&w_id, NodeType::Workload, &workload.name)
                    .with_data(NodeData::kind(workload.kind.to_string())),
            );
            graph.push_edge(GraphEdge::link(&svc_id, &w_id, EdgeType::Serves));
        }
    }
}

/// Route nodes, parent attachment and backend resolution, one record per route
fn resolve_routes(
    graph: &mut GraphBuffer,
    resources: &ResourceSet,
) -> (Vec<RouteCoverageDetail>, RouteTally) {
    let gateways: HashSet<(&str, &str)> = resources
        .gateways
        .iter()
        .map(|gw| (gw.metadata.namespace_or_default(), gw.metadata.name.as_str()))
        .collect();
    let services: HashSet<(&str, &str)> = resources
        .services
        .iter()
        .map(|s| (s.metadata.namespace_or_default(), s.metadata.name.as_str()))
        .collect();

    let mut tally = RouteTally::default();
    let mut coverage = Vec::with_capacity(resources.routes.len());

    for route in &resources.routes {
        let meta = route.metadata();
        let namespace = meta.namespace_or_default();
        let rt_id = route_id(namespace, &meta.name);
        graph.insert_node(
            GraphNode::new(&rt_id, NodeType::Route, &meta.name)
                .with_data(NodeData::kind(route.kind().to_string())),
        );

        // Parent attachment. Any parentRef counts as coverage, resolved or not.
        let mut parent_ids = Vec::new();
        let mut missing_parents = Vec::new();
        for parent in route.parent_refs() {
            let parent_ns = non_empty(&parent.namespace).unwrap_or(namespace);
            let gw_id = gateway_id(parent_ns, &parent.name);
            let gateway_exists = gateways.contains(&(parent_ns, parent.name.as_str()));
            if !gateway_exists {
                missing_parents.push(ResourceRef::new(&parent.name, parent_ns));
            }

            let mut target_id = gw_id.clone();
            if let Some(section) = parent.section() {
                let l_id = listener_id(&gw_id, section);
                let synthesized = graph.insert_node(
                    GraphNode::new(&l_id, NodeType::Listener, section)
                        .with_data(NodeData::placeholder()),
                );
                if synthesized {
                    graph.push_edge(GraphEdge::link(&gw_id, &l_id, EdgeType::Owns));
                }
                target_id = l_id;
            }

            graph.insert_node(
                GraphNode::new(&gw_id, NodeType::Gateway, &parent.name)
                    .with_data(NodeData::placeholder()),
            );
            graph.push_edge(GraphEdge::link(&rt_id, &target_id, EdgeType::Routes));
            parent_ids.push(target_id);
        }

        let covered = !route.parent_refs().is_empty();
        if covered {
            tally.covered_routes += 1;
        }

        // Backend resolution. Unresolved services get neither node nor edge.
        let mut backends: Vec<BackendResolution> = Vec::new();
        let mut missing_backends = Vec::new();
        for backend in route.backend_refs() {
            tally.backend_refs += 1;

            let target_ns = non_empty(&backend.namespace).unwrap_or(namespace);
            let svc_id = service_id(target_ns, &backend.name);
            let resolved = services.contains(&(target_ns, backend.name.as_str()));
            let cross_namespace = namespace != target_ns;
            let granted = grant_allows(
                &resources.reference_grants,
                namespace,
                target_ns,
                backend.kind_or_service(),
                &backend.name,
            );

            if resolved {
                graph.insert_node(GraphNode::new(&svc_id, NodeType::Service, &backend.name));
                graph.push_edge(GraphEdge {
                    id: format!("{rt_id}->{svc_id}:{}", backends.len()),
                    source: rt_id.clone(),
                    target: svc_id.clone(),
                    edge_type: EdgeType::Backend,
                    data: Some(EdgeData {
                        cross_namespace,
                        granted,
                    }),
                });
                if cross_namespace && granted {
                    graph.push_edge(GraphEdge {
                        id: format!("grant:{rt_id}->{svc_id}"),
                        source: rt_id.clone(),
                        target: svc_id.clone(),
                        edge_type: EdgeType::Grant,
                        data: Some(EdgeData {
                            cross_namespace: true,
                            granted: true,
                        }),
                    });
                }
                tally.resolved_backends += 1;
            } else {
                missing_backends.push(ResourceRef::new(&backend.name, target_ns));
                tally.missing_backends += 1;
            }

            backends.push(BackendResolution {
                id: svc_id,
                service: backend.name.clone(),
                namespace: target_ns.to_string(),
                resolved,
                cross_namespace,
                granted,
            });
        }

        coverage.push(RouteCoverageDetail {
            id: rt_id,
            name: meta.name.clone(),
            namespace: namespace.to_string(),
            covered,
            parent_refs: parent_ids,
            missing_parent_refs: (!missing_parents.is_empty()).then_some(missing_parents),
            kind: route.kind(),
            backend_refs: (!backends.is_empty()).then_some(backends),
            missing_backends: (!missing_backends.is_empty()).then_some(missing_backends),
        });
    }

    (coverage, tally)
}

fn summarize(resources: &ResourceSet, workloads: usize, tally: &RouteTally) -> CoverageSummary {
    let routes = resources.routes.len();
    let coverage_percent = if routes == 0 {
        0.0
    } else {
        tally.covered_routes as f64 / routes as f64 * 100.0
    };

    CoverageSummary {
        gateways: resources.gateways.len(),
        routes,
        covered_routes: tally.covered_routes,
        uncovered_routes: routes - tally.covered_routes,
        coverage_percent,
        services: resources.services.len(),
        workloads,
        gateway_classes: resources.gateway_classes.len(),
        reference_grants: resources.reference_grants.len(),
        backend_refs: tally.backend_refs,
        resolved_backends: tally.resolved_backends,
        missing_backends: tally.missing_backends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{
        BackendRef, GatewaySpec, HttpRoute, HttpRouteRule, HttpRouteSpec, Listener, ParentRef,
    };

    fn gateway(ns: &str, name: &str, listeners: &[&str]) -> Gateway {
        Gateway {
            api_version: String::new(),
            metadata: ObjectMeta::new(name, Some(ns)),
            spec: GatewaySpec {
                gateway_class_name: None,
                listeners: listeners
                    .iter()
                    .map(|l| Listener {
                        name: Some(l.to_string()),
                        hostname: None,
                        port: 80,
                        protocol: "HTTP".to_string(),
                        allowed_routes: None,
                    })
                    .collect(),
            },
        }
    }

    fn http_route(ns: &str, name: &str, parents: Vec<ParentRef>, backends: Vec<BackendRef>) -> Route {
        Route::Http(HttpRoute {
            api_version: String::new(),
            metadata: ObjectMeta::new(name, Some(ns)),
            spec: HttpRouteSpec {
                parent_refs: parents,
                hostnames: vec![],
                rules: vec![HttpRouteRule {
                    matches: vec![],
                    backend_refs: backends,
                }],
            },
        })
    }

    #[test]
    fn test_graph_buffer_dedups_by_id() {
        let mut buf = GraphBuffer::default();
        assert!(buf.insert_node(GraphNode::new("a", NodeType::Service, "first")));
        assert!(!buf.insert_node(GraphNode::new("a", NodeType::Service, "second")));
        assert_eq!(buf.nodes.len(), 1);
        assert_eq!(buf.nodes[0].label, "first");
    }

    #[test]
    fn test_section_on_existing_gateway_reuses_listener() {
        let gw = gateway("default", "gw", &["web"]);
        let route = http_route("default", "r", vec![ParentRef::new("gw").with_section("web")], vec![]);
        let graph = build_coverage_graph(vec![gw], vec![route]).unwrap();

        let owns: Vec<_> = graph.edges_of_type(EdgeType::Owns).collect();
        assert_eq!(owns.len(), 1);
        let listener = graph.node("gateway:default/gw:listener:web").unwrap();
        assert!(!listener.is_placeholder());
        assert_eq!(listener.data.as_ref().and_then(|d| d.port), Some(80));
    }

    #[test]
    fn test_unknown_section_synthesizes_listener() {
        let gw = gateway("default", "gw", &["web"]);
        let route = http_route("default", "r", vec![ParentRef::new("gw").with_section("admin")], vec![]);
        let graph = build_coverage_graph(vec![gw], vec![route]).unwrap();

        let listener = graph.node("gateway:default/gw:listener:admin").unwrap();
        assert!(listener.is_placeholder());
        assert_eq!(graph.edges_of_type(EdgeType::Owns).count(), 2);
        assert!(graph.route("r").unwrap().missing_parent_refs.is_none());
    }

    #[test]
    fn test_parent_namespace_override() {
        let gw = gateway("infra", "shared", &[]);
        let route = http_route(
            "apps",
            "r",
            vec![ParentRef::new("shared").with_namespace("infra")],
            vec![],
        );
        let graph = build_coverage_graph(vec![gw], vec![route]).unwrap();

        let rc = graph.route("r").unwrap();
        assert_eq!(rc.parent_refs, vec!["gateway:infra/shared".to_string()]);
        assert!(rc.missing_parent_refs.is_none());
        assert!(graph
            .edges
            .iter()
            .any(|e| e.id == "route:apps/r->gateway:infra/shared"));
    }

    #[test]
    fn test_backend_edge_ids_index_all_backend_refs() {
        let svc = Service {
            api_version: String::new(),
            metadata: ObjectMeta::new("present", None),
            spec: Default::default(),
        };
        let route = http_route(
            "default",
            "r",
            vec![],
            vec![BackendRef::new("absent"), BackendRef::new("present")],
        );
        let graph = build_graph(&ResourceSet {
            routes: vec![route],
            services: vec![svc],
            ..Default::default()
        })
        .unwrap();

        let backend: Vec<_> = graph.edges_of_type(EdgeType::Backend).collect();
        assert_eq!(backend.len(), 1);
        assert_eq!(backend[0].id, "route:default/r->service:default/present:1");
    }

    #[test]
    fn test_empty_name_fails_fast() {
        let mut gw = gateway("default", "gw", &[]);
        gw.metadata.name = String::new();
        let err = build_coverage_graph(vec![gw], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidResource { ref kind, .. } if kind == "Gateway"));

        let route = http_route("default", "r", vec![], vec![BackendRef::new(" ")]);
        let err = build_coverage_graph(vec![], vec![route]).unwrap_err();
        assert!(err.to_string().contains("backendRef without a name"));
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&ResourceSet::new()).unwrap();
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert_eq!(graph.summary.coverage_percent, 0.0);
        assert_eq!(graph.summary.routes, 0);
    }
}
