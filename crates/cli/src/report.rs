//! Plain-text coverage report

use gav_core::{CoverageGraph, ResourceRef, RouteCoverageDetail};

/// Render the counters and problem routes of a graph for terminal output
pub fn render_summary(graph: &CoverageGraph) -> String {
    let s = &graph.summary;
    let mut lines = vec![
        format!("Gateway classes:   {}", s.gateway_classes),
        format!("Gateways:          {}", s.gateways),
        format!(
            "Routes:            {} ({} covered, {} uncovered, {:.1}%)",
            s.routes, s.covered_routes, s.uncovered_routes, s.coverage_percent
        ),
        format!("Services:          {}", s.services),
        format!("Workloads:         {}", s.workloads),
        format!("Reference grants:  {}", s.reference_grants),
        format!(
            "Backend refs:      {} ({} resolved, {} missing)",
            s.backend_refs, s.resolved_backends, s.missing_backends
        ),
    ];

    let uncovered: Vec<_> = graph.uncovered_routes().map(route_label).collect();
    push_section(&mut lines, "Uncovered routes", uncovered);

    let missing_parents = graph
        .route_coverage
        .iter()
        .flat_map(|r| missing_lines(r, r.missing_parent_refs.as_deref()))
        .collect();
    push_section(&mut lines, "Missing parents", missing_parents);

    let missing_backends = graph
        .route_coverage
        .iter()
        .flat_map(|r| missing_lines(r, r.missing_backends.as_deref()))
        .collect();
    push_section(&mut lines, "Missing backends", missing_backends);

    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, title: &str, entries: Vec<String>) {
    if entries.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{title}:"));
    lines.extend(entries.into_iter().map(|e| format!("  - {e}")));
}

fn route_label(route: &RouteCoverageDetail) -> String {
    format!("{} {}/{}", route.kind, route.namespace, route.name)
}

fn missing_lines(route: &RouteCoverageDetail, refs: Option<&[ResourceRef]>) -> Vec<String> {
    refs.unwrap_or_default()
        .iter()
        .map(|r| format!("{} -> {}/{}", route_label(route), r.namespace, r.name))
        .collect()
}
