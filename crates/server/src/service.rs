//! Holder of the current coverage graph
//!
//! The graph is rebuilt from disk as a whole and swapped in atomically.
//! Readers clone the `Arc` and never block a rebuild for longer than the swap.

use gav_core::config::DataConfig;
use gav_core::error::{Result, ResultExt};
use gav_core::{build_graph, CoverageGraph};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{error, info};

pub struct GraphService {
    data: DataConfig,
    current: RwLock<Arc<CoverageGraph>>,
    updates: broadcast::Sender<Arc<CoverageGraph>>,
    /// Serializes rebuilds so an older snapshot never replaces a newer one
    rebuild_lock: Mutex<()>,
}

impl GraphService {
    /// Create a service holding an empty graph
    pub fn new(data: DataConfig, broadcast_capacity: usize) -> Self {
        let (updates, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            data,
            current: RwLock::new(Arc::new(CoverageGraph::default())),
            updates,
            rebuild_lock: Mutex::new(()),
        }
    }

    pub fn data_config(&self) -> &DataConfig {
        &self.data
    }

    /// The most recently built graph
    pub async fn current(&self) -> Arc<CoverageGraph> {
        Arc::clone(&*self.current.read().await)
    }

    /// Receive every graph swapped in after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<CoverageGraph>> {
        self.updates.subscribe()
    }

    /// Reload the data directory and swap in a fresh graph
    ///
    /// On failure the error is logged and returned, and the previous graph
    /// stays current.
    pub async fn rebuild(&self) -> Result<Arc<CoverageGraph>> {
        let _guard = self.rebuild_lock.lock().await;
        let data = self.data.clone();

        let built = tokio::task::spawn_blocking(move || {
            let resources = gav_loader::load_dir(&data)?;
            build_graph(&resources)
        })
        .await
        .context("Graph rebuild task failed")
        .and_then(|result| result);

        match built {
            Ok(graph) => {
                let summary = &graph.summary;
                info!(
                    "Graph rebuilt: {} nodes, {} edges, {}/{} routes covered ({:.1}%)",
                    graph.nodes.len(),
                    graph.edges.len(),
                    summary.covered_routes,
                    summary.routes,
                    summary.coverage_percent
                );
                Ok(self.replace(graph).await)
            }
            Err(e) => {
                error!("Graph rebuild failed, keeping previous graph: {e}");
                Err(e)
            }
        }
    }

    /// Swap in `graph` and notify subscribers
    pub async fn replace(&self, graph: CoverageGraph) -> Arc<CoverageGraph> {
        let graph = Arc::new(graph);
        *self.current.write().await = Arc::clone(&graph);
        // No subscribers is not an error
        let _ = self.updates.send(Arc::clone(&graph));
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn service_for(dir: &TempDir) -> GraphService {
        GraphService::new(
            DataConfig {
                dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            4,
        )
    }

    #[tokio::test]
    async fn test_rebuild_swaps_and_broadcasts() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("routes.yaml"),
            "kind: HTTPRoute\nmetadata: { name: r }\nspec:\n  parentRefs: [{ name: gw }]\n",
        )
        .unwrap();

        let service = service_for(&dir);
        assert_eq!(service.current().await.summary.routes, 0);

        let mut rx = service.subscribe();
        let graph = service.rebuild().await.unwrap();
        assert_eq!(graph.summary.routes, 1);
        assert_eq!(service.current().await.summary.covered_routes, 1);
        assert_eq!(rx.recv().await.unwrap().summary.routes, 1);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_graph() {
        let root = TempDir::new().unwrap();
        let data = root.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(data.join("routes.yaml"), "kind: HTTPRoute\nmetadata: { name: r }\n").unwrap();

        let service = GraphService::new(
            DataConfig {
                dir: data.clone(),
                ..Default::default()
            },
            4,
        );
        service.rebuild().await.unwrap();

        // The data directory replaced by a plain file cannot be listed
        std::fs::remove_dir_all(&data).unwrap();
        std::fs::write(&data, "kind: Service\nmetadata: { name: s }\n").unwrap();

        let mut rx = service.subscribe();
        assert!(service.rebuild().await.is_err());
        assert_eq!(service.current().await.summary.routes, 1);
        assert!(rx.try_recv().is_err());
    }
}
