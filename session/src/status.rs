use graph_lens_core::{HopLimit, Mode};
use serde::Serialize;

use crate::session::Session;

/// Snapshot of what the session holds, for the status command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    /// "not_loaded", "loaded" or "stale".
    pub status: &'static str,
    pub node_count: usize,
    pub edge_count: usize,
    pub cluster_count: usize,
    pub selection_count: usize,
    pub mode: Mode,
    pub max_hops: HopLimit,
    pub auto_apply: bool,
    pub loaded_generation: u64,
    pub load_time_ms: f64,
    /// A render was requested and has not completed.
    pub render_pending: bool,
    /// The editor holds text that differs from the loaded graph.
    pub is_stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    pub fn status(&self) -> Status {
        let is_stale = self.pending().is_some() || self.load_error().is_some();
        let error = self
            .load_error()
            .map(ToString::to_string)
            .or_else(|| self.render_error().map(ToString::to_string));

        let (status, node_count, edge_count, cluster_count, loaded_generation, load_time_ms) =
            match self.state() {
                Some(gs) => (
                    if is_stale { "stale" } else { "loaded" },
                    gs.node_count(),
                    gs.edge_count(),
                    gs.model.clusters().len(),
                    gs.loaded_generation,
                    gs.load_time_ms,
                ),
                None => ("not_loaded", 0, 0, 0, 0, 0.0),
            };

        Status {
            status,
            node_count,
            edge_count,
            cluster_count,
            selection_count: self.selections().len(),
            mode: self.mode(),
            max_hops: self.max_hops(),
            auto_apply: self.preferences().auto_apply,
            loaded_generation,
            load_time_ms,
            render_pending: self.generations().outstanding().is_some(),
            is_stale,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_not_loaded() {
        let status = Session::default().status();
        assert_eq!(status.status, "not_loaded");
        assert_eq!(status.node_count, 0);
        assert!(!status.is_stale);
    }

    #[test]
    fn test_status_loaded_then_stale() {
        let mut session = Session::default();
        session
            .apply_source("digraph { subgraph cluster_x { a -> b } c }")
            .unwrap();
        session.activate("a", false);
        let status = session.status();
        assert_eq!(status.status, "loaded");
        assert_eq!(
            (status.node_count, status.edge_count, status.cluster_count),
            (3, 1, 1)
        );
        assert_eq!(status.selection_count, 1);
        assert_eq!(status.loaded_generation, 1);

        assert!(session.apply_source("digraph {").is_err());
        let status = session.status();
        assert_eq!(status.status, "stale");
        assert!(status.error.is_some());
    }

    #[test]
    fn test_status_render_pending() {
        let mut session = Session::default();
        session.apply_source("digraph { a }").unwrap();
        session.begin_render();
        assert!(session.status().render_pending);
    }

    #[test]
    fn test_status_json_shape() {
        let json = serde_json::to_value(Session::default().status()).unwrap();
        assert_eq!(json["status"], "not_loaded");
        assert_eq!(json["mode"], "downstream");
        assert_eq!(json["max_hops"]["bounded"], 3);
        assert!(json.get("error").is_none());
    }
}
