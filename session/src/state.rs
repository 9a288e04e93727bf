use std::time::Instant;

use graph_lens_core::{Adjacency, GraphModel};

/// The last successfully parsed source and its derived index.
///
/// Owned by the session; a failed parse never replaces it.
#[derive(Debug, Clone)]
pub struct GraphState {
    pub model: GraphModel,
    pub adjacency: Adjacency,
    /// Sanitized source text the model was scanned from.
    pub source: String,
    pub load_time_ms: f64,
    pub loaded_at: Instant,
    /// Source generation at time of load.
    pub loaded_generation: u64,
}

impl GraphState {
    pub fn node_count(&self) -> usize {
        self.adjacency.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }
}
