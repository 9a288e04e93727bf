use std::time::Instant;

use graph_lens_core::{scan, validate, Adjacency, EdgeKey, SourceError};

use crate::render::{sanitize, RenderedGraph};
use crate::settings::Settings;
use crate::state::GraphState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("source is {size} bytes, exceeds max_source_bytes={limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("invalid graph source: {0}")]
    Invalid(#[from] SourceError),
}

/// Validate, scan and index `text`.
///
/// The size limit is checked before any scanning. `generation` is the
/// source generation the resulting state belongs to.
pub fn load_source(
    text: &str,
    settings: &Settings,
    generation: u64,
) -> Result<GraphState, LoadError> {
    if text.len() > settings.max_source_bytes {
        return Err(LoadError::TooLarge {
            size: text.len(),
            limit: settings.max_source_bytes,
        });
    }

    let start = Instant::now();
    let source = sanitize(text).into_owned();
    validate(&source)?;

    let model = scan(&source);
    let adjacency = Adjacency::from_model(&model);
    let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        "graph_lens: loaded {} nodes, {} edges, {} clusters in {:.2}ms (gen {})",
        adjacency.node_count(),
        adjacency.edge_count(),
        model.clusters().len(),
        load_time_ms,
        generation
    );

    Ok(GraphState {
        model,
        adjacency,
        source,
        load_time_ms,
        loaded_at: Instant::now(),
        loaded_generation: generation,
    })
}

/// Rebuild the adjacency index from the model and merge in whatever the
/// renderer drew that the scanner missed. Returns how many nodes and edges
/// the rendered output added.
pub fn reconcile(state: &mut GraphState, rendered: &RenderedGraph) -> usize {
    let mut adjacency = Adjacency::from_model(&state.model);
    let mut added = 0;

    for title in &rendered.nodes {
        let id = title.trim();
        if !id.is_empty() && adjacency.insert_node(id) {
            added += 1;
        }
    }

    for title in &rendered.edges {
        match EdgeKey::parse(title) {
            Some(key) => {
                let before = adjacency.node_count();
                if adjacency.insert_edge(key.source, key.target) {
                    added += 1;
                }
                added += adjacency.node_count() - before;
            }
            None => tracing::debug!("graph_lens: skipping rendered edge title '{}'", title),
        }
    }

    if added > 0 {
        tracing::info!(
            "graph_lens: reconciled {} rendered elements missing from the scan",
            added
        );
    }
    state.adjacency = adjacency;
    added
}
