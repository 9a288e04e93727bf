use graph_lens_core::{neighborhood, Direction, HopLimit};
use serde::Serialize;

use crate::session::Session;
use crate::util::direction_str;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no graph loaded")]
    NotLoaded,

    #[error("node '{0}' not found")]
    UnknownNode(String),
}

/// One node in a neighborhood listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborRow {
    pub node_id: String,
    pub distance: u32,
    pub direction: &'static str,
}

impl Session {
    /// Nodes within `max_hops` of `start_id`, nearest first. Unlike
    /// activation, an unknown start id is an error here.
    pub fn neighborhood(
        &self,
        start_id: &str,
        direction: Direction,
        max_hops: HopLimit,
    ) -> Result<Vec<NeighborRow>, QueryError> {
        let state = self.state().ok_or(QueryError::NotLoaded)?;
        if !state.adjacency.contains_node(start_id) {
            return Err(QueryError::UnknownNode(start_id.to_string()));
        }

        let rows = neighborhood(&state.adjacency, start_id, direction, max_hops.depth())
            .into_iter()
            .map(|nr| NeighborRow {
                node_id: nr.node_id,
                distance: nr.distance,
                direction: direction_str(direction),
            })
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut session = Session::default();
        session
            .apply_source("digraph { a -> b -> c -> d; a -> c; e -> a }")
            .unwrap();
        session
    }

    fn ids(rows: &[NeighborRow]) -> Vec<(&str, u32)> {
        rows.iter().map(|r| (r.node_id.as_str(), r.distance)).collect()
    }

    #[test]
    fn test_downstream_rows_sorted() {
        let rows = session()
            .neighborhood("a", Direction::Downstream, HopLimit::Unbounded)
            .unwrap();
        assert_eq!(ids(&rows), vec![("b", 1), ("c", 1), ("d", 2)]);
        assert!(rows.iter().all(|r| r.direction == "downstream"));
    }

    #[test]
    fn test_upstream_bounded() {
        let rows = session()
            .neighborhood("c", Direction::Upstream, HopLimit::Bounded(1))
            .unwrap();
        assert_eq!(ids(&rows), vec![("a", 1), ("b", 1)]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Session::default().neighborhood("a", Direction::Downstream, HopLimit::default()),
            Err(QueryError::NotLoaded)
        );
        assert_eq!(
            session().neighborhood("zz", Direction::Downstream, HopLimit::default()),
            Err(QueryError::UnknownNode("zz".into()))
        );
    }
}
