//! graph-lens-core: neighborhood traversal and highlight compositing for
//! interactive graph views.
//!
//! A pure Rust library: scan DOT-like source into nodes, edges and
//! clusters, index adjacency, run hop-bounded BFS in either direction, and
//! merge any number of selections into one highlight/fade snapshot.
//! No rendering or editor dependencies; the session crate wires those in.

mod compositor;
mod error;
mod graph;
mod scan;
mod selection;
mod traversal;
mod validate;

pub use compositor::{compute_view, ClusterView, EdgeView, Emphasis, NodeView, View};
pub use error::{Marker, SourceError, SourceErrorKind};
pub use graph::{
    Adjacency, Attributes, Cluster, Direction, Edge, EdgeKey, GraphModel, Node, NodeId,
};
pub use scan::scan;
pub use selection::{
    HopLimit, Mode, ParseModeError, Selection, SelectionStore, DEFAULT_MAX_HOPS,
};
pub use traversal::{neighborhood, single_hop, traverse, NeighborResult, Reach, UNBOUNDED_HOPS};
pub use validate::validate;
