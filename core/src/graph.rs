use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

/// Node identifier as written in the graph source (quotes stripped).
pub type NodeId = String;

/// Free-form attribute bag (`shape=box`, `style=invis`, ...).
pub type Attributes = BTreeMap<String, String>;

/// Which way a traversal follows edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow outgoing edges (successors).
    Downstream,
    /// Follow incoming edges (predecessors).
    Upstream,
}

/// A declared node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub attrs: Attributes,
}

/// A directed edge as it appeared in the source. Parallel edges and
/// self-loops are kept here; the adjacency index filters them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub attrs: Attributes,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn key(&self) -> EdgeKey<'_> {
        EdgeKey::new(&self.source, &self.target)
    }
}

/// A `subgraph cluster_*` grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    pub label: Option<String>,
    /// Direct and nested members, in first-mention order.
    pub members: Vec<NodeId>,
}

impl Cluster {
    /// Legend clusters stay lit regardless of what is selected.
    pub fn is_legend(&self) -> bool {
        let mentions = |s: &str| s.to_ascii_lowercase().contains("legend");
        mentions(&self.id) || self.label.as_deref().is_some_and(mentions)
    }
}

/// Directed edge identity, always oriented source→target.
///
/// Rendered as `"source->target"`, the same string the renderer puts in
/// an edge element's title. An endpoint that contains `->` or starts with
/// a quote is written quoted so distinct edges never share a rendering;
/// [`EdgeKey::parse`] only reads plain titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey<'a> {
    pub source: &'a str,
    pub target: &'a str,
}

impl<'a> EdgeKey<'a> {
    pub fn new(source: &'a str, target: &'a str) -> Self {
        Self { source, target }
    }

    /// Parse a `"source->target"` title. Returns None if there is no arrow
    /// or either side is empty.
    pub fn parse(title: &'a str) -> Option<Self> {
        let (source, target) = title.split_once("->")?;
        let (source, target) = (source.trim(), target.trim());
        if source.is_empty() || target.is_empty() {
            return None;
        }
        Some(Self { source, target })
    }
}

impl fmt::Display for EdgeKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_endpoint(f, self.source)?;
        f.write_str("->")?;
        write_endpoint(f, self.target)
    }
}

fn write_endpoint(f: &mut fmt::Formatter<'_>, id: &str) -> fmt::Result {
    if id.contains("->") || id.starts_with('"') {
        write!(f, "\"{}\"", id.replace('"', "\\\""))
    } else {
        f.write_str(id)
    }
}

/// Nodes, edges and clusters extracted from one version of the source.
///
/// Nodes keep declaration order; re-declaring a node merges its attributes.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    clusters: Vec<Cluster>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node, merging attributes into an existing declaration.
    pub fn add_node(&mut self, id: &str, attrs: Attributes) {
        match self.node_index.get(id) {
            Some(&i) => self.nodes[i].attrs.extend(attrs),
            None => {
                self.node_index.insert(id.to_string(), self.nodes.len());
                self.nodes.push(Node {
                    id: id.to_string(),
                    attrs,
                });
            }
        }
    }

    /// Add a directed edge. Both endpoints are declared implicitly.
    pub fn add_edge(&mut self, source: &str, target: &str, attrs: Attributes) {
        self.add_node(source, Attributes::new());
        self.add_node(target, Attributes::new());
        self.edges.push(Edge {
            source: source.to_string(),
            target: target.to_string(),
            attrs,
        });
    }

    pub fn add_cluster(&mut self, cluster: Cluster) {
        self.clusters.push(cluster);
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Derived adjacency: distinct successors and predecessors per node.
///
/// Self-loops are dropped here and never take part in traversal or
/// highlighting. Parallel edges collapse to one entry.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    outgoing: HashMap<NodeId, BTreeSet<NodeId>>,
    incoming: HashMap<NodeId, BTreeSet<NodeId>>,
    nodes: BTreeSet<NodeId>,
}

impl Adjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from a parsed model.
    pub fn from_model(model: &GraphModel) -> Self {
        let mut adj = Self::new();
        for node in model.nodes() {
            adj.nodes.insert(node.id.clone());
        }
        for edge in model.edges() {
            adj.insert_edge(&edge.source, &edge.target);
        }
        adj
    }

    /// Register a node id. Returns false if it was already known.
    pub fn insert_node(&mut self, id: &str) -> bool {
        self.nodes.insert(id.to_string())
    }

    /// Register an edge and its endpoints. Returns true if the edge is new;
    /// self-loops only register their node and always return false.
    pub fn insert_edge(&mut self, source: &str, target: &str) -> bool {
        self.nodes.insert(source.to_string());
        self.nodes.insert(target.to_string());
        if source == target {
            return false;
        }
        let added = self
            .outgoing
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
        self.incoming
            .entry(target.to_string())
            .or_default()
            .insert(source.to_string());
        added
    }

    /// Distinct targets of edges leaving `id`.
    pub fn successors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.neighbors(id, Direction::Downstream)
    }

    /// Distinct sources of edges entering `id`.
    pub fn predecessors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.neighbors(id, Direction::Upstream)
    }

    /// Neighbors in the given traversal direction.
    pub fn neighbors<'a>(
        &'a self,
        id: &str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let side = match direction {
            Direction::Downstream => &self.outgoing,
            Direction::Upstream => &self.incoming,
        };
        side.get(id)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.outgoing
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    /// Every node id, sorted.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Every distinct non-loop edge, sorted by source then target.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey<'_>> {
        self.nodes.iter().flat_map(move |source| {
            self.successors(source)
                .map(move |target| EdgeKey::new(source, target))
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(|v| v.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(edges: &[(&str, &str)]) -> GraphModel {
        let mut m = GraphModel::new();
        for (s, t) in edges {
            m.add_edge(s, t, Attributes::new());
        }
        m
    }

    #[test]
    fn test_edge_endpoints_declare_nodes() {
        let m = model(&[("a", "b")]);
        assert_eq!(m.node_count(), 2);
        assert!(m.contains_node("a"));
        assert!(m.contains_node("b"));
    }

    #[test]
    fn test_redeclared_node_merges_attrs() {
        let mut m = GraphModel::new();
        m.add_node("a", Attributes::from([("shape".into(), "box".into())]));
        m.add_node(
            "a",
            Attributes::from([
                ("shape".into(), "oval".into()),
                ("color".into(), "red".into()),
            ]),
        );
        assert_eq!(m.node_count(), 1);
        let a = m.node("a").unwrap();
        assert_eq!(a.attrs["shape"], "oval");
        assert_eq!(a.attrs["color"], "red");
    }

    #[test]
    fn test_parallel_edges_kept_raw_but_deduped_in_adjacency() {
        let m = model(&[("a", "b"), ("a", "b"), ("a", "b")]);
        assert_eq!(m.edge_count(), 3);
        let adj = Adjacency::from_model(&m);
        assert_eq!(adj.edge_count(), 1);
        assert_eq!(adj.successors("a").collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(adj.predecessors("b").collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_self_loop_excluded_from_adjacency() {
        let m = model(&[("a", "a"), ("a", "b")]);
        assert_eq!(m.edge_count(), 2);
        let adj = Adjacency::from_model(&m);
        assert!(!adj.has_edge("a", "a"));
        assert!(adj.has_edge("a", "b"));
        assert!(adj.contains_node("a"));
        assert_eq!(adj.edge_count(), 1);
    }

    #[test]
    fn test_isolated_node_in_adjacency() {
        let mut m = GraphModel::new();
        m.add_node("lonely", Attributes::new());
        let adj = Adjacency::from_model(&m);
        assert!(adj.contains_node("lonely"));
        assert_eq!(adj.successors("lonely").count(), 0);
    }

    #[test]
    fn test_insert_edge_reports_new_edges() {
        let mut adj = Adjacency::from_model(&model(&[("a", "b")]));
        assert!(!adj.insert_edge("a", "b"));
        assert!(!adj.insert_edge("c", "c"));
        assert!(adj.contains_node("c"));
        assert!(adj.insert_edge("b", "d"));
        assert!(adj.insert_node("e"));
        assert!(!adj.insert_node("e"));
        assert_eq!(adj.edge_count(), 2);
    }

    #[test]
    fn test_edge_keys_sorted_and_oriented() {
        let m = model(&[("b", "c"), ("a", "b"), ("a", "c")]);
        let adj = Adjacency::from_model(&m);
        let keys: Vec<String> = adj.edge_keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a->b", "a->c", "b->c"]);
    }

    #[test]
    fn test_neighbors_by_direction() {
        let m = model(&[("a", "b"), ("c", "b")]);
        let adj = Adjacency::from_model(&m);
        assert_eq!(
            adj.neighbors("b", Direction::Upstream).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(adj.neighbors("b", Direction::Downstream).count(), 0);
        assert!(adj
            .neighbors("a", Direction::Downstream)
            .eq(adj.successors("a")));
        assert!(adj
            .neighbors("b", Direction::Upstream)
            .eq(adj.predecessors("b")));
    }

    #[test]
    fn test_edge_key_parse() {
        let key = EdgeKey::parse("a -> b").unwrap();
        assert_eq!(key, EdgeKey::new("a", "b"));
        assert_eq!(key.to_string(), "a->b");
        assert!(EdgeKey::parse("ab").is_none());
        assert!(EdgeKey::parse("->b").is_none());
    }

    #[test]
    fn test_edge_key_quotes_arrow_endpoints() {
        let left = EdgeKey::new("a->b", "c");
        let right = EdgeKey::new("a", "b->c");
        assert_eq!(left.to_string(), "\"a->b\"->c");
        assert_eq!(right.to_string(), "a->\"b->c\"");
        assert_ne!(left.to_string(), right.to_string());
        assert_eq!(EdgeKey::new("\"x", "y").to_string(), "\"\\\"x\"->y");
    }

    #[test]
    fn test_legend_detection() {
        let by_id = Cluster {
            id: "cluster_legend".into(),
            label: None,
            members: vec![],
        };
        let by_label = Cluster {
            id: "cluster_0".into(),
            label: Some("Legend".into()),
            members: vec![],
        };
        let plain = Cluster {
            id: "cluster_db".into(),
            label: Some("Storage".into()),
            members: vec![],
        };
        assert!(by_id.is_legend());
        assert!(by_label.is_legend());
        assert!(!plain.is_legend());
    }
}
