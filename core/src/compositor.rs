//! Merge the traversals of every active selection into one highlight/fade
//! snapshot for the renderer.
//!
//! `compute_view` is pure: same selections and graph in, same `View` out.
//! Highlights are additive across selections; nothing lit by one
//! selection is faded by another.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::graph::{Adjacency, Cluster, Direction, EdgeKey};
use crate::selection::{Mode, Selection};
use crate::traversal::{single_hop, traverse};

/// Visual treatment of a node, edge or cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    /// No filtering active.
    #[default]
    Neutral,
    Highlighted,
    Faded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NodeView {
    pub emphasis: Emphasis,
    /// The node is the start of an active selection.
    pub selected: bool,
    /// Shortest hop distance from any selection that reached the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EdgeView {
    pub emphasis: Emphasis,
    /// One-hop link from a selected node; drawn with stronger emphasis.
    pub direct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClusterView {
    pub emphasis: Emphasis,
}

/// Full highlight state for one graph and one selection list.
///
/// Edge entries are keyed `"source->target"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct View {
    pub filtered: bool,
    pub nodes: BTreeMap<String, NodeView>,
    pub edges: BTreeMap<String, EdgeView>,
    pub clusters: BTreeMap<String, ClusterView>,
}

impl View {
    /// Everything neutral.
    fn neutral(adjacency: &Adjacency, clusters: &[Cluster]) -> Self {
        Self {
            filtered: false,
            nodes: adjacency
                .node_ids()
                .map(|id| (id.to_string(), NodeView::default()))
                .collect(),
            edges: adjacency
                .edge_keys()
                .map(|key| (key.to_string(), EdgeView::default()))
                .collect(),
            clusters: clusters
                .iter()
                .map(|c| (c.id.clone(), ClusterView::default()))
                .collect(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeView> {
        self.nodes.get(id)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeView> {
        self.edges.get(&EdgeKey::new(source, target).to_string())
    }

    pub fn cluster(&self, id: &str) -> Option<&ClusterView> {
        self.clusters.get(id)
    }

    /// Ids of highlighted nodes, sorted.
    pub fn highlighted_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.emphasis == Emphasis::Highlighted)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Keys of highlighted edges, sorted.
    pub fn highlighted_edges(&self) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, e)| e.emphasis == Emphasis::Highlighted)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn is_neutral(&self) -> bool {
        !self.filtered
            && self.nodes.values().all(|n| n.emphasis == Emphasis::Neutral && !n.selected)
            && self.edges.values().all(|e| e.emphasis == Emphasis::Neutral && !e.direct)
            && self.clusters.values().all(|c| c.emphasis == Emphasis::Neutral)
    }
}

/// What one selection lights up.
struct Lit<'a> {
    nodes: HashMap<&'a str, u32>,
    edges: Vec<(EdgeKey<'a>, bool)>,
}

/// Compute the highlight state for `selections` over the graph.
///
/// An empty list, or any selection in `Mode::All`, leaves everything
/// neutral. Otherwise every node and edge starts faded and each selection
/// lights up its own neighborhood.
pub fn compute_view(adjacency: &Adjacency, clusters: &[Cluster], selections: &[Selection]) -> View {
    let mut view = View::neutral(adjacency, clusters);
    if selections.is_empty() || selections.iter().any(|s| s.mode == Mode::All) {
        return view;
    }

    view.filtered = true;
    for node in view.nodes.values_mut() {
        node.emphasis = Emphasis::Faded;
    }
    for edge in view.edges.values_mut() {
        edge.emphasis = Emphasis::Faded;
    }
    for cluster in clusters {
        if let Some(cv) = view.clusters.get_mut(&cluster.id) {
            cv.emphasis = if cluster.is_legend() {
                Emphasis::Highlighted
            } else {
                Emphasis::Faded
            };
        }
    }

    for selection in selections {
        let lit = light(adjacency, selection);

        for (&id, &distance) in &lit.nodes {
            if let Some(node) = view.nodes.get_mut(id) {
                node.emphasis = Emphasis::Highlighted;
                node.distance = Some(node.distance.map_or(distance, |d| d.min(distance)));
            }
        }
        if let Some(node) = view.nodes.get_mut(&selection.node_id) {
            node.selected = true;
        }

        for (key, direct) in &lit.edges {
            if let Some(edge) = view.edges.get_mut(&key.to_string()) {
                edge.emphasis = Emphasis::Highlighted;
                edge.direct |= *direct;
            }
        }

        for cluster in clusters {
            if cluster.members.iter().any(|m| lit.nodes.contains_key(m.as_str())) {
                if let Some(cv) = view.clusters.get_mut(&cluster.id) {
                    cv.emphasis = Emphasis::Highlighted;
                }
            }
        }
    }

    tracing::debug!(
        "graph_lens: view for {} selection(s): {} nodes lit, {} edges lit",
        selections.len(),
        view.highlighted_nodes().len(),
        view.highlighted_edges().len()
    );
    view
}

fn light<'a>(adjacency: &'a Adjacency, selection: &'a Selection) -> Lit<'a> {
    let start = selection.node_id.as_str();
    let max_hops = selection.max_hops.depth();

    match selection.mode {
        Mode::All => Lit {
            nodes: HashMap::new(),
            edges: Vec::new(),
        },
        Mode::Single => {
            let reach = single_hop(adjacency, start);
            let mut edges: Vec<(EdgeKey<'a>, bool)> =
                reach.edges.iter().map(|&key| (key, true)).collect();
            edges.sort();
            Lit {
                nodes: reach.hops,
                edges,
            }
        }
        Mode::Downstream => {
            let reach = traverse(adjacency, start, Direction::Downstream, max_hops);
            let edges = edges_among(adjacency, &reach.hops, |s, t| {
                s == start || reach.hops[s] < reach.hops[t]
            });
            Lit {
                edges: flag_direct(edges, &reach.direct),
                nodes: reach.hops,
            }
        }
        Mode::Upstream => {
            let reach = traverse(adjacency, start, Direction::Upstream, max_hops);
            let edges = edges_among(adjacency, &reach.hops, |s, t| {
                t == start || reach.hops[t] < reach.hops[s]
            });
            Lit {
                edges: flag_direct(edges, &reach.direct),
                nodes: reach.hops,
            }
        }
        Mode::Bidirectional => {
            let up = traverse(adjacency, start, Direction::Upstream, max_hops);
            let down = traverse(adjacency, start, Direction::Downstream, max_hops);

            let mut nodes = up.hops.clone();
            for (&id, &d) in &down.hops {
                nodes
                    .entry(id)
                    .and_modify(|e| *e = (*e).min(d))
                    .or_insert(d);
            }

            let edges = edges_among(adjacency, &nodes, |s, t| {
                let crosses = up.contains(s) && down.contains(t);
                let touches_start = s == start || t == start;
                let up_step = matches!(
                    (up.distance(s), up.distance(t)),
                    (Some(ds), Some(dt)) if ds == dt + 1
                );
                let down_step = matches!(
                    (down.distance(s), down.distance(t)),
                    (Some(ds), Some(dt)) if dt == ds + 1
                );
                crosses || touches_start || up_step || down_step
            });

            let direct: HashSet<EdgeKey<'a>> = up.direct.union(&down.direct).copied().collect();
            Lit {
                edges: flag_direct(edges, &direct),
                nodes,
            }
        }
    }
}

/// Edges of the graph whose endpoints are both in `nodes` and which pass
/// the mode's directionality rule.
fn edges_among<'a>(
    adjacency: &'a Adjacency,
    nodes: &HashMap<&'a str, u32>,
    keep: impl Fn(&str, &str) -> bool,
) -> Vec<EdgeKey<'a>> {
    let mut edges: Vec<EdgeKey<'a>> = nodes
        .keys()
        .flat_map(|&source| {
            adjacency
                .successors(source)
                .map(move |target| EdgeKey::new(source, target))
        })
        .filter(|key| nodes.contains_key(key.target) && keep(key.source, key.target))
        .collect();
    edges.sort();
    edges
}

fn flag_direct<'a>(edges: Vec<EdgeKey<'a>>, direct: &HashSet<EdgeKey<'a>>) -> Vec<(EdgeKey<'a>, bool)> {
    edges
        .into_iter()
        .map(|key| {
            let is_direct = direct.contains(&key);
            (key, is_direct)
        })
        .collect()
}
