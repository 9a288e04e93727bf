use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{Adjacency, Direction, EdgeKey};

/// Hop bound used for "unbounded" selections. BFS still stops once every
/// reachable node has been discovered.
pub const UNBOUNDED_HOPS: u32 = u32::MAX;

/// Everything one traversal touched.
///
/// `hops` always contains the start node at distance 0, even when the start
/// id is not in the graph. `edges` holds every edge examined from a node
/// inside the hop bound; `direct` is the subset touching the start node.
#[derive(Debug, Clone)]
pub struct Reach<'a> {
    pub start: &'a str,
    pub hops: HashMap<&'a str, u32>,
    pub edges: HashSet<EdgeKey<'a>>,
    pub direct: HashSet<EdgeKey<'a>>,
}

impl<'a> Reach<'a> {
    fn new(start: &'a str) -> Self {
        let mut hops = HashMap::new();
        hops.insert(start, 0);
        Self {
            start,
            hops,
            edges: HashSet::new(),
            direct: HashSet::new(),
        }
    }

    /// Shortest hop distance from the start, if reached.
    pub fn distance(&self, id: &str) -> Option<u32> {
        self.hops.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hops.contains_key(id)
    }

    /// Reached nodes other than the start.
    pub fn reached(&self) -> impl Iterator<Item = &'a str> + '_ {
        let start = self.start;
        self.hops.keys().copied().filter(move |&id| id != start)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges.contains(&EdgeKey::new(source, target))
    }

    pub fn is_direct(&self, source: &str, target: &str) -> bool {
        self.direct.contains(&EdgeKey::new(source, target))
    }
}

/// A node found during a neighborhood query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborResult {
    pub node_id: String,
    pub distance: u32,
}

/// BFS from `start` following `direction`, at most `max_hops` steps out.
///
/// Each dequeued node below the bound has every neighbor's edge recorded,
/// even when the neighbor was already reached by a shorter route. A
/// neighbor is (re)enqueued only when this route improves its distance, so
/// each node is expanded once, at its shortest distance.
pub fn traverse<'a>(
    adjacency: &'a Adjacency,
    start: &'a str,
    direction: Direction,
    max_hops: u32,
) -> Reach<'a> {
    let mut reach = Reach::new(start);
    if !adjacency.contains_node(start) {
        tracing::debug!("graph_lens: traversal start '{}' not in graph", start);
        return reach;
    }

    let mut queue: VecDeque<(&'a str, u32)> = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_hops {
            continue;
        }
        // Superseded queue entry: a shorter route already expanded this node.
        if reach.distance(current).is_some_and(|d| d < depth) {
            continue;
        }

        let next = depth + 1;
        for neighbor in adjacency.neighbors(current, direction) {
            let key = match direction {
                Direction::Downstream => EdgeKey::new(current, neighbor),
                Direction::Upstream => EdgeKey::new(neighbor, current),
            };
            reach.edges.insert(key);
            if current == start {
                reach.direct.insert(key);
            }

            let improves = reach.hops.get(neighbor).map_or(true, |&d| d > next);
            if improves {
                reach.hops.insert(neighbor, next);
                queue.push_back((neighbor, next));
            }
        }
    }

    reach
}

/// Immediate predecessors and successors of `start`; every edge is both
/// reached and direct.
pub fn single_hop<'a>(adjacency: &'a Adjacency, start: &'a str) -> Reach<'a> {
    let mut reach = Reach::new(start);

    for target in adjacency.successors(start) {
        let key = EdgeKey::new(start, target);
        reach.edges.insert(key);
        reach.direct.insert(key);
        reach.hops.entry(target).or_insert(1);
    }
    for source in adjacency.predecessors(start) {
        let key = EdgeKey::new(source, start);
        reach.edges.insert(key);
        reach.direct.insert(key);
        reach.hops.entry(source).or_insert(1);
    }

    reach
}

/// Nodes reachable from `start` within `max_hops`, excluding the start,
/// ordered by distance then id.
pub fn neighborhood(
    adjacency: &Adjacency,
    start: &str,
    direction: Direction,
    max_hops: u32,
) -> Vec<NeighborResult> {
    let reach = traverse(adjacency, start, direction, max_hops);
    let mut neighbors: Vec<NeighborResult> = reach
        .reached()
        .map(|id| NeighborResult {
            node_id: id.to_string(),
            distance: reach.hops[id],
        })
        .collect();

    neighbors.sort_by(|a, b| {
        a.distance
            .cmp(&b.distance)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    neighbors
}
