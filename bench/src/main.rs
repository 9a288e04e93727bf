use graph_lens_core::{
    compute_view, scan, traverse, validate, Adjacency, Direction, HopLimit, Mode, Selection,
};
use std::fmt::Write;
use std::time::Instant;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: graph-lens-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  lsystem     Fractal branching tree (deep paths)");
        println!("  scalefree   Preferential attachment via edge sampling (hub-and-spoke)");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  clustered   Chained clusters plus a legend block");
        println!();
        println!("Default node_count: 100000");
        return;
    }

    println!("graph-lens-bench");
    println!("================");
    println!();

    let generators: Vec<(&str, fn(u64) -> String)> = match mode {
        "lsystem" => vec![("L-system tree", gen_lsystem)],
        "scalefree" => vec![("Scale-free (edge sampling)", gen_scale_free)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "clustered" => vec![("Clustered chain", gen_clustered)],
        "all" => vec![
            ("L-system tree", gen_lsystem as fn(u64) -> String),
            ("Scale-free (edge sampling)", gen_scale_free),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Erdos-Renyi random", gen_random),
            ("Clustered chain", gen_clustered),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, node_count);
    }
}

fn ms(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1000.0
}

fn run_benchmark(name: &str, generator: fn(u64) -> String, node_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let source = generator(node_count);
    println!(
        "Generated in {:.2}s: {:.1}MB of source",
        t.elapsed().as_secs_f64(),
        source.len() as f64 / 1_048_576.0
    );

    let t = Instant::now();
    if let Err(e) = validate(&source) {
        println!("Generated source failed validation: {}", e);
        return;
    }
    let validate_ms = ms(t);

    let t = Instant::now();
    let model = scan(&source);
    let scan_ms = ms(t);

    let t = Instant::now();
    let adj = Adjacency::from_model(&model);
    let index_ms = ms(t);

    println!(
        "validate {:.1}ms, scan {:.1}ms, index {:.1}ms: {} nodes, {} edges, {} clusters",
        validate_ms,
        scan_ms,
        index_ms,
        adj.node_count(),
        adj.edge_count(),
        model.clusters().len()
    );

    // BFS from n0 (root or hub) in both directions
    println!();
    println!(
        "{:>8} {:>12} {:>10} {:>12} {:>10}",
        "depth", "down found", "time", "up found", "time"
    );
    println!("{:->8} {:->12} {:->10} {:->12} {:->10}", "", "", "", "", "");

    for depth in [1, 2, 3, 5, 10, 20, 50] {
        let t = Instant::now();
        let down = traverse(&adj, "n0", Direction::Downstream, depth);
        let down_ms = ms(t);
        let t = Instant::now();
        let up = traverse(&adj, "n0", Direction::Upstream, depth);
        let up_ms = ms(t);
        println!(
            "{:>8} {:>12} {:>8.1}ms {:>12} {:>8.1}ms",
            depth,
            down.hops.len() - 1,
            down_ms,
            up.hops.len() - 1,
            up_ms
        );
        // Stop if we already found everything
        if down.hops.len() + up.hops.len() >= 2 * adj.node_count() {
            println!("{:>8} (entire graph reached)", "");
            break;
        }
    }

    // Full view snapshots at the default hop limit
    println!();
    println!("{:>14} {:>12} {:>12} {:>10}", "view", "lit nodes", "lit edges", "time");
    println!("{:->14} {:->12} {:->12} {:->10}", "", "", "", "");

    let far = format!("n{}", adj.node_count().saturating_sub(1));
    let cases: Vec<(&str, Vec<Selection>)> = vec![
        ("single", vec![Selection::new("n0", Mode::Single, HopLimit::default())]),
        ("downstream", vec![Selection::new("n0", Mode::Downstream, HopLimit::default())]),
        ("upstream", vec![Selection::new("n0", Mode::Upstream, HopLimit::default())]),
        (
            "bidirectional",
            vec![Selection::new("n0", Mode::Bidirectional, HopLimit::default())],
        ),
        (
            "multi (2)",
            vec![
                Selection::new("n0", Mode::Downstream, HopLimit::default()),
                Selection::new(far.as_str(), Mode::Upstream, HopLimit::default()),
            ],
        ),
    ];

    for (label, selections) in cases {
        let t = Instant::now();
        let view = compute_view(&adj, model.clusters(), &selections);
        let elapsed = ms(t);
        println!(
            "{:>14} {:>12} {:>12} {:>8.1}ms",
            label,
            view.highlighted_nodes().len(),
            view.highlighted_edges().len(),
            elapsed
        );
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: deterministic DOT source, single-threaded, O(n + edges)
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

const SHAPES: [&str; 4] = ["box", "ellipse", "diamond", "note"];

/// Accumulates DOT statements. `write!` into a String cannot fail.
struct Dot(String);

impl Dot {
    fn new(edges_hint: u64) -> Self {
        let mut s = String::with_capacity(edges_hint as usize * 16);
        s.push_str("digraph G {\n");
        Self(s)
    }
    fn node(&mut self, id: u64, rng: &mut FastRng) {
        let _ = writeln!(self.0, "  n{} [shape={}];", id, SHAPES[rng.next(4) as usize]);
    }
    fn edge(&mut self, from: u64, to: u64) {
        let _ = writeln!(self.0, "  n{} -> n{};", from, to);
    }
    fn finish(mut self) -> String {
        self.0.push_str("}\n");
        self.0
    }
}

/// L-system fractal tree: each node spawns 3 children. Deep paths (log
/// depth) with exponential width; n0 is the root.
fn gen_lsystem(node_count: u64) -> String {
    let mut dot = Dot::new(node_count);
    let mut rng = FastRng::new(42);
    let branching = 3u64;
    dot.node(0, &mut rng);

    let mut next_id: u64 = 1;
    let mut frontier: Vec<u64> = vec![0];

    while next_id < node_count && !frontier.is_empty() {
        let mut next_frontier = Vec::with_capacity(frontier.len() * branching as usize);
        for &parent in &frontier {
            for _ in 0..branching {
                if next_id >= node_count {
                    break;
                }
                let child = next_id;
                next_id += 1;
                dot.node(child, &mut rng);
                dot.edge(parent, child);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
    }

    dot.finish()
}

/// Scale-free via edge-list sampling: new nodes attach to endpoints of
/// random existing edges, so well-connected nodes keep gaining edges.
fn gen_scale_free(node_count: u64) -> String {
    let edges_per_node = 5u64;
    let mut dot = Dot::new(node_count * edges_per_node);
    let mut rng = FastRng::new(12345);
    let mut endpoints: Vec<u64> = Vec::with_capacity((node_count * edges_per_node * 2) as usize);

    let seed = 5u64.min(node_count);
    for i in 0..seed {
        dot.node(i, &mut rng);
    }
    for i in 0..seed {
        for j in (i + 1)..seed {
            dot.edge(i, j);
            endpoints.push(i);
            endpoints.push(j);
        }
    }

    for new_node in seed..node_count {
        dot.node(new_node, &mut rng);
        for _ in 0..edges_per_node.min(new_node) {
            let target = endpoints[rng.next(endpoints.len() as u64) as usize];
            // Hubs point at newcomers half the time so upstream BFS has work too.
            if rng.next(2) == 0 {
                dot.edge(new_node, target);
            } else {
                dot.edge(target, new_node);
            }
            endpoints.push(new_node);
            endpoints.push(target);
        }
    }

    dot.finish()
}

/// Small-world (Watts-Strogatz): ring lattice with K forward neighbors,
/// each edge rewired with probability p.
fn gen_small_world(node_count: u64) -> String {
    let k = 5u64;
    let p = 0.05f64;
    let mut dot = Dot::new(node_count * k);
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        dot.node(i, &mut rng);
    }
    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let target = if rng.next_f64() < p {
                rng.next(node_count)
            } else {
                neighbor
            };
            dot.edge(i, target);
        }
    }

    dot.finish()
}

/// Erdos-Renyi: ~5 uniform random edges per node, no structure.
fn gen_random(node_count: u64) -> String {
    let target_edges = node_count * 5;
    let mut dot = Dot::new(target_edges);
    let mut rng = FastRng::new(54321);

    for i in 0..node_count {
        dot.node(i, &mut rng);
    }
    for _ in 0..target_edges {
        let from = rng.next(node_count);
        let to = rng.next(node_count);
        dot.edge(from, to);
    }

    dot.finish()
}

/// Clusters of 50 nodes, each a random DAG, chained cluster to cluster,
/// plus a legend cluster. Exercises cluster propagation.
fn gen_clustered(node_count: u64) -> String {
    let size = 50u64;
    let mut dot = Dot::new(node_count * 3);
    let mut rng = FastRng::new(99999);

    let mut start = 0u64;
    while start < node_count {
        let end = (start + size).min(node_count);
        let _ = writeln!(dot.0, "  subgraph cluster_{} {{", start / size);
        let _ = writeln!(dot.0, "    label = \"block {}\";", start / size);
        for i in start..end {
            dot.node(i, &mut rng);
        }
        for i in (start + 1)..end {
            dot.edge(start + rng.next(i - start), i);
        }
        dot.0.push_str("  }\n");
        if end < node_count {
            dot.edge(end - 1, end);
        }
        start = end;
    }

    dot.0.push_str("  subgraph cluster_legend {\n    label = \"Legend\";\n");
    dot.0.push_str("    key_a -> key_b;\n  }\n");
    dot.finish()
}
