//! Lightweight scanner: pulls nodes, directed edges and clusters out of
//! DOT-like source without a full grammar.
//!
//! The scanner never fails. Text it does not recognise is skipped, so
//! source with no matches produces an empty model. Structural problems
//! are the validator's business (see `validate`).

use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

use regex::Regex;

use crate::graph::{Attributes, Cluster, GraphModel};

/// Quoted string, bare identifier, or numeral.
const ID: &str = r#"(?:"(?:[^"\\]|\\.)*"|[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*|-?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?))"#;

static ENDPOINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^\s*({ID})(?:\s*:\s*{ID}){{0,2}}\s*$")).expect("endpoint regex")
});

static NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^\s*({ID})(?:\s*:\s*{ID}){{0,2}}\s*(\[.*)?$")).expect("node regex")
});

static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?s)({ID})\s*=\s*({ID})")).expect("attr regex"));

static ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^\s*({ID})\s*=\s*({ID})\s*$")).expect("assignment regex")
});

static DEFAULTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)^\s*(graph|node|edge)\s*(\[.*)?$").expect("defaults regex"));

static SUBGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?si)^\s*subgraph\s+({ID})\s*$")).expect("subgraph regex")
});

const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Scan graph source into a model.
pub fn scan(source: &str) -> GraphModel {
    let mut scanner = Scanner::default();
    for piece in split_pieces(source) {
        match piece {
            Piece::Open(header) => scanner.open_scope(&header),
            Piece::Close => {
                scanner.scopes.pop();
            }
            Piece::Statement(text) => scanner.statement(&text),
        }
    }

    let mut model = scanner.model;
    for cluster in scanner.clusters {
        model.add_cluster(cluster);
    }

    tracing::debug!(
        "graph_lens: scanned {} nodes, {} edges, {} clusters",
        model.node_count(),
        model.edge_count(),
        model.clusters().len()
    );
    model
}

#[derive(Debug, PartialEq)]
enum Piece {
    Statement(String),
    /// Text before a `{`, e.g. `digraph G` or `subgraph cluster_x`.
    Open(String),
    Close,
}

/// Split source into statements and scope markers. Separators inside
/// quotes or attribute brackets do not count. Comments are dropped.
fn split_pieces(source: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;
    let mut depth = 0usize;
    // Only whitespace seen so far on the current line.
    let mut line_blank = true;
    let mut chars = source.chars().peekable();

    let flush = |current: &mut String, pieces: &mut Vec<Piece>| {
        if !current.trim().is_empty() {
            pieces.push(Piece::Statement(current.trim().to_string()));
        }
        current.clear();
    };

    while let Some(c) = chars.next() {
        if in_quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }

        let line_start = line_blank;
        line_blank = c == '\n' || (line_blank && c.is_whitespace());

        match c {
            '"' => {
                in_quote = true;
                current.push(c);
            }
            '/' if chars.peek() == Some(&'/') => skip_line(&mut chars),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            '#' if line_start => skip_line(&mut chars),
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '\n' if depth == 0
                && (current.trim_end().ends_with("->") || continues_statement(&chars)) =>
            {
                current.push(' ')
            }
            ';' | '\n' if depth == 0 => flush(&mut current, &mut pieces),
            '{' if depth == 0 => {
                pieces.push(Piece::Open(current.trim().to_string()));
                current.clear();
            }
            '}' if depth == 0 => {
                flush(&mut current, &mut pieces);
                pieces.push(Piece::Close);
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut pieces);
    pieces
}

/// Whether the next non-blank text carries on the statement before a
/// line break: an edge operator or an attribute block.
fn continues_statement(chars: &Peekable<Chars<'_>>) -> bool {
    let mut rest = chars.clone().skip_while(|c| c.is_whitespace());
    match rest.next() {
        Some('[') => true,
        Some('-') => rest.next() == Some('>'),
        _ => false,
    }
}

fn skip_line(chars: &mut Peekable<Chars<'_>>) {
    while let Some(&n) = chars.peek() {
        if n == '\n' {
            break;
        }
        chars.next();
    }
}

#[derive(Default)]
struct Scanner {
    model: GraphModel,
    clusters: Vec<Cluster>,
    /// One entry per open `{`; Some(i) when the scope is clusters[i].
    scopes: Vec<Option<usize>>,
}

impl Scanner {
    fn open_scope(&mut self, header: &str) {
        let cluster = SUBGRAPH_RE
            .captures(header)
            .map(|caps| unquote(&caps[1]))
            .filter(|id| id.starts_with("cluster"));

        match cluster {
            Some(id) => {
                self.scopes.push(Some(self.clusters.len()));
                self.clusters.push(Cluster {
                    id,
                    label: None,
                    members: Vec::new(),
                });
            }
            None => self.scopes.push(None),
        }
    }

    fn current_cluster(&mut self) -> Option<&mut Cluster> {
        let idx = self.scopes.last().copied().flatten()?;
        self.clusters.get_mut(idx)
    }

    fn statement(&mut self, text: &str) {
        if let Some(caps) = ASSIGN_RE.captures(text) {
            if unquote(&caps[1]) == "label" {
                let label = unquote(&caps[2]);
                if let Some(cluster) = self.current_cluster() {
                    cluster.label = Some(label);
                }
            }
            return;
        }

        if let Some(caps) = DEFAULTS_RE.captures(text) {
            if caps[1].eq_ignore_ascii_case("graph") {
                let attrs = caps.get(2).map(|m| parse_attrs(m.as_str())).unwrap_or_default();
                if let Some(label) = attrs.get("label").cloned() {
                    if let Some(cluster) = self.current_cluster() {
                        cluster.label = Some(label);
                    }
                }
            }
            return;
        }

        let operands = split_arrows(text);
        if operands.len() >= 2 {
            self.edge_chain(&operands);
            return;
        }

        if let Some(caps) = NODE_RE.captures(text) {
            let raw = &caps[1];
            if is_keyword(raw) {
                return;
            }
            let id = unquote(raw);
            let attrs = caps.get(2).map(|m| parse_attrs(m.as_str())).unwrap_or_default();
            self.model.add_node(&id, attrs);
            self.mention(&id);
        }
    }

    fn edge_chain(&mut self, operands: &[&str]) {
        let Some((last, init)) = operands.split_last() else {
            return;
        };
        let (last_id, attr_text) = split_attrs(last);
        let attrs = attr_text.map(parse_attrs).unwrap_or_default();

        let mut ids = Vec::with_capacity(operands.len());
        for operand in init.iter().copied().chain(std::iter::once(last_id)) {
            // Group operands (`a -> {b c}`) and anything else unrecognised
            // drop the whole chain.
            match parse_endpoint(operand) {
                Some(id) => ids.push(id),
                None => return,
            }
        }

        for pair in ids.windows(2) {
            self.model.add_edge(&pair[0], &pair[1], attrs.clone());
        }
        for id in &ids {
            self.mention(id);
        }
    }

    /// Record membership in every open cluster scope.
    fn mention(&mut self, id: &str) {
        for idx in self.scopes.iter().flatten() {
            let members = &mut self.clusters[*idx].members;
            if !members.iter().any(|m| m == id) {
                members.push(id.to_string());
            }
        }
    }
}

fn parse_endpoint(text: &str) -> Option<String> {
    let caps = ENDPOINT_RE.captures(text)?;
    let raw = &caps[1];
    if is_keyword(raw) {
        return None;
    }
    Some(unquote(raw))
}

/// Split a statement on top-level `->` tokens.
fn split_arrows(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut escaped = false;
    let mut depth = 0usize;
    let bytes = text.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_quote = false;
            }
        } else {
            match b {
                b'"' => in_quote = true,
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'-' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                    parts.push(&text[start..i]);
                    start = i + 2;
                    i += 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Separate a trailing attribute block: `b [color=red]` -> (`b `, `[color=red]`).
fn split_attrs(text: &str) -> (&str, Option<&str>) {
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '"' => in_quote = true,
            '[' => return (&text[..i], Some(&text[i..])),
            _ => {}
        }
    }
    (text, None)
}

fn parse_attrs(text: &str) -> Attributes {
    ATTR_RE
        .captures_iter(text)
        .map(|caps| (unquote(&caps[1]), unquote(&caps[2])))
        .collect()
}

fn is_keyword(raw: &str) -> bool {
    !raw.starts_with('"') && KEYWORDS.iter().any(|k| raw.eq_ignore_ascii_case(k))
}

/// Strip surrounding quotes and DOT escapes (`\"` and line continuations).
fn unquote(raw: &str) -> String {
    match raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner
            .replace("\\\r\n", "")
            .replace("\\\n", "")
            .replace("\\\"", "\""),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_pairs(model: &GraphModel) -> Vec<(String, String)> {
        model
            .edges()
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }

    fn pair(s: &str, t: &str) -> (String, String) {
        (s.to_string(), t.to_string())
    }

    #[test]
    fn test_quoted_nodes_and_edges() {
        let m = scan(
            r#"digraph G {
                "api" [shape=box, label="API server"];
                "db" [shape=cylinder];
                "api" -> "db";
            }"#,
        );
        assert_eq!(m.node_count(), 2);
        assert_eq!(m.node("api").unwrap().attrs["label"], "API server");
        assert_eq!(m.node("db").unwrap().attrs["shape"], "cylinder");
        assert_eq!(edge_pairs(&m), vec![pair("api", "db")]);
    }

    #[test]
    fn test_bare_identifiers_and_chains() {
        let m = scan("digraph { a -> b -> c; x1 -> 42 }");
        assert_eq!(
            edge_pairs(&m),
            vec![pair("a", "b"), pair("b", "c"), pair("x1", "42")]
        );
    }

    #[test]
    fn test_edge_attrs_apply_to_every_link_in_chain() {
        let m = scan(r#"digraph { a -> b -> c [color="red"] }"#);
        assert_eq!(m.edge_count(), 2);
        assert!(m.edges().iter().all(|e| e.attrs["color"] == "red"));
        // Target of an edge statement is not mistaken for a node statement.
        assert!(m.node("c").unwrap().attrs.is_empty());
    }

    #[test]
    fn test_escaped_quotes_and_separators_inside_strings() {
        let m = scan(r#"digraph { "say \"hi\"; -> {}" -> "b" }"#);
        assert_eq!(edge_pairs(&m), vec![pair(r#"say "hi"; -> {}"#, "b")]);
    }

    #[test]
    fn test_ports_are_stripped() {
        let m = scan(r#"digraph { a:out -> "b":in:n }"#);
        assert_eq!(edge_pairs(&m), vec![pair("a", "b")]);
    }

    #[test]
    fn test_default_statements_are_not_nodes() {
        let m = scan("digraph { node [shape=box]; edge [color=gray]; graph [rankdir=LR]; a }");
        assert_eq!(m.node_count(), 1);
        assert!(m.contains_node("a"));
    }

    #[test]
    fn test_comments_skipped() {
        let m = scan(
            "digraph {\n  // a -> b\n  /* c -> d\n e -> f */\n# g -> h\n  x -> y // trailing\n}",
        );
        assert_eq!(edge_pairs(&m), vec![pair("x", "y")]);
    }

    #[test]
    fn test_multiline_attribute_block() {
        let m = scan("digraph {\n  n [\n    shape=box\n    color=blue\n  ]\n}");
        let n = m.node("n").unwrap();
        assert_eq!(n.attrs["shape"], "box");
        assert_eq!(n.attrs["color"], "blue");
    }

    #[test]
    fn test_chain_continues_after_trailing_arrow() {
        let m = scan("digraph {\n a ->\n b\n}");
        assert_eq!(edge_pairs(&m), vec![pair("a", "b")]);
    }

    #[test]
    fn test_chain_continues_on_leading_arrow() {
        let m = scan("digraph {\n  a\n    -> b\n    -> c\n  d\n}");
        assert_eq!(edge_pairs(&m), vec![pair("a", "b"), pair("b", "c")]);
        assert!(m.contains_node("d"));
    }

    #[test]
    fn test_attribute_block_on_next_line() {
        let m = scan("digraph {\n  a -> b\n    [color=red]\n  n\n\n  [shape=box]\n}");
        assert_eq!(m.edge_count(), 1);
        assert_eq!(m.edges()[0].attrs["color"], "red");
        assert_eq!(m.node("n").unwrap().attrs["shape"], "box");
    }

    #[test]
    fn test_hash_comment_only_at_line_start() {
        let m = scan("digraph {\n    # { \"\n  a -> b; # c\n}");
        assert_eq!(edge_pairs(&m), vec![pair("a", "b")]);
        assert!(!m.contains_node("c"));
    }

    #[test]
    fn test_clusters_collect_nested_members_and_label() {
        let m = scan(
            r#"digraph {
                subgraph cluster_outer {
                    label = "Outer";
                    a;
                    subgraph "cluster_inner" {
                        graph [label="Legend"];
                        b -> c;
                    }
                }
                subgraph plain { d }
                e -> a;
            }"#,
        );
        let clusters = m.clusters();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].id, "cluster_outer");
        assert_eq!(clusters[0].label.as_deref(), Some("Outer"));
        assert_eq!(clusters[0].members, vec!["a", "b", "c"]);
        assert_eq!(clusters[1].id, "cluster_inner");
        assert!(clusters[1].is_legend());
        assert_eq!(clusters[1].members, vec!["b", "c"]);
        assert!(m.contains_node("d"));
    }

    #[test]
    fn test_group_edges_skipped() {
        let m = scan("digraph { a -> {b c}; d -> e }");
        assert!(m.contains_edge("d", "e"));
        assert!(!m.contains_edge("a", "b"));
    }

    #[test]
    fn test_no_matches_yields_empty_model() {
        assert!(scan("").is_empty());
        assert!(scan("this is not a graph at all !!!").is_empty());
        assert_eq!(scan("{{{ ]]] ->").edge_count(), 0);
    }

    #[test]
    fn test_self_loop_kept_in_model() {
        let m = scan("digraph { a -> a }");
        assert_eq!(m.edge_count(), 1);
        assert!(m.edges()[0].is_self_loop());
    }

    #[test]
    fn test_split_pieces_scopes() {
        let pieces = split_pieces("digraph G { a; subgraph s { b } }");
        assert_eq!(
            pieces,
            vec![
                Piece::Open("digraph G".into()),
                Piece::Statement("a".into()),
                Piece::Open("subgraph s".into()),
                Piece::Statement("b".into()),
                Piece::Close,
                Piece::Close,
            ]
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a\"b""#), r#"a"b"#);
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\"long\\\nname\""), "longname");
        assert_eq!(unquote("\""), "\"");
    }
}
