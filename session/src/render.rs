//! Contract with the external layout engine.
//!
//! The engine takes sanitized source and hands back the titles of the
//! elements it drew: node ids, and edges as `source->target`. Those titles
//! are reconciled into the adjacency index after each render.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bline\s+(\d+)").expect("line regex"));

/// Element titles reported by a completed render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderedGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Source line named in the engine's message (`... line 7 ...`).
    pub fn line(&self) -> Option<usize> {
        LINE_RE
            .captures(&self.message)
            .and_then(|c| c[1].parse().ok())
    }
}

pub trait Renderer {
    fn render(&mut self, source: &str) -> Result<RenderedGraph, RenderError>;
}

/// Replays a previously captured render result.
#[derive(Debug, Clone, Default)]
pub struct Recorded(pub RenderedGraph);

impl Renderer for Recorded {
    fn render(&mut self, _source: &str) -> Result<RenderedGraph, RenderError> {
        Ok(self.0.clone())
    }
}

/// Strip a leading BOM and normalize line endings to `\n`.
pub fn sanitize(source: &str) -> Cow<'_, str> {
    let body = source.strip_prefix('\u{feff}').unwrap_or(source);
    if body.contains('\r') {
        Cow::Owned(body.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line_parsed() {
        let err = RenderError::new("syntax error in line 7 near '->'");
        assert_eq!(err.line(), Some(7));
        assert_eq!(RenderError::new("Error: Line  12: bad").line(), Some(12));
        assert_eq!(RenderError::new("out of memory").line(), None);
        assert_eq!(RenderError::new("pipeline 4 failed").line(), None);
    }

    #[test]
    fn test_sanitize_strips_bom_and_crlf() {
        assert_eq!(sanitize("\u{feff}digraph {\r\na\r\n}"), "digraph {\na\n}");
        assert_eq!(sanitize("a\rb"), "a\nb");
        assert!(matches!(sanitize("digraph {}"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_recorded_renderer_replays() {
        let graph = RenderedGraph {
            nodes: vec!["a".into(), "b".into()],
            edges: vec!["a->b".into()],
        };
        let mut renderer = Recorded(graph.clone());
        assert_eq!(renderer.render("ignored").unwrap(), graph);
    }

    #[test]
    fn test_rendered_graph_json_defaults() {
        let graph: RenderedGraph = serde_json::from_str(r#"{"nodes": ["x"]}"#).unwrap();
        assert_eq!(graph.nodes, vec!["x"]);
        assert!(graph.edges.is_empty());
    }
}
