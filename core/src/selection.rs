use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::traversal::UNBOUNDED_HOPS;

/// Hop limit applied when the user's input cannot be used.
pub const DEFAULT_MAX_HOPS: u32 = 3;

/// How a selection explores the graph around its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// No filtering; the whole graph stays neutral.
    All,
    /// Immediate predecessors and successors only.
    Single,
    #[default]
    Downstream,
    Upstream,
    Bidirectional,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown traversal mode '{0}', use all, single, downstream, upstream or bidirectional")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "none" => Ok(Mode::All),
            "single" | "neighbors" => Ok(Mode::Single),
            "downstream" | "down" | "out" => Ok(Mode::Downstream),
            "upstream" | "up" | "in" => Ok(Mode::Upstream),
            "bidirectional" | "both" => Ok(Mode::Bidirectional),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::All => "all",
            Mode::Single => "single",
            Mode::Downstream => "downstream",
            Mode::Upstream => "upstream",
            Mode::Bidirectional => "bidirectional",
        };
        f.write_str(s)
    }
}

/// Maximum traversal depth: a positive hop count or no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HopLimit {
    Bounded(u32),
    Unbounded,
}

impl HopLimit {
    /// A bounded limit; zero is not a valid limit.
    pub fn new(hops: u32) -> Option<Self> {
        (hops > 0).then_some(HopLimit::Bounded(hops))
    }

    /// Interpret user input from the hop control. Anything unusable
    /// (non-numeric, zero, negative) falls back to `default`.
    pub fn parse_or(input: &str, default: HopLimit) -> HopLimit {
        let input = input.trim();
        if matches!(
            input.to_lowercase().as_str(),
            "unbounded" | "all" | "inf" | "infinite" | "∞" | "*"
        ) {
            return HopLimit::Unbounded;
        }
        match input.parse::<i64>() {
            Ok(n) if n > 0 => {
                HopLimit::Bounded(u32::try_from(n).unwrap_or(UNBOUNDED_HOPS).min(UNBOUNDED_HOPS - 1))
            }
            _ => {
                tracing::warn!(
                    "graph_lens: invalid hop limit '{}', using {}",
                    input,
                    default
                );
                default
            }
        }
    }

    /// The bound handed to the traversal engine.
    pub fn depth(self) -> u32 {
        match self {
            HopLimit::Bounded(n) => n,
            HopLimit::Unbounded => UNBOUNDED_HOPS,
        }
    }
}

impl Default for HopLimit {
    fn default() -> Self {
        HopLimit::Bounded(DEFAULT_MAX_HOPS)
    }
}

impl fmt::Display for HopLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HopLimit::Bounded(n) => write!(f, "{n}"),
            HopLimit::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// One recorded exploration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub node_id: String,
    pub mode: Mode,
    pub max_hops: HopLimit,
}

impl Selection {
    pub fn new(node_id: impl Into<String>, mode: Mode, max_hops: HopLimit) -> Self {
        Self {
            node_id: node_id.into(),
            mode,
            max_hops,
        }
    }
}

/// Active selections, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    selections: Vec<Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node activation. A plain activation replaces the list; an
    /// additive one (modifier key held) appends unless the node is already
    /// selected. Returns whether the list changed.
    pub fn activate(&mut self, node_id: &str, mode: Mode, max_hops: HopLimit, additive: bool) -> bool {
        let selection = Selection::new(node_id, mode, max_hops);

        if additive {
            if self.contains(node_id) {
                return false;
            }
            self.selections.push(selection);
            return true;
        }

        if self.selections.len() == 1 && self.selections[0] == selection {
            return false;
        }
        self.selections.clear();
        self.selections.push(selection);
        true
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Apply a new hop limit to every active selection.
    pub fn update_hop_setting(&mut self, max_hops: HopLimit) {
        for selection in &mut self.selections {
            selection.max_hops = max_hops;
        }
    }

    /// Apply a new mode to every active selection.
    pub fn update_mode(&mut self, mode: Mode) {
        for selection in &mut self.selections {
            selection.mode = mode;
        }
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.selections.iter().any(|s| s.node_id == node_id)
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(store: &SelectionStore) -> Vec<&str> {
        store.selections().iter().map(|s| s.node_id.as_str()).collect()
    }

    #[test]
    fn test_plain_activation_replaces() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::default(), false);
        store.activate("b", Mode::Downstream, HopLimit::default(), true);
        assert!(store.activate("c", Mode::Upstream, HopLimit::default(), false));
        assert_eq!(ids(&store), vec!["c"]);
        assert_eq!(store.selections()[0].mode, Mode::Upstream);
    }

    #[test]
    fn test_additive_appends_in_order() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::default(), false);
        store.activate("b", Mode::Downstream, HopLimit::default(), true);
        store.activate("c", Mode::Single, HopLimit::default(), true);
        assert_eq!(ids(&store), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_additive_duplicate_is_noop() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::default(), false);
        store.activate("b", Mode::Downstream, HopLimit::default(), true);
        assert!(!store.activate("a", Mode::Upstream, HopLimit::Unbounded, true));
        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.selections()[0].mode, Mode::Downstream);
    }

    #[test]
    fn test_additive_on_empty_store() {
        let mut store = SelectionStore::new();
        assert!(store.activate("a", Mode::Downstream, HopLimit::default(), true));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_repeat_plain_activation_unchanged() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::default(), false);
        assert!(!store.activate("a", Mode::Downstream, HopLimit::default(), false));
    }

    #[test]
    fn test_clear() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::default(), false);
        store.activate("b", Mode::Downstream, HopLimit::default(), true);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_hop_setting_applies_to_all() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::Bounded(1), false);
        store.activate("b", Mode::Upstream, HopLimit::Bounded(2), true);
        store.update_hop_setting(HopLimit::Unbounded);
        assert!(store
            .selections()
            .iter()
            .all(|s| s.max_hops == HopLimit::Unbounded));
    }

    #[test]
    fn test_mode_applies_to_all() {
        let mut store = SelectionStore::new();
        store.activate("a", Mode::Downstream, HopLimit::default(), false);
        store.activate("b", Mode::Upstream, HopLimit::default(), true);
        store.update_mode(Mode::Bidirectional);
        assert!(store
            .selections()
            .iter()
            .all(|s| s.mode == Mode::Bidirectional));
    }

    #[test]
    fn test_hop_limit_parse() {
        let fallback = HopLimit::Bounded(2);
        assert_eq!(HopLimit::parse_or("5", fallback), HopLimit::Bounded(5));
        assert_eq!(HopLimit::parse_or(" 7 ", fallback), HopLimit::Bounded(7));
        assert_eq!(HopLimit::parse_or("unbounded", fallback), HopLimit::Unbounded);
        assert_eq!(HopLimit::parse_or("∞", fallback), HopLimit::Unbounded);
        assert_eq!(HopLimit::parse_or("0", fallback), fallback);
        assert_eq!(HopLimit::parse_or("-3", fallback), fallback);
        assert_eq!(HopLimit::parse_or("lots", fallback), fallback);
        assert_eq!(HopLimit::parse_or("", fallback), fallback);
        assert_eq!(
            HopLimit::parse_or("99999999999", fallback),
            HopLimit::Bounded(UNBOUNDED_HOPS - 1)
        );
    }

    #[test]
    fn test_hop_limit_depth() {
        assert_eq!(HopLimit::Bounded(4).depth(), 4);
        assert_eq!(HopLimit::Unbounded.depth(), UNBOUNDED_HOPS);
        assert_eq!(HopLimit::new(0), None);
        assert_eq!(HopLimit::default().depth(), DEFAULT_MAX_HOPS);
    }

    #[test]
    fn test_mode_round_trip_names() {
        for mode in [
            Mode::All,
            Mode::Single,
            Mode::Downstream,
            Mode::Upstream,
            Mode::Bidirectional,
        ] {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
        assert_eq!("BOTH".parse::<Mode>(), Ok(Mode::Bidirectional));
        assert!("sideways".parse::<Mode>().is_err());
    }
}
