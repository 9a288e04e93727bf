//! Generation counters for the source and for in-flight renders.
//!
//! Every accepted source bumps the source generation. Every render request
//! takes a ticket from a monotonic sequence; only the most recently issued
//! ticket may complete. A completion carrying an older ticket belongs to a
//! superseded render and is dropped.

use serde::Serialize;

/// Handle for one submitted render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderTicket {
    pub seq: u64,
    /// Source generation the render was requested for.
    pub source_generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Generations {
    source: u64,
    render_seq: u64,
    outstanding: Option<RenderTicket>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new accepted source. Returns the new generation.
    pub fn bump_source(&mut self) -> u64 {
        self.source += 1;
        self.source
    }

    pub fn source(&self) -> u64 {
        self.source
    }

    /// Issue a ticket for a new render, superseding any outstanding one.
    pub fn issue(&mut self) -> RenderTicket {
        self.render_seq += 1;
        let ticket = RenderTicket {
            seq: self.render_seq,
            source_generation: self.source,
        };
        if let Some(prev) = self.outstanding.replace(ticket) {
            tracing::debug!(
                "graph_lens: render {} superseded by {}",
                prev.seq,
                ticket.seq
            );
        }
        ticket
    }

    /// Whether `ticket` is the latest render for the current source.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        self.outstanding == Some(ticket) && ticket.source_generation == self.source
    }

    /// Close out `ticket`. Returns false, leaving state untouched, when the
    /// ticket is stale.
    pub fn complete(&mut self, ticket: RenderTicket) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "graph_lens: ignoring stale render {} (source gen {} vs {})",
                ticket.seq,
                ticket.source_generation,
                self.source
            );
            return false;
        }
        self.outstanding = None;
        true
    }

    pub fn outstanding(&self) -> Option<RenderTicket> {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_completes() {
        let mut gens = Generations::new();
        gens.bump_source();
        let ticket = gens.issue();
        assert!(gens.is_current(ticket));
        assert!(gens.complete(ticket));
        assert_eq!(gens.outstanding(), None);
    }

    #[test]
    fn test_superseded_ticket_ignored() {
        let mut gens = Generations::new();
        gens.bump_source();
        let first = gens.issue();
        let second = gens.issue();
        assert!(!gens.complete(first));
        assert_eq!(gens.outstanding(), Some(second));
        assert!(gens.complete(second));
    }

    #[test]
    fn test_ticket_for_old_source_ignored() {
        let mut gens = Generations::new();
        gens.bump_source();
        let ticket = gens.issue();
        gens.bump_source();
        assert!(!gens.is_current(ticket));
        assert!(!gens.complete(ticket));
    }

    #[test]
    fn test_completed_ticket_cannot_complete_twice() {
        let mut gens = Generations::new();
        let ticket = gens.issue();
        assert!(gens.complete(ticket));
        assert!(!gens.complete(ticket));
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let mut gens = Generations::new();
        let a = gens.issue();
        let b = gens.issue();
        assert!(b.seq > a.seq);
        assert_eq!(gens.bump_source(), 1);
        assert_eq!(gens.bump_source(), 2);
        assert_eq!(gens.issue().source_generation, 2);
    }
}
