//! The precedence dependency graph over `(run, step)` events (component G).
//!
//! Tracks "this event must occur before that one" edges accumulated as the
//! search binds sends to receives, kept transitively closed so a cycle
//! (an event depending on itself) can be detected in O(1) once computed.
//! Snapshotting is push/pop: `mark()` records the current edge count and
//! `undo_to` truncates back to it, since edges are only ever added along a
//! branch and removed by backtracking out of it wholesale.

use std::collections::HashSet;

/// An event address: the run it belongs to and its step index within that
/// run's event sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EventId {
    pub run: usize,
    pub step: usize,
}

impl EventId {
    pub fn new(run: usize, step: usize) -> Self {
        EventId { run, step }
    }
}

/// A transitively-closed "happens-before" relation over events.
#[derive(Clone, Default)]
pub struct DependencyGraph {
    /// `edges[i]` is the set of nodes `i` is known to precede, kept closed
    /// under transitivity after every `add_edge`.
    direct: Vec<(EventId, EventId)>,
    closure: HashSet<(EventId, EventId)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph { direct: Vec::new(), closure: HashSet::new() }
    }

    pub fn mark(&self) -> usize {
        self.direct.len()
    }

    pub fn undo_to(&mut self, mark: usize) {
        while self.direct.len() > mark {
            self.direct.pop();
        }
        self.recompute_closure();
    }

    /// Adds `before -> after` and recomputes the transitive closure.
    /// Returns `false` (and does not add the edge) if doing so would create
    /// a cycle.
    pub fn add_edge(&mut self, before: EventId, after: EventId) -> bool {
        if before == after || self.closure.contains(&(after, before)) {
            return false;
        }
        self.direct.push((before, after));
        self.recompute_closure();
        true
    }

    pub fn depends(&self, before: EventId, after: EventId) -> bool {
        before == after || self.closure.contains(&(before, after))
    }

    pub fn has_cycle(&self) -> bool {
        self.closure.iter().any(|(a, b)| a == b)
    }

    /// The directly-added `before -> after` edges, in insertion order, for
    /// an attack emitter to render the precedence relation without the
    /// transitive closure's redundant pairs.
    pub fn edges(&self) -> &[(EventId, EventId)] {
        &self.direct
    }

    fn recompute_closure(&mut self) {
        self.closure.clear();
        for &(a, b) in &self.direct {
            self.closure.insert((a, b));
        }
        // Warshall transitive closure over the small, explicitly listed node set.
        let mut nodes: Vec<EventId> = Vec::new();
        for &(a, b) in &self.direct {
            if !nodes.contains(&a) {
                nodes.push(a);
            }
            if !nodes.contains(&b) {
                nodes.push(b);
            }
        }
        for &k in &nodes {
            for &i in &nodes {
                if !self.closure.contains(&(i, k)) {
                    continue;
                }
                for &j in &nodes {
                    if self.closure.contains(&(k, j)) {
                        self.closure.insert((i, j));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_exposes_only_direct_insertions() {
        let mut graph = DependencyGraph::new();
        let a = EventId::new(0, 0);
        let b = EventId::new(0, 1);
        let c = EventId::new(1, 0);
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        assert_eq!(graph.edges(), &[(a, b), (b, c)]);
    }

    #[test]
    fn transitive_edges_are_derived() {
        let mut graph = DependencyGraph::new();
        let a = EventId::new(0, 0);
        let b = EventId::new(0, 1);
        let c = EventId::new(1, 0);
        assert!(graph.add_edge(a, b));
        assert!(graph.add_edge(b, c));
        assert!(graph.depends(a, c));
    }

    #[test]
    fn adding_a_cycle_is_rejected() {
        let mut graph = DependencyGraph::new();
        let a = EventId::new(0, 0);
        let b = EventId::new(0, 1);
        assert!(graph.add_edge(a, b));
        assert!(!graph.add_edge(b, a));
        assert!(!graph.has_cycle());
    }

    #[test]
    fn undo_to_restores_prior_closure() {
        let mut graph = DependencyGraph::new();
        let a = EventId::new(0, 0);
        let b = EventId::new(0, 1);
        let c = EventId::new(1, 0);
        let mark = graph.mark();
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        assert!(graph.depends(a, c));
        graph.undo_to(mark);
        assert!(!graph.depends(a, c));
        assert!(!graph.depends(a, b));
    }
}
