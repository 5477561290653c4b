//! The outstanding-receive obligation list (component H): every receive
//! event whose sender has not yet been bound to a concrete send, tracked so
//! the driver's `select_goal` has something to choose from.

use scy_term::Term;

use crate::graph::EventId;

/// One unresolved obligation: a receive event on `to` at `ev_to` needing a
/// send for `term`, optionally already fixed to a particular sender.
#[derive(Clone, Debug)]
pub struct Obligation {
    pub term: Term,
    pub run_to: usize,
    pub ev_to: EventId,
    /// The event supplying `term`, once bound. `None` while open; per the
    /// data model a `Binding`'s from-fields are only meaningful once `done`.
    pub from: Option<EventId>,
    /// Set once this obligation has been bound to a send; kept instead of
    /// removed so the graph edge it induced can be undone by truncation.
    pub done: bool,
    /// Search depth at which this obligation was created, for the
    /// heuristic's oldest-first tie-break.
    pub level: usize,
}

impl Obligation {
    /// Constructs a fresh, unbound obligation at the given search depth.
    pub fn open(term: Term, run_to: usize, ev_to: EventId, level: usize) -> Self {
        Obligation { term, run_to, ev_to, from: None, done: false, level }
    }
}

/// Append-only along a branch; backtracking truncates to a saved length
/// rather than snapshotting the whole list.
#[derive(Clone, Default)]
pub struct ObligationList {
    items: Vec<Obligation>,
}

impl ObligationList {
    pub fn new() -> Self {
        ObligationList { items: Vec::new() }
    }

    pub fn mark(&self) -> usize {
        self.items.len()
    }

    pub fn undo_to(&mut self, mark: usize) {
        self.items.truncate(mark);
    }

    pub fn push(&mut self, obligation: Obligation) {
        self.items.push(obligation);
    }

    pub fn pending(&self) -> impl Iterator<Item = &Obligation> {
        self.items.iter().filter(|o| !o.done)
    }

    /// Marks obligation `index` as satisfied by the event at `from`.
    pub fn mark_done(&mut self, index: usize, from: EventId) {
        self.items[index].done = true;
        self.items[index].from = Some(from);
    }

    /// Reverses `mark_done` on an obligation that was never appended after
    /// (i.e. an existing index, not a truncation candidate) — backtracking
    /// out of a refinement that bound an already-present obligation.
    pub fn unmark(&mut self, index: usize) {
        self.items[index].done = false;
        self.items[index].from = None;
    }

    pub fn get(&self, index: usize) -> &Obligation {
        &self.items[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obligation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
