//! Claim records and the label occurrence table (component I).

use scy_base::Symbol;

use crate::protocol::ClaimKind;

/// One claim event, addressed by the run it will be checked against once
/// instantiated, plus the set of labels it precedes (for agreement claims,
/// which compare against partner runs up to a shared label).
#[derive(Clone, Debug)]
pub struct Claim {
    pub protocol_index: usize,
    pub role_index: usize,
    pub step: usize,
    pub kind: ClaimKind,
    /// Labels of preceding send/recv events on the same role, in order;
    /// agreement claims compare these against a candidate partner run.
    pub precedence_labels: Vec<Symbol>,
}

/// Maps a label to every `(role_index, step)` occurrence across a
/// protocol's roles, built once at compile time and consulted by
/// partnering logic to find candidate matching events.
#[derive(Clone, Default)]
pub struct LabelTable {
    entries: Vec<(Symbol, Vec<(usize, usize)>)>,
}

impl LabelTable {
    pub fn new() -> Self {
        LabelTable { entries: Vec::new() }
    }

    pub fn record(&mut self, label: Symbol, role_index: usize, step: usize) {
        if let Some(slot) = self.entries.iter_mut().find(|(l, _)| *l == label) {
            slot.1.push((role_index, step));
        } else {
            self.entries.push((label, vec![(role_index, step)]));
        }
    }

    pub fn occurrences(&self, label: Symbol) -> &[(usize, usize)] {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, occs)| occs.as_slice())
            .unwrap_or(&[])
    }

    /// Labels used by more than one role/step pair share an underlying send
    /// or receive; a genuine duplicate *declaration* (the same label
    /// re-declared for an unrelated event) is instead caught at compile time
    /// by suffixing and flagged as a `Diagnostic`.
    pub fn is_shared(&self, label: Symbol) -> bool {
        self.occurrences(label).len() > 1
    }
}
