//! A run: one instantiation of a role's event template, with its own
//! knowledge, local bindings, and position in the trace.

use std::rc::Rc;

use scy_base::Symbol;
use scy_know::{InverseKeyTable, Knowledge, TermMap};
use scy_term::Term;

/// A run's position in its role's event sequence. Step `n` means the first
/// `n` events have already occurred on this run.
pub type Step = usize;

/// One send or receive event already realized on a run, kept so agreement
/// claims and partner computation (§4.J/§4.N) can compare runs' concrete
/// histories without re-walking the role template.
#[derive(Clone, Debug)]
pub struct TraceEntry {
    pub label: Symbol,
    pub msg: Term,
    pub is_send: bool,
    pub step: Step,
}

/// One instantiated run of a role.
#[derive(Clone)]
pub struct Run {
    pub id: usize,
    pub protocol_index: usize,
    pub role_index: usize,
    pub step: Step,
    /// Knowledge learned by this run's owner as a side effect of running it;
    /// distinct from the shared intruder `Knowledge` the search tracks
    /// separately.
    pub knowledge: Knowledge,
    /// ρ/σ: role-local variable leaves rewritten to this run's scope, mapped
    /// to the concrete value chosen at instantiation or bound later by the
    /// search (agent names, the run's own fresh nonces/keys, and any other
    /// role-local variable).
    pub locals: TermMap<Term>,
    /// Whether this run is known to be performed by a compromised agent,
    /// set by the compromise model when Long-Term-Key-Reveal applies.
    pub compromised: bool,
    /// Realized send/recv events, oldest first; growing in step order.
    pub trace: Vec<TraceEntry>,
}

impl Run {
    pub fn new(id: usize, protocol_index: usize, role_index: usize, inverse_table: Rc<InverseKeyTable>) -> Self {
        Run {
            id,
            protocol_index,
            role_index,
            step: 0,
            knowledge: Knowledge::new(inverse_table),
            locals: TermMap::new(),
            compromised: false,
            trace: Vec::new(),
        }
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Appends one realized event to this run's trace. Does not itself
    /// advance `step`; callers drive stepping separately since a recv's
    /// step only truly completes once its obligation is bound.
    pub fn record(&mut self, label: Symbol, msg: Term, is_send: bool, step: Step) {
        self.trace.push(TraceEntry { label, msg, is_send, step });
    }

    /// Labels and steps this run has already realized, in order.
    pub fn trace_labels(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.trace.iter().map(|e| e.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_run_starts_at_step_zero() {
        let run = Run::new(0, 0, 0, Rc::new(InverseKeyTable::new()));
        assert_eq!(run.step, 0);
        assert!(!run.compromised);
    }

    #[test]
    fn advance_increments_step() {
        let mut run = Run::new(1, 0, 0, Rc::new(InverseKeyTable::new()));
        run.advance();
        run.advance();
        assert_eq!(run.step, 2);
    }

    #[test]
    fn record_appends_to_trace_in_order() {
        use scy_base::Interner;
        use scy_term::Leaf;

        let mut interner = Interner::new();
        let label_a = interner.intern("l1");
        let label_b = interner.intern("l2");
        let msg = Term::constant(Leaf::global(interner.intern("m"), vec![]));
        let mut run = Run::new(0, 0, 0, Rc::new(InverseKeyTable::new()));
        run.record(label_a, msg.clone(), true, 0);
        run.record(label_b, msg, false, 1);
        let labels: Vec<Symbol> = run.trace_labels().collect();
        assert_eq!(labels, vec![label_a, label_b]);
    }
}
