//! The binding stack: the one place variable substitution state actually
//! lives.
//!
//! `Term` itself carries no mutable field. A [`BindingStack`] is a scoped
//! map from [`VarId`] to [`Term`] with an undo log, so unification can bind
//! a variable, recurse, and have the caller cheaply roll back to any
//! earlier point — decoupling term identity from substitution state, as
//! opposed to a mutable pointer on the term leaf with manual rebind/unbind.

use std::collections::HashMap;

use scy_term::{Substitution, Term, VarId};

/// A caveat recorded when a variable with no declared sort was bound under
/// a type-checking mode that would normally require one; surfaced to the
/// caller rather than silently ignored.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UntypedBindCaveat {
    pub var: VarId,
}

struct LogEntry {
    var: VarId,
    previous: Option<Term>,
    caveat: bool,
}

/// Scoped substitution with push (`bind`) / pop (`undo_to`) discipline.
#[derive(Default)]
pub struct BindingStack {
    map: HashMap<VarId, Term>,
    log: Vec<LogEntry>,
    caveats: Vec<UntypedBindCaveat>,
}

impl BindingStack {
    pub fn new() -> Self {
        BindingStack { map: HashMap::new(), log: Vec::new(), caveats: Vec::new() }
    }

    /// A token identifying the current depth of the undo log. Pass it back
    /// to [`BindingStack::undo_to`] to roll back every binding made since.
    pub fn mark(&self) -> usize {
        self.log.len()
    }

    pub fn bind(&mut self, var: VarId, value: Term) {
        self.bind_impl(var, value, false);
    }

    pub fn bind_with_caveat(&mut self, var: VarId, value: Term) {
        self.bind_impl(var, value, true);
    }

    fn bind_impl(&mut self, var: VarId, value: Term, caveat: bool) {
        let previous = self.map.insert(var, value);
        if caveat {
            self.caveats.push(UntypedBindCaveat { var });
        }
        self.log.push(LogEntry { var, previous, caveat });
    }

    /// Restores the stack to exactly the state it had when `mark` was taken.
    pub fn undo_to(&mut self, mark: usize) {
        while self.log.len() > mark {
            let entry = self.log.pop().expect("log longer than mark");
            match entry.previous {
                Some(value) => {
                    self.map.insert(entry.var, value);
                }
                None => {
                    self.map.remove(&entry.var);
                }
            }
            if entry.caveat {
                self.caveats.pop();
            }
        }
    }

    pub fn caveats(&self) -> &[UntypedBindCaveat] {
        &self.caveats
    }

    /// The `(var, value)` pairs bound since `mark`, oldest first. Lets a
    /// caller capture a solution found inside a unifier continuation as
    /// plain data and replay it later outside that continuation's own
    /// undo scope — needed wherever the continuation cannot itself hold
    /// the wider mutable context a caller needs to recurse with.
    pub fn bindings_since(&self, mark: usize) -> Vec<(VarId, Term)> {
        self.log[mark..].iter().map(|entry| (entry.var, self.map[&entry.var].clone())).collect()
    }

    pub fn is_bound(&self, var: VarId) -> bool {
        self.map.contains_key(&var)
    }

    /// Every variable currently bound, for an attack emitter to render the
    /// concrete substitution without reaching into the undo log.
    pub fn snapshot(&self) -> Vec<(VarId, Term)> {
        self.map.iter().map(|(&var, value)| (var, value.clone())).collect()
    }
}

impl Substitution for BindingStack {
    fn get(&self, var: VarId) -> Option<&Term> {
        self.map.get(&var)
    }
}
