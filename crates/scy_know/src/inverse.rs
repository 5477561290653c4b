//! The global inverse-key relation compiled from `inversekeys` and
//! `inversekeyfunctions` declarations.

use scy_term::{Substitution, Term};

/// Maps each key (or keyed-hash function) to its declared counterpart.
///
/// Populated once at compile time from the protocol's global declarations
/// and shared (read-only) by every run's [`crate::Knowledge`].
#[derive(Clone, Default)]
pub struct InverseKeyTable {
    pairs: Vec<(Term, Term)>,
}

impl InverseKeyTable {
    pub fn new() -> Self {
        InverseKeyTable { pairs: Vec::new() }
    }

    /// Registers `a` and `b` as each other's inverse. Passing the same term
    /// twice (`register(k, k.clone())`) declares a symmetric key.
    pub fn register(&mut self, a: Term, b: Term) {
        self.pairs.push((a, b));
    }

    /// The counterpart of `k`, or `None` if no inverse is derivable (a
    /// "hidden" key in the source terminology).
    pub fn inverse<S: Substitution>(&self, k: &Term, subst: &S) -> Option<Term> {
        for (a, b) in &self.pairs {
            if a.term_equal(k, subst) {
                return Some(b.clone());
            }
            if b.term_equal(k, subst) {
                return Some(a.clone());
            }
        }
        None
    }
}
