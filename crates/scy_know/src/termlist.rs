//! Ordered, duplicate-permitting sequences of terms.
//!
//! Order is preserved deliberately: the heuristic's "oldest binding first"
//! tie-break and the knowledge set's saturation order both rely on
//! insertion order being observable, so this is a growable array rather
//! than a set.

use scy_term::{Substitution, Term};

/// An ordered multiset of terms, compared structurally via [`Term::term_equal`].
#[derive(Clone, Default)]
pub struct TermList {
    items: Vec<Term>,
}

impl TermList {
    pub fn new() -> Self {
        TermList { items: Vec::new() }
    }

    pub fn push(&mut self, term: Term) {
        self.items.push(term);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.items.iter()
    }

    pub fn contains<S: Substitution>(&self, term: &Term, subst: &S) -> bool {
        self.items.iter().any(|t| t.term_equal(term, subst))
    }

    /// Appends `term` if it is not already present (by `term_equal`).
    /// Returns `true` if the list changed.
    pub fn push_unique<S: Substitution>(&mut self, term: Term, subst: &S) -> bool {
        if self.contains(&term, subst) {
            false
        } else {
            self.items.push(term);
            true
        }
    }

    /// `self ∪ other`, preserving `self`'s order followed by the elements
    /// of `other` not already present.
    pub fn union<S: Substitution>(&self, other: &TermList, subst: &S) -> TermList {
        let mut result = self.clone();
        for t in other.iter() {
            result.push_unique(t.clone(), subst);
        }
        result
    }

    /// `self \ other`.
    pub fn subtract<S: Substitution>(&self, other: &TermList, subst: &S) -> TermList {
        let mut result = TermList::new();
        for t in self.iter() {
            if !other.contains(t, subst) {
                result.push(t.clone());
            }
        }
        result
    }
}
