//! Terms: the symbolic messages the verifier reasons about.
//!
//! A [`Term`] is an immutable, reference-counted tree. Two `Term` values
//! that are `Rc`-equal share structure; `Term::clone` is always a cheap
//! pointer bump, never a deep copy. See [`crate::substitution`] for how
//! variable bindings are threaded through without mutating a `Term`.

use std::fmt;
use std::rc::Rc;

use crate::leaf::{Leaf, VarId};
use crate::substitution::Substitution;

#[derive(Debug)]
enum TermNode {
    Constant(Leaf),
    Variable { leaf: Leaf, role_variable: bool },
    Tuple(Term, Term),
    /// `is_function` distinguishes a one-way function application
    /// (hash, keyed-hash, `fcall`) from genuine encryption; both share this
    /// node shape since they are structurally identical (plaintext, key).
    Encrypt { plaintext: Term, key: Term, is_function: bool },
}

/// A symbolic message: a constant, a variable, a tuple, or an encryption.
#[derive(Clone, Debug)]
pub struct Term(Rc<TermNode>);

impl Term {
    pub fn constant(leaf: Leaf) -> Term {
        Term(Rc::new(TermNode::Constant(leaf)))
    }

    pub fn variable(leaf: Leaf, role_variable: bool) -> Term {
        Term(Rc::new(TermNode::Variable { leaf, role_variable }))
    }

    /// Builds a tuple, normalising to right-associative form so that no
    /// nested tuple ever appears as the left operand.
    pub fn tuple(left: Term, right: Term) -> Term {
        match &*left.0 {
            TermNode::Tuple(a, b) => Term::tuple(a.clone(), Term::tuple(b.clone(), right)),
            _ => Term(Rc::new(TermNode::Tuple(left, right))),
        }
    }

    pub fn encrypt(plaintext: Term, key: Term) -> Term {
        Term(Rc::new(TermNode::Encrypt { plaintext, key, is_function: false }))
    }

    pub fn fcall(plaintext: Term, key: Term) -> Term {
        Term(Rc::new(TermNode::Encrypt { plaintext, key, is_function: true }))
    }

    pub fn is_variable(&self) -> bool {
        matches!(&*self.0, TermNode::Variable { .. })
    }

    pub fn is_tuple(&self) -> bool {
        matches!(&*self.0, TermNode::Tuple(..))
    }

    pub fn is_encryption(&self) -> bool {
        matches!(&*self.0, TermNode::Encrypt { is_function: false, .. })
    }

    pub fn is_fcall(&self) -> bool {
        matches!(&*self.0, TermNode::Encrypt { is_function: true, .. })
    }

    pub fn leaf(&self) -> Option<&Leaf> {
        match &*self.0 {
            TermNode::Constant(l) => Some(l),
            TermNode::Variable { leaf, .. } => Some(leaf),
            _ => None,
        }
    }

    pub fn is_role_variable(&self) -> bool {
        matches!(&*self.0, TermNode::Variable { role_variable: true, .. })
    }

    pub fn tuple_parts(&self) -> Option<(&Term, &Term)> {
        match &*self.0 {
            TermNode::Tuple(a, b) => Some((a, b)),
            _ => None,
        }
    }

    pub fn encryption_parts(&self) -> Option<(&Term, &Term)> {
        match &*self.0 {
            TermNode::Encrypt { plaintext, key, .. } => Some((plaintext, key)),
            _ => None,
        }
    }

    /// Follows the substitution chain until reaching a non-variable or an
    /// unbound variable. Idempotent: `devar(devar(t, s), s) == devar(t, s)`.
    pub fn devar<S: Substitution>(&self, subst: &S) -> Term {
        let mut current = self.clone();
        loop {
            let var_id = match &*current.0 {
                TermNode::Variable { leaf, .. } => leaf.var_id(),
                _ => return current,
            };
            match subst.get(var_id) {
                Some(bound) => current = bound.clone(),
                None => return current,
            }
        }
    }

    /// Structural equality after devar-ing both sides everywhere.
    pub fn term_equal<S: Substitution>(&self, other: &Term, subst: &S) -> bool {
        let a = self.devar(subst);
        let b = other.devar(subst);
        match (&*a.0, &*b.0) {
            (TermNode::Constant(l1), TermNode::Constant(l2)) => l1.identity_eq(l2),
            (TermNode::Variable { leaf: l1, .. }, TermNode::Variable { leaf: l2, .. }) => {
                l1.identity_eq(l2)
            }
            (TermNode::Tuple(a1, a2), TermNode::Tuple(b1, b2)) => {
                a1.term_equal(b1, subst) && a2.term_equal(b2, subst)
            }
            (
                TermNode::Encrypt { plaintext: p1, key: k1, is_function: f1 },
                TermNode::Encrypt { plaintext: p2, key: k2, is_function: f2 },
            ) => f1 == f2 && p1.term_equal(p2, subst) && k1.term_equal(k2, subst),
            _ => false,
        }
    }

    /// Whether `needle` appears anywhere inside `haystack`, after devar-ing
    /// at every step. Used by the unifier's occurs-check.
    pub fn occurs<S: Substitution>(needle: &Term, haystack: &Term, subst: &S) -> bool {
        let h = haystack.devar(subst);
        if needle.term_equal(&h, subst) {
            return true;
        }
        match &*h.0 {
            TermNode::Tuple(a, b) => {
                Term::occurs(needle, a, subst) || Term::occurs(needle, b, subst)
            }
            TermNode::Encrypt { plaintext, key, .. } => {
                Term::occurs(needle, plaintext, subst) || Term::occurs(needle, key, subst)
            }
            _ => false,
        }
    }

    /// Maximum nesting depth of encryptions (function applications count,
    /// since they share the encryption node shape).
    pub fn encryption_level(&self) -> usize {
        match &*self.0 {
            TermNode::Encrypt { plaintext, key, .. } => {
                1 + plaintext.encryption_level().max(key.encryption_level())
            }
            TermNode::Tuple(a, b) => a.encryption_level().max(b.encryption_level()),
            _ => 0,
        }
    }

    /// Deep copy rewriting every leaf for which `map` returns a replacement;
    /// leaves for which it returns `None` are kept as-is. Used to instantiate
    /// a role's event templates into a fresh run: the map sends each
    /// role-scope leaf to its run-local counterpart.
    pub fn rewrite_leaves(&self, map: &mut dyn FnMut(&Leaf, LeafKind) -> Option<Term>) -> Term {
        match &*self.0 {
            TermNode::Constant(l) => map(l, LeafKind::Constant).unwrap_or_else(|| self.clone()),
            TermNode::Variable { leaf, role_variable } => {
                let kind = LeafKind::Variable { role_variable: *role_variable };
                map(leaf, kind).unwrap_or_else(|| self.clone())
            }
            TermNode::Tuple(a, b) => {
                Term::tuple(a.rewrite_leaves(map), b.rewrite_leaves(map))
            }
            TermNode::Encrypt { plaintext, key, is_function } => {
                let p = plaintext.rewrite_leaves(map);
                let k = key.rewrite_leaves(map);
                if *is_function {
                    Term::fcall(p, k)
                } else {
                    Term::encrypt(p, k)
                }
            }
        }
    }

    /// Convenience wrapper over [`Term::rewrite_leaves`] for the common case
    /// of moving every leaf from one run scope to another.
    pub fn term_local(&self, from_run: i64, to_run: i64) -> Term {
        self.rewrite_leaves(&mut |leaf, kind| {
            if leaf.run_id != from_run {
                return None;
            }
            let mut rewritten = leaf.clone();
            rewritten.run_id = to_run;
            Some(match kind {
                LeafKind::Constant => Term::constant(rewritten),
                LeafKind::Variable { role_variable } => Term::variable(rewritten, role_variable),
            })
        })
    }

    pub fn var_id(&self) -> Option<VarId> {
        self.leaf().map(|l| l.var_id())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            TermNode::Constant(l) => write!(f, "#{}@{}", l.symbol.index(), l.run_id),
            TermNode::Variable { leaf, .. } => write!(f, "?{}@{}", leaf.symbol.index(), leaf.run_id),
            TermNode::Tuple(a, b) => write!(f, "({}, {})", a, b),
            TermNode::Encrypt { plaintext, key, is_function: false } => {
                write!(f, "{{{}}}{}", plaintext, key)
            }
            TermNode::Encrypt { plaintext, key, is_function: true } => {
                write!(f, "{}({})", key, plaintext)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitution::NoBindings;
    use scy_base::Interner;

    fn leaf(interner: &mut Interner, name: &str, run: i64) -> Leaf {
        let sym = interner.intern(name);
        Leaf::new(sym, run, vec![])
    }

    #[test]
    fn devar_is_idempotent_on_ground_terms() {
        let mut interner = Interner::new();
        let t = Term::constant(leaf(&mut interner, "alice", -1));
        let once = t.devar(&NoBindings);
        let twice = once.devar(&NoBindings);
        assert!(once.term_equal(&twice, &NoBindings));
    }

    #[test]
    fn tuple_normalises_right_associative() {
        let mut interner = Interner::new();
        let a = Term::constant(leaf(&mut interner, "a", -1));
        let b = Term::constant(leaf(&mut interner, "b", -1));
        let c = Term::constant(leaf(&mut interner, "c", -1));
        let left_nested = Term::tuple(Term::tuple(a.clone(), b.clone()), c.clone());
        let (first, rest) = left_nested.tuple_parts().unwrap();
        assert!(first.term_equal(&a, &NoBindings));
        let (second, third) = rest.tuple_parts().unwrap();
        assert!(second.term_equal(&b, &NoBindings));
        assert!(third.term_equal(&c, &NoBindings));
    }

    #[test]
    fn occurs_detects_self_reference_inside_tuple() {
        let mut interner = Interner::new();
        let v = Term::variable(leaf(&mut interner, "x", 0), false);
        let other = Term::constant(leaf(&mut interner, "y", 0));
        let wrapped = Term::tuple(other, v.clone());
        assert!(Term::occurs(&v, &wrapped, &NoBindings));
    }

    #[test]
    fn occurs_false_when_absent() {
        let mut interner = Interner::new();
        let v = Term::variable(leaf(&mut interner, "x", 0), false);
        let other = Term::constant(leaf(&mut interner, "y", 0));
        assert!(!Term::occurs(&v, &other, &NoBindings));
    }

    #[test]
    fn encryption_level_counts_nesting() {
        let mut interner = Interner::new();
        let m = Term::constant(leaf(&mut interner, "m", -1));
        let k1 = Term::constant(leaf(&mut interner, "k1", -1));
        let k2 = Term::constant(leaf(&mut interner, "k2", -1));
        let once = Term::encrypt(m, k1);
        let twice = Term::encrypt(once, k2);
        assert_eq!(twice.encryption_level(), 2);
    }

    #[test]
    fn term_local_rewrites_run_scope() {
        let mut interner = Interner::new();
        let na = leaf(&mut interner, "na", -1);
        let template = Term::variable(na, true);
        let instantiated = template.term_local(-1, 3);
        assert_eq!(instantiated.leaf().unwrap().run_id, 3);
    }

    #[test]
    fn term_equal_ignores_sorts() {
        let mut interner = Interner::new();
        let agent = interner.intern("Agent");
        let sym = interner.intern("alice");
        let with_sort = Term::constant(Leaf::new(sym, -1, vec![agent]));
        let without_sort = Term::constant(Leaf::new(sym, -1, vec![]));
        assert!(with_sort.term_equal(&without_sort, &NoBindings));
    }
}
