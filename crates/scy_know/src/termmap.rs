//! A finite map keyed by term identity (after devar).
//!
//! Implemented as an association list rather than a hash map: keys compare
//! structurally via [`Term::term_equal`], which depends on the active
//! substitution, so a `HashMap`'s hash-before-eq contract does not apply.
//! The declaration-time tables this backs (inverse keys, role-local σ) are
//! small, so the linear scan is not a bottleneck.

use scy_term::{Substitution, Term};

#[derive(Clone, Default)]
pub struct TermMap<V> {
    entries: Vec<(Term, V)>,
}

impl<V> TermMap<V> {
    pub fn new() -> Self {
        TermMap { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<S: Substitution>(&self, key: &Term, subst: &S) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k.term_equal(key, subst)).map(|(_, v)| v)
    }

    /// Inserts, overwriting any existing entry whose key is `term_equal`.
    pub fn insert<S: Substitution>(&mut self, key: Term, value: V, subst: &S) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.term_equal(&key, subst)) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_term::{Leaf, NoBindings};

    fn term(interner: &mut Interner, name: &str) -> Term {
        let sym = interner.intern(name);
        Term::constant(Leaf::global(sym, vec![]))
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let mut interner = Interner::new();
        let mut map: TermMap<i32> = TermMap::new();
        let k = term(&mut interner, "kab");
        map.insert(k.clone(), 42, &NoBindings);
        assert_eq!(*map.get(&k, &NoBindings).unwrap(), 42);
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut interner = Interner::new();
        let mut map: TermMap<i32> = TermMap::new();
        let k = term(&mut interner, "kab");
        map.insert(k.clone(), 1, &NoBindings);
        map.insert(k.clone(), 2, &NoBindings);
        assert_eq!(map.len(), 1);
        assert_eq!(*map.get(&k, &NoBindings).unwrap(), 2);
    }

    #[test]
    fn get_missing_key_returns_none() {
        let mut interner = Interner::new();
        let map: TermMap<i32> = TermMap::new();
        let k = term(&mut interner, "absent");
        assert!(map.get(&k, &NoBindings).is_none());
    }
}
