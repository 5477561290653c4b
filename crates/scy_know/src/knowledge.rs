//! The intruder knowledge set: everything the adversary can currently
//! construct, kept saturated under tupling and decryption.

use std::rc::Rc;

use scy_term::{Substitution, Term};

use crate::inverse::InverseKeyTable;
use crate::termlist::TermList;

/// Basic (leaf) and composite (tuple/encryption) terms the intruder knows,
/// plus a shared handle to the declared inverse-key relation.
#[derive(Clone)]
pub struct Knowledge {
    basic: TermList,
    composite: TermList,
    inverse_table: Rc<InverseKeyTable>,
}

impl Knowledge {
    pub fn new(inverse_table: Rc<InverseKeyTable>) -> Self {
        Knowledge { basic: TermList::new(), composite: TermList::new(), inverse_table }
    }

    pub fn basic(&self) -> &TermList {
        &self.basic
    }

    pub fn composite(&self) -> &TermList {
        &self.composite
    }

    /// Inserts a term and re-saturates. Tuples and decryptable encryptions
    /// are split into their components as part of saturation, so callers
    /// may insert composite terms directly rather than pre-flattening them.
    pub fn insert<S: Substitution>(&mut self, term: &Term, subst: &S) {
        self.insert_one_changed(term, subst);
        self.saturate(subst);
    }

    /// Membership under closure: a term is known if it is already a basic
    /// or composite entry (saturation keeps these sets closed, so this is
    /// not itself recursive).
    pub fn in_knowledge<S: Substitution>(&self, term: &Term, subst: &S) -> bool {
        let devarred = term.devar(subst);
        self.basic.contains(&devarred, subst) || self.composite.contains(&devarred, subst)
    }

    /// The declared counterpart of `key`, or `None` if hidden.
    pub fn inverse<S: Substitution>(&self, key: &Term, subst: &S) -> Option<Term> {
        self.inverse_table.inverse(key, subst)
    }

    /// Fixpoint saturation: split every known tuple into its components,
    /// and decrypt every known encryption whose inverse key is also known,
    /// until no new basic term is produced.
    pub fn saturate<S: Substitution>(&mut self, subst: &S) {
        loop {
            let mut changed = false;
            let snapshot: Vec<Term> = self.composite.iter().cloned().collect();
            for c in &snapshot {
                if let Some((a, b)) = c.tuple_parts() {
                    if self.insert_one_changed(a, subst) {
                        changed = true;
                    }
                    if self.insert_one_changed(b, subst) {
                        changed = true;
                    }
                } else if let Some((plaintext, key)) = c.encryption_parts() {
                    if let Some(inv) = self.inverse(key, subst) {
                        if self.in_knowledge(&inv, subst) && self.insert_one_changed(plaintext, subst) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn insert_one_changed<S: Substitution>(&mut self, term: &Term, subst: &S) -> bool {
        let devarred = term.devar(subst);
        if devarred.is_tuple() || devarred.is_encryption() || devarred.is_fcall() {
            self.composite.push_unique(devarred, subst)
        } else {
            self.basic.push_unique(devarred, subst)
        }
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
    fn tuple_saturates_into_components() {
        let mut interner = Interner::new();
        let a = term(&mut interner, "a");
        let b = term(&mut interner, "b");
        let pair = Term::tuple(a.clone(), b.clone());
        let mut know = Knowledge::new(Rc::new(InverseKeyTable::new()));
        know.insert(&pair, &NoBindings);
        assert!(know.in_knowledge(&a, &NoBindings));
        assert!(know.in_knowledge(&b, &NoBindings));
    }

    #[test]
    fn encryption_decrypts_once_inverse_known() {
        let mut interner = Interner::new();
        let m = term(&mut interner, "m");
        let pk = term(&mut interner, "pk");
        let sk = term(&mut interner, "sk");
        let mut table = InverseKeyTable::new();
        table.register(pk.clone(), sk.clone());
        let mut know = Knowledge::new(Rc::new(table));
        let ciphertext = Term::encrypt(m.clone(), pk);
        know.insert(&ciphertext, &NoBindings);
        assert!(!know.in_knowledge(&m, &NoBindings), "must not decrypt without the inverse key");
        know.insert(&sk, &NoBindings);
        assert!(know.in_knowledge(&m, &NoBindings));
    }

    #[test]
    fn encryption_stays_opaque_without_inverse() {
        let mut interner = Interner::new();
        let m = term(&mut interner, "secret");
        let k = term(&mut interner, "k");
        let mut know = Knowledge::new(Rc::new(InverseKeyTable::new()));
        let ciphertext = Term::encrypt(m.clone(), k);
        know.insert(&ciphertext, &NoBindings);
        assert!(!know.in_knowledge(&m, &NoBindings));
    }
}
