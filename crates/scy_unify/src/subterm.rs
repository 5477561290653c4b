//! Subterm unification modulo decryption and tupling.
//!
//! Extends [`crate::unify::unify`] with the ways the intruder can reach
//! into a composite term: splitting tuples, and unwrapping encryptions
//! (accumulating the keys that would be needed to do so in `keylist`,
//! outermost first).

use scy_term::{ScopeTable, Term};

use crate::binding::BindingStack;
use crate::mode::MatchMode;
use crate::unify::unify;

/// Tries `big` directly against `small`, then — if `adversary_tupling` is
/// set and `big` is a tuple — recurses into each component, and if `big`
/// is an encryption, recurses into its plaintext with the encryption
/// pushed onto `keylist`. `kont` is invoked once per solution with the
/// binding state and the keylist accumulated so far.
pub fn subterm_unify(
    big: &Term,
    small: &Term,
    bindings: &mut BindingStack,
    mode: MatchMode,
    scope: &ScopeTable,
    adversary_tupling: bool,
    keylist: &mut Vec<Term>,
    kont: &mut dyn FnMut(&mut BindingStack, &[Term]) -> bool,
) -> bool {
    // 1. direct unification.
    let direct_cont = unify(big, small, bindings, mode, scope, &mut |b| kont(b, keylist));
    if !direct_cont {
        return false;
    }

    let devarred = big.devar(bindings);

    // 2. tuple decomposition.
    if adversary_tupling {
        if let Some((l, r)) = devarred.tuple_parts() {
            let (l, r) = (l.clone(), r.clone());
            let cont = subterm_unify(&l, small, bindings, mode, scope, adversary_tupling, keylist, kont);
            if !cont {
                return false;
            }
            let cont = subterm_unify(&r, small, bindings, mode, scope, adversary_tupling, keylist, kont);
            if !cont {
                return false;
            }
        }
    }

    // 3. encryption/decryption: the key goes on the list outermost-first.
    if let Some((plaintext, _key)) = devarred.encryption_parts() {
        let plaintext = plaintext.clone();
        keylist.push(devarred.clone());
        let cont = subterm_unify(&plaintext, small, bindings, mode, scope, adversary_tupling, keylist, kont);
        keylist.pop();
        if !cont {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_term::Leaf;

    fn constant(interner: &mut Interner, name: &str) -> Term {
        let sym = interner.intern(name);
        Term::constant(Leaf::global(sym, vec![]))
    }

    #[test]
    fn direct_match_requires_no_decryption() {
        let mut interner = Interner::new();
        let m = constant(&mut interner, "m");
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let mut keylist = Vec::new();
        let mut hits = 0;
        subterm_unify(&m, &m, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope, true, &mut keylist, &mut |_, kl| {
            hits += 1;
            assert!(kl.is_empty());
            false
        });
        assert_eq!(hits, 1);
    }

    #[test]
    fn tuple_component_found_without_key() {
        let mut interner = Interner::new();
        let a = constant(&mut interner, "a");
        let b = constant(&mut interner, "b");
        let pair = Term::tuple(a.clone(), b);
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let mut keylist = Vec::new();
        let mut found = false;
        subterm_unify(&pair, &a, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope, true, &mut keylist, &mut |_, kl| {
            found = true;
            assert!(kl.is_empty());
            false
        });
        assert!(found);
    }

    #[test]
    fn encrypted_component_accumulates_key() {
        let mut interner = Interner::new();
        let m = constant(&mut interner, "m");
        let k = constant(&mut interner, "k");
        let ciphertext = Term::encrypt(m.clone(), k.clone());
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let mut keylist = Vec::new();
        let mut seen_keylist_len = None;
        subterm_unify(
            &ciphertext,
            &m,
            &mut bindings,
            MatchMode::ArbitraryTypeFlaw,
            &scope,
            true,
            &mut keylist,
            &mut |_, kl| {
                seen_keylist_len = Some(kl.len());
                false
            },
        );
        assert_eq!(seen_keylist_len, Some(1));
    }

    #[test]
    fn no_tupling_when_adversary_tupling_disabled() {
        let mut interner = Interner::new();
        let a = constant(&mut interner, "a");
        let b = constant(&mut interner, "b");
        let pair = Term::tuple(a.clone(), b);
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let mut keylist = Vec::new();
        let mut found = false;
        subterm_unify(&pair, &a, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope, false, &mut keylist, &mut |_, _| {
            found = true;
            false
        });
        assert!(!found);
    }
}
