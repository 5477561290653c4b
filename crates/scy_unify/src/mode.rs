//! Type discipline consulted by the unifier when binding a variable.

use scy_term::{ScopeTable, Substitution, Term};

/// How strictly sorts are checked when binding a variable to a term.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MatchMode {
    /// Mode 0: sorts must be compatible on every bind.
    Strict,
    /// Mode 1: sort checks are skipped when the candidate is a compound
    /// term (tuple or encryption), since compound terms carry no sort of
    /// their own to conflict with.
    BasicTypeFlaw,
    /// Mode 2: no sort check at all, except a guard against binding an
    /// agent-typed (role) variable to a constant that is itself used
    /// elsewhere in key position — arbitrary type flaws should not erase
    /// the run/global distinction on ρ slots.
    ArbitraryTypeFlaw,
}

fn sorts_compatible(a: &[scy_base::Symbol], b: &[scy_base::Symbol]) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }
    a.iter().any(|s| b.contains(s))
}

/// Whether binding `var` to `candidate` is allowed under `mode`.
///
/// Returns `(allowed, untyped_caveat)`: `untyped_caveat` is set when `var`
/// has no declared sort and the binding proceeded only because of that,
/// so the caller can surface an incomplete-type-inference note.
pub fn goodsubst<S: Substitution>(
    var: &Term,
    candidate: &Term,
    mode: MatchMode,
    scope: &ScopeTable,
    subst: &S,
) -> (bool, bool) {
    let var_leaf = match var.leaf() {
        Some(l) => l,
        None => return (false, false),
    };

    match mode {
        MatchMode::ArbitraryTypeFlaw => {
            if var.is_role_variable() {
                if let Some(cand_leaf) = candidate.devar(subst).leaf() {
                    let cand_is_key = scope.key_level_of(cand_leaf.symbol)
                        == scy_term::KeyLevel::UsedAsKey;
                    let sort_mismatch = !sorts_compatible(&var_leaf.sorts, &cand_leaf.sorts);
                    if cand_is_key && sort_mismatch {
                        return (false, false);
                    }
                }
            }
            (true, false)
        }
        MatchMode::BasicTypeFlaw => {
            let candidate = candidate.devar(subst);
            if candidate.is_tuple() || candidate.is_encryption() || candidate.is_fcall() {
                return (true, false);
            }
            match candidate.leaf() {
                Some(cand_leaf) => {
                    let untyped = var_leaf.sorts.is_empty();
                    (sorts_compatible(&var_leaf.sorts, &cand_leaf.sorts), untyped)
                }
                None => (true, false),
            }
        }
        MatchMode::Strict => {
            let candidate = candidate.devar(subst);
            match candidate.leaf() {
                Some(cand_leaf) => {
                    let untyped = var_leaf.sorts.is_empty();
                    (sorts_compatible(&var_leaf.sorts, &cand_leaf.sorts), untyped)
                }
                None => {
                    // Compound candidate: only an untyped variable can accept it.
                    (var_leaf.sorts.is_empty(), var_leaf.sorts.is_empty())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_term::{Leaf, NoBindings};

    fn var(interner: &mut Interner, name: &str, sorts: Vec<scy_base::Symbol>) -> Term {
        let sym = interner.intern(name);
        Term::variable(Leaf::new(sym, 0, sorts), false)
    }

    fn constant(interner: &mut Interner, name: &str, sorts: Vec<scy_base::Symbol>) -> Term {
        let sym = interner.intern(name);
        Term::constant(Leaf::new(sym, -1, sorts))
    }

    #[test]
    fn strict_mode_requires_shared_sort() {
        let mut interner = Interner::new();
        let agent = interner.intern("Agent");
        let nonce = interner.intern("Nonce");
        let v = var(&mut interner, "x", vec![agent]);
        let c = constant(&mut interner, "na", vec![nonce]);
        let scope = ScopeTable::new();
        let (ok, _) = goodsubst(&v, &c, MatchMode::Strict, &scope, &NoBindings);
        assert!(!ok);
    }

    #[test]
    fn strict_mode_untyped_variable_flags_caveat() {
        let mut interner = Interner::new();
        let nonce = interner.intern("Nonce");
        let v = var(&mut interner, "x", vec![]);
        let c = constant(&mut interner, "na", vec![nonce]);
        let scope = ScopeTable::new();
        let (ok, caveat) = goodsubst(&v, &c, MatchMode::Strict, &scope, &NoBindings);
        assert!(ok);
        assert!(caveat);
    }

    #[test]
    fn basic_type_flaw_allows_compound_candidate() {
        let mut interner = Interner::new();
        let agent = interner.intern("Agent");
        let v = var(&mut interner, "x", vec![agent]);
        let m = constant(&mut interner, "m", vec![]);
        let k = constant(&mut interner, "k", vec![]);
        let compound = Term::encrypt(m, k);
        let scope = ScopeTable::new();
        let (ok, _) = goodsubst(&v, &compound, MatchMode::BasicTypeFlaw, &scope, &NoBindings);
        assert!(ok);
    }

    #[test]
    fn arbitrary_type_flaw_blocks_key_sort_clash_on_role_variable() {
        let mut interner = Interner::new();
        let agent = interner.intern("Agent");
        let sym = interner.intern("x");
        let role_var = Term::variable(Leaf::new(sym, 0, vec![agent]), true);
        let key_sym = interner.intern("kab");
        let nonce = interner.intern("Nonce");
        let key_const = Term::constant(Leaf::new(key_sym, -1, vec![nonce]));
        let mut scope = ScopeTable::new();
        scope.mark_key_use(key_sym);
        let (ok, _) =
            goodsubst(&role_var, &key_const, MatchMode::ArbitraryTypeFlaw, &scope, &NoBindings);
        assert!(!ok);
    }

    #[test]
    fn arbitrary_type_flaw_allows_mismatched_non_role_variable() {
        let mut interner = Interner::new();
        let v = var(&mut interner, "x", vec![]);
        let nonce = interner.intern("Nonce");
        let c = constant(&mut interner, "na", vec![nonce]);
        let scope = ScopeTable::new();
        let (ok, _) = goodsubst(&v, &c, MatchMode::ArbitraryTypeFlaw, &scope, &NoBindings);
        assert!(ok);
    }
}
