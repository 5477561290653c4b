//! The most-general unifier.
//!
//! `unify` is continuation-passing: rather than returning one substitution,
//! it invokes `kont` once per most-general solution, and the overall result
//! is the conjunction of those invocations. `kont` returning `false` means
//! "stop, I have what I need" and is propagated straight back up; `true`
//! means "keep exploring other solutions/alternatives".

use scy_term::{ScopeTable, Term, VarId};

use crate::binding::BindingStack;
use crate::mode::{goodsubst, MatchMode};

/// Lower rank is preferred as the *surviving* variable (the target that
/// keeps standing for the pair once unified); the other is bound to it.
/// Role-locals (ρ/σ slots) are kept as survivors since later code looks
/// them up by role-variable identity.
fn preference_rank(term: &Term) -> (u8, u32) {
    let leaf = term.leaf().expect("preference_rank called on non-leaf term");
    let role_rank = if term.is_role_variable() { 0 } else { 1 };
    (role_rank, leaf.symbol.index() as u32)
}

/// Attempts to unify `t1` and `t2`, invoking `kont` for every most-general
/// solution found. Returns the last value `kont` returned (or `true` if no
/// solution exists and no `kont` call was made).
pub fn unify(
    t1: &Term,
    t2: &Term,
    bindings: &mut BindingStack,
    mode: MatchMode,
    scope: &ScopeTable,
    kont: &mut dyn FnMut(&mut BindingStack) -> bool,
) -> bool {
    let a = t1.devar(bindings);
    let b = t2.devar(bindings);

    if a.term_equal(&b, bindings) {
        return kont(bindings);
    }

    match (a.is_variable(), b.is_variable()) {
        (true, true) => unify_var_var(&a, &b, bindings, mode, scope, kont),
        (true, false) => unify_var_term(&a, &b, bindings, mode, scope, kont),
        (false, true) => unify_var_term(&b, &a, bindings, mode, scope, kont),
        (false, false) => unify_compound(&a, &b, bindings, mode, scope, kont),
    }
}

fn unify_var_var(
    a: &Term,
    b: &Term,
    bindings: &mut BindingStack,
    mode: MatchMode,
    scope: &ScopeTable,
    kont: &mut dyn FnMut(&mut BindingStack) -> bool,
) -> bool {
    let (target, source) = if preference_rank(a) <= preference_rank(b) { (a, b) } else { (b, a) };
    let (ok, caveat) = goodsubst(target, source, mode, scope, bindings);
    if !ok {
        return true;
    }
    bind_and_continue(target.var_id().unwrap(), source.clone(), caveat, bindings, kont)
}

fn unify_var_term(
    v: &Term,
    u: &Term,
    bindings: &mut BindingStack,
    mode: MatchMode,
    scope: &ScopeTable,
    kont: &mut dyn FnMut(&mut BindingStack) -> bool,
) -> bool {
    if Term::occurs(v, u, bindings) {
        return true;
    }
    let (ok, caveat) = goodsubst(v, u, mode, scope, bindings);
    if !ok {
        return true;
    }
    bind_and_continue(v.var_id().unwrap(), u.clone(), caveat, bindings, kont)
}

fn bind_and_continue(
    var: VarId,
    value: Term,
    caveat: bool,
    bindings: &mut BindingStack,
    kont: &mut dyn FnMut(&mut BindingStack) -> bool,
) -> bool {
    let mark = bindings.mark();
    if caveat {
        bindings.bind_with_caveat(var, value);
    } else {
        bindings.bind(var, value);
    }
    let cont = kont(bindings);
    bindings.undo_to(mark);
    cont
}

fn unify_compound(
    a: &Term,
    b: &Term,
    bindings: &mut BindingStack,
    mode: MatchMode,
    scope: &ScopeTable,
    kont: &mut dyn FnMut(&mut BindingStack) -> bool,
) -> bool {
    if let (Some((a1, a2)), Some((b1, b2))) = (a.tuple_parts(), b.tuple_parts()) {
        let (a1, a2, b1, b2) = (a1.clone(), a2.clone(), b1.clone(), b2.clone());
        return unify(&a1, &b1, bindings, mode, scope, &mut |bindings| {
            unify(&a2, &b2, bindings, mode, scope, kont)
        });
    }
    if a.is_encryption() == b.is_encryption() && a.is_fcall() == b.is_fcall() {
        if let (Some((pa, ka)), Some((pb, kb))) = (a.encryption_parts(), b.encryption_parts()) {
            let (pa, ka, pb, kb) = (pa.clone(), ka.clone(), pb.clone(), kb.clone());
            return unify(&ka, &kb, bindings, mode, scope, &mut |bindings| {
                unify(&pa, &pb, bindings, mode, scope, kont)
            });
        }
    }
    true
}

/// Unifies once and runs `on_success` while the winning binding is still
/// active, returning its result. The binding is undone (as with every
/// `unify` continuation) once this call returns — callers that need the
/// binding to persist across further search steps must do that further
/// work from inside `on_success` itself, exactly as the Arachne driver's
/// recursive `iterate` does from inside a refinement's continuation.
pub fn unify_with<R>(
    t1: &Term,
    t2: &Term,
    bindings: &mut BindingStack,
    mode: MatchMode,
    scope: &ScopeTable,
    mut on_success: impl FnMut(&mut BindingStack) -> R,
) -> Option<R> {
    let mut result = None;
    unify(t1, t2, bindings, mode, scope, &mut |b| {
        result = Some(on_success(b));
        false
    });
    result
}

/// Whether `t1` and `t2` unify at all, without doing anything while bound.
pub fn unifiable(t1: &Term, t2: &Term, bindings: &mut BindingStack, mode: MatchMode, scope: &ScopeTable) -> bool {
    unify_with(t1, t2, bindings, mode, scope, |_| ()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_term::Leaf;

    fn var(interner: &mut Interner, name: &str) -> Term {
        let sym = interner.intern(name);
        Term::variable(Leaf::new(sym, 0, vec![]), false)
    }

    fn constant(interner: &mut Interner, name: &str) -> Term {
        let sym = interner.intern(name);
        Term::constant(Leaf::global(sym, vec![]))
    }

    #[test]
    fn unifies_variable_with_constant() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x");
        let alice = constant(&mut interner, "alice");
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let seen = unify_with(&x, &alice, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope, |b| {
            x.devar(b).term_equal(&alice, b)
        });
        assert_eq!(seen, Some(true));
        // the binding does not outlive the continuation
        assert!(x.devar(&bindings).term_equal(&x, &bindings));
    }

    #[test]
    fn occurs_check_blocks_self_referential_binding() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x");
        let y = var(&mut interner, "y");
        let wrapped = Term::tuple(x.clone(), y);
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let ok = unifiable(&x, &wrapped, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope);
        assert!(!ok);
    }

    #[test]
    fn unifies_tuples_componentwise() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x");
        let y = var(&mut interner, "y");
        let a = constant(&mut interner, "a");
        let b = constant(&mut interner, "b");
        let lhs = Term::tuple(x.clone(), y.clone());
        let rhs = Term::tuple(a.clone(), b.clone());
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let seen = unify_with(&lhs, &rhs, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope, |bs| {
            (x.devar(bs).term_equal(&a, bs), y.devar(bs).term_equal(&b, bs))
        });
        assert_eq!(seen, Some((true, true)));
    }

    #[test]
    fn encryption_with_different_function_flag_never_unifies() {
        let mut interner = Interner::new();
        let m = constant(&mut interner, "m");
        let k = constant(&mut interner, "k");
        let enc = Term::encrypt(m.clone(), k.clone());
        let fc = Term::fcall(m, k);
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let ok = unifiable(&enc, &fc, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope);
        assert!(!ok);
    }

    #[test]
    fn failed_unification_leaves_no_trace() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x");
        let alice = constant(&mut interner, "alice");
        let bob = constant(&mut interner, "bob");
        let mut bindings = BindingStack::new();
        let scope = ScopeTable::new();
        let mark = bindings.mark();
        unify_with(&x, &alice, &mut bindings, MatchMode::ArbitraryTypeFlaw, &scope, |b| {
            // while bound to alice, unifying x with bob must fail
            assert!(!unifiable(&x, &bob, b, MatchMode::ArbitraryTypeFlaw, &scope));
        });
        assert_eq!(bindings.mark(), mark);
    }
}
