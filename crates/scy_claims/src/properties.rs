//! Agreement and liveness rule evaluation (component N), applied to one
//! fully realized semi-trace (a state [`scy_search::driver::iterate`] has
//! already found to have no selectable goal left).
//!
//! Secret/SKR get their rule here too, but it is the inverse of every other
//! kind's: `checker.rs` installs the claim's parameter as a goal obligation
//! before searching, so reaching a realizable pattern at all means that
//! goal resolved — the intruder derived the secret. `claim_holds` returns
//! `false` for Secret/SKR unconditionally; every other kind instead
//! inspects the finished state, where `false` is itself the attack.

use scy_model::{ClaimKind, EventId, Verifier};
use scy_term::Substitution;

use scy_search::compromise::is_partner;
use scy_model::PartnerDef;

/// Whether `claim_kind`'s property holds for `claim_run` in the current
/// state. `Secret`/`Skr` always fail here — reaching a realizable pattern
/// with their goal obligation installed is itself the leak (§4.N: "failure
/// to realize = success of the claim", read the other way round). Kinds
/// with no independent pass/fail property once reached (`Reachable`,
/// `Running`, `Sid`, `NotEqual`, `Empty`) always hold — their own semantics
/// are either "reaching this state is the witness" or bookkeeping with no
/// claim-checker rule of its own.
pub fn claim_holds(verifier: &Verifier, claim_kind: ClaimKind, claim_run: usize, partner_def: PartnerDef) -> bool {
    match claim_kind {
        ClaimKind::Secret | ClaimKind::Skr => false,
        ClaimKind::NiAgree => ni_agree_holds(verifier, claim_run, partner_def),
        ClaimKind::NiSynch => {
            ni_agree_holds(verifier, claim_run, partner_def) && ni_synch_order_holds(verifier, claim_run, partner_def)
        }
        ClaimKind::WeakAgree => weak_agree_holds(verifier, claim_run),
        ClaimKind::Alive => alive_holds(verifier, claim_run),
        ClaimKind::Commit => commit_running_holds(verifier, claim_run, partner_def),
        ClaimKind::Reachable | ClaimKind::Running | ClaimKind::Sid | ClaimKind::NotEqual | ClaimKind::Empty => true,
    }
}

fn partner_candidates(verifier: &Verifier, claim_run: usize, partner_def: PartnerDef) -> Vec<usize> {
    verifier
        .runs
        .iter()
        .map(|r| r.id)
        .filter(|&id| id != claim_run && is_partner(verifier, claim_run, id, partner_def))
        .collect()
}

/// §4.N NI-Agree: some partner run exists under the configured partner
/// definition. Under `NoPartnering` no agreement is demanded at all, so the
/// claim trivially holds.
fn ni_agree_holds(verifier: &Verifier, claim_run: usize, partner_def: PartnerDef) -> bool {
    if partner_def == PartnerDef::NoPartnering {
        return true;
    }
    !partner_candidates(verifier, claim_run, partner_def).is_empty()
}

/// §4.N NI-Synch: NI-Agree's partner, plus every complementary send/recv
/// pair on the two runs respects the dependency graph's precedence order.
fn ni_synch_order_holds(verifier: &Verifier, claim_run: usize, partner_def: PartnerDef) -> bool {
    partner_candidates(verifier, claim_run, partner_def).iter().any(|&partner| {
        let a = &verifier.runs[claim_run];
        let b = &verifier.runs[partner];
        a.trace.len() == b.trace.len()
            && a.trace.iter().zip(b.trace.iter()).all(|(ea, eb)| {
                if ea.is_send == eb.is_send {
                    return true;
                }
                let (send, recv) = if ea.is_send {
                    (EventId::new(claim_run, ea.step), EventId::new(partner, eb.step))
                } else {
                    (EventId::new(partner, eb.step), EventId::new(claim_run, ea.step))
                };
                verifier.graph.depends(send, recv)
            })
    })
}

/// §4.N Weak-Agree: some run of the same protocol shares `claim_run`'s set
/// of bound role-local agents (the `SameParameters` partner rule already
/// expresses exactly this comparison).
fn weak_agree_holds(verifier: &Verifier, claim_run: usize) -> bool {
    verifier.runs.iter().any(|r| r.id != claim_run && is_partner(verifier, claim_run, r.id, PartnerDef::SameParameters))
}

/// §4.N Alive: every agent named in `claim_run`'s ρ also appears in some
/// other run's ρ — vacuously true for a run with no role-local agents.
fn alive_holds(verifier: &Verifier, claim_run: usize) -> bool {
    let claim = &verifier.runs[claim_run];
    claim.locals.iter().all(|(_, value)| {
        let value = value.devar(&verifier.bindings);
        verifier.runs.iter().any(|r| {
            r.id != claim_run
                && r.locals.iter().any(|(_, other)| other.devar(&verifier.bindings).term_equal(&value, &verifier.bindings))
        })
    })
}

/// §4.N Commit(a,b,d)⇒Running(b,a,d), approximated as: some partner run
/// exists whose exchanged messages match `claim_run`'s (the same evidence a
/// genuine preceding Running claim would leave). The driver here only ever
/// advances a freshly spawned partner run by the one send needed to supply
/// a goal, so it never walks a partner all the way to its own `Running`
/// claim event; `MatchingHistory`-style matching is the closest available
/// substitute rather than a literal graph-witnessed claim lookup.
fn commit_running_holds(verifier: &Verifier, claim_run: usize, partner_def: PartnerDef) -> bool {
    !partner_candidates(verifier, claim_run, partner_def).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_model::{Bounds, CompromiseConfig};
    use scy_term::{Leaf, Term};

    fn constant(interner: &mut Interner, name: &str) -> Term {
        Term::constant(Leaf::global(interner.intern(name), vec![]))
    }

    #[test]
    fn ni_agree_fails_with_no_partner() {
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let claim_run = verifier.spawn_run(0, 0).unwrap();
        assert!(!ni_agree_holds(&verifier, claim_run, PartnerDef::MatchingHistory));
    }

    #[test]
    fn ni_agree_holds_with_matching_partner() {
        let mut interner = Interner::new();
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let claim_run = verifier.spawn_run(0, 0).unwrap();
        let partner = verifier.spawn_run(0, 1).unwrap();
        let msg = constant(&mut interner, "na");
        let label = interner.intern("l1");
        verifier.runs[claim_run].record(label, msg.clone(), true, 0);
        verifier.runs[partner].record(label, msg, false, 0);
        assert!(ni_agree_holds(&verifier, claim_run, PartnerDef::MatchingHistory));
    }

    #[test]
    fn alive_holds_vacuously_with_no_locals() {
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let claim_run = verifier.spawn_run(0, 0).unwrap();
        assert!(alive_holds(&verifier, claim_run));
    }

    #[test]
    fn alive_fails_when_no_other_run_shares_an_agent() {
        let mut interner = Interner::new();
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let claim_run = verifier.spawn_run(0, 0).unwrap();
        let alice = constant(&mut interner, "alice");
        verifier.runs[claim_run].locals.insert(alice.clone(), alice, &verifier.bindings);
        assert!(!alive_holds(&verifier, claim_run));
    }

    #[test]
    fn claim_holds_default_true_for_kinds_without_a_rule() {
        let verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        assert!(claim_holds(&verifier, ClaimKind::Reachable, 0, PartnerDef::Strict));
    }

    #[test]
    fn secret_and_skr_never_hold_once_realizable() {
        let verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        assert!(!claim_holds(&verifier, ClaimKind::Secret, 0, PartnerDef::Strict));
        assert!(!claim_holds(&verifier, ClaimKind::Skr, 0, PartnerDef::Strict));
    }
}
