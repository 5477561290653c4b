//! The compromise model (component J): long-term-key-reveal enablement,
//! session-key/session-state reveal candidacy, and partner-run computation
//! for agreement claims.

use scy_base::Symbol;
use scy_know::TermList;
use scy_model::{CompromiseConfig, EventId, LongTermKeyReveal, PartnerDef, Run, Verifier};
use scy_term::Term;
use scy_unify::BindingStack;

/// Whether the intruder may reveal an agent's long-term key, given whether
/// that agent is the claim run's actor and whether the actor's role name
/// recurs elsewhere in the claim's ρ (multiplicity > 1 fails the *actor*
/// rule, per §4.J).
pub fn lkr_enabled(config: &CompromiseConfig, agent_is_claim_actor: bool, agent_appears_elsewhere_in_rho: bool) -> bool {
    match config.lkr {
        LongTermKeyReveal::None => false,
        LongTermKeyReveal::Others => !agent_is_claim_actor,
        LongTermKeyReveal::Actor => agent_is_claim_actor && !agent_appears_elsewhere_in_rho,
        LongTermKeyReveal::After => true,
    }
}

/// For `after`/`after-ours`/`after-correct` LKR: the reveal event may only
/// be placed once a precedence edge from the claim run's last event to it
/// is actually addable, i.e. it would not close a cycle.
pub fn lkr_after_is_placeable(verifier: &Verifier, claim_run: usize, reveal_event: EventId) -> bool {
    let run = &verifier.runs[claim_run];
    if run.step == 0 {
        return true;
    }
    let last = EventId::new(claim_run, run.step - 1);
    !verifier.graph.depends(reveal_event, last)
}

/// Whether `term` carries the session-key sort or mentions a role-local
/// variable, making it a candidate for a spliced session-key/session-state
/// reveal event (§4.J).
pub fn is_session_reveal_candidate(term: &Term, session_key_sort: Symbol) -> bool {
    if let Some(leaf) = term.leaf() {
        return leaf.has_sort(session_key_sort);
    }
    if let Some((a, b)) = term.tuple_parts() {
        return is_session_reveal_candidate(a, session_key_sort) || is_session_reveal_candidate(b, session_key_sort);
    }
    if let Some((p, k)) = term.encryption_parts() {
        return is_session_reveal_candidate(p, session_key_sort) || is_session_reveal_candidate(k, session_key_sort);
    }
    false
}

/// Whether `candidate_run` may be targeted by a session-key/session-state
/// reveal in service of a claim on `claim_run`: partner runs are never
/// reveal-eligible.
pub fn reveal_allowed(verifier: &Verifier, claim_run: usize, candidate_run: usize, partner_def: PartnerDef) -> bool {
    claim_run == candidate_run || !is_partner(verifier, claim_run, candidate_run, partner_def)
}

/// Whether `candidate_run` partners `claim_run` under `partner_def`, from
/// loosest (`NoPartnering`, never) to strictest (`Strict`, same protocol,
/// same label trace and same concrete message trace).
pub fn is_partner(verifier: &Verifier, claim_run: usize, candidate_run: usize, partner_def: PartnerDef) -> bool {
    if claim_run == candidate_run {
        return true;
    }
    let a = &verifier.runs[claim_run];
    let b = &verifier.runs[candidate_run];
    match partner_def {
        PartnerDef::NoPartnering => false,
        PartnerDef::MatchingHistory | PartnerDef::MatchingCommunication => {
            matching_message_lists(a, b, &verifier.bindings)
        }
        PartnerDef::SameLabel => a.trace_labels().eq(b.trace_labels()),
        PartnerDef::SameParameters => {
            a.protocol_index == b.protocol_index && locals_match(a, b, &verifier.bindings)
        }
        PartnerDef::Strict => {
            a.protocol_index == b.protocol_index
                && a.trace_labels().eq(b.trace_labels())
                && matching_message_lists(a, b, &verifier.bindings)
        }
    }
}

/// Same length, alternating send/recv-complementary trace whose concrete
/// messages agree once devarred — the "matching exchanged-message lists"
/// partner rule.
fn matching_message_lists(a: &Run, b: &Run, bindings: &BindingStack) -> bool {
    if a.trace.len() != b.trace.len() {
        return false;
    }
    a.trace.iter().zip(b.trace.iter()).all(|(ea, eb)| {
        ea.is_send != eb.is_send && ea.msg.devar(bindings).term_equal(&eb.msg.devar(bindings), bindings)
    })
}

/// Same (unordered) set of concrete values bound to role-local variables.
fn locals_match(a: &Run, b: &Run, bindings: &BindingStack) -> bool {
    let mut av = TermList::new();
    for (_, v) in a.locals.iter() {
        av.push(v.devar(bindings));
    }
    let mut bv = TermList::new();
    for (_, v) in b.locals.iter() {
        bv.push(v.devar(bindings));
    }
    av.len() == bv.len() && av.subtract(&bv, bindings).is_empty() && bv.subtract(&av, bindings).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_model::{Bounds, CompromiseConfig};
    use scy_term::Leaf;

    fn constant(interner: &mut Interner, name: &str) -> Term {
        Term::constant(Leaf::global(interner.intern(name), vec![]))
    }

    #[test]
    fn lkr_none_never_enables_reveal() {
        let config = CompromiseConfig { lkr: LongTermKeyReveal::None, ..CompromiseConfig::default() };
        assert!(!lkr_enabled(&config, true, false));
        assert!(!lkr_enabled(&config, false, false));
    }

    #[test]
    fn lkr_others_excludes_the_actor() {
        let config = CompromiseConfig { lkr: LongTermKeyReveal::Others, ..CompromiseConfig::default() };
        assert!(lkr_enabled(&config, false, false));
        assert!(!lkr_enabled(&config, true, false));
    }

    #[test]
    fn lkr_actor_refuses_multiplicity_above_one() {
        let config = CompromiseConfig { lkr: LongTermKeyReveal::Actor, ..CompromiseConfig::default() };
        assert!(lkr_enabled(&config, true, false));
        assert!(!lkr_enabled(&config, true, true));
    }

    #[test]
    fn no_partnering_is_never_a_partner_across_runs() {
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        verifier.spawn_run(0, 0).unwrap();
        verifier.spawn_run(0, 1).unwrap();
        assert!(!is_partner(&verifier, 0, 1, PartnerDef::NoPartnering));
        assert!(is_partner(&verifier, 0, 0, PartnerDef::NoPartnering));
    }

    #[test]
    fn matching_message_lists_requires_complementary_sends_and_recvs() {
        let mut interner = Interner::new();
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let r0 = verifier.spawn_run(0, 0).unwrap();
        let r1 = verifier.spawn_run(0, 1).unwrap();
        let msg = constant(&mut interner, "na");
        let label = interner.intern("l1");
        verifier.runs[r0].record(label, msg.clone(), true, 0);
        verifier.runs[r1].record(label, msg, false, 0);
        assert!(is_partner(&verifier, r0, r1, PartnerDef::MatchingHistory));
    }

    #[test]
    fn mismatched_message_lists_are_not_partners() {
        let mut interner = Interner::new();
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let r0 = verifier.spawn_run(0, 0).unwrap();
        let r1 = verifier.spawn_run(0, 1).unwrap();
        let na = constant(&mut interner, "na");
        let nb = constant(&mut interner, "nb");
        let label = interner.intern("l1");
        verifier.runs[r0].record(label, na, true, 0);
        verifier.runs[r1].record(label, nb, false, 0);
        assert!(!is_partner(&verifier, r0, r1, PartnerDef::MatchingHistory));
    }

    #[test]
    fn session_reveal_candidate_detects_sort_under_encryption() {
        let mut interner = Interner::new();
        let session_key = interner.intern("SessionKey");
        let k = Term::constant(Leaf::new(interner.intern("k"), 0, vec![session_key]));
        let m = constant(&mut interner, "m");
        let ciphertext = Term::encrypt(m, k);
        assert!(is_session_reveal_candidate(&ciphertext, session_key));
    }

    #[test]
    fn lkr_after_is_placeable_before_any_event_has_happened() {
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        verifier.spawn_run(0, 0).unwrap();
        let reveal = EventId::new(usize::MAX, 0);
        assert!(lkr_after_is_placeable(&verifier, 0, reveal));
    }
}
