//! The claim checker (component N): drives one claim's Arachne search to
//! completion and folds the outcome into a [`ClaimResult`].
//!
//! Secret and SKR claims have no independent post-trace rule: §4.N treats
//! realizing the claim's own goal binding as the attack itself, so this
//! module installs the claim's parameter as an obligation and lets
//! [`scy_search::driver::search`] do the work — [`crate::properties::claim_holds`]
//! reports them as never holding once a realizable pattern is reached, since
//! that is precisely the state in which the goal resolved. Every other
//! claim kind is evaluated over the realized state by that same function.

use scy_model::{ClaimKind, Diagnostic, EventId, Obligation, PartnerDef, Verifier};
use scy_search::driver::{search, DriverHooks, SearchConfig};
use scy_term::{Term, VarId};

use crate::observer::{Attack, ClaimResult, Observer};
use crate::properties::claim_holds;

/// One claim to evaluate: which run's which step carries it, and (for
/// Secret/SKR) the term whose secrecy is being asserted.
#[derive(Clone, Debug)]
pub struct ClaimTarget {
    pub protocol_index: usize,
    pub role_index: usize,
    pub step: usize,
    pub kind: ClaimKind,
    pub parameter: Option<Term>,
}

struct CheckerHooks<'a> {
    kind: ClaimKind,
    claim_run: usize,
    partner_def: PartnerDef,
    max_attacks: Option<u32>,
    attacks: Vec<Attack>,
    observer: &'a mut dyn Observer,
}

impl<'a> DriverHooks for CheckerHooks<'a> {
    fn on_realizable(&mut self, verifier: &mut Verifier) -> bool {
        let holds = claim_holds(verifier, self.kind, self.claim_run, self.partner_def);
        let caveats: Vec<VarId> = verifier.bindings.caveats().iter().map(|c| c.var).collect();
        for var in caveats {
            verifier.diagnostics.push(Diagnostic::UntypedCaveat { symbol: var.symbol, run_id: var.run_id });
        }
        if holds {
            return true;
        }
        let attack = Attack::capture(verifier);
        self.observer.on_attack(&attack);
        self.attacks.push(attack);
        let within_bound = verifier.record_attack().is_ok();
        match self.max_attacks {
            Some(max) => within_bound && (self.attacks.len() as u32) < max,
            None => false,
        }
    }
}

/// Collects every variable leaf occurring anywhere inside `term`, deduped,
/// in first-occurrence order.
fn collect_variables(term: &Term, out: &mut Vec<VarId>) {
    if term.is_variable() {
        let id = term.var_id().expect("variable term always carries a leaf");
        if !out.contains(&id) {
            out.push(id);
        }
        return;
    }
    if let Some((a, b)) = term.tuple_parts() {
        collect_variables(a, out);
        collect_variables(b, out);
        return;
    }
    if let Some((plaintext, key)) = term.encryption_parts() {
        collect_variables(plaintext, out);
        collect_variables(key, out);
    }
}

/// Whether `target`'s parameter (for Secret/SKR kinds) carries a variable
/// that is never received by its own role — the `alwaystrue` diagnostic of
/// §4.N / §8 scenario 6. Ground parameters (a concrete nonce or key sent in
/// the clear) never trigger this: only a variable the intruder could never
/// be asked to supply makes the claim vacuous, per
/// `original_source/src/compiler.c`'s `claimvars`/`recvvars` check — a
/// variable standing for one of the protocol's own role names is excluded,
/// since it is fixed by ρ rather than ever received.
fn is_always_true(verifier: &Verifier, target: &ClaimTarget) -> bool {
    if !matches!(target.kind, ClaimKind::Secret | ClaimKind::Skr) {
        return false;
    }
    let Some(parameter) = &target.parameter else { return false };
    let protocol = &verifier.protocols[target.protocol_index];
    let role = &protocol.roles[target.role_index];

    let mut claim_vars = Vec::new();
    collect_variables(parameter, &mut claim_vars);
    if claim_vars.is_empty() {
        return false;
    }

    let mut recv_vars = Vec::new();
    for event in &role.events {
        if let scy_model::RoleEvent::Recv { from, to, msg, .. } = event {
            collect_variables(from, &mut recv_vars);
            collect_variables(to, &mut recv_vars);
            collect_variables(msg, &mut recv_vars);
        }
    }

    claim_vars.iter().any(|v| !protocol.roles.iter().any(|r| r.name == v.symbol) && !recv_vars.contains(v))
}

/// Checks one claim, seeding the state with a single run of the claim's
/// role and (for Secret/SKR) installing the claim's parameter as the
/// initial goal obligation, then running the Arachne search to
/// completion.
pub fn check_claim(
    verifier: &mut Verifier,
    target: &ClaimTarget,
    config: &SearchConfig,
    partner_def: PartnerDef,
    observer: &mut dyn Observer,
) -> scy_model::Result<ClaimResult> {
    if is_always_true(verifier, target) {
        verifier.diagnostics.push(Diagnostic::AlwaysTrue {
            protocol: verifier.protocols[target.protocol_index].name,
            role: verifier.protocols[target.protocol_index].roles[target.role_index].name,
            step: target.step,
        });
        return Ok(ClaimResult::AlwaysTrue);
    }

    verifier.reset_attacks();
    let claim_run = verifier.spawn_run(target.protocol_index, target.role_index)?;

    if let Some(parameter) = &target.parameter {
        let ev_to = EventId::new(claim_run, target.step);
        verifier.obligations.push(Obligation::open(parameter.clone(), claim_run, ev_to, 0));
    }

    let mut hooks = CheckerHooks {
        kind: target.kind,
        claim_run,
        partner_def,
        max_attacks: verifier.bounds.max_attacks,
        attacks: Vec::new(),
        observer,
    };

    let finished = search(verifier, target.protocol_index, config, &mut hooks);

    let result = if verifier.time_limit_exceeded() {
        hooks.observer.on_timeout();
        ClaimResult::TimeOut
    } else if let Some(attack) = hooks.attacks.into_iter().next() {
        ClaimResult::Falsified(attack)
    } else if finished {
        hooks.observer.on_proof(0, verifier.runs.len() as u32);
        ClaimResult::Verified
    } else {
        ClaimResult::Bounded
    };

    Ok(result)
}
