//! The Arachne backward search driver (component M).
//!
//! `iterate` is the recursive core described in §4.M: prune, select a
//! goal, and try each of the three refinement families in turn, each
//! wrapped in a scoped push/pop so every branch is fully reversible.
//!
//! Claim semantics are deliberately not known here — `iterate` calls out
//! to a caller-supplied [`DriverHooks`] at every realizable pattern (no
//! selectable goal left) and, optionally, for a claim-specific prune
//! lemma, so this crate stays a generic constraint search and the claim
//! checker owns what a "property" actually means.
//!
//! A unifier continuation cannot itself recurse into `iterate`, since
//! doing so would need a second mutable borrow of the same `Verifier`
//! the continuation's `&mut BindingStack` argument is already borrowed
//! from. Refinements therefore let the continuation only *collect* each
//! solution as plain data (via [`scy_unify::BindingStack::bindings_since`])
//! and replay it onto `verifier.bindings` once the unifier call has
//! returned, before recursing.

use scy_model::{EventId, Obligation, Protocol, RoleEvent, Verifier};
use scy_term::{Term, VarId, ROLE_TEMPLATE_SCOPE};
use scy_unify::{subterm_unify, unify, MatchMode};

use crate::heuristic::{self, HeuristicConfig};
use crate::hide_level::hide_level;

/// Sentinel run id for intruder-construction refinements and class
/// choices, which satisfy an obligation without any real `Run` behind
/// them.
pub const INTRUDER_RUN: usize = usize::MAX;

#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    pub match_mode: MatchMode,
    pub prune: scy_model::PruneMode,
    pub heuristic: HeuristicConfig,
    /// Whether the intruder may reach into a tuple component (almost
    /// always true; `false` is mostly useful for isolating a particular
    /// refinement family in a test).
    pub adversary_tupling: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            match_mode: MatchMode::ArbitraryTypeFlaw,
            prune: scy_model::PruneMode::all(),
            heuristic: HeuristicConfig::default(),
            adversary_tupling: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SearchState {
    pub depth: u32,
    pub intruder_actions: u32,
}

/// Callbacks the claim checker (component N) supplies so the generic
/// search mechanics here never need to know what a claim is.
pub trait DriverHooks {
    /// A claim-specific lemma (§4.M `pruneClaim`); `true` prunes this
    /// branch without exploring further. Default: never prunes.
    fn prune_claim(&mut self, _verifier: &Verifier) -> bool {
        false
    }

    /// Called once per realizable pattern (a state with no selectable
    /// goal). Return `true` to keep searching for further patterns,
    /// `false` to stop the whole search immediately.
    fn on_realizable(&mut self, verifier: &mut Verifier) -> bool;
}

/// Runs the backward search for `protocol_index`'s currently installed
/// obligations/runs, starting the time budget fresh.
pub fn search(verifier: &mut Verifier, protocol_index: usize, config: &SearchConfig, hooks: &mut dyn DriverHooks) -> bool {
    verifier.arm_deadline();
    let mut state = SearchState::default();
    iterate(verifier, protocol_index, config, &mut state, hooks)
}

pub fn iterate(
    verifier: &mut Verifier,
    protocol_index: usize,
    config: &SearchConfig,
    state: &mut SearchState,
    hooks: &mut dyn DriverHooks,
) -> bool {
    if config.prune.bounds && prune_bounds(verifier, state) {
        return true;
    }
    let protocol = verifier.protocols[protocol_index].clone();
    if config.prune.theorems && prune_theorems(verifier, &protocol) {
        return true;
    }
    if config.prune.claim_specific && hooks.prune_claim(verifier) {
        return true;
    }

    match heuristic::select_goal(verifier, &protocol, &config.heuristic) {
        None => hooks.on_realizable(verifier),
        Some(idx) => {
            state.depth += 1;
            let keep_going = refine(verifier, protocol_index, &protocol, idx, config, state, hooks);
            state.depth -= 1;
            keep_going
        }
    }
}

fn prune_bounds(verifier: &Verifier, state: &SearchState) -> bool {
    if verifier.time_limit_exceeded() {
        return true;
    }
    let bounds = &verifier.bounds;
    if let Some(max) = bounds.max_proof_depth {
        if state.depth >= max {
            return true;
        }
    }
    if let Some(max) = bounds.max_trace_length {
        let total: u32 = verifier.runs.iter().map(|r| r.trace.len() as u32).sum();
        if total >= max {
            return true;
        }
    }
    if let Some(max) = bounds.max_intruder_actions {
        if state.intruder_actions >= max {
            return true;
        }
    }
    if let Some(max) = bounds.max_attacks {
        if verifier.attacks_found() >= max {
            return true;
        }
    }
    false
}

fn prune_theorems(verifier: &Verifier, protocol: &Protocol) -> bool {
    verifier.obligations.pending().any(|o| {
        let term = o.term.devar(&verifier.bindings);
        hide_level(&term, protocol).is_impossible()
    })
}

fn refine(
    verifier: &mut Verifier,
    protocol_index: usize,
    protocol: &Protocol,
    idx: usize,
    config: &SearchConfig,
    state: &mut SearchState,
    hooks: &mut dyn DriverHooks,
) -> bool {
    if !refine_existing_send(verifier, protocol_index, idx, config, state, hooks) {
        return false;
    }
    if !refine_new_run(verifier, protocol_index, protocol, idx, config, state, hooks) {
        return false;
    }
    refine_intruder_construction(verifier, protocol_index, idx, config, state, hooks)
}

/// Refinement family 1: bind `idx`'s goal to a send event already
/// realized on some run, directly or by unifying into one of its
/// subterms (accumulating the keys a decryption would need).
fn refine_existing_send(
    verifier: &mut Verifier,
    protocol_index: usize,
    idx: usize,
    config: &SearchConfig,
    state: &mut SearchState,
    hooks: &mut dyn DriverHooks,
) -> bool {
    let obligation = verifier.obligations.get(idx).clone();
    let term = obligation.term.clone();
    let ev_to = obligation.ev_to;

    let candidates: Vec<(usize, usize, Term)> = verifier
        .runs
        .iter()
        .flat_map(|r| r.trace.iter().filter(|e| e.is_send).map(move |e| (r.id, e.step, e.msg.clone())))
        .collect();

    for (run_from, step_from, msg) in candidates {
        let from_event = EventId::new(run_from, step_from);
        if verifier.graph.depends(ev_to, from_event) {
            continue;
        }

        let mark = verifier.bindings.mark();
        let mut solutions: Vec<(Vec<(VarId, Term)>, Vec<Term>)> = Vec::new();
        let mut keylist = Vec::new();
        subterm_unify(
            &msg,
            &term,
            &mut verifier.bindings,
            config.match_mode,
            &verifier.scope,
            config.adversary_tupling,
            &mut keylist,
            &mut |bindings, kl| {
                solutions.push((bindings.bindings_since(mark), kl.to_vec()));
                true
            },
        );

        for (delta, keys) in solutions {
            for (var, value) in &delta {
                verifier.bindings.bind(*var, value.clone());
            }
            let graph_mark = verifier.graph.mark();
            let obligations_mark = verifier.obligations.mark();
            if verifier.graph.add_edge(from_event, ev_to) {
                verifier.obligations.mark_done(idx, from_event);
                for key in &keys {
                    verifier.obligations.push(Obligation::open(key.clone(), obligation.run_to, ev_to, state.depth as usize));
                    state.intruder_actions += 1;
                }
                let keep_going = iterate(verifier, protocol_index, config, state, hooks);
                verifier.obligations.unmark(idx);
                if !keep_going {
                    verifier.obligations.undo_to(obligations_mark);
                    verifier.graph.undo_to(graph_mark);
                    verifier.bindings.undo_to(mark);
                    return false;
                }
            }
            verifier.obligations.undo_to(obligations_mark);
            verifier.graph.undo_to(graph_mark);
            verifier.bindings.undo_to(mark);
        }
    }
    true
}

/// Refinement family 2: allocate a fresh run of a role whose first event
/// is a send unifiable with the goal, and bind the goal to that send.
/// Only a role's *first* event is ever tried here — the role's later
/// sends only become reachable once earlier obligations on that same
/// run have been resolved by the other two families, exactly as running
/// a role in order requires.
fn refine_new_run(
    verifier: &mut Verifier,
    protocol_index: usize,
    protocol: &Protocol,
    idx: usize,
    config: &SearchConfig,
    state: &mut SearchState,
    hooks: &mut dyn DriverHooks,
) -> bool {
    if let Some(max) = verifier.bounds.max_runs {
        if verifier.runs.len() as u32 >= max {
            return true;
        }
    }

    let obligation = verifier.obligations.get(idx).clone();
    let term = obligation.term.clone();
    let ev_to = obligation.ev_to;

    let role_candidates: Vec<(usize, scy_base::Symbol, Term)> = protocol
        .roles
        .iter()
        .enumerate()
        .filter_map(|(ri, role)| match role.events.first() {
            Some(RoleEvent::Send { label, msg, .. }) => Some((ri, *label, msg.clone())),
            _ => None,
        })
        .collect();

    for (role_index, label, msg_template) in role_candidates {
        let new_run = match verifier.spawn_run(protocol_index, role_index) {
            Ok(id) => id,
            Err(_) => continue,
        };
        // Spawned regardless of whether it ends up used; an abandoned run
        // from a backtracked branch is orphaned rather than reclaimed,
        // mirroring the graph's and obligation list's append-only history
        // (runs are addressed by id elsewhere, so ids can never be reused).
        let msg = msg_template.term_local(ROLE_TEMPLATE_SCOPE, new_run as i64);

        let mark = verifier.bindings.mark();
        let mut solutions: Vec<Vec<(VarId, Term)>> = Vec::new();
        unify(&msg, &term, &mut verifier.bindings, config.match_mode, &verifier.scope, &mut |bindings| {
            solutions.push(bindings.bindings_since(mark));
            true
        });

        for delta in solutions {
            for (var, value) in &delta {
                verifier.bindings.bind(*var, value.clone());
            }
            let graph_mark = verifier.graph.mark();
            let obligations_mark = verifier.obligations.mark();
            let from_event = EventId::new(new_run, 0);
            if verifier.graph.add_edge(from_event, ev_to) {
                verifier.runs[new_run].record(label, msg.clone(), true, 0);
                verifier.runs[new_run].advance();
                verifier.obligations.mark_done(idx, from_event);
                let keep_going = iterate(verifier, protocol_index, config, state, hooks);
                verifier.obligations.unmark(idx);
                if !keep_going {
                    verifier.obligations.undo_to(obligations_mark);
                    verifier.graph.undo_to(graph_mark);
                    verifier.bindings.undo_to(mark);
                    return false;
                }
            }
            verifier.obligations.undo_to(obligations_mark);
            verifier.graph.undo_to(graph_mark);
            verifier.bindings.undo_to(mark);
        }
    }
    true
}

/// Refinement family 3: let the intruder construct the goal outright —
/// by splitting a tuple or a decryptable encryption into sub-goals, by
/// recognising a term already in some run's initial knowledge, or (for
/// an as-yet-unconstrained variable) by choosing a concrete value from
/// initial knowledge (a *class choice*).
fn refine_intruder_construction(
    verifier: &mut Verifier,
    protocol_index: usize,
    idx: usize,
    config: &SearchConfig,
    state: &mut SearchState,
    hooks: &mut dyn DriverHooks,
) -> bool {
    let obligation = verifier.obligations.get(idx).clone();
    let term = obligation.term.devar(&verifier.bindings);
    let ev_to = obligation.ev_to;
    let run_to = obligation.run_to;
    let sentinel = EventId::new(INTRUDER_RUN, idx);

    if let Some((a, b)) = term.tuple_parts() {
        let (a, b) = (a.clone(), b.clone());
        let obligations_mark = verifier.obligations.mark();
        verifier.obligations.mark_done(idx, sentinel);
        verifier.obligations.push(Obligation::open(a, run_to, ev_to, state.depth as usize));
        verifier.obligations.push(Obligation::open(b, run_to, ev_to, state.depth as usize));
        state.intruder_actions += 1;
        let keep_going = iterate(verifier, protocol_index, config, state, hooks);
        verifier.obligations.unmark(idx);
        verifier.obligations.undo_to(obligations_mark);
        return keep_going;
    }

    if let Some((plaintext, key)) = term.encryption_parts() {
        let (plaintext, key) = (plaintext.clone(), key.clone());
        let obligations_mark = verifier.obligations.mark();
        verifier.obligations.mark_done(idx, sentinel);
        verifier.obligations.push(Obligation::open(plaintext, run_to, ev_to, state.depth as usize));
        verifier.obligations.push(Obligation::open(key, run_to, ev_to, state.depth as usize));
        state.intruder_actions += 1;
        let keep_going = iterate(verifier, protocol_index, config, state, hooks);
        verifier.obligations.unmark(idx);
        verifier.obligations.undo_to(obligations_mark);
        return keep_going;
    }

    let known = verifier.runs.iter().any(|r| r.knowledge.in_knowledge(&term, &verifier.bindings));
    if known {
        verifier.obligations.mark_done(idx, sentinel);
        let keep_going = iterate(verifier, protocol_index, config, state, hooks);
        verifier.obligations.unmark(idx);
        if !keep_going {
            return false;
        }
        return true;
    }

    if term.is_variable() {
        let choices: Vec<Term> = verifier.runs.iter().flat_map(|r| r.knowledge.basic().iter().cloned()).collect();
        for choice in choices {
            let mark = verifier.bindings.mark();
            let mut solutions: Vec<Vec<(VarId, Term)>> = Vec::new();
            unify(&term, &choice, &mut verifier.bindings, config.match_mode, &verifier.scope, &mut |bindings| {
                solutions.push(bindings.bindings_since(mark));
                true
            });
            for delta in solutions {
                for (var, value) in &delta {
                    verifier.bindings.bind(*var, value.clone());
                }
                verifier.obligations.mark_done(idx, sentinel);
                state.intruder_actions += 1;
                let keep_going = iterate(verifier, protocol_index, config, state, hooks);
                verifier.obligations.unmark(idx);
                if !keep_going {
                    verifier.bindings.undo_to(mark);
                    return false;
                }
                verifier.bindings.undo_to(mark);
            }
        }
    }

    true
}
