//! The goal-selection heuristic (component K): scores every selectable
//! obligation and hands the driver the lowest-scoring one, so the search
//! explores the most-constrained binding first. Ties break by whichever
//! obligation was opened first, which is well-defined because
//! [`scy_model::ObligationList`] preserves insertion order.

use rand::Rng;

use scy_model::{Obligation, ObligationList, Protocol, Verifier};
use scy_term::KeyLevel;

use crate::hide_level::hide_level;

/// Sub-score bits, matching the order listed in §4.K.
pub const BIT_TERM_CONSTRAIN: u32 = 1 << 0;
pub const BIT_LEVEL: u32 = 1 << 1;
pub const BIT_CONSEQUENCE: u32 = 1 << 2;
pub const BIT_SINGULAR_VARIABLE: u32 = 1 << 3;
pub const BIT_OPEN_NONCES: u32 = 1 << 4;
pub const BIT_HIDE_LEVEL: u32 = 1 << 5;
pub const BIT_KEY_LEVEL: u32 = 1 << 6;

/// Default mask: bits 0, 1 and 5 — term-constrain level, the key-preferred
/// level bit, and the hide-level weight.
pub const DEFAULT_HEURISTIC: u32 = BIT_TERM_CONSTRAIN | BIT_LEVEL | BIT_HIDE_LEVEL;

/// Which sub-scores are active, and whether goal selection should instead
/// pick uniformly at random among selectable obligations.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicConfig {
    pub mask: u32,
    /// When set, `select_goal` ignores `mask` and picks uniformly at random
    /// (via the `Verifier`'s seeded RNG, so the choice is still reproducible
    /// for a fixed seed).
    pub random: bool,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig { mask: DEFAULT_HEURISTIC, random: false }
    }
}

fn count_variables(term: &scy_term::Term) -> u32 {
    if term.is_variable() {
        return 1;
    }
    if let Some((a, b)) = term.tuple_parts() {
        return count_variables(a) + count_variables(b);
    }
    if let Some((p, k)) = term.encryption_parts() {
        return count_variables(p) + count_variables(k);
    }
    0
}

/// The weighted sub-score sum for one obligation; lower is preferred.
fn score(obligation: &Obligation, verifier: &Verifier, protocol: &Protocol, pending: &[&Obligation], mask: u32) -> i64 {
    let mut total: i64 = 0;
    let term = obligation.term.devar(&verifier.bindings);

    if mask & BIT_TERM_CONSTRAIN != 0 {
        total += count_variables(&term) as i64;
    }

    if mask & BIT_LEVEL != 0 {
        // Keys are preferred: a term whose leaf symbol has been observed in
        // key position anywhere in the protocol scores lower.
        let is_key = term
            .leaf()
            .map(|l| verifier.scope.key_level_of(l.symbol) == KeyLevel::UsedAsKey)
            .unwrap_or(false);
        total += if is_key { 0 } else { 1 };
    }

    if mask & BIT_CONSEQUENCE != 0 {
        // More other pending obligations sharing a variable with this one
        // means resolving it first constrains more of the remaining search,
        // so it scores lower (more negative) the more it is shared.
        let shared = pending
            .iter()
            .filter(|other| !std::ptr::eq(**other, obligation))
            .filter(|other| terms_share_a_variable(&term, &other.term.devar(&verifier.bindings)))
            .count();
        total -= shared as i64;
    }

    if mask & BIT_SINGULAR_VARIABLE != 0 {
        total += if term.is_variable() { 0 } else { 1 };
    }

    if mask & BIT_OPEN_NONCES != 0 {
        // Athena-style: fewer still-open variables in the goal is preferred.
        total += count_variables(&term) as i64;
    }

    if mask & BIT_HIDE_LEVEL != 0 {
        let protocol_def = protocol;
        let weight = match hide_level(&term, protocol_def) {
            crate::hide_level::HideLevel::Both => 0,
            crate::hide_level::HideLevel::KnowledgeOnly => 1,
            crate::hide_level::HideLevel::ProtocolOnly => 2,
            crate::hide_level::HideLevel::Impossible => 3,
        };
        total += weight;
    }

    if mask & BIT_KEY_LEVEL != 0 {
        // Prefer goals that sit fewer encryption layers deep, so the search
        // peels outer layers before chasing a deeply nested key.
        total += term.encryption_level() as i64;
    }

    total
}

fn terms_share_a_variable(a: &scy_term::Term, b: &scy_term::Term) -> bool {
    if a.is_variable() && b.is_variable() {
        return a.leaf().zip(b.leaf()).map(|(x, y)| x.identity_eq(y)).unwrap_or(false);
    }
    false
}

/// Picks the index (into the obligation list) of the obligation to refine
/// next, or `None` if no obligation is selectable (a realizable pattern).
pub fn select_goal(verifier: &mut Verifier, protocol: &Protocol, config: &HeuristicConfig) -> Option<usize> {
    let obligations: &ObligationList = &verifier.obligations;
    let candidates: Vec<usize> = obligations
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.done)
        .map(|(i, _)| i)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    if config.random {
        let pick = verifier.rng().gen_range(0..candidates.len());
        return Some(candidates[pick]);
    }

    let pending_refs: Vec<&Obligation> = candidates.iter().map(|&i| obligations.get(i)).collect();
    let mut best_index = candidates[0];
    let mut best_score = score(obligations.get(candidates[0]), verifier, protocol, &pending_refs, config.mask);
    for &i in &candidates[1..] {
        let s = score(obligations.get(i), verifier, protocol, &pending_refs, config.mask);
        if s < best_score {
            best_score = s;
            best_index = i;
        }
        // ties keep `best_index` at the lower (older) index already held.
    }
    Some(best_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_model::{Bounds, CompromiseConfig, EventId};
    use scy_term::Leaf;

    fn term(interner: &mut Interner, name: &str) -> scy_term::Term {
        scy_term::Term::constant(Leaf::global(interner.intern(name), vec![]))
    }

    #[test]
    fn no_pending_obligations_selects_nothing() {
        let mut interner = Interner::new();
        let protocol = Protocol::new(interner.intern("p"));
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let config = HeuristicConfig::default();
        assert_eq!(select_goal(&mut verifier, &protocol, &config), None);
    }

    #[test]
    fn oldest_obligation_wins_on_tied_score() {
        let mut interner = Interner::new();
        let protocol = Protocol::new(interner.intern("p"));
        let mut verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let m1 = term(&mut interner, "m1");
        let m2 = term(&mut interner, "m2");
        verifier.obligations.push(Obligation::open(m1, 0, EventId::new(0, 0), 0));
        verifier.obligations.push(Obligation::open(m2, 0, EventId::new(0, 1), 0));
        let config = HeuristicConfig::default();
        assert_eq!(select_goal(&mut verifier, &protocol, &config), Some(0));
    }

    #[test]
    fn random_mode_is_reproducible_for_a_fixed_seed() {
        let mut interner = Interner::new();
        let protocol = Protocol::new(interner.intern("p"));
        let mut v1 = Verifier::new(Bounds::default(), CompromiseConfig::default(), 7);
        let mut v2 = Verifier::new(Bounds::default(), CompromiseConfig::default(), 7);
        for v in [&mut v1, &mut v2] {
            let m = term(&mut interner, "m");
            v.obligations.push(Obligation::open(m.clone(), 0, EventId::new(0, 0), 0));
            v.obligations.push(Obligation::open(m, 0, EventId::new(0, 1), 0));
        }
        let config = HeuristicConfig { mask: DEFAULT_HEURISTIC, random: true };
        let a = select_goal(&mut v1, &protocol, &config);
        let b = select_goal(&mut v2, &protocol, &config);
        assert_eq!(a, b);
    }
}
