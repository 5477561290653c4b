//! The hide-level lemma (component L): a conservative, pre-computed upper
//! bound on how a basic term can ever be synthesized, used to prune a goal
//! whose message can be produced neither from initial knowledge nor by any
//! protocol send.

use scy_model::Protocol;
use scy_term::{NoBindings, Term};

/// Where a term can come from, as far as a purely lexical scan of the
/// protocol's sends and initial knowledge can tell (it does not account for
/// bindings introduced later by the search, hence "conservative").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HideLevel {
    /// Derivable both from initial knowledge and from some protocol send.
    Both,
    /// Derivable only from initial knowledge.
    KnowledgeOnly,
    /// Derivable only by observing some protocol send.
    ProtocolOnly,
    /// Derivable from neither; any goal for this term can be pruned.
    Impossible,
}

impl HideLevel {
    pub fn is_impossible(self) -> bool {
        matches!(self, HideLevel::Impossible)
    }
}

/// Computes the hide-level of `term` against `protocol`'s declared initial
/// knowledge and the lexical content of its roles' send events.
///
/// A term counts as "from a send" if it occurs anywhere inside the send's
/// message, including under encryption — the adversary may not be able to
/// *decrypt* to reach it, but the lemma is deliberately an upper bound, not
/// an exact derivability check (that is the job of [`scy_know::Knowledge`]
/// during the actual search).
pub fn hide_level(term: &Term, protocol: &Protocol) -> HideLevel {
    let from_knowledge = protocol
        .initial_knowledge
        .iter()
        .any(|k| term.term_equal(k, &NoBindings) || Term::occurs(term, k, &NoBindings));

    let from_protocol = protocol.roles.iter().any(|role| {
        role.events.iter().any(|event| {
            event.is_send()
                && event
                    .message()
                    .map(|m| term.term_equal(m, &NoBindings) || Term::occurs(term, m, &NoBindings))
                    .unwrap_or(false)
        })
    });

    match (from_knowledge, from_protocol) {
        (true, true) => HideLevel::Both,
        (true, false) => HideLevel::KnowledgeOnly,
        (false, true) => HideLevel::ProtocolOnly,
        (false, false) => HideLevel::Impossible,
    }
}
