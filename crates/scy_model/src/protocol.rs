//! Static role and protocol definitions (component F, static half).
//!
//! `Protocol`/`Role`/`RoleEvent` hold term *templates*: role-local leaves
//! that have not yet been rewritten into any particular run's scope. A
//! `Role` never points back to its owning `Protocol`; callers address a
//! role by `(protocol_index, role_index)` instead, per the "arena with
//! indices rather than pointers" re-architecture of cyclic ownership.

use scy_base::Symbol;
use scy_term::Term;

/// The six claim kinds the checker evaluates, plus the three bookkeeping
/// kinds the parser collaborator may also emit (SID, NotEqual, Empty) which
/// never reach the checker as a pass/fail property in their own right.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ClaimKind {
    Secret,
    Skr,
    Alive,
    WeakAgree,
    NiAgree,
    NiSynch,
    Reachable,
    Commit,
    Running,
    Sid,
    NotEqual,
    Empty,
}

/// One event in a role's template sequence.
#[derive(Clone, Debug)]
pub enum RoleEvent {
    Send { label: Symbol, from: Term, to: Term, msg: Term },
    Recv { label: Symbol, from: Term, to: Term, msg: Term },
    Claim { label: Symbol, kind: ClaimKind, parameter: Option<Term> },
}

impl RoleEvent {
    pub fn label(&self) -> Symbol {
        match self {
            RoleEvent::Send { label, .. } => *label,
            RoleEvent::Recv { label, .. } => *label,
            RoleEvent::Claim { label, .. } => *label,
        }
    }

    pub fn message(&self) -> Option<&Term> {
        match self {
            RoleEvent::Send { msg, .. } => Some(msg),
            RoleEvent::Recv { msg, .. } => Some(msg),
            RoleEvent::Claim { .. } => None,
        }
    }

    pub fn is_send(&self) -> bool {
        matches!(self, RoleEvent::Send { .. })
    }

    pub fn is_recv(&self) -> bool {
        matches!(self, RoleEvent::Recv { .. })
    }
}

/// A role: its name and its ordered event template sequence.
#[derive(Clone, Debug)]
pub struct Role {
    pub name: Symbol,
    pub events: Vec<RoleEvent>,
}

impl Role {
    pub fn new(name: Symbol) -> Self {
        Role { name, events: Vec::new() }
    }

    pub fn push(&mut self, event: RoleEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// A compiled protocol: a name and its roles, addressed by index.
#[derive(Clone, Debug)]
pub struct Protocol {
    pub name: Symbol,
    pub roles: Vec<Role>,
    /// Initial intruder knowledge declared for this protocol (`const`s,
    /// untrusted agents' long-term keys, and so on), inserted into every
    /// fresh run's knowledge set at instantiation.
    pub initial_knowledge: Vec<Term>,
}

impl Protocol {
    pub fn new(name: Symbol) -> Self {
        Protocol { name, roles: Vec::new(), initial_knowledge: Vec::new() }
    }

    pub fn role_index(&self, name: Symbol) -> Option<usize> {
        self.roles.iter().position(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_base::Interner;
    use scy_term::Leaf;

    #[test]
    fn role_index_finds_by_name() {
        let mut interner = Interner::new();
        let initiator = interner.intern("Initiator");
        let responder = interner.intern("Responder");
        let mut protocol = Protocol::new(interner.intern("ns"));
        protocol.roles.push(Role::new(initiator));
        protocol.roles.push(Role::new(responder));
        assert_eq!(protocol.role_index(responder), Some(1));
    }

    #[test]
    fn role_event_exposes_message() {
        let mut interner = Interner::new();
        let label = interner.intern("l1");
        let agent = interner.intern("A");
        let term = Term::constant(Leaf::global(agent, vec![]));
        let event = RoleEvent::Send { label, from: term.clone(), to: term.clone(), msg: term.clone() };
        assert!(event.is_send());
        assert!(event.message().unwrap().term_equal(&term, &scy_term::NoBindings));
    }
}
