#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-spdl
//!
//! A minimal stand-in for the SPDL surface parser and type-checker
//! collaborator described in §6 of the specification: this crate does not
//! lex or parse a concrete-syntax SPDL file (that grammar is explicitly out
//! of scope for the core) — it offers [`ProtocolBuilder`], a small
//! programmatic constructor API that produces exactly the `Protocol`/`Role`
//! structure the core consumes, sufficient to build the concrete
//! end-to-end scenarios the core's test suites exercise.
//!
//! # Example
//!
//! ```
//! use scy_base::Interner;
//! use scy_spdl::ProtocolBuilder;
//!
//! let mut interner = Interner::new();
//! let mut builder = ProtocolBuilder::new(&mut interner, "ping");
//! let agent = builder.usertype("Agent");
//! let a = builder.constant("A", &[agent]);
//! let mut initiator = builder.role("Initiator");
//! initiator.send("l1", a.clone(), a.clone(), a.clone());
//! builder.add_role(initiator.finish());
//! let (protocol, _labels, _scope, diagnostics) = builder.compile();
//! assert!(diagnostics.is_empty());
//! assert_eq!(protocol.roles.len(), 1);
//! ```

use std::collections::HashMap;

use scy_base::{Interner, Symbol};
use scy_model::{Claim, ClaimKind, Diagnostic, LabelTable, Protocol, Role, RoleEvent};
use scy_term::{Leaf, ScopeLevel, ScopeTable, Term, GLOBAL_SCOPE, ROLE_TEMPLATE_SCOPE};

/// Builds one role's event template sequence, parameterised by the
/// protocol's shared interner.
pub struct RoleBuilder<'a> {
    interner: &'a mut Interner,
    role: Role,
    fresh_counter: &'a mut u32,
    role_template_symbols: &'a mut Vec<Symbol>,
}

impl<'a> RoleBuilder<'a> {
    /// A role-local variable (agent parameter, nonce, session key, ...):
    /// not yet owned by any run, rewritten to the run's scope at
    /// instantiation by `Term::term_local(ROLE_TEMPLATE_SCOPE, run_id)`.
    pub fn local(&mut self, name: &str, sorts: &[Symbol]) -> Term {
        let symbol = self.interner.intern(name);
        self.role_template_symbols.push(symbol);
        Term::variable(Leaf::new(symbol, ROLE_TEMPLATE_SCOPE, sorts.to_vec()), true)
    }

    pub fn send(&mut self, label: &str, from: Term, to: Term, msg: Term) -> &mut Self {
        let label = self.interner.intern(label);
        self.role.push(RoleEvent::Send { label, from, to, msg });
        self
    }

    pub fn recv(&mut self, label: &str, from: Term, to: Term, msg: Term) -> &mut Self {
        let label = self.interner.intern(label);
        self.role.push(RoleEvent::Recv { label, from, to, msg });
        self
    }

    pub fn claim(&mut self, label: &str, kind: ClaimKind, parameter: Option<Term>) -> &mut Self {
        let label = self.interner.intern(label);
        self.role.push(RoleEvent::Claim { label, kind, parameter });
        self
    }

    /// Desugars `match(pattern, term)` into the send/recv pair over a
    /// fresh symmetric key described in §6: a send of `term` encrypted
    /// under a key nobody else knows, immediately followed by a recv of
    /// `pattern` encrypted under that same key. The two only unify when
    /// `pattern` and `term` themselves unify, so binding this recv's
    /// obligation to this send (the only send that could ever supply it)
    /// forces the equality test without adding a dedicated event kind to
    /// the core's data model.
    pub fn match_equal(&mut self, label: &str, from: Term, to: Term, pattern: Term, term: Term) -> &mut Self {
        *self.fresh_counter += 1;
        let key_name = format!("__match_key_{}", self.fresh_counter);
        let key_symbol = self.interner.intern(&key_name);
        self.role_template_symbols.push(key_symbol);
        let key = Term::variable(Leaf::new(key_symbol, ROLE_TEMPLATE_SCOPE, vec![]), true);
        let send_label = self.interner.intern(&format!("{label}_send"));
        let recv_label = self.interner.intern(&format!("{label}_recv"));
        self.role.push(RoleEvent::Send { label: send_label, from: from.clone(), to: to.clone(), msg: Term::encrypt(term, key.clone()) });
        self.role.push(RoleEvent::Recv { label: recv_label, from, to, msg: Term::encrypt(pattern, key) });
        self
    }

    /// Hands back the role built so far, for [`ProtocolBuilder::add_role`].
    pub fn finish(self) -> Role {
        self.role
    }
}

/// Programmatic constructor for one protocol's global declarations and
/// roles; the SPDL-stand-in entry point.
pub struct ProtocolBuilder<'a> {
    interner: &'a mut Interner,
    name: Symbol,
    roles: Vec<Role>,
    initial_knowledge: Vec<Term>,
    inverse_pairs: Vec<(Term, Term)>,
    session_key_sort: Option<Symbol>,
    fresh_counter: u32,
    seen_labels: HashMap<Symbol, u32>,
    diagnostics: Vec<Diagnostic>,
    key_uses: Vec<Symbol>,
    global_symbols: Vec<Symbol>,
    role_template_symbols: Vec<Symbol>,
}

impl<'a> ProtocolBuilder<'a> {
    pub fn new(interner: &'a mut Interner, name: &str) -> Self {
        let name = interner.intern(name);
        ProtocolBuilder {
            interner,
            name,
            roles: Vec::new(),
            initial_knowledge: Vec::new(),
            inverse_pairs: Vec::new(),
            session_key_sort: None,
            fresh_counter: 0,
            seen_labels: HashMap::new(),
            diagnostics: Vec::new(),
            key_uses: Vec::new(),
            global_symbols: Vec::new(),
            role_template_symbols: Vec::new(),
        }
    }

    /// `usertype` declaration: a sort name used to tag agent/nonce/key
    /// variables and constants.
    pub fn usertype(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    /// Declares the sort used to mark session-key-typed terms, consulted
    /// by the compromise model's SKR/SSR splicing (§4.J). Only one sort
    /// may carry this role per protocol; later calls overwrite it.
    pub fn declare_session_key_sort(&mut self, sort: Symbol) {
        self.session_key_sort = Some(sort);
    }

    pub fn session_key_sort(&self) -> Option<Symbol> {
        self.session_key_sort
    }

    /// `const` declaration: a global constant (agent name, fixed label,
    /// ...), owned by no run.
    pub fn constant(&mut self, name: &str, sorts: &[Symbol]) -> Term {
        let symbol = self.interner.intern(name);
        self.global_symbols.push(symbol);
        Term::constant(Leaf::new(symbol, GLOBAL_SCOPE, sorts.to_vec()))
    }

    /// A fresh, never-reused global constant, for synthesising the
    /// intruder's own name or other compiler-generated atoms.
    pub fn fresh_constant(&mut self, prefix: &str, sorts: &[Symbol]) -> Term {
        self.fresh_counter += 1;
        self.constant(&format!("{prefix}_{}", self.fresh_counter), sorts)
    }

    /// `compromised` / `untrusted` declaration: seeds initial intruder
    /// knowledge with an agent's long-term secret (its private key, a
    /// shared key with the intruder, ...).
    pub fn add_initial_knowledge(&mut self, term: Term) -> &mut Self {
        self.initial_knowledge.push(term);
        self
    }

    /// `inversekeys(k, k⁻¹)` / `inversekeyfunctions(f, f⁻¹)` declaration.
    /// Pass the same term twice to declare a symmetric key.
    pub fn inverse_keys(&mut self, a: Term, b: Term) -> &mut Self {
        if let Some(leaf) = a.leaf() {
            self.scope_key_use(leaf.symbol);
        }
        if let Some(leaf) = b.leaf() {
            self.scope_key_use(leaf.symbol);
        }
        self.inverse_pairs.push((a, b));
        self
    }

    fn scope_key_use(&mut self, symbol: Symbol) {
        self.key_uses.push(symbol);
    }

    /// The `inversekeys`/`inversekeyfunctions` pairs declared so far, for a
    /// caller to fold into a `scy_know::InverseKeyTable` and install on a
    /// `scy_model::Verifier` before any run is spawned. Kept as raw pairs
    /// rather than a built table here since `scy_know` sits below this
    /// crate's own dependencies (§9a's layering keeps the parser stand-in
    /// thin: `scy_base`, `scy_term`, `scy_model` only).
    pub fn inverse_pairs(&self) -> &[(Term, Term)] {
        &self.inverse_pairs
    }

    /// Starts building a role; call [`ProtocolBuilder::add_role`] once its
    /// events are in place.
    pub fn role(&mut self, name: &str) -> RoleBuilder<'_> {
        let symbol = self.interner.intern(name);
        RoleBuilder {
            interner: &mut *self.interner,
            role: Role::new(symbol),
            fresh_counter: &mut self.fresh_counter,
            role_template_symbols: &mut self.role_template_symbols,
        }
    }

    /// Commits a finished role to the protocol, recording its claims'
    /// labels and preceding-label sets, and resolving a duplicate claim
    /// label per §9's adopted resolution: suffix with `#n` and record a
    /// non-fatal [`Diagnostic::LabelCollision`].
    pub fn add_role(&mut self, mut role: Role) {
        for event in role.events.iter_mut() {
            if let RoleEvent::Claim { label, .. } = event {
                let count = self.seen_labels.entry(*label).or_insert(0);
                *count += 1;
                if *count > 1 {
                    let original = *label;
                    let renamed_name = format!("{}#{}", self.interner.resolve(original), count);
                    let renamed = self.interner.intern(&renamed_name);
                    *label = renamed;
                    self.diagnostics.push(Diagnostic::LabelCollision { original, renamed });
                }
            }
        }
        self.roles.push(role);
    }

    /// Compiles the declared roles into a [`Protocol`], a [`LabelTable`] of
    /// label occurrences, a [`ScopeTable`] recording every key-used symbol
    /// (to be merged into a [`scy_model::Verifier`]'s own scope table
    /// before search), and any non-fatal diagnostics collected along the
    /// way.
    pub fn compile(self) -> (Protocol, LabelTable, ScopeTable, Vec<Diagnostic>) {
        let mut protocol = Protocol::new(self.name);
        protocol.roles = self.roles;
        protocol.initial_knowledge = self.initial_knowledge;

        let mut labels = LabelTable::new();
        for (role_index, role) in protocol.roles.iter().enumerate() {
            for (step, event) in role.events.iter().enumerate() {
                labels.record(event.label(), role_index, step);
            }
        }

        let mut scope = ScopeTable::new();
        for symbol in &self.global_symbols {
            scope.set_scope(*symbol, ScopeLevel::Global);
        }
        for symbol in &self.role_template_symbols {
            scope.set_scope(*symbol, ScopeLevel::RoleTemplate);
        }
        for symbol in &self.key_uses {
            scope.mark_key_use(*symbol);
        }

        (protocol, labels, scope, self.diagnostics)
    }

    /// Every claim in the compiled roles, addressed by `(role_index, step)`
    /// and paired with the labels of every send/recv event preceding it on
    /// the same role — used to seed [`Claim::precedence_labels`] once a
    /// caller knows which [`scy_model::Protocol`] index this builder's
    /// output landed at.
    pub fn claims(&self, protocol_index: usize) -> Vec<Claim> {
        let mut claims = Vec::new();
        for (role_index, role) in self.roles.iter().enumerate() {
            let mut preceding = Vec::new();
            for (step, event) in role.events.iter().enumerate() {
                match event {
                    RoleEvent::Claim { kind, .. } => {
                        claims.push(Claim {
                            protocol_index,
                            role_index,
                            step,
                            kind: *kind,
                            precedence_labels: preceding.clone(),
                        });
                    }
                    _ => preceding.push(event.label()),
                }
            }
        }
        claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_role_compiles_with_one_send() {
        let mut interner = Interner::new();
        let mut builder = ProtocolBuilder::new(&mut interner, "ping");
        let agent = builder.usertype("Agent");
        let a = builder.constant("A", &[agent]);
        let mut initiator = builder.role("Initiator");
        initiator.send("l1", a.clone(), a.clone(), a.clone());
        builder.add_role(initiator.finish());
        let (protocol, labels, _scope, diagnostics) = builder.compile();
        assert_eq!(protocol.roles.len(), 1);
        assert!(diagnostics.is_empty());
        assert_eq!(labels.occurrences(interner.lookup("l1").unwrap()).len(), 1);
    }

    #[test]
    fn duplicate_claim_label_is_suffixed_with_a_warning() {
        let mut interner = Interner::new();
        let mut builder = ProtocolBuilder::new(&mut interner, "p");
        let mut r1 = builder.role("R1");
        r1.claim("dup", ClaimKind::Reachable, None);
        builder.add_role(r1.finish());
        let mut r2 = builder.role("R2");
        r2.claim("dup", ClaimKind::Reachable, None);
        builder.add_role(r2.finish());
        assert_eq!(builder.diagnostics.len(), 1);
        let (protocol, _labels, _scope, diagnostics) = builder.compile();
        assert_eq!(diagnostics.len(), 1);
        match &protocol.roles[1].events[0] {
            RoleEvent::Claim { label, .. } => {
                assert_eq!(interner.resolve(*label), "dup#2");
            }
            _ => panic!("expected a claim event"),
        }
    }

    #[test]
    fn match_equal_desugars_to_a_send_recv_pair_over_a_fresh_key() {
        let mut interner = Interner::new();
        let mut builder = ProtocolBuilder::new(&mut interner, "p");
        let agent = builder.usertype("Agent");
        let a = builder.constant("A", &[agent]);
        let mut role = builder.role("Checker");
        let pattern = role.local("x", &[]);
        let term = a.clone();
        role.match_equal("eq", a.clone(), a.clone(), pattern, term);
        let finished = role.finish();
        assert_eq!(finished.len(), 2);
        assert!(finished.events[0].is_send());
        assert!(finished.events[1].is_recv());
    }
}
