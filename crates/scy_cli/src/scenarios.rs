//! Built-in demonstration protocols, since this tool has no concrete-syntax
//! parser of its own (§6): each one is built programmatically with
//! [`scy_spdl::ProtocolBuilder`] rather than read from a file.

use scy_base::Interner;
use scy_model::{ClaimKind, Protocol, LabelTable};
use scy_term::{Term, ScopeTable};
use scy_spdl::ProtocolBuilder;

pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn(&mut Interner) -> (Protocol, LabelTable, ScopeTable, Vec<(Term, Term)>),
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario { name: "ns", description: "Needham-Schroeder public key protocol (vulnerable to Lowe's attack)", build: needham_schroeder },
    Scenario { name: "ns-lowe", description: "Needham-Schroeder-Lowe, the fixed variant naming the responder in message 2", build: needham_schroeder_lowe },
    Scenario { name: "always-true", description: "a claim whose secret parameter is never received, verified without search", build: always_true_secret },
];

pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

/// `A -> B: {Na, A}pk(B)`, `B -> A: {Na, Nb}pk(A)`, `A -> B: {Nb}pk(B)`,
/// each role claiming secrecy of its own nonce. Lowe's man-in-the-middle
/// attack lets the intruder learn `Nb` by relaying B's identity unchanged
/// in message 2, so the responder's Secret claim on `Nb` is falsifiable.
fn needham_schroeder(interner: &mut Interner) -> (Protocol, LabelTable, ScopeTable, Vec<(Term, Term)>) {
    build_ns(interner, false)
}

/// The Lowe fix: message 2 becomes `{Na, Nb, B}pk(A)`, binding the
/// responder's identity into the encrypted payload so the relay no longer
/// unifies and both nonce-secrecy claims hold.
fn needham_schroeder_lowe(interner: &mut Interner) -> (Protocol, LabelTable, ScopeTable, Vec<(Term, Term)>) {
    build_ns(interner, true)
}

fn build_ns(interner: &mut Interner, lowe_fix: bool) -> (Protocol, LabelTable, ScopeTable, Vec<(Term, Term)>) {
    let mut builder = ProtocolBuilder::new(interner, if lowe_fix { "ns-lowe" } else { "ns" });
    let agent = builder.usertype("Agent");
    let nonce = builder.usertype("Nonce");
    let pk = builder.usertype("PublicKey");
    let sk = builder.usertype("SecretKey");

    let a = builder.constant("A", &[agent]);
    let b = builder.constant("B", &[agent]);
    let pk_a = builder.constant("pk_A", &[pk]);
    let pk_b = builder.constant("pk_B", &[pk]);
    let sk_a = builder.constant("sk_A", &[sk]);
    let sk_b = builder.constant("sk_B", &[sk]);
    builder.inverse_keys(pk_a.clone(), sk_a.clone());
    builder.inverse_keys(pk_b.clone(), sk_b.clone());

    let mut initiator = builder.role("Initiator");
    let na = initiator.local("Na", &[nonce]);
    initiator.send("i1", a.clone(), b.clone(), Term::encrypt(Term::tuple(na.clone(), a.clone()), pk_b.clone()));
    let nb_recv = initiator.local("Nb", &[nonce]);
    let msg2_pattern = if lowe_fix {
        Term::tuple(na.clone(), Term::tuple(nb_recv.clone(), b.clone()))
    } else {
        Term::tuple(na.clone(), nb_recv.clone())
    };
    initiator.recv("i2", b.clone(), a.clone(), Term::encrypt(msg2_pattern, pk_a.clone()));
    initiator.send("i3", a.clone(), b.clone(), Term::encrypt(nb_recv.clone(), pk_b.clone()));
    initiator.claim("i_secret_na", ClaimKind::Secret, Some(na));
    let initiator = initiator.finish();

    let mut responder = builder.role("Responder");
    let na_recv = responder.local("Na", &[nonce]);
    responder.recv("r1", a.clone(), b.clone(), Term::encrypt(Term::tuple(na_recv.clone(), a.clone()), pk_b.clone()));
    let nb = responder.local("Nb", &[nonce]);
    let msg2_out = if lowe_fix {
        Term::tuple(na_recv.clone(), Term::tuple(nb.clone(), b.clone()))
    } else {
        Term::tuple(na_recv.clone(), nb.clone())
    };
    responder.send("r2", b.clone(), a.clone(), Term::encrypt(msg2_out, pk_a.clone()));
    responder.recv("r3", a.clone(), b.clone(), Term::encrypt(nb.clone(), pk_b.clone()));
    responder.claim("r_secret_nb", ClaimKind::Secret, Some(nb));
    let responder = responder.finish();

    builder.add_role(initiator);
    builder.add_role(responder);

    let inverse_pairs = builder.inverse_pairs().to_vec();
    let (protocol, labels, scope, _diagnostics) = builder.compile();
    (protocol, labels, scope, inverse_pairs)
}

fn always_true_secret(interner: &mut Interner) -> (Protocol, LabelTable, ScopeTable, Vec<(Term, Term)>) {
    let mut builder = ProtocolBuilder::new(interner, "always-true");
    let mut role = builder.role("Solo");
    let secret = role.local("Hidden", &[]);
    role.claim("hidden", ClaimKind::Secret, Some(secret));
    builder.add_role(role.finish());
    let (protocol, labels, scope, _diagnostics) = builder.compile();
    (protocol, labels, scope, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_builds_at_least_one_role() {
        for scenario in SCENARIOS {
            let mut interner = Interner::new();
            let (protocol, _labels, _scope, _inverse) = (scenario.build)(&mut interner);
            assert!(!protocol.roles.is_empty(), "{} built no roles", scenario.name);
        }
    }

    #[test]
    fn find_looks_up_by_name() {
        assert!(find("ns-lowe").is_some());
        assert!(find("nonexistent").is_none());
    }
}
