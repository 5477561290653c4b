//! The attack/proof emitter (component O): a snapshot of a realized
//! semi-trace plus the `Observer` trait collaborators implement to receive
//! it, and one concrete plain-text reference implementation.

use scy_model::{EventId, Run, Verifier};
use scy_term::{Term, VarId};

/// A realizable semi-trace captured at the moment a claim's property was
/// found violated: every run involved, the concrete substitution, and the
/// precedence edges between them — enough for an XML/DOT/LaTeX back-end to
/// render the attack without reaching back into the `Verifier`.
#[derive(Clone, Debug)]
pub struct Attack {
    pub runs: Vec<Run>,
    pub bindings: Vec<(VarId, Term)>,
    pub edges: Vec<(EventId, EventId)>,
}

impl Attack {
    pub fn capture(verifier: &Verifier) -> Self {
        Attack {
            runs: verifier.runs.clone(),
            bindings: verifier.bindings.snapshot(),
            edges: verifier.graph.edges().to_vec(),
        }
    }
}

/// The result of checking one claim, mirroring §6's exit semantics.
#[derive(Clone, Debug)]
pub enum ClaimResult {
    /// Complete proof within bounds: no attack exists at all.
    Verified,
    /// No attack found before a configured bound was hit; the claim might
    /// still fail outside the explored bound.
    Bounded,
    /// At least one attack was found; carries the first one captured.
    Falsified(Attack),
    /// The time budget ran out before the search could complete or prove
    /// the claim bound-limited.
    TimeOut,
    /// The claim's term never appears in any `recv`, detected at compile
    /// time; verified without any search (§4.N, §8 scenario 6).
    AlwaysTrue,
}

/// Callbacks a collaborator implements to receive search outcomes, each
/// with a no-op default so an implementor only overrides what it needs.
pub trait Observer {
    fn on_attack(&mut self, _attack: &Attack) {}
    fn on_proof(&mut self, _depth: u32, _step_count: u32) {}
    fn on_timeout(&mut self) {}
}

/// A plain-text summary writer: the reference `Observer` this crate ships,
/// not a mandated wire format. Collects lines instead of printing directly
/// so a caller controls where they end up.
#[derive(Default)]
pub struct TextObserver {
    pub lines: Vec<String>,
}

impl Observer for TextObserver {
    fn on_attack(&mut self, attack: &Attack) {
        self.lines.push(format!(
            "attack: {} run(s), {} binding(s), {} precedence edge(s)",
            attack.runs.len(),
            attack.bindings.len(),
            attack.edges.len()
        ));
    }

    fn on_proof(&mut self, depth: u32, step_count: u32) {
        self.lines.push(format!("proof: no attack within depth {depth}, {step_count} step(s)"));
    }

    fn on_timeout(&mut self) {
        self.lines.push("time-out: no attack found within the configured time limit".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scy_model::{Bounds, CompromiseConfig};

    #[test]
    fn text_observer_records_attack_counts() {
        let verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        let attack = Attack::capture(&verifier);
        let mut observer = TextObserver::default();
        observer.on_attack(&attack);
        assert_eq!(observer.lines.len(), 1);
        assert!(observer.lines[0].starts_with("attack: 0 run(s)"));
    }

    #[test]
    fn default_observer_methods_are_no_ops() {
        struct Quiet;
        impl Observer for Quiet {}
        let mut q = Quiet;
        let verifier = Verifier::new(Bounds::default(), CompromiseConfig::default(), 0);
        q.on_attack(&Attack::capture(&verifier));
        q.on_proof(0, 0);
        q.on_timeout();
    }
}
