//! The `Verifier` context: the single struct that owns everything a search
//! run touches, tying together the static protocol set, the live runs, the
//! dependency graph, the binding stack, and the configured bounds.

use std::rc::Rc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use scy_base::Symbol;
use scy_know::InverseKeyTable;
use scy_term::ScopeTable;
use scy_unify::BindingStack;

use crate::claim::LabelTable;
use crate::config::{Bounds, CompromiseConfig};
use crate::error::{Bound, Result, VerifierError};
use crate::graph::DependencyGraph;
use crate::obligation::ObligationList;
use crate::protocol::Protocol;
use crate::run::Run;

/// A non-fatal observation worth surfacing even though the protocol
/// compiles, e.g. a claim that is trivially true regardless of the trace,
/// or a label that had to be disambiguated by suffixing.
#[derive(Clone, Debug)]
pub enum Diagnostic {
    AlwaysTrue { protocol: Symbol, role: Symbol, step: usize },
    LabelCollision { original: Symbol, renamed: Symbol },
    /// §4.E's "untyped variable about to be unified" case: a variable with
    /// no declared sort was bound under a mode that would normally require
    /// one, so the realized pattern this diagnostic is attached to may
    /// rest on incomplete type inference.
    UntypedCaveat { symbol: Symbol, run_id: i64 },
}

/// Owns the static protocol set and all mutable search state for one
/// verification session.
pub struct Verifier {
    pub protocols: Vec<Protocol>,
    pub label_tables: Vec<LabelTable>,
    pub runs: Vec<Run>,
    pub graph: DependencyGraph,
    pub obligations: ObligationList,
    pub bindings: BindingStack,
    pub scope: ScopeTable,
    pub inverse_table: Rc<InverseKeyTable>,
    pub bounds: Bounds,
    pub compromise: CompromiseConfig,
    pub diagnostics: Vec<Diagnostic>,
    rng: StdRng,
    deadline: Option<Instant>,
    attacks_found: u32,
}

impl Verifier {
    pub fn new(bounds: Bounds, compromise: CompromiseConfig, seed: u64) -> Self {
        Verifier {
            protocols: Vec::new(),
            label_tables: Vec::new(),
            runs: Vec::new(),
            graph: DependencyGraph::new(),
            obligations: ObligationList::new(),
            bindings: BindingStack::new(),
            scope: ScopeTable::new(),
            inverse_table: Rc::new(InverseKeyTable::new()),
            bounds,
            compromise,
            diagnostics: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            deadline: None,
            attacks_found: 0,
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn add_protocol(&mut self, protocol: Protocol, labels: LabelTable) -> usize {
        self.protocols.push(protocol);
        self.label_tables.push(labels);
        self.protocols.len() - 1
    }

    pub fn spawn_run(&mut self, protocol_index: usize, role_index: usize) -> Result<usize> {
        if let Some(max_runs) = self.bounds.max_runs {
            if self.runs.len() as u32 >= max_runs {
                return Err(VerifierError::BoundExceeded(Bound::Runs));
            }
        }
        let id = self.runs.len();
        self.runs.push(Run::new(id, protocol_index, role_index, Rc::clone(&self.inverse_table)));
        Ok(id)
    }

    /// Call once, at the start of a claim's check, to arm the time budget.
    pub fn arm_deadline(&mut self) {
        self.deadline = self.bounds.time_limit.map(|limit| Instant::now() + limit);
    }

    pub fn time_limit_exceeded(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    pub fn record_attack(&mut self) -> Result<()> {
        self.attacks_found += 1;
        if let Some(max) = self.bounds.max_attacks {
            if self.attacks_found > max {
                return Err(VerifierError::BoundExceeded(Bound::Attacks));
            }
        }
        Ok(())
    }

    pub fn attacks_found(&self) -> u32 {
        self.attacks_found
    }

    /// Zeroes the attack counter; called once per claim so one claim's
    /// attacks never count against a later, unrelated claim's bound.
    pub fn reset_attacks(&mut self) {
        self.attacks_found = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_run_respects_max_runs_bound() {
        let mut bounds = Bounds::default();
        bounds.max_runs = Some(1);
        let mut verifier = Verifier::new(bounds, CompromiseConfig::default(), 0);
        assert!(verifier.spawn_run(0, 0).is_ok());
        assert!(verifier.spawn_run(0, 0).is_err());
    }

    #[test]
    fn record_attack_respects_max_attacks_bound() {
        let mut bounds = Bounds::default();
        bounds.max_attacks = Some(1);
        let mut verifier = Verifier::new(bounds, CompromiseConfig::default(), 0);
        assert!(verifier.record_attack().is_ok());
        assert!(verifier.record_attack().is_err());
    }

    #[test]
    fn same_seed_produces_same_rng_sequence() {
        use rand::Rng;
        let mut v1 = Verifier::new(Bounds::default(), CompromiseConfig::default(), 42);
        let mut v2 = Verifier::new(Bounds::default(), CompromiseConfig::default(), 42);
        let a: u32 = v1.rng().gen();
        let b: u32 = v2.rng().gen();
        assert_eq!(a, b);
    }
}
