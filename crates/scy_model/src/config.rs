//! Search bounds and the compromise (adversary power) model (component J
//! config surface), mirroring the switch set the parser/CLI collaborators
//! populate before a run starts.

use std::time::Duration;

/// How much of the search space to cover before giving up, independent of
/// wall-clock time.
#[derive(Clone, Debug)]
pub struct Bounds {
    pub max_proof_depth: Option<u32>,
    pub max_trace_length: Option<u32>,
    pub max_runs: Option<u32>,
    pub max_attacks: Option<u32>,
    pub max_of_role: Option<u32>,
    pub max_intruder_actions: Option<u32>,
    pub one_role_per_agent: bool,
    pub time_limit: Option<Duration>,
    /// Round-tripped experimental-switches bitmask; carried for compatibility
    /// with project files but not consulted by any prune rule.
    pub experimental: u32,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            max_proof_depth: None,
            max_trace_length: None,
            max_runs: None,
            max_attacks: Some(1),
            max_of_role: None,
            max_intruder_actions: None,
            one_role_per_agent: false,
            time_limit: None,
            experimental: 0,
        }
    }
}

/// Who the intruder may learn long-term keys from (Long-term Key Reveal),
/// and the two further channel-compromise flags (Session-Key Reveal,
/// Session-State Reveal).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum LongTermKeyReveal {
    #[default]
    None,
    Others,
    Actor,
    After,
}

#[derive(Clone, Debug, Default)]
pub struct CompromiseConfig {
    pub lkr: LongTermKeyReveal,
    pub session_key_reveal: bool,
    pub session_state_reveal: bool,
}

/// The six ways two runs of different roles can be considered partnered
/// for an agreement claim, from loosest to strictest.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PartnerDef {
    NoPartnering,
    MatchingHistory,
    MatchingCommunication,
    SameLabel,
    SameParameters,
    Strict,
}

/// Which pruning families are active during search.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PruneMode {
    pub bounds: bool,
    pub theorems: bool,
    pub claim_specific: bool,
}

impl PruneMode {
    pub fn all() -> Self {
        PruneMode { bounds: true, theorems: true, claim_specific: true }
    }
}
