//! Command-line switches (§9a "Configuration"): one flat `clap` derive
//! struct covering the bounds/compromise/heuristic table one-for-one,
//! mirroring the teacher's `#[derive(Parser)]` style in `cli.rs` even
//! though this tool has no subcommands of its own — a verification run
//! is the program's only mode, not one of several build-tool actions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use scy_model::{Bounds, CompromiseConfig, LongTermKeyReveal, PartnerDef, PruneMode};
use scy_search::driver::SearchConfig;
use scy_search::heuristic::{DEFAULT_HEURISTIC, HeuristicConfig};
use scy_unify::MatchMode;

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum MatchModeArg {
    Strict,
    Basic,
    Arbitrary,
}

impl From<MatchModeArg> for MatchMode {
    fn from(value: MatchModeArg) -> Self {
        match value {
            MatchModeArg::Strict => MatchMode::Strict,
            MatchModeArg::Basic => MatchMode::BasicTypeFlaw,
            MatchModeArg::Arbitrary => MatchMode::ArbitraryTypeFlaw,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum LkrArg {
    None,
    Others,
    Actor,
    After,
}

impl From<LkrArg> for LongTermKeyReveal {
    fn from(value: LkrArg) -> Self {
        match value {
            LkrArg::None => LongTermKeyReveal::None,
            LkrArg::Others => LongTermKeyReveal::Others,
            LkrArg::Actor => LongTermKeyReveal::Actor,
            LkrArg::After => LongTermKeyReveal::After,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum PartnerDefArg {
    NoPartnering,
    MatchingHistory,
    MatchingCommunication,
    SameLabel,
    SameParameters,
    Strict,
}

impl From<PartnerDefArg> for PartnerDef {
    fn from(value: PartnerDefArg) -> Self {
        match value {
            PartnerDefArg::NoPartnering => PartnerDef::NoPartnering,
            PartnerDefArg::MatchingHistory => PartnerDef::MatchingHistory,
            PartnerDefArg::MatchingCommunication => PartnerDef::MatchingCommunication,
            PartnerDefArg::SameLabel => PartnerDef::SameLabel,
            PartnerDefArg::SameParameters => PartnerDef::SameParameters,
            PartnerDefArg::Strict => PartnerDef::Strict,
        }
    }
}

/// Verifies claims in one of the built-in demonstration protocols (see
/// `scenarios.rs`) or, with `--project`, a directory carrying a project
/// manifest (`Scy.toml`) that sets these same switches' defaults.
#[derive(Parser, Debug)]
#[command(name = "scy")]
#[command(about = "Symbolic Dolev-Yao protocol claim checker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Name of a built-in demonstration protocol (see `scy --list`).
    #[arg(default_value = "ns-lowe")]
    pub protocol: String,

    /// Lists the built-in demonstration protocols and exits.
    #[arg(long)]
    pub list: bool,

    /// Directory carrying a `Scy.toml` project manifest whose `[bounds]`
    /// and `[compromise]` tables seed these switches before CLI flags
    /// override them.
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Type-flaw matching mode used when unifying a goal against a
    /// candidate binding.
    #[arg(long, value_enum, default_value = "arbitrary")]
    pub r#match: MatchModeArg,

    #[arg(long)]
    pub max_runs: Option<u32>,

    #[arg(long)]
    pub max_proof_depth: Option<u32>,

    #[arg(long)]
    pub max_trace_length: Option<u32>,

    #[arg(long)]
    pub max_attacks: Option<u32>,

    #[arg(long)]
    pub max_intruder_actions: Option<u32>,

    #[arg(long, value_delimiter = ',', default_values_t = [true, true, true])]
    pub prune: Vec<bool>,

    /// Bitmask selecting the heuristic's active sub-scores (§4.K); see
    /// `scy_search::heuristic` for the bit layout.
    #[arg(long, default_value_t = DEFAULT_HEURISTIC)]
    pub heuristic: u32,

    /// Selects goals uniformly at random (seeded by `--seed`) instead of
    /// by the `--heuristic` score.
    #[arg(long)]
    pub random_heuristic: bool,

    #[arg(long, value_enum, default_value = "none")]
    pub lkr: LkrArg,

    /// Session-Key Reveal: the intruder may learn a run's session key
    /// once that run has reached its Commit/claim event.
    #[arg(long)]
    pub skr: bool,

    /// Session-State Reveal: the intruder may learn a run's local state
    /// (nonces generated so far) before it completes.
    #[arg(long)]
    pub ssr: bool,

    #[arg(long, value_enum, default_value = "matching-history")]
    pub partner_def: PartnerDefArg,

    /// Only check claims on roles of protocols whose name contains this
    /// substring (case-sensitive).
    #[arg(long)]
    pub filter_protocol: Option<String>,

    /// Only check claims whose label contains this substring.
    #[arg(long)]
    pub filter_label: Option<String>,

    /// Seed for the heuristic's random-selection mode and any other
    /// reproducible randomness.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Wall-clock budget per claim, in seconds.
    #[arg(long)]
    pub time_limit: Option<u64>,

    /// Enables progress logging (protocol loaded, claim N/M, elapsed
    /// time) via `env_logger`.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            max_proof_depth: self.max_proof_depth,
            max_trace_length: self.max_trace_length,
            max_runs: self.max_runs,
            max_attacks: self.max_attacks.or(Some(1)),
            max_of_role: None,
            max_intruder_actions: self.max_intruder_actions,
            one_role_per_agent: false,
            time_limit: self.time_limit.map(Duration::from_secs),
            experimental: 0,
        }
    }

    pub fn compromise(&self) -> CompromiseConfig {
        CompromiseConfig {
            lkr: self.lkr.into(),
            session_key_reveal: self.skr,
            session_state_reveal: self.ssr,
        }
    }

    pub fn prune_mode(&self) -> PruneMode {
        let mut bits = self.prune.iter().copied();
        PruneMode {
            bounds: bits.next().unwrap_or(true),
            theorems: bits.next().unwrap_or(true),
            claim_specific: bits.next().unwrap_or(true),
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            match_mode: self.r#match.into(),
            prune: self.prune_mode(),
            heuristic: HeuristicConfig { mask: self.heuristic, random: self.random_heuristic },
            adversary_tupling: true,
        }
    }

    pub fn partner_def(&self) -> PartnerDef {
        self.partner_def.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_bounds_caps_attacks_at_one() {
        let cli = Cli::parse_from(["scy"]);
        assert_eq!(cli.bounds().max_attacks, Some(1));
        assert_eq!(cli.prune_mode(), PruneMode::all());
    }

    #[test]
    fn match_mode_flag_maps_to_the_core_enum() {
        let cli = Cli::parse_from(["scy", "--match", "strict"]);
        assert_eq!(MatchMode::from(cli.r#match), MatchMode::Strict);
    }
}
