#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-search
//!
//! The Arachne backward, constraint-based search: goal selection, the two
//! pruning lemmas, the adversary compromise model, and the recursive
//! refinement driver.
//!
//! What a *claim* means is deliberately not known here — [`driver::DriverHooks`]
//! is the seam a claim checker implements so this crate stays generic search
//! mechanics, reusable across every claim kind.

pub mod compromise;
pub mod driver;
pub mod heuristic;
pub mod hide_level;

pub use driver::{search, DriverHooks, SearchConfig, SearchState, INTRUDER_RUN};
pub use heuristic::{select_goal, HeuristicConfig, DEFAULT_HEURISTIC};
pub use hide_level::{hide_level, HideLevel};
