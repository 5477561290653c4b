#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-model
//!
//! The protocol/role/run model: static [`Protocol`]/[`Role`] templates,
//! live [`Run`] instances, the [`DependencyGraph`] precedence relation, the
//! outstanding-receive [`ObligationList`], claim/label bookkeeping, and the
//! [`Verifier`] context that owns all of it for one verification session.

mod claim;
mod config;
mod error;
mod graph;
mod obligation;
mod protocol;
mod run;
mod verifier;

pub use claim::{Claim, LabelTable};
pub use config::{Bounds, CompromiseConfig, LongTermKeyReveal, PartnerDef, PruneMode};
pub use error::{Bound, Result, VerifierError};
pub use graph::{DependencyGraph, EventId};
pub use obligation::{Obligation, ObligationList};
pub use protocol::{ClaimKind, Protocol, Role, RoleEvent};
pub use run::{Run, Step, TraceEntry};
pub use verifier::{Diagnostic, Verifier};
