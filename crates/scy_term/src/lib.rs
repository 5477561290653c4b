#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-term
//!
//! The Dolev-Yao term algebra: symbols, variables, tuples and encryptions,
//! plus the scope/key-level metadata the search heuristic consults.
//!
//! # Core Insight
//!
//! Every message the verifier reasons about is a [`Term`]:
//! - Agent names, nonces, keys are constant or variable leaves
//! - Concatenated messages are [`Term::tuple`]
//! - Encrypted or hashed messages are [`Term::encrypt`] / [`Term::fcall`]
//!
//! # No Mutable Substitution
//!
//! A `Term` never carries a substitution pointer. `devar`, `term_equal` and
//! `occurs` all take a [`Substitution`] view so that variable bindings live
//! in the unifier's binding stack, not in the term tree itself — see
//! [`substitution`] for why.
//!
//! # Public API
//!
//! - [`Term`] — the term tree
//! - [`Leaf`] / [`leaf::VarId`] — the atoms terms are built from
//! - [`Substitution`] — the binding-lookup seam
//! - [`ScopeTable`] — per-symbol scope and key-use metadata

pub mod leaf;
pub mod scope;
pub mod substitution;
mod term;

pub use leaf::{Leaf, LeafKind, VarId, GLOBAL_SCOPE, ROLE_TEMPLATE_SCOPE};
pub use scope::{KeyLevel, ScopeLevel, ScopeTable};
pub use substitution::{NoBindings, Substitution};
pub use term::Term;
