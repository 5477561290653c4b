#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-unify
//!
//! The most-general unifier ([`unify`], [`unify_with`], [`unifiable`]), its
//! subterm-modulo-decryption extension ([`subterm_unify`]), and the
//! [`BindingStack`] that carries substitution state without mutating a
//! `Term`.

mod binding;
mod mode;
mod subterm;
mod unify;

pub use binding::{BindingStack, UntypedBindCaveat};
pub use mode::{goodsubst, MatchMode};
pub use subterm::subterm_unify;
pub use unify::{unifiable, unify, unify_with};
