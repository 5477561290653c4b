#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-claims
//!
//! The claim checker (component N) and the attack/proof emitter
//! (component O): [`checker::check_claim`] drives one claim's Arachne
//! search and folds the result into a [`observer::ClaimResult`];
//! [`properties::claim_holds`] evaluates the agreement/liveness claim
//! kinds over a realized semi-trace; [`observer::Observer`] is the seam
//! an XML/DOT/LaTeX back-end implements to receive attacks and proofs.

pub mod checker;
pub mod observer;
pub mod properties;

pub use checker::{check_claim, ClaimTarget};
pub use observer::{Attack, ClaimResult, Observer, TextObserver};
pub use properties::claim_holds;
