#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-base
//!
//! Pure structural atoms shared by every crate in the verifier.
//!
//! This crate provides the one piece of foundational infrastructure every
//! higher layer needs: [`Interner`]/[`Symbol`] string interning, giving
//! O(1) equality on agent names, role names, labels and sorts instead of
//! string comparison.
//!
//! # Design Principles
//!
//! This crate has **no knowledge of protocol semantics or I/O**. It provides
//! only generic, reusable infrastructure that higher-level crates build upon.
//!
//! # Example
//!
//! ```
//! use scy_base::Interner;
//!
//! let mut interner = Interner::new();
//!
//! let hello = interner.intern("hello");
//! assert_eq!(interner.resolve(hello), "hello");
//! ```

pub mod intern;

pub use intern::{Interner, Symbol, SymbolEq};
