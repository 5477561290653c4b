#![cfg_attr(docsrs, feature(doc_cfg))]

//! # scy-know
//!
//! Ordered term lists and finite maps over terms ([`TermList`], [`TermMap`]),
//! and the intruder [`Knowledge`] set built on top of them: basic terms,
//! composite terms, and the declared inverse-key relation ([`InverseKeyTable`]).

mod inverse;
mod knowledge;
mod termlist;
mod termmap;

pub use inverse::InverseKeyTable;
pub use knowledge::Knowledge;
pub use termlist::TermList;
pub use termmap::TermMap;
