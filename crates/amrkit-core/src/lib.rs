//! Core data model for amrkit.
//!
//! This crate holds the types every other amrkit crate shares:
//! - [`id`]: canonical positional node ids and edge ids
//! - [`graph`]: the immutable AMR graph and its builder
//! - [`alignment`]: notations and normalized alignment records
//!
//! It has no parsing logic; see `amrkit-parser` for that.

pub mod alignment;
pub mod graph;
pub mod id;
