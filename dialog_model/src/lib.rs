//! # Dialog Model
//!
//! The data model for branching conversation graphs ("dialog trees"). This crate
//! is the single source of truth for what a tree *is*: nodes, ordered responses,
//! portraits, and the canonical JSON document shape consumed by the game runtime.
//! It performs no I/O and knows nothing about editing sessions.

pub mod error;
pub mod node;
pub mod tree;

pub use error::*;
pub use node::*;
pub use tree::*;
