//! # Dialog Editor
//!
//! The authoring core for branching conversation graphs. This crate wraps the
//! `dialog_model` types in an editing session, checks trees for consistency,
//! lays them out, and moves them in and out of storage.
//!
//! ## Core Components
//!
//! - **store**: the single authoritative tree plus editor session (selection, positions, dirty flag)
//! - **validation**: blocking errors and advisory warnings for a tree snapshot
//! - **layout**: deterministic layered positions from graph structure alone
//! - **persistence**: validation-gated load, save, and export of canonical documents
//! - **scheduler**: debounced, cancellable validation passes per session
//! - **events**: change notifications published after every store command
//!
//! ## Design Philosophy
//!
//! - **Command/Query Split**: commands mutate and invalidate derived state; queries pull fresh results
//! - **Pure Core**: validation and layout never do I/O and always agree for the same snapshot
//! - **Injected Ports**: confirmation prompts and notifications are traits, so nothing needs a UI to test

pub mod config;
pub mod events;
pub mod layout;
pub mod persistence;
pub mod scheduler;
pub mod store;
pub mod traversal;
pub mod validation;

pub use config::*;
pub use events::*;
pub use layout::*;
pub use persistence::*;
pub use scheduler::*;
pub use store::*;
pub use validation::*;

pub use dialog_model::{
    DialogNode, DialogTree, MoveDirection, MutationError, NodeId, Portrait, Response,
};
