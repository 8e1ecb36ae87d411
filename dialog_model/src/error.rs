//! Errors raised by structural edits and document parsing.

use thiserror::Error;

use crate::node::NodeId;

/// Caller misuse of the mutation API.
///
/// These are explicit failures rather than silent no-ops so editing code can
/// surface them and tests can assert on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("a node with id \"{0}\" already exists")]
    DuplicateId(NodeId),

    #[error("no node with id \"{0}\"")]
    UnknownNode(NodeId),

    #[error("response index {index} is out of range for node \"{node_id}\" ({len} responses)")]
    IndexOutOfRange {
        node_id: NodeId,
        index: usize,
        len: usize,
    },
}

/// A document that parses as JSON but violates a model invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("node stored under key \"{key}\" declares id \"{id}\"")]
    IdMismatch { key: NodeId, id: NodeId },
}
