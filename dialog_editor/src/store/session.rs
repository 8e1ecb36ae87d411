//! Ephemeral editor state. Never persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use dialog_model::NodeId;

use crate::layout::Position;
use crate::validation::ValidationReport;

/// Unique identifier for an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the editor currently has selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Response { node_id: NodeId, index: usize },
}

impl Selection {
    /// The selected node, or the node owning the selected response.
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Selection::None => None,
            Selection::Node(id) | Selection::Response { node_id: id, .. } => Some(id),
        }
    }

    pub fn response(&self) -> Option<(&NodeId, usize)> {
        match self {
            Selection::Response { node_id, index } => Some((node_id, *index)),
            _ => None,
        }
    }
}

/// Session state that rides alongside the tree.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pub node_positions: BTreeMap<NodeId, Position>,
    pub selection: Selection,
    pub is_dirty: bool,
    /// Findings for the current revision; `None` once an edit invalidates them.
    pub validation: Option<ValidationReport>,
}

impl EditorSession {
    /// Forget everything tied to the previous tree.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
