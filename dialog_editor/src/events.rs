//! Change notifications published by the tree store after every command.

use serde::{Deserialize, Serialize};

use dialog_model::NodeId;

/// What a store command changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    /// Nothing has happened yet.
    Opened,
    NodeAdded { id: NodeId },
    NodeDeleted { id: NodeId, rewritten: usize },
    NodeChanged { id: NodeId },
    ResponsesChanged { node_id: NodeId },
    StartNodeChanged { id: NodeId },
    TreeMetadataChanged,
    /// The whole tree was replaced by a load or a new template.
    TreeReplaced,
    /// The tree was written back to its named resource.
    Saved { name: String },
    SelectionChanged,
    PositionsChanged,
    ValidationUpdated,
}

impl StoreEvent {
    /// Check if the event alters the tree itself (and so its saved form).
    pub fn changes_tree(&self) -> bool {
        matches!(
            self,
            StoreEvent::NodeAdded { .. }
                | StoreEvent::NodeDeleted { .. }
                | StoreEvent::NodeChanged { .. }
                | StoreEvent::ResponsesChanged { .. }
                | StoreEvent::StartNodeChanged { .. }
                | StoreEvent::TreeMetadataChanged
                | StoreEvent::TreeReplaced
        )
    }
}

/// The latest change, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Tree content revision after the change.
    pub revision: u64,
    pub event: StoreEvent,
}
