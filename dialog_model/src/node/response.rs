//! Player-facing response choices.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A player-facing choice. Leads to another node, or ends the conversation
/// when `next_node_id` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub text: String,
    pub next_node_id: Option<NodeId>,
}

impl Response {
    /// A response leading to `next`.
    pub fn new(text: impl Into<String>, next: impl Into<NodeId>) -> Self {
        Self {
            text: text.into(),
            next_node_id: Some(next.into()),
        }
    }

    /// A response that ends the conversation.
    pub fn terminal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next_node_id: None,
        }
    }

    /// Check if choosing this response ends the conversation.
    pub fn is_terminal(&self) -> bool {
        self.next_node_id.is_none()
    }

    /// Check if this response points at `id`.
    pub fn targets(&self, id: &NodeId) -> bool {
        self.next_node_id.as_ref() == Some(id)
    }
}
