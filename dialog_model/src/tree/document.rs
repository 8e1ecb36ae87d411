//! Canonical JSON document shape shared with the game runtime.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::DialogTree;
use crate::error::ModelError;
use crate::node::{DialogNode, NodeId, Portrait};

/// The tree as it appears on disk, before the key/id invariant is checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    pub id: String,
    #[serde(default)]
    pub character_name: String,
    #[serde(default)]
    pub portrait: Portrait,
    #[serde(default)]
    pub start_node_id: NodeId,
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, DialogNode>,
}

impl TryFrom<TreeDocument> for DialogTree {
    type Error = ModelError;

    fn try_from(doc: TreeDocument) -> Result<Self, Self::Error> {
        if let Some((key, node)) = doc.nodes.iter().find(|(key, node)| *key != node.id()) {
            return Err(ModelError::IdMismatch {
                key: key.clone(),
                id: node.id().clone(),
            });
        }

        Ok(DialogTree {
            id: doc.id,
            character_name: doc.character_name,
            portrait: doc.portrait,
            start_node_id: doc.start_node_id,
            nodes: doc.nodes,
        })
    }
}

impl DialogTree {
    /// Parse a canonical document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Render the canonical document: pretty-printed, nodes in id order.
    ///
    /// Two structurally equal trees always render to the same bytes.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
