//! Dialog tree - the complete branching conversation for one character.

mod document;

pub use document::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MutationError;
use crate::node::{DialogNode, NodeId, Portrait};

/// Id given to the single node of a freshly created tree.
pub const TEMPLATE_START_ID: &str = "start";

/// The complete branching-conversation document for one character.
///
/// Nodes are keyed by their own id and the map is never handed out for direct
/// insertion, so a key always equals the id of the node stored under it.
/// Iteration is in key order, which keeps layout and export deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TreeDocument")]
pub struct DialogTree {
    pub id: String,
    pub character_name: String,
    pub portrait: Portrait,
    start_node_id: NodeId,
    nodes: BTreeMap<NodeId, DialogNode>,
}

impl DialogTree {
    /// Create a tree with no nodes. The start reference is empty until the
    /// first call to [`DialogTree::set_start_node`].
    pub fn new(id: impl Into<String>, character_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            character_name: character_name.into(),
            portrait: Portrait::default(),
            start_node_id: NodeId::default(),
            nodes: BTreeMap::new(),
        }
    }

    /// The minimal template: one empty start node.
    pub fn template() -> Self {
        let start = NodeId::from(TEMPLATE_START_ID);
        let mut nodes = BTreeMap::new();
        nodes.insert(start.clone(), DialogNode::new(start.clone()));
        Self {
            id: "new_dialog".to_owned(),
            character_name: "New Character".to_owned(),
            portrait: Portrait::default(),
            start_node_id: start,
            nodes,
        }
    }

    pub fn with_portrait(mut self, portrait: Portrait) -> Self {
        self.portrait = portrait;
        self
    }

    pub fn start_node_id(&self) -> &NodeId {
        &self.start_node_id
    }

    /// The start node, if the start reference resolves.
    pub fn start_node(&self) -> Option<&DialogNode> {
        self.nodes.get(&self.start_node_id)
    }

    pub fn set_start_node(&mut self, id: &str) -> Result<(), MutationError> {
        let (key, _) = self
            .nodes
            .get_key_value(id)
            .ok_or_else(|| MutationError::UnknownNode(id.into()))?;
        self.start_node_id = key.clone();
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&DialogNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Result<&mut DialogNode, MutationError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| MutationError::UnknownNode(id.into()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &DialogNode> {
        self.nodes.values()
    }

    /// All node ids in sorted order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create an empty node under `id`.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> Result<&mut DialogNode, MutationError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(MutationError::DuplicateId(id));
        }
        Ok(self
            .nodes
            .entry(id.clone())
            .or_insert_with(|| DialogNode::new(id)))
    }

    /// Insert a fully built node, keyed by its own id.
    pub fn insert(&mut self, node: DialogNode) -> Result<(), MutationError> {
        if self.nodes.contains_key(node.id()) {
            return Err(MutationError::DuplicateId(node.id().clone()));
        }
        self.nodes.insert(node.id().clone(), node);
        Ok(())
    }

    /// Remove a node and turn every response that pointed at it into a
    /// terminal response.
    ///
    /// The start reference is left as-is, even when it named the removed node.
    /// Returns the removed node and the number of responses rewritten.
    pub fn remove_node(&mut self, id: &str) -> Result<(DialogNode, usize), MutationError> {
        let removed = self
            .nodes
            .remove(id)
            .ok_or_else(|| MutationError::UnknownNode(id.into()))?;

        let rewritten = self
            .nodes
            .values_mut()
            .map(|node| node.detach_target(removed.id()))
            .sum();

        Ok((removed, rewritten))
    }

    /// Ids of nodes holding at least one response that points at `id`.
    pub fn referrers(&self, id: &str) -> Vec<&NodeId> {
        self.nodes
            .values()
            .filter(|node| node.successors().any(|next| next.as_str() == id))
            .map(DialogNode::id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Response;

    fn branching_tree() -> DialogTree {
        let mut tree = DialogTree::new("guard", "Gate Guard");
        tree.insert(
            DialogNode::new("start")
                .with_message("Halt!")
                .with_response(Response::new("Who goes there?", "ask"))
                .with_response(Response::new("Let me through", "deny")),
        )
        .unwrap();
        tree.insert(
            DialogNode::new("ask")
                .with_message("The king's guard.")
                .with_response(Response::new("Sorry", "deny")),
        )
        .unwrap();
        tree.insert(DialogNode::new("deny").with_message("Move along."))
            .unwrap();
        tree.set_start_node("start").unwrap();
        tree
    }

    #[test]
    fn test_template_has_single_start_node() {
        let tree = DialogTree::template();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.start_node_id().as_str(), TEMPLATE_START_ID);
        let start = tree.start_node().unwrap();
        assert!(start.message.is_empty());
        assert!(start.responses.is_empty());
    }

    #[test]
    fn test_add_node_rejects_duplicate() {
        let mut tree = branching_tree();
        let err = tree.add_node("ask").unwrap_err();
        assert_eq!(err, MutationError::DuplicateId(NodeId::from("ask")));

        tree.add_node("fresh").unwrap();
        assert_eq!(tree.node("fresh").unwrap().id().as_str(), "fresh");
    }

    #[test]
    fn test_set_start_node_requires_existing_node() {
        let mut tree = branching_tree();
        assert_eq!(
            tree.set_start_node("nowhere"),
            Err(MutationError::UnknownNode(NodeId::from("nowhere")))
        );
        assert_eq!(tree.start_node_id().as_str(), "start");

        tree.set_start_node("ask").unwrap();
        assert_eq!(tree.start_node_id().as_str(), "ask");
    }

    #[test]
    fn test_remove_node_rewrites_incoming_responses() {
        let mut tree = branching_tree();
        let (removed, rewritten) = tree.remove_node("deny").unwrap();

        assert_eq!(removed.id().as_str(), "deny");
        assert_eq!(rewritten, 2);
        assert!(tree.referrers("deny").is_empty());
        assert!(tree.node("ask").unwrap().responses[0].is_terminal());
        assert!(tree.node("start").unwrap().responses[1].is_terminal());
        // Untouched edges survive.
        assert!(tree.node("start").unwrap().responses[0].targets(&NodeId::from("ask")));
    }

    #[test]
    fn test_remove_start_node_leaves_reference_dangling() {
        let mut tree = branching_tree();
        tree.remove_node("start").unwrap();
        assert_eq!(tree.start_node_id().as_str(), "start");
        assert!(tree.start_node().is_none());
    }

    #[test]
    fn test_remove_unknown_node() {
        let mut tree = branching_tree();
        assert!(matches!(
            tree.remove_node("ghost"),
            Err(MutationError::UnknownNode(_))
        ));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_referrers() {
        let tree = branching_tree();
        let referrers: Vec<_> = tree.referrers("deny").into_iter().map(NodeId::as_str).collect();
        assert_eq!(referrers, vec!["ask", "start"]);
    }
}
