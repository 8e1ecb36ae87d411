//! Node definitions - one conversation beat with its ordered responses.

mod portrait;
mod response;

pub use portrait::*;
pub use response::*;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::error::MutationError;

/// Identifier of a node within one tree. Permanent once created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction for adjacent-swap reordering of responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// One conversation beat: what the speaker says and how the player may answer.
///
/// Response order is semantic. It is the display order, and response indices
/// are how editors address individual edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogNode {
    id: NodeId,
    pub message: String,
    #[serde(default)]
    pub responses: Vec<Response>,
    /// Per-node override; `None` falls back to the tree's portrait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<Portrait>,
}

impl DialogNode {
    /// Create an empty node: no message, no responses, tree-default portrait.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            message: String::new(),
            responses: Vec::new(),
            portrait: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }

    pub fn with_portrait(mut self, portrait: Portrait) -> Self {
        self.portrait = Some(portrait);
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// A node ends the conversation when no response leads anywhere.
    pub fn is_terminal(&self) -> bool {
        self.responses.iter().all(Response::is_terminal)
    }

    /// Non-null response targets, in response order.
    pub fn successors(&self) -> impl Iterator<Item = &NodeId> {
        self.responses.iter().filter_map(|r| r.next_node_id.as_ref())
    }

    pub fn response(&self, index: usize) -> Result<&Response, MutationError> {
        let len = self.responses.len();
        self.responses
            .get(index)
            .ok_or_else(|| self.out_of_range(index, len))
    }

    pub fn response_mut(&mut self, index: usize) -> Result<&mut Response, MutationError> {
        let len = self.responses.len();
        if index >= len {
            return Err(self.out_of_range(index, len));
        }
        Ok(&mut self.responses[index])
    }

    /// Remove the response at `index`, shifting later responses up.
    pub fn remove_response(&mut self, index: usize) -> Result<Response, MutationError> {
        let len = self.responses.len();
        if index >= len {
            return Err(self.out_of_range(index, len));
        }
        Ok(self.responses.remove(index))
    }

    /// Swap the response at `index` with its neighbour.
    ///
    /// Moving the first response up or the last one down does nothing and
    /// returns `Ok(None)`. Otherwise returns the response's new index.
    pub fn move_response(
        &mut self,
        index: usize,
        direction: MoveDirection,
    ) -> Result<Option<usize>, MutationError> {
        let len = self.responses.len();
        if index >= len {
            return Err(self.out_of_range(index, len));
        }

        let target = match direction {
            MoveDirection::Up if index == 0 => return Ok(None),
            MoveDirection::Up => index - 1,
            MoveDirection::Down if index + 1 == len => return Ok(None),
            MoveDirection::Down => index + 1,
        };
        self.responses.swap(index, target);
        Ok(Some(target))
    }

    /// Rewrite every response pointing at `id` to end the conversation.
    ///
    /// Returns the number of responses rewritten.
    pub fn detach_target(&mut self, id: &NodeId) -> usize {
        let mut rewritten = 0;
        for response in self.responses.iter_mut().filter(|r| r.targets(id)) {
            response.next_node_id = None;
            rewritten += 1;
        }
        rewritten
    }

    fn out_of_range(&self, index: usize, len: usize) -> MutationError {
        MutationError::IndexOutOfRange {
            node_id: self.id.clone(),
            index,
            len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_choices() -> DialogNode {
        DialogNode::new("hub")
            .with_message("What now?")
            .with_response(Response::new("Fight", "fight"))
            .with_response(Response::new("Talk", "talk"))
            .with_response(Response::terminal("Leave"))
    }

    #[test]
    fn test_new_node_is_empty_and_terminal() {
        let node = DialogNode::new("a");
        assert_eq!(node.id().as_str(), "a");
        assert!(node.message.is_empty());
        assert!(node.responses.is_empty());
        assert!(node.portrait.is_none());
        assert!(node.is_terminal());
    }

    #[test]
    fn test_terminal_when_all_targets_null() {
        let node = DialogNode::new("end")
            .with_response(Response::terminal("Bye"))
            .with_response(Response::terminal("Later"));
        assert!(node.is_terminal());

        assert!(!three_choices().is_terminal());
    }

    #[test]
    fn test_successors_skip_null_targets() {
        let node = three_choices();
        let next: Vec<_> = node.successors().map(NodeId::as_str).collect();
        assert_eq!(next, vec!["fight", "talk"]);
    }

    #[test]
    fn test_move_response_swaps_neighbours() {
        let mut node = three_choices();
        assert_eq!(node.move_response(1, MoveDirection::Up), Ok(Some(0)));
        assert_eq!(node.responses[0].text, "Talk");
        assert_eq!(node.responses[1].text, "Fight");

        assert_eq!(node.move_response(1, MoveDirection::Down), Ok(Some(2)));
        assert_eq!(node.responses[2].text, "Fight");
    }

    #[test]
    fn test_move_response_at_edges_is_noop() {
        let mut node = three_choices();
        let before = node.responses.clone();

        assert_eq!(node.move_response(0, MoveDirection::Up), Ok(None));
        assert_eq!(node.move_response(2, MoveDirection::Down), Ok(None));
        assert_eq!(node.responses, before);
    }

    #[test]
    fn test_response_index_out_of_range() {
        let mut node = three_choices();
        let err = node.remove_response(3).unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfRange {
                node_id: NodeId::from("hub"),
                index: 3,
                len: 3,
            }
        );
        assert!(node.move_response(7, MoveDirection::Up).is_err());
        assert!(node.response_mut(3).is_err());
    }

    #[test]
    fn test_detach_target() {
        let mut node = three_choices().with_response(Response::new("Fight again", "fight"));
        let rewritten = node.detach_target(&NodeId::from("fight"));
        assert_eq!(rewritten, 2);
        assert!(node.responses.iter().all(|r| !r.targets(&NodeId::from("fight"))));
        assert!(node.responses[1].targets(&NodeId::from("talk")));
    }

    #[test]
    fn test_portrait_omitted_when_absent() {
        let json = serde_json::to_value(DialogNode::new("a")).unwrap();
        assert!(json.get("portrait").is_none());

        let json = serde_json::to_value(
            DialogNode::new("a").with_portrait(Portrait::new("img/a.png", "Alice")),
        )
        .unwrap();
        assert_eq!(json["portrait"]["path"], "img/a.png");
    }

    #[test]
    fn test_response_serializes_null_target() {
        let json = serde_json::to_string(&Response::terminal("Bye")).unwrap();
        assert_eq!(json, r#"{"text":"Bye","nextNodeId":null}"#);
    }
}
