//! Tree Store - the single authoritative tree plus its editing session.
//!
//! Every edit goes through a store command. Commands apply in the order they
//! are issued, mark the session dirty, drop cached validation, bump the tree
//! revision, and publish a [`Change`] to subscribers. Commands never perform
//! I/O; see [`crate::persistence`] for that.
//!
//! Commands reject caller misuse (unknown ids, bad indices, duplicate ids) with
//! a [`MutationError`] but accept states that are representable yet invalid,
//! such as a response pointing at a node that does not exist yet. Those are
//! the validator's business.

mod session;

pub use session::*;

use tokio::sync::watch;

use dialog_model::{DialogTree, MoveDirection, MutationError, NodeId, Portrait, Response};

use crate::config::{EditorConfig, LayoutConfig};
use crate::events::{Change, StoreEvent};
use crate::layout::{self, LayoutResult, Position};
use crate::scheduler::{ScheduledValidation, ValidationRequest};
use crate::validation::{ValidationReport, Validator};

pub struct TreeStore {
    id: SessionId,
    tree: DialogTree,
    session: EditorSession,
    source_name: Option<String>,
    revision: u64,
    validator: Validator,
    changes: watch::Sender<Change>,
}

impl TreeStore {
    /// Open a session on a fresh template tree.
    pub fn new(validator: Validator) -> Self {
        let (changes, _) = watch::channel(Change {
            revision: 0,
            event: StoreEvent::Opened,
        });
        Self {
            id: SessionId::new(),
            tree: DialogTree::template(),
            session: EditorSession::default(),
            source_name: None,
            revision: 0,
            validator,
            changes,
        }
    }

    /// Open a session on a template tree, validating with configured limits.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(Validator::new(config.validation.clone()))
    }

    /// Open a session on an existing tree, bound to a named resource.
    pub fn with_tree(validator: Validator, tree: DialogTree, source_name: Option<String>) -> Self {
        let mut store = Self::new(validator);
        store.tree = tree;
        store.source_name = source_name;
        store
    }

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn tree(&self) -> &DialogTree {
        &self.tree
    }

    /// An owned copy of the tree, detached from the session.
    pub fn snapshot(&self) -> DialogTree {
        self.tree.clone()
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Name of the resource the tree was loaded from or last saved to.
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Receive the latest [`Change`] after every command.
    pub fn subscribe(&self) -> watch::Receiver<Change> {
        self.changes.subscribe()
    }

    // ------------------------------------------------------------------
    // Node commands
    // ------------------------------------------------------------------

    /// Create an empty node.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> Result<(), MutationError> {
        let id = id.into();
        self.tree.add_node(id.clone())?;
        log::debug!("store: added node \"{id}\"");
        self.touch(StoreEvent::NodeAdded { id });
        Ok(())
    }

    /// Delete a node. Every response that led to it becomes terminal.
    ///
    /// Deleting the start node is allowed and leaves the start reference
    /// dangling until another start is chosen.
    pub fn delete_node(&mut self, id: &str) -> Result<(), MutationError> {
        let (removed, rewritten) = self.tree.remove_node(id)?;
        let id = removed.id().clone();

        self.session.node_positions.remove(&id);
        if self.session.selection.node_id() == Some(&id) {
            self.session.selection = Selection::None;
        }
        if self.tree.start_node_id() == &id {
            log::warn!("store: deleted start node \"{id}\"");
        }
        log::debug!("store: deleted node \"{id}\", {rewritten} responses now terminal");
        self.touch(StoreEvent::NodeDeleted { id, rewritten });
        Ok(())
    }

    pub fn update_node_message(
        &mut self,
        id: &str,
        message: impl Into<String>,
    ) -> Result<(), MutationError> {
        let node = self.tree.node_mut(id)?;
        node.message = message.into();
        let id = node.id().clone();
        self.touch(StoreEvent::NodeChanged { id });
        Ok(())
    }

    /// Set or clear (with `None`) a node's portrait override.
    pub fn update_node_portrait(
        &mut self,
        id: &str,
        portrait: Option<Portrait>,
    ) -> Result<(), MutationError> {
        let node = self.tree.node_mut(id)?;
        node.portrait = portrait;
        let id = node.id().clone();
        self.touch(StoreEvent::NodeChanged { id });
        Ok(())
    }

    pub fn set_start_node(&mut self, id: &str) -> Result<(), MutationError> {
        self.tree.set_start_node(id)?;
        let id = self.tree.start_node_id().clone();
        log::debug!("store: start node is now \"{id}\"");
        self.touch(StoreEvent::StartNodeChanged { id });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Response commands
    // ------------------------------------------------------------------

    /// Append an empty, terminal response.
    pub fn add_response(&mut self, node_id: &str) -> Result<(), MutationError> {
        let node = self.tree.node_mut(node_id)?;
        node.responses.push(Response::default());
        let node_id = node.id().clone();
        self.touch(StoreEvent::ResponsesChanged { node_id });
        Ok(())
    }

    /// Replace the text and target of one response.
    pub fn update_response(
        &mut self,
        node_id: &str,
        index: usize,
        text: impl Into<String>,
        next_node_id: Option<NodeId>,
    ) -> Result<(), MutationError> {
        let node = self.tree.node_mut(node_id)?;
        let response = node.response_mut(index)?;
        response.text = text.into();
        response.next_node_id = next_node_id;
        let node_id = node.id().clone();
        self.touch(StoreEvent::ResponsesChanged { node_id });
        Ok(())
    }

    pub fn delete_response(&mut self, node_id: &str, index: usize) -> Result<(), MutationError> {
        let node = self.tree.node_mut(node_id)?;
        node.remove_response(index)?;
        let node_id = node.id().clone();

        if let Selection::Response {
            node_id: selected,
            index: selected_index,
        } = &mut self.session.selection
        {
            if *selected == node_id {
                if *selected_index == index {
                    self.session.selection = Selection::Node(node_id.clone());
                } else if *selected_index > index {
                    *selected_index -= 1;
                }
            }
        }

        self.touch(StoreEvent::ResponsesChanged { node_id });
        Ok(())
    }

    /// Swap a response with its neighbour. Moving the first response up or
    /// the last one down changes nothing and does not dirty the session.
    pub fn move_response(
        &mut self,
        node_id: &str,
        index: usize,
        direction: MoveDirection,
    ) -> Result<(), MutationError> {
        let node = self.tree.node_mut(node_id)?;
        let Some(moved_to) = node.move_response(index, direction)? else {
            return Ok(());
        };
        let node_id = node.id().clone();

        if let Selection::Response {
            node_id: selected,
            index: selected_index,
        } = &mut self.session.selection
        {
            if *selected == node_id {
                if *selected_index == index {
                    *selected_index = moved_to;
                } else if *selected_index == moved_to {
                    *selected_index = index;
                }
            }
        }

        self.touch(StoreEvent::ResponsesChanged { node_id });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tree commands
    // ------------------------------------------------------------------

    pub fn set_character_name(&mut self, name: impl Into<String>) {
        self.tree.character_name = name.into();
        self.touch(StoreEvent::TreeMetadataChanged);
    }

    pub fn set_tree_portrait(&mut self, portrait: Portrait) {
        self.tree.portrait = portrait;
        self.touch(StoreEvent::TreeMetadataChanged);
    }

    /// Replace the whole tree. The session starts clean: no unsaved changes,
    /// no positions, nothing selected.
    pub fn load_dialog_tree(&mut self, tree: DialogTree, source_name: Option<String>) {
        log::info!(
            "store: loaded tree \"{}\" ({} nodes)",
            tree.id,
            tree.len()
        );
        self.tree = tree;
        self.source_name = source_name;
        self.replace_session();
    }

    /// Replace the tree with the minimal one-node template.
    pub fn create_new_tree(&mut self) {
        self.tree = DialogTree::template();
        self.source_name = None;
        log::info!("store: created new tree");
        self.replace_session();
    }

    fn replace_session(&mut self) {
        self.session.reset();
        self.revision += 1;
        self.publish(StoreEvent::TreeReplaced);
    }

    // ------------------------------------------------------------------
    // Session commands (do not dirty the tree)
    // ------------------------------------------------------------------

    pub fn select_node(&mut self, id: &str) -> Result<(), MutationError> {
        let node = self
            .tree
            .node(id)
            .ok_or_else(|| MutationError::UnknownNode(id.into()))?;
        self.session.selection = Selection::Node(node.id().clone());
        self.publish(StoreEvent::SelectionChanged);
        Ok(())
    }

    pub fn select_response(&mut self, node_id: &str, index: usize) -> Result<(), MutationError> {
        let node = self
            .tree
            .node(node_id)
            .ok_or_else(|| MutationError::UnknownNode(node_id.into()))?;
        node.response(index)?;
        self.session.selection = Selection::Response {
            node_id: node.id().clone(),
            index,
        };
        self.publish(StoreEvent::SelectionChanged);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.session.selection = Selection::None;
        self.publish(StoreEvent::SelectionChanged);
    }

    pub fn selection(&self) -> &Selection {
        &self.session.selection
    }

    pub fn selected_node_id(&self) -> Option<&NodeId> {
        self.session.selection.node_id()
    }

    /// Record a manually placed node. Positions are editor-only state.
    pub fn set_node_position(&mut self, id: &str, position: Position) -> Result<(), MutationError> {
        let node = self
            .tree
            .node(id)
            .ok_or_else(|| MutationError::UnknownNode(id.into()))?;
        self.session.node_positions.insert(node.id().clone(), position);
        self.publish(StoreEvent::PositionsChanged);
        Ok(())
    }

    pub fn node_position(&self, id: &str) -> Option<Position> {
        self.session.node_positions.get(id).copied()
    }

    /// Run auto-layout on the current tree and merge the result into the
    /// session's positions.
    pub fn apply_layout(&mut self, config: &LayoutConfig) -> LayoutResult {
        let result = layout::compute_layout(&self.tree, config);
        self.session
            .node_positions
            .extend(result.positions.iter().map(|(id, pos)| (id.clone(), *pos)));
        self.publish(StoreEvent::PositionsChanged);
        result
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Findings for the current tree, computed now if no fresh result is cached.
    pub fn validation(&mut self) -> &ValidationReport {
        let validator = &self.validator;
        let tree = &self.tree;
        self.session
            .validation
            .get_or_insert_with(|| validator.validate(tree))
    }

    /// Cached findings, if still fresh.
    pub fn cached_validation(&self) -> Option<&ValidationReport> {
        self.session.validation.as_ref()
    }

    /// Package the current state for a debounced validation pass. The pass
    /// runs with this store's validator, so its findings match the save gate.
    pub fn validation_request(&self) -> ValidationRequest {
        ValidationRequest {
            session: self.id,
            revision: self.revision,
            tree: self.snapshot(),
            validator: self.validator.clone(),
        }
    }

    /// Install findings produced off the edit path.
    ///
    /// Results for another session or an older revision are dropped and
    /// `false` is returned.
    pub fn accept_validation(&mut self, result: ScheduledValidation) -> bool {
        if result.session != self.id || result.revision != self.revision {
            log::debug!(
                "store: dropped stale validation (revision {} != {})",
                result.revision,
                self.revision
            );
            return false;
        }
        self.session.validation = Some(result.report);
        self.publish(StoreEvent::ValidationUpdated);
        true
    }

    pub(crate) fn mark_saved(&mut self, name: &str) {
        self.session.is_dirty = false;
        self.source_name = Some(name.to_owned());
        self.publish(StoreEvent::Saved {
            name: name.to_owned(),
        });
    }

    fn touch(&mut self, event: StoreEvent) {
        self.session.is_dirty = true;
        self.session.validation = None;
        self.revision += 1;
        self.publish(event);
    }

    fn publish(&self, event: StoreEvent) {
        self.changes.send_replace(Change {
            revision: self.revision,
            event,
        });
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new(Validator::default())
    }
}
