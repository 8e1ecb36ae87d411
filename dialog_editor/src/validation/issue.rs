//! Validation findings.

use serde::{Deserialize, Serialize};

use dialog_model::NodeId;

/// Whether a finding blocks save/export or only asks for confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// What a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    // Errors
    MissingStartNode,
    DanglingTarget { target: NodeId },
    EmptyMessage,
    EmptyResponseText,

    // Warnings
    OrphanedNode,
    NoTerminalPath { cycle_detected: bool },
    ResponseTooLong { chars: usize, limit: usize },
    MessageTooLong { chars: usize, limit: usize },
    TooManyResponses { count: usize, limit: usize },
}

impl IssueKind {
    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::MissingStartNode
            | IssueKind::DanglingTarget { .. }
            | IssueKind::EmptyMessage
            | IssueKind::EmptyResponseText => Severity::Error,

            IssueKind::OrphanedNode
            | IssueKind::NoTerminalPath { .. }
            | IssueKind::ResponseTooLong { .. }
            | IssueKind::MessageTooLong { .. }
            | IssueKind::TooManyResponses { .. } => Severity::Warning,
        }
    }
}

/// One validation finding, optionally tagged with the node (and response)
/// it concerns so editors can highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub node_id: Option<NodeId>,
    pub response_index: Option<usize>,
    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            node_id: None,
            response_index: None,
            message: message.into(),
        }
    }

    pub fn at_node(mut self, node_id: &NodeId) -> Self {
        self.node_id = Some(node_id.clone());
        self
    }

    pub fn at_response(mut self, node_id: &NodeId, index: usize) -> Self {
        self.node_id = Some(node_id.clone());
        self.response_index = Some(index);
        self
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
