//! Validator - structural errors and advisory warnings for a tree snapshot.
//!
//! Validation runs a fixed list of checks in order:
//! 1. **Structure**: start reference, dangling response targets, empty text (errors)
//! 2. **Reachability**: breadth-first walk from the start; unvisited nodes are orphans
//! 3. **Endings**: depth-first search for a path that ends the conversation
//! 4. **Heuristics**: length and response-count thresholds (warnings)
//!
//! Validation is pure and deterministic: the same snapshot always yields the
//! same findings in the same order.

mod issue;

pub use issue::*;

use serde::{Deserialize, Serialize};

use dialog_model::DialogTree;

use crate::config::ValidationLimits;
use crate::traversal;

/// The individual rules the validator knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Check {
    StartNode,
    DanglingTargets,
    EmptyText,
    Reachability,
    TerminalPath,
    LengthLimits,
    ResponseCount,
}

impl Check {
    /// Every check, in evaluation order.
    pub const ALL: [Check; 7] = [
        Check::StartNode,
        Check::DanglingTargets,
        Check::EmptyText,
        Check::Reachability,
        Check::TerminalPath,
        Check::LengthLimits,
        Check::ResponseCount,
    ];

    fn run(self, tree: &DialogTree, limits: &ValidationLimits, out: &mut Vec<Issue>) {
        match self {
            Check::StartNode => check_start_node(tree, out),
            Check::DanglingTargets => check_dangling_targets(tree, out),
            Check::EmptyText => check_empty_text(tree, out),
            Check::Reachability => check_reachability(tree, out),
            Check::TerminalPath => check_terminal_path(tree, out),
            Check::LengthLimits => check_lengths(tree, limits, out),
            Check::ResponseCount => check_response_count(tree, limits, out),
        }
    }
}

/// Findings for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Blocking findings.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    /// Advisory findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Findings tagged with `node_id`, for highlighting a node.
    pub fn issues_for<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues
            .iter()
            .filter(move |i| i.node_id.as_ref().is_some_and(|id| id.as_str() == node_id))
    }

    /// Check if any finding has exactly this kind.
    pub fn contains(&self, kind: &IssueKind) -> bool {
        self.issues.iter().any(|i| &i.kind == kind)
    }
}

/// Runs every [`Check`] against a snapshot using configured thresholds.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    limits: ValidationLimits,
}

impl Validator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    pub fn validate(&self, tree: &DialogTree) -> ValidationReport {
        let mut issues = Vec::new();
        for check in Check::ALL {
            check.run(tree, &self.limits, &mut issues);
        }
        ValidationReport { issues }
    }
}

/// Validate with default thresholds.
pub fn validate(tree: &DialogTree) -> ValidationReport {
    Validator::default().validate(tree)
}

fn start_resolves(tree: &DialogTree) -> bool {
    tree.start_node().is_some()
}

fn check_start_node(tree: &DialogTree, out: &mut Vec<Issue>) {
    if tree.is_empty() || start_resolves(tree) {
        return;
    }

    let start = tree.start_node_id();
    let message = if start.is_empty() {
        "No start node is set".to_owned()
    } else {
        format!("Start node \"{start}\" does not exist")
    };
    out.push(Issue::new(IssueKind::MissingStartNode, message));
}

fn check_dangling_targets(tree: &DialogTree, out: &mut Vec<Issue>) {
    for node in tree.nodes() {
        for (index, response) in node.responses.iter().enumerate() {
            let Some(target) = &response.next_node_id else {
                continue;
            };
            if tree.contains(target.as_str()) {
                continue;
            }
            out.push(
                Issue::new(
                    IssueKind::DanglingTarget {
                        target: target.clone(),
                    },
                    format!(
                        "Response {} of \"{}\" leads to missing node \"{}\"",
                        index + 1,
                        node.id(),
                        target
                    ),
                )
                .at_response(node.id(), index),
            );
        }
    }
}

fn check_empty_text(tree: &DialogTree, out: &mut Vec<Issue>) {
    for node in tree.nodes() {
        if node.message.trim().is_empty() {
            out.push(
                Issue::new(
                    IssueKind::EmptyMessage,
                    format!("Node \"{}\" has an empty message", node.id()),
                )
                .at_node(node.id()),
            );
        }
        for (index, response) in node.responses.iter().enumerate() {
            if response.text.trim().is_empty() {
                out.push(
                    Issue::new(
                        IssueKind::EmptyResponseText,
                        format!("Response {} of \"{}\" has no text", index + 1, node.id()),
                    )
                    .at_response(node.id(), index),
                );
            }
        }
    }
}

// Both walks start from the start node; when it is missing the blocking
// error already covers the tree and flagging every node as orphaned is noise.
fn check_reachability(tree: &DialogTree, out: &mut Vec<Issue>) {
    if !start_resolves(tree) {
        return;
    }

    let reachable = traversal::reachable(tree);
    for id in tree.node_ids().filter(|id| !reachable.contains(id)) {
        out.push(
            Issue::new(
                IssueKind::OrphanedNode,
                format!("Node \"{id}\" cannot be reached from the start node"),
            )
            .at_node(id),
        );
    }
}

fn check_terminal_path(tree: &DialogTree, out: &mut Vec<Issue>) {
    if !start_resolves(tree) {
        return;
    }

    let search = traversal::find_terminal_path(tree);
    if search.reaches_terminal {
        return;
    }
    let message = if search.cycle_detected {
        "No path from the start node reaches an ending: the conversation loops forever"
    } else {
        "No path from the start node reaches an ending"
    };
    out.push(
        Issue::new(
            IssueKind::NoTerminalPath {
                cycle_detected: search.cycle_detected,
            },
            message,
        )
        .at_node(tree.start_node_id()),
    );
}

fn check_lengths(tree: &DialogTree, limits: &ValidationLimits, out: &mut Vec<Issue>) {
    for node in tree.nodes() {
        let chars = node.message.chars().count();
        if chars > limits.max_message_chars {
            out.push(
                Issue::new(
                    IssueKind::MessageTooLong {
                        chars,
                        limit: limits.max_message_chars,
                    },
                    format!(
                        "Message of \"{}\" is {chars} characters (recommended at most {})",
                        node.id(),
                        limits.max_message_chars
                    ),
                )
                .at_node(node.id()),
            );
        }

        for (index, response) in node.responses.iter().enumerate() {
            let chars = response.text.chars().count();
            if chars > limits.max_response_chars {
                out.push(
                    Issue::new(
                        IssueKind::ResponseTooLong {
                            chars,
                            limit: limits.max_response_chars,
                        },
                        format!(
                            "Response {} of \"{}\" is {chars} characters (recommended at most {})",
                            index + 1,
                            node.id(),
                            limits.max_response_chars
                        ),
                    )
                    .at_response(node.id(), index),
                );
            }
        }
    }
}

fn check_response_count(tree: &DialogTree, limits: &ValidationLimits, out: &mut Vec<Issue>) {
    for node in tree.nodes() {
        let count = node.responses.len();
        if count > limits.max_responses {
            out.push(
                Issue::new(
                    IssueKind::TooManyResponses {
                        count,
                        limit: limits.max_responses,
                    },
                    format!(
                        "Node \"{}\" offers {count} responses (recommended at most {})",
                        node.id(),
                        limits.max_responses
                    ),
                )
                .at_node(node.id()),
            );
        }
    }
}
