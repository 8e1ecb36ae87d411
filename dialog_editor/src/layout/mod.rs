//! Auto-Layout - deterministic layered positions from graph structure alone.
//!
//! The algorithm:
//! 1. **Depth**: breadth-first walk from the start node; a node's column is its
//!    shortest distance (in edges) from the start, fixed on first discovery
//! 2. **Stacking**: within a column, nodes are stacked top to bottom in
//!    discovery order
//! 3. **Fallback**: nodes the walk never reaches go into one extra column to
//!    the right of the deepest level, in id order
//!
//! Previously stored positions are never consulted, so laying out an unchanged
//! graph twice yields identical output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dialog_model::{DialogTree, NodeId};

use crate::config::LayoutConfig;
use crate::traversal;

/// A point on the editor canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Column assignment of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depth {
    /// Shortest distance from the start node.
    Level(usize),
    /// Not reachable from the start node.
    Unreachable,
}

/// Output of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub positions: BTreeMap<NodeId, Position>,
    pub depths: BTreeMap<NodeId, Depth>,
}

impl LayoutResult {
    pub fn position(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn depth(&self, id: &str) -> Option<Depth> {
        self.depths.get(id).copied()
    }

    /// Number of reachable depth levels.
    pub fn level_count(&self) -> usize {
        self.depths
            .values()
            .filter_map(|d| match d {
                Depth::Level(level) => Some(level + 1),
                Depth::Unreachable => None,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Lay out every node of `tree`.
pub fn compute_layout(tree: &DialogTree, config: &LayoutConfig) -> LayoutResult {
    let mut result = LayoutResult::default();
    let mut rows: Vec<usize> = Vec::new();

    for (id, depth) in traversal::breadth_first(tree) {
        if rows.len() <= depth {
            rows.resize(depth + 1, 0);
        }
        let row = rows[depth];
        rows[depth] += 1;

        result
            .positions
            .insert(id.clone(), place(config, depth, row));
        result.depths.insert(id.clone(), Depth::Level(depth));
    }

    let fallback_column = rows.len();
    let mut fallback_row = 0;
    for id in tree.node_ids() {
        if result.depths.contains_key(id) {
            continue;
        }
        result
            .positions
            .insert(id.clone(), place(config, fallback_column, fallback_row));
        result.depths.insert(id.clone(), Depth::Unreachable);
        fallback_row += 1;
    }

    log::debug!(
        "layout: placed {} nodes in {} levels ({} unreachable)",
        result.positions.len(),
        rows.len(),
        fallback_row
    );
    result
}

fn place(config: &LayoutConfig, column: usize, row: usize) -> Position {
    Position {
        x: config.origin_x + column as f32 * config.column_width,
        y: config.origin_y + row as f32 * config.row_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_model::{DialogNode, Response};
    use proptest::prelude::*;

    fn node(id: &str, targets: &[&str]) -> DialogNode {
        targets
            .iter()
            .fold(DialogNode::new(id).with_message(id), |n, t| {
                n.with_response(Response::new("go", *t))
            })
    }

    fn tree_from(nodes: Vec<DialogNode>) -> DialogTree {
        let mut tree = DialogTree::new("layout", "L");
        for n in nodes {
            tree.insert(n).unwrap();
        }
        tree.set_start_node("start").unwrap();
        tree
    }

    fn sample() -> Vec<DialogNode> {
        vec![
            node("start", &["x", "z"]),
            node("x", &["y"]),
            node("y", &[]),
            node("z", &[]),
        ]
    }

    #[test]
    fn test_depths_follow_shortest_paths() {
        let layout = compute_layout(&tree_from(sample()), &LayoutConfig::default());
        assert_eq!(layout.depth("start"), Some(Depth::Level(0)));
        assert_eq!(layout.depth("x"), Some(Depth::Level(1)));
        assert_eq!(layout.depth("z"), Some(Depth::Level(1)));
        assert_eq!(layout.depth("y"), Some(Depth::Level(2)));
        assert_eq!(layout.level_count(), 3);
    }

    #[test]
    fn test_depths_ignore_insertion_order() {
        let mut reversed = sample();
        reversed.reverse();
        let config = LayoutConfig::default();
        assert_eq!(
            compute_layout(&tree_from(sample()), &config),
            compute_layout(&tree_from(reversed), &config)
        );
    }

    #[test]
    fn test_positions_use_configured_spacing() {
        let config = LayoutConfig {
            column_width: 100.0,
            row_height: 10.0,
            origin_x: 0.0,
            origin_y: 0.0,
        };
        let layout = compute_layout(&tree_from(sample()), &config);
        assert_eq!(layout.position("start"), Some(Position::new(0.0, 0.0)));
        // x is discovered before z.
        assert_eq!(layout.position("x"), Some(Position::new(100.0, 0.0)));
        assert_eq!(layout.position("z"), Some(Position::new(100.0, 10.0)));
        assert_eq!(layout.position("y"), Some(Position::new(200.0, 0.0)));
    }

    #[test]
    fn test_unreachable_nodes_get_fallback_column() {
        let mut nodes = sample();
        nodes.push(node("island_b", &[]));
        nodes.push(node("island_a", &["island_b"]));
        let config = LayoutConfig {
            column_width: 100.0,
            row_height: 10.0,
            origin_x: 0.0,
            origin_y: 0.0,
        };
        let layout = compute_layout(&tree_from(nodes), &config);

        assert_eq!(layout.depth("island_a"), Some(Depth::Unreachable));
        assert_eq!(layout.position("island_a"), Some(Position::new(300.0, 0.0)));
        assert_eq!(layout.position("island_b"), Some(Position::new(300.0, 10.0)));
    }

    #[test]
    fn test_cycles_terminate_and_keep_first_depth() {
        let tree = tree_from(vec![
            node("start", &["a"]),
            node("a", &["b", "start"]),
            node("b", &["a", "start"]),
        ]);
        let layout = compute_layout(&tree, &LayoutConfig::default());
        assert_eq!(layout.depth("start"), Some(Depth::Level(0)));
        assert_eq!(layout.depth("a"), Some(Depth::Level(1)));
        assert_eq!(layout.depth("b"), Some(Depth::Level(2)));
    }

    #[test]
    fn test_missing_start_puts_everything_in_fallback() {
        let mut tree = tree_from(sample());
        tree.remove_node("start").unwrap();
        let layout = compute_layout(&tree, &LayoutConfig::default());
        assert_eq!(layout.level_count(), 0);
        assert!(layout.depths.values().all(|d| *d == Depth::Unreachable));
        assert_eq!(layout.positions.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_layout_is_idempotent(
            edges in prop::collection::vec((0usize..5, 0usize..5), 0..12),
        ) {
            let ids = ["start", "n1", "n2", "n3", "n4"];
            let mut nodes: Vec<DialogNode> = ids.iter().map(|id| node(id, &[])).collect();
            for (from, to) in &edges {
                nodes[*from].responses.push(Response::new("go", ids[*to]));
            }
            let tree = tree_from(nodes);
            let config = LayoutConfig::default();

            let first = compute_layout(&tree, &config);
            prop_assert_eq!(&first, &compute_layout(&tree, &config));
            prop_assert_eq!(first.positions.len(), tree.len());
        }
    }
}
