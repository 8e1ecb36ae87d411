//! Graph walks shared by the validator and the layout engine.
//!
//! Edges are non-null response targets that resolve to an existing node.
//! Dangling targets are skipped here; the validator reports them separately.

use std::collections::{HashSet, VecDeque};

use dialog_model::{DialogNode, DialogTree, NodeId};

/// Breadth-first walk from the start node.
///
/// Returns every reachable node with its shortest-path depth (in edges), in
/// discovery order. A node is recorded on first discovery only, so cycles
/// terminate. Empty when the start reference does not resolve.
pub fn breadth_first(tree: &DialogTree) -> Vec<(&NodeId, usize)> {
    let Some(start) = tree.start_node() else {
        return Vec::new();
    };

    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut queue: VecDeque<(&DialogNode, usize)> = VecDeque::new();
    let mut order = Vec::new();

    visited.insert(start.id());
    queue.push_back((start, 0));

    while let Some((node, depth)) = queue.pop_front() {
        order.push((node.id(), depth));

        for next in node.successors() {
            let Some(next_node) = tree.node(next.as_str()) else {
                continue;
            };
            if visited.insert(next_node.id()) {
                queue.push_back((next_node, depth + 1));
            }
        }
    }

    order
}

/// Ids of every node reachable from the start node.
pub fn reachable(tree: &DialogTree) -> HashSet<&NodeId> {
    breadth_first(tree).into_iter().map(|(id, _)| id).collect()
}

/// Outcome of the depth-first search for a conversation ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalSearch {
    /// Some path from the start node reaches a node with no onward edges.
    pub reaches_terminal: bool,
    /// A node already on the DFS stack was re-entered somewhere.
    pub cycle_detected: bool,
}

struct Frame<'a> {
    node: &'a DialogNode,
    cursor: usize,
}

/// Depth-first search from the start node for a terminal node.
///
/// Uses an explicit stack plus an on-stack set: re-entering a node that is
/// still on the stack marks a cycle and is not expanded again. Nodes whose
/// subtree is fully explored are never revisited.
pub fn find_terminal_path(tree: &DialogTree) -> TerminalSearch {
    let mut search = TerminalSearch::default();
    let Some(start) = tree.start_node() else {
        return search;
    };
    if start.is_terminal() {
        search.reaches_terminal = true;
        return search;
    }

    let mut on_stack: HashSet<&NodeId> = HashSet::new();
    let mut finished: HashSet<&NodeId> = HashSet::new();
    let mut stack = vec![Frame {
        node: start,
        cursor: 0,
    }];
    on_stack.insert(start.id());

    while let Some(frame) = stack.last_mut() {
        let node = frame.node;
        let next = node.successors().nth(frame.cursor);
        frame.cursor += 1;

        let Some(next) = next else {
            on_stack.remove(node.id());
            finished.insert(node.id());
            stack.pop();
            continue;
        };

        if on_stack.contains(next) {
            search.cycle_detected = true;
            continue;
        }
        if finished.contains(next) {
            continue;
        }
        let Some(next_node) = tree.node(next.as_str()) else {
            continue;
        };
        if next_node.is_terminal() {
            search.reaches_terminal = true;
            return search;
        }

        on_stack.insert(next_node.id());
        stack.push(Frame {
            node: next_node,
            cursor: 0,
        });
    }

    search
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_model::Response;

    fn tree_of(start: &str, nodes: Vec<DialogNode>) -> DialogTree {
        let mut tree = DialogTree::new("t", "Tester");
        for node in nodes {
            tree.insert(node).unwrap();
        }
        tree.set_start_node(start).unwrap();
        tree
    }

    fn link(id: &str, targets: &[&str]) -> DialogNode {
        targets.iter().fold(DialogNode::new(id).with_message(id), |node, t| {
            node.with_response(Response::new(format!("to {t}"), *t))
        })
    }

    #[test]
    fn test_breadth_first_depths() {
        let tree = tree_of(
            "start",
            vec![
                link("start", &["x", "z"]),
                link("x", &["y"]),
                link("y", &[]),
                link("z", &[]),
            ],
        );
        let order: Vec<_> = breadth_first(&tree)
            .into_iter()
            .map(|(id, depth)| (id.as_str(), depth))
            .collect();
        assert_eq!(order, vec![("start", 0), ("x", 1), ("z", 1), ("y", 2)]);
    }

    #[test]
    fn test_breadth_first_terminates_on_cycles() {
        let tree = tree_of("a", vec![link("a", &["b", "a"]), link("b", &["a", "b"])]);
        assert_eq!(breadth_first(&tree).len(), 2);
    }

    #[test]
    fn test_breadth_first_skips_dangling_targets() {
        let tree = tree_of("a", vec![link("a", &["ghost", "b"]), link("b", &[])]);
        let ids: Vec<_> = reachable(&tree).into_iter().map(NodeId::as_str).collect();
        assert_eq!(ids.len(), 2);
        assert!(!ids.contains(&"ghost"));
    }

    #[test]
    fn test_missing_start_reaches_nothing() {
        let mut tree = tree_of("a", vec![link("a", &[])]);
        tree.remove_node("a").unwrap();
        assert!(breadth_first(&tree).is_empty());
        assert_eq!(find_terminal_path(&tree), TerminalSearch::default());
    }

    #[test]
    fn test_terminal_search_on_pure_cycle() {
        let tree = tree_of("a", vec![link("a", &["b"]), link("b", &["a"])]);
        let search = find_terminal_path(&tree);
        assert!(!search.reaches_terminal);
        assert!(search.cycle_detected);
    }

    #[test]
    fn test_terminal_search_finds_exit_behind_cycle() {
        let tree = tree_of(
            "a",
            vec![link("a", &["b"]), link("b", &["a", "c"]), link("c", &[])],
        );
        assert!(find_terminal_path(&tree).reaches_terminal);
    }

    #[test]
    fn test_terminal_search_counts_null_only_responses_as_ending() {
        let tree = tree_of(
            "a",
            vec![
                link("a", &["b"]),
                DialogNode::new("b")
                    .with_message("bye")
                    .with_response(Response::terminal("Goodbye")),
            ],
        );
        assert!(find_terminal_path(&tree).reaches_terminal);
    }

    #[test]
    fn test_dangling_target_is_not_an_ending() {
        let tree = tree_of("a", vec![link("a", &["ghost", "a"])]);
        let search = find_terminal_path(&tree);
        assert!(!search.reaches_terminal);
    }
}
