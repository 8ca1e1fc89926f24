use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::entities::Category;

/// Data payload for combined-tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Identity of the node within one combined tree
    pub name: String,
    /// Valid only after classification
    pub category: Category,
}

impl NodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: Category::None,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

/// Arena-based tree structure.
///
/// Nodes reference each other by generational index, so a node reached from
/// several source hierarchies is still stored once with a single parent edge.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal from the root.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree below and including `start`.
    pub fn iter_from(&self, start: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(start))
    }

    /// Post-order traversal from the root: children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Names of all leaf nodes in pre-order.
    ///
    /// A root without children counts as a leaf; empty trees return an empty vector.
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.name.clone())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Reverse push keeps left-to-right order
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TreeArena, Index) {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new("root"), None);
        let a = tree.insert_node(NodeData::new("a"), Some(root));
        tree.insert_node(NodeData::new("a1"), Some(a));
        tree.insert_node(NodeData::new("a2"), Some(a));
        tree.insert_node(NodeData::new("b"), Some(root));
        (tree, a)
    }

    fn names<'a>(iter: impl Iterator<Item = (Index, &'a TreeNode)>) -> Vec<String> {
        iter.map(|(_, n)| n.data.name.clone()).collect()
    }

    #[test]
    fn test_preorder_visits_children_left_to_right() {
        let (tree, _) = sample();
        assert_eq!(names(tree.iter()), ["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_postorder_visits_children_before_parent() {
        let (tree, _) = sample();
        assert_eq!(names(tree.iter_postorder()), ["a1", "a2", "a", "b", "root"]);
    }

    #[test]
    fn test_iter_from_stays_inside_subtree() {
        let (tree, a) = sample();
        assert_eq!(names(tree.iter_from(a)), ["a", "a1", "a2"]);
    }

    #[test]
    fn test_depth_and_leaves() {
        let (tree, _) = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_nodes(), ["a1", "a2", "b"]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_empty_tree() {
        let tree = TreeArena::new();
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.iter().next().is_none());
        assert!(tree.leaf_nodes().is_empty());
    }
}
