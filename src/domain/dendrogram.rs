//! The classified combined tree.

use std::collections::{BTreeMap, HashMap};

use generational_arena::Index;

use crate::domain::arena::{TreeArena, TreeNode};
use crate::domain::classify::classify_tree;
use crate::domain::entities::{Category, DendrogramNode, MergeSignals};

/// A merged and classified tree.
///
/// Merge signals are frozen here; only [`Dendrogram::classify`] writes to nodes.
#[derive(Debug)]
pub struct Dendrogram {
    tree: TreeArena,
    root: Index,
    identity: HashMap<String, Index>,
    signals: HashMap<Index, MergeSignals>,
}

impl Dendrogram {
    pub(crate) fn classified(
        tree: TreeArena,
        root: Index,
        identity: HashMap<String, Index>,
        signals: HashMap<Index, MergeSignals>,
    ) -> Self {
        let mut dendrogram = Self {
            tree,
            root,
            identity,
            signals,
        };
        dendrogram.classify();
        dendrogram
    }

    /// Recompute every category from the frozen signals.
    pub fn classify(&mut self) {
        classify_tree(&mut self.tree, &self.signals);
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn root(&self) -> &TreeNode {
        self.tree
            .get_node(self.root)
            .expect("root is inserted first and never removed")
    }

    pub fn root_index(&self) -> Index {
        self.root
    }

    /// Direct children of `node`, in insertion order.
    pub fn children<'a>(&'a self, node: &'a TreeNode) -> impl Iterator<Item = &'a TreeNode> + 'a {
        node.children.iter().filter_map(|&idx| self.tree.get_node(idx))
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.identity
            .get(name)
            .and_then(|&idx| self.tree.get_node(idx))
    }

    pub fn category(&self, name: &str) -> Option<Category> {
        self.get(name).map(|node| node.data.category)
    }

    pub fn signals(&self, name: &str) -> Option<MergeSignals> {
        self.identity
            .get(name)
            .and_then(|idx| self.signals.get(idx).copied())
    }

    /// Number of names in the identity index.
    pub fn identity_len(&self) -> usize {
        self.identity.len()
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children.is_empty()
    }

    /// Nodes per category, root excluded.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|&c| (c, 0)).collect();
        for (idx, node) in self.tree.iter() {
            if idx != self.root {
                *counts.entry(node.data.category).or_default() += 1;
            }
        }
        counts
    }

    /// Owned, serializable copy of the tree.
    pub fn to_node(&self) -> DendrogramNode {
        self.view(self.root())
    }

    fn view(&self, node: &TreeNode) -> DendrogramNode {
        DendrogramNode {
            name: node.data.name.clone(),
            children: self.children(node).map(|child| self.view(child)).collect(),
            category: node.data.category,
        }
    }
}
