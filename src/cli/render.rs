//! Text tree rendering with termtree.

use termtree::Tree;

use crate::cli::output::paint;
use crate::domain::{Dendrogram, SourceNode, TreeNode};

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for Dendrogram {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(dendrogram: &Dendrogram, node: &TreeNode) -> Tree<String> {
            let label = paint(&node.data.name, node.data.category).to_string();
            let leaves: Vec<_> = dendrogram
                .children(node)
                .map(|child| build_tree(dendrogram, child))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }

        build_tree(self, self.root())
    }
}

impl TreeDisplay for SourceNode {
    fn to_tree_string(&self) -> Tree<String> {
        let label = if self.nested {
            format!("{} (nested)", self.name)
        } else {
            self.name.clone()
        };
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(label).with_leaves(leaves)
    }
}
