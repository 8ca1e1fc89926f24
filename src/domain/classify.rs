//! Post-order classification of a merged tree.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::TreeArena;
use crate::domain::entities::{Category, MergeSignals};

/// Derive the category of a single node from its merge signals.
pub fn categorize(signals: MergeSignals) -> Category {
    match (signals.overlapping, signals.is_nested()) {
        (true, true) => Category::Both,
        (true, false) => Category::Overlap,
        (false, true) => Category::Hierarchical,
        (false, false) => Category::None,
    }
}

/// Write a category to every node, children first. The root stays `None`.
///
/// Nodes without recorded signals are classified from default signals.
#[instrument(level = "debug", skip_all)]
pub(crate) fn classify_tree(tree: &mut TreeArena, signals: &HashMap<Index, MergeSignals>) {
    let root = tree.root();
    let updates: Vec<(Index, Category)> = tree
        .iter_postorder()
        .map(|(idx, _)| {
            let category = if Some(idx) == root {
                Category::None
            } else {
                categorize(signals.get(&idx).copied().unwrap_or_default())
            };
            (idx, category)
        })
        .collect();

    for (idx, category) in updates {
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.category = category;
        }
    }
}
