//! Identity-based merging of source hierarchies into one combined tree.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::dendrogram::Dendrogram;
use crate::domain::entities::{MergeSignals, SourceNode};

/// Mutable state of one merge run.
///
/// Holds the identity index (name to node) and the signal annotations. Both are
/// private to the session; [`MergeSession::finish`] freezes them and classifies.
#[derive(Debug)]
pub struct MergeSession {
    tree: TreeArena,
    root: Index,
    identity: HashMap<String, Index>,
    signals: HashMap<Index, MergeSignals>,
}

impl MergeSession {
    /// Start with a childless root. The root name is not registered for identity.
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(root_name), None);
        Self {
            tree,
            root,
            identity: HashMap::new(),
            signals: HashMap::new(),
        }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    /// Fold the children of an entity hierarchy into the combined root.
    ///
    /// The entity node itself is not inserted.
    #[instrument(level = "debug", skip(self, entity_tree), fields(entity = %entity_tree.name))]
    pub fn merge_entity(&mut self, entity_tree: &SourceNode) {
        let before = self.identity.len();
        let root = self.root;
        self.merge(root, entity_tree);
        debug!(
            "merged {}: {} new nodes",
            entity_tree.name,
            self.identity.len() - before
        );
    }

    /// Fold the children of `source` into the combined node `parent`.
    ///
    /// A known name resolves to the existing node, which gains a parent, becomes
    /// overlapping together with its subtree, and absorbs the source children.
    /// An unknown name is registered and attached below `parent`, inheriting the
    /// parent's overlap so an overlapping node never has a non-overlapping child.
    pub fn merge(&mut self, parent: Index, source: &SourceNode) {
        for child in &source.children {
            match self.identity.get(&child.name).copied() {
                Some(existing) => {
                    trace!("re-encountered {}", child.name);
                    self.signals.entry(existing).or_default().has_parent = true;
                    self.mark_overlap(existing);
                    self.merge(existing, child);
                }
                None => {
                    let overlapping = self.signals.get(&parent).is_some_and(|s| s.overlapping);
                    let idx = self
                        .tree
                        .insert_node(NodeData::new(child.name.as_str()), Some(parent));
                    self.identity.insert(child.name.clone(), idx);
                    self.signals.insert(
                        idx,
                        MergeSignals {
                            overlapping,
                            has_parent: child.nested,
                            has_children: !child.is_leaf(),
                        },
                    );
                    self.merge(idx, child);
                }
            }
        }
    }

    /// Mark `start` and every node currently below it as overlapping.
    fn mark_overlap(&mut self, start: Index) {
        let subtree: Vec<Index> = self.tree.iter_from(start).map(|(idx, _)| idx).collect();
        for idx in subtree {
            self.signals.entry(idx).or_default().overlapping = true;
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Index> {
        self.identity.get(name).copied()
    }

    pub fn signals(&self, name: &str) -> Option<MergeSignals> {
        self.lookup(name)
            .and_then(|idx| self.signals.get(&idx).copied())
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    /// End the merge phase and classify the combined tree.
    pub fn finish(self) -> Dendrogram {
        Dendrogram::classified(self.tree, self.root, self.identity, self.signals)
    }
}
