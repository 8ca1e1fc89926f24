//! Domain entities: source hierarchies, merge signals and categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node of one entity's source hierarchy.
///
/// Children are owned, so a source hierarchy can never contain a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    pub name: String,
    pub children: Vec<SourceNode>,
    /// The source hierarchy asserts this node sits inside a parent/child chain
    pub nested: bool,
}

impl SourceNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            nested: false,
        }
    }

    /// Mark the node as nested inside its entity hierarchy.
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SourceNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn find(&self, name: &str) -> Option<&SourceNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Number of nodes in this hierarchy, including self.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(SourceNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Signals collected for one combined-tree node while merging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSignals {
    /// Reached from more than one source hierarchy, or below such a node
    pub overlapping: bool,
    pub has_parent: bool,
    /// Node had children when it was first inserted
    pub has_children: bool,
}

impl MergeSignals {
    pub fn is_nested(&self) -> bool {
        self.has_parent && self.has_children
    }
}

/// Final classification of a combined-tree node.
///
/// Serialized as the integer level the client colours by:
/// 0 default, 1 overlap, 2 hierarchical, 3 both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Category {
    #[default]
    None,
    Overlap,
    Hierarchical,
    Both,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::None,
        Category::Overlap,
        Category::Hierarchical,
        Category::Both,
    ];

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn is_overlap(self) -> bool {
        matches!(self, Category::Overlap | Category::Both)
    }
}

impl From<Category> for u8 {
    fn from(category: Category) -> Self {
        category.level()
    }
}

impl TryFrom<u8> for Category {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Category::None),
            1 => Ok(Category::Overlap),
            2 => Ok(Category::Hierarchical),
            3 => Ok(Category::Both),
            other => Err(format!("invalid category level: {other}")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::None => "none",
            Category::Overlap => "overlap",
            Category::Hierarchical => "hierarchical",
            Category::Both => "both",
        };
        f.write_str(label)
    }
}

/// Serializable view of a classified combined-tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DendrogramNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DendrogramNode>,
    pub category: Category,
}

impl DendrogramNode {
    pub fn find(&self, name: &str) -> Option<&DendrogramNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_levels_round_trip_through_u8() {
        for category in Category::ALL {
            assert_eq!(Category::try_from(u8::from(category)), Ok(category));
        }
        assert!(Category::try_from(4).is_err());
    }

    #[test]
    fn test_source_node_len_counts_all_descendants() {
        let tree = SourceNode::new("root")
            .with_child(SourceNode::new("a").with_child(SourceNode::new("a1")))
            .with_child(SourceNode::new("b"));
        assert_eq!(tree.len(), 4);
        assert!(tree.find("a1").is_some_and(SourceNode::is_leaf));
    }
}
