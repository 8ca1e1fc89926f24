//! Domain layer: entities, merge and classification
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Randomness is always passed in by the caller.

pub mod arena;
pub mod builder;
pub mod classify;
pub mod dendrogram;
pub mod entities;
pub mod error;
pub mod generator;
pub mod merge;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::{build_dendrogram, DendrogramBuilder, DEFAULT_ROOT_NAME};
pub use classify::categorize;
pub use dendrogram::Dendrogram;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use generator::{EntityTreeGenerator, GeneratorPolicy};
pub use merge::MergeSession;
