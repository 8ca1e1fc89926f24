//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated generator preconditions.
/// Generation, merge and classification themselves never fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("name must not be empty: {0}")]
    EmptyName(&'static str),

    #[error("duplicate candidate group: {0}")]
    DuplicateCandidate(String),

    #[error("candidate group collides with shared group: {0}")]
    ReservedCandidate(String),

    #[error("shared leaf collides with a group name: {0}")]
    ReservedLeaf(String),

    #[error("invalid {what} range: {min}..={max}")]
    InvalidRange {
        what: &'static str,
        min: usize,
        max: usize,
    },

    #[error("candidate pool has {pool} groups, at least {required} required")]
    PoolTooSmall { pool: usize, required: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
