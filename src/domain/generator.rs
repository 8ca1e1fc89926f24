//! Synthesis of per-entity source hierarchies.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument};

use crate::domain::entities::SourceNode;
use crate::domain::error::{DomainError, DomainResult};

pub const DEFAULT_SHARED_GROUP: &str = "OU=Admins";
pub const DEFAULT_SHARED_LEAF: &str = "Permission-Admin-Shared";
pub const DEFAULT_CANDIDATE_GROUPS: [&str; 4] =
    ["OU=Finance", "OU=HR", "OU=Engineering", "OU=Product"];

/// Name of the branch only `entity` owns.
pub fn unique_group_name(entity: &str) -> String {
    format!("OU=UniqueGroup-{entity}")
}

/// Name of the single leaf below [`unique_group_name`].
pub fn unique_leaf_name(entity: &str) -> String {
    format!("Permission-Unique-{entity}")
}

/// Name of the `index`-th leaf `entity` gets below a drawn `group`.
pub fn group_leaf_name(group: &str, entity: &str, index: usize) -> String {
    format!("Permission-{group}-{entity}-{index}")
}

/// Validated shape of the generated hierarchies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorPolicy {
    shared_group: String,
    shared_leaf: String,
    candidate_groups: Vec<String>,
    min_groups: usize,
    max_groups: usize,
    min_leaves: usize,
    max_leaves: usize,
}

impl Default for GeneratorPolicy {
    fn default() -> Self {
        Self {
            shared_group: DEFAULT_SHARED_GROUP.to_string(),
            shared_leaf: DEFAULT_SHARED_LEAF.to_string(),
            candidate_groups: DEFAULT_CANDIDATE_GROUPS.map(String::from).to_vec(),
            min_groups: 2,
            max_groups: 4,
            min_leaves: 1,
            max_leaves: 3,
        }
    }
}

impl GeneratorPolicy {
    /// Build a policy, rejecting shapes that would break identity-based merging.
    ///
    /// # Errors
    ///
    /// * an empty shared group or shared leaf name
    /// * a shared leaf equal to the shared group or to a candidate
    /// * duplicate candidates, or a candidate equal to the shared group
    /// * an empty or inverted group/leaf range
    /// * fewer candidates than `max_groups`
    pub fn new(
        shared_group: impl Into<String>,
        shared_leaf: impl Into<String>,
        candidate_groups: Vec<String>,
        groups: (usize, usize),
        leaves: (usize, usize),
    ) -> DomainResult<Self> {
        let policy = Self {
            shared_group: shared_group.into(),
            shared_leaf: shared_leaf.into(),
            candidate_groups,
            min_groups: groups.0,
            max_groups: groups.1,
            min_leaves: leaves.0,
            max_leaves: leaves.1,
        };
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.shared_group.is_empty() {
            return Err(DomainError::EmptyName("shared_group"));
        }
        if self.shared_leaf.is_empty() {
            return Err(DomainError::EmptyName("shared_leaf"));
        }
        if self.shared_leaf == self.shared_group || self.candidate_groups.contains(&self.shared_leaf) {
            return Err(DomainError::ReservedLeaf(self.shared_leaf.clone()));
        }

        let mut seen = HashSet::new();
        for group in &self.candidate_groups {
            if group.is_empty() {
                return Err(DomainError::EmptyName("candidate_groups"));
            }
            if *group == self.shared_group {
                return Err(DomainError::ReservedCandidate(group.clone()));
            }
            if !seen.insert(group.as_str()) {
                return Err(DomainError::DuplicateCandidate(group.clone()));
            }
        }

        if self.min_groups == 0 || self.min_groups > self.max_groups {
            return Err(DomainError::InvalidRange {
                what: "group",
                min: self.min_groups,
                max: self.max_groups,
            });
        }
        if self.min_leaves == 0 || self.min_leaves > self.max_leaves {
            return Err(DomainError::InvalidRange {
                what: "leaf",
                min: self.min_leaves,
                max: self.max_leaves,
            });
        }
        if self.candidate_groups.len() < self.max_groups {
            return Err(DomainError::PoolTooSmall {
                pool: self.candidate_groups.len(),
                required: self.max_groups,
            });
        }
        Ok(())
    }

    pub fn shared_group(&self) -> &str {
        &self.shared_group
    }

    pub fn shared_leaf(&self) -> &str {
        &self.shared_leaf
    }

    pub fn candidate_groups(&self) -> &[String] {
        &self.candidate_groups
    }

    pub fn group_range(&self) -> (usize, usize) {
        (self.min_groups, self.max_groups)
    }

    pub fn leaf_range(&self) -> (usize, usize) {
        (self.min_leaves, self.max_leaves)
    }
}

/// Produces one source hierarchy per entity.
#[derive(Debug, Clone, Default)]
pub struct EntityTreeGenerator {
    policy: GeneratorPolicy,
}

impl EntityTreeGenerator {
    pub fn new(policy: GeneratorPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GeneratorPolicy {
        &self.policy
    }

    /// Generate the hierarchy rooted at `entity`.
    ///
    /// Children, in order: the entity-unique branch (marked nested), the shared
    /// branch, then the groups drawn from the candidate pool in draw order.
    #[instrument(level = "debug", skip(self, rng))]
    pub fn generate<R: Rng + ?Sized>(&self, entity: &str, rng: &mut R) -> SourceNode {
        let policy = &self.policy;

        let unique = SourceNode::new(unique_group_name(entity))
            .nested()
            .with_child(SourceNode::new(unique_leaf_name(entity)));
        let shared = SourceNode::new(policy.shared_group.as_str())
            .with_child(SourceNode::new(policy.shared_leaf.as_str()));

        let mut pool = policy.candidate_groups.clone();
        pool.shuffle(rng);
        let group_count = rng.random_range(policy.min_groups..=policy.max_groups);

        let mut drawn = Vec::with_capacity(group_count);
        for group in pool.into_iter().take(group_count) {
            let leaf_count = rng.random_range(policy.min_leaves..=policy.max_leaves);
            let leaves = (0..leaf_count)
                .map(|i| SourceNode::new(group_leaf_name(&group, entity, i)))
                .collect::<Vec<_>>();
            drawn.push(SourceNode::new(group).with_children(leaves));
        }
        debug!("{entity}: drew {} groups", drawn.len());

        SourceNode::new(entity)
            .with_child(unique)
            .with_child(shared)
            .with_children(drawn)
    }
}
