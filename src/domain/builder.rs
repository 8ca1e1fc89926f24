//! Top-level driver: generate, merge and classify.

use rand::Rng;
use tracing::{debug, instrument};

use crate::domain::dendrogram::Dendrogram;
use crate::domain::entities::SourceNode;
use crate::domain::generator::{EntityTreeGenerator, GeneratorPolicy};
use crate::domain::merge::MergeSession;

pub const DEFAULT_ROOT_NAME: &str = "Permissions";

/// Builds classified dendrograms from entity names.
#[derive(Debug, Clone)]
pub struct DendrogramBuilder {
    root_name: String,
    generator: EntityTreeGenerator,
}

impl Default for DendrogramBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME, GeneratorPolicy::default())
    }
}

impl DendrogramBuilder {
    pub fn new(root_name: impl Into<String>, policy: GeneratorPolicy) -> Self {
        Self {
            root_name: root_name.into(),
            generator: EntityTreeGenerator::new(policy),
        }
    }

    pub fn generator(&self) -> &EntityTreeGenerator {
        &self.generator
    }

    /// Generate one source hierarchy per entity, in input order.
    pub fn generate<S, R>(&self, entities: &[S], rng: &mut R) -> Vec<SourceNode>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        entities
            .iter()
            .map(|entity| self.generator.generate(entity.as_ref(), rng))
            .collect()
    }

    /// Merge already generated hierarchies in order, then classify once.
    #[instrument(level = "debug", skip_all, fields(trees = trees.len()))]
    pub fn merge_trees(&self, trees: &[SourceNode]) -> Dendrogram {
        let mut session = MergeSession::new(self.root_name.as_str());
        for tree in trees {
            session.merge_entity(tree);
        }
        let dendrogram = session.finish();
        debug!("dendrogram has {} nodes", dendrogram.node_count());
        dendrogram
    }

    /// Generate, merge and classify.
    pub fn build<S, R>(&self, entities: &[S], rng: &mut R) -> Dendrogram
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let trees = self.generate(entities, rng);
        self.merge_trees(&trees)
    }
}

/// Build a dendrogram with the default root name and generator policy.
pub fn build_dendrogram<S, R>(entities: &[S], rng: &mut R) -> Dendrogram
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    DendrogramBuilder::default().build(entities, rng)
}
