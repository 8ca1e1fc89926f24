//! Dendrogram service
//!
//! Builds classified dendrograms per request from a shared, seedable random
//! source. The source is locked only while randomness is drawn; merging and
//! classification run outside the lock.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Category, Dendrogram, DendrogramBuilder, SourceNode};

/// Category counts aggregated over several independent builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSummary {
    pub runs: usize,
    /// Root excluded
    pub nodes: usize,
    pub counts: BTreeMap<Category, usize>,
}

impl SampleSummary {
    fn empty() -> Self {
        Self {
            runs: 0,
            nodes: 0,
            counts: Category::ALL.iter().map(|&c| (c, 0)).collect(),
        }
    }

    fn add(mut self, dendrogram: &Dendrogram) -> Self {
        self.runs += 1;
        for (category, count) in dendrogram.category_counts() {
            self.nodes += count;
            *self.counts.entry(category).or_default() += count;
        }
        self
    }

    fn combine(mut self, other: Self) -> Self {
        self.runs += other.runs;
        self.nodes += other.nodes;
        for (category, count) in other.counts {
            *self.counts.entry(category).or_default() += count;
        }
        self
    }
}

/// Service for building dendrograms.
pub struct DendrogramService {
    builder: DendrogramBuilder,
    rng: Mutex<StdRng>,
}

impl DendrogramService {
    /// Create a service from validated settings.
    ///
    /// Seeds the random source from `settings.seed`, or from the OS when unset.
    pub fn new(settings: &Settings) -> ApplicationResult<Self> {
        let builder = settings.builder()?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self::with_rng(builder, rng))
    }

    pub fn with_rng(builder: DendrogramBuilder, rng: StdRng) -> Self {
        Self {
            builder,
            rng: Mutex::new(rng),
        }
    }

    pub fn builder(&self) -> &DendrogramBuilder {
        &self.builder
    }

    /// Run `draw` with exclusive access to the shared random source.
    fn draw<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> ApplicationResult<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| ApplicationError::RandomSource(e.to_string()))?;
        Ok(draw(&mut *rng))
    }

    /// Generate the source hierarchy of one entity.
    pub fn entity_tree(&self, entity: &str) -> ApplicationResult<SourceNode> {
        self.draw(|rng| self.builder.generator().generate(entity, rng))
    }

    /// Build and classify a dendrogram for `entities`, merged in the given order.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, entities: &[String]) -> ApplicationResult<Dendrogram> {
        let trees = self.draw(|rng| self.builder.generate(entities, rng))?;
        let dendrogram = self.builder.merge_trees(&trees);
        info!(
            "built dendrogram for {} entities: {} nodes",
            entities.len(),
            dendrogram.node_count()
        );
        Ok(dendrogram)
    }

    /// Build a dendrogram and encode it as JSON.
    pub fn build_json(&self, entities: &[String], pretty: bool) -> ApplicationResult<String> {
        let dendrogram = self.build(entities)?;
        to_json(&dendrogram, pretty)
    }

    /// Build `runs` independent dendrograms in parallel and aggregate their categories.
    ///
    /// Each run gets a private random source seeded from the shared one, so the
    /// result is reproducible for a seeded service regardless of scheduling.
    #[instrument(level = "debug", skip(self))]
    pub fn sample(&self, entities: &[String], runs: usize) -> ApplicationResult<SampleSummary> {
        let seeds: Vec<u64> = self.draw(|rng| (0..runs).map(|_| rng.random()).collect())?;
        debug!("sampling {} runs", seeds.len());

        let summary = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                self.builder.build(entities, &mut rng)
            })
            .fold(SampleSummary::empty, |acc, dendrogram| acc.add(&dendrogram))
            .reduce(SampleSummary::empty, SampleSummary::combine);
        Ok(summary)
    }
}

/// Encode a dendrogram as JSON: `name`, `children` (omitted when empty), `category`.
pub fn to_json(dendrogram: &Dendrogram, pretty: bool) -> ApplicationResult<String> {
    let node = dendrogram.to_node();
    let json = if pretty {
        serde_json::to_string_pretty(&node)?
    } else {
        serde_json::to_string(&node)?
    };
    Ok(json)
}
