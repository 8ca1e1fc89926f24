//! Application services

pub mod dendrogram;

pub use dendrogram::{to_json, DendrogramService, SampleSummary};
