//! Merge per-entity hierarchies into one classified dendrogram.
//!
//! Layers, inner to outer: [`domain`] (generation, merge, classification),
//! [`application`] (services), [`infrastructure`] (I/O and wiring), [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{build_dendrogram, Category, Dendrogram, DendrogramNode};
