//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and owns the shared random source.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
