//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::DendrogramService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    pub dendrogram: DendrogramService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let dendrogram = DendrogramService::new(&settings)?;
        let settings = Arc::new(settings);

        Ok(Self {
            settings,
            fs,
            dendrogram,
        })
    }

    /// Entities from the command line, or the configured defaults when none given.
    pub fn entities_or_default(&self, entities: &[String]) -> Vec<String> {
        if entities.is_empty() {
            self.settings.entities.clone()
        } else {
            entities.to_vec()
        }
    }
}
