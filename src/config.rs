//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dendromerge/dendromerge.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `DENDROMERGE_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::builder::DEFAULT_ROOT_NAME;
use crate::domain::generator::{
    DEFAULT_CANDIDATE_GROUPS, DEFAULT_SHARED_GROUP, DEFAULT_SHARED_LEAF,
};
use crate::domain::{DendrogramBuilder, GeneratorPolicy};

const ENV_PREFIX: &str = "DENDROMERGE";

/// Shape of the generated entity hierarchies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Group every entity carries (e.g. "OU=Admins")
    pub shared_group: String,
    /// Single leaf below the shared group
    pub shared_leaf: String,
    /// Pool the extra groups are drawn from, without replacement
    pub candidate_groups: Vec<String>,
    pub min_groups: usize,
    pub max_groups: usize,
    pub min_leaves: usize,
    pub max_leaves: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            shared_group: DEFAULT_SHARED_GROUP.into(),
            shared_leaf: DEFAULT_SHARED_LEAF.into(),
            candidate_groups: DEFAULT_CANDIDATE_GROUPS.map(String::from).to_vec(),
            min_groups: 2,
            max_groups: 4,
            min_leaves: 1,
            max_leaves: 3,
        }
    }
}

/// Raw generator settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGeneratorSettings {
    pub shared_group: Option<String>,
    pub shared_leaf: Option<String>,
    pub candidate_groups: Option<Vec<String>>,
    pub min_groups: Option<usize>,
    pub max_groups: Option<usize>,
    pub min_leaves: Option<usize>,
    pub max_leaves: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_name: Option<String>,
    pub entities: Option<Vec<String>>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub generator: RawGeneratorSettings,
}

impl GeneratorSettings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are appended to base, keeping base order
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are dropped
    ///
    /// Order is kept because the candidate pool is shuffled by a seeded source.
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let removed: HashSet<&str> = overlay
            .iter()
            .filter_map(|item| item.strip_prefix('!'))
            .collect();

        let mut seen = HashSet::new();
        base.iter()
            .chain(overlay.iter().filter(|item| !item.starts_with('!')))
            .filter(|item| !removed.contains(item.as_str()))
            .filter(|item| seen.insert(item.as_str()))
            .cloned()
            .collect()
    }

    /// Merge overlay onto self: scalars replace, the candidate pool is unioned.
    fn merge(&self, overlay: &RawGeneratorSettings) -> Self {
        Self {
            candidate_groups: overlay
                .candidate_groups
                .as_ref()
                .map(|o| Self::merge_array(&self.candidate_groups, o))
                .unwrap_or_else(|| self.candidate_groups.clone()),
            ..self.replace_scalars(overlay)
        }
    }

    /// Apply global config onto defaults: everything specified REPLACES.
    fn apply_global(&self, global: &RawGeneratorSettings) -> Self {
        Self {
            candidate_groups: global
                .candidate_groups
                .clone()
                .unwrap_or_else(|| self.candidate_groups.clone()),
            ..self.replace_scalars(global)
        }
    }

    fn replace_scalars(&self, raw: &RawGeneratorSettings) -> Self {
        Self {
            shared_group: raw
                .shared_group
                .clone()
                .unwrap_or_else(|| self.shared_group.clone()),
            shared_leaf: raw
                .shared_leaf
                .clone()
                .unwrap_or_else(|| self.shared_leaf.clone()),
            candidate_groups: self.candidate_groups.clone(),
            min_groups: raw.min_groups.unwrap_or(self.min_groups),
            max_groups: raw.max_groups.unwrap_or(self.max_groups),
            min_leaves: raw.min_leaves.unwrap_or(self.min_leaves),
            max_leaves: raw.max_leaves.unwrap_or(self.max_leaves),
        }
    }

    /// Validate into a generator policy.
    pub fn policy(&self) -> Result<GeneratorPolicy, ApplicationError> {
        Ok(GeneratorPolicy::new(
            self.shared_group.as_str(),
            self.shared_leaf.as_str(),
            self.candidate_groups.clone(),
            (self.min_groups, self.max_groups),
            (self.min_leaves, self.max_leaves),
        )?)
    }
}

/// Unified configuration for dendromerge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name of the combined root (default: "Permissions")
    pub root_name: String,
    /// Entities merged when none are given on the command line
    pub entities: Vec<String>,
    /// Seed for the random source; unset means seeded from the OS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub generator: GeneratorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.into(),
            entities: vec!["User Bob".into(), "User Alice".into()],
            seed: None,
            generator: GeneratorSettings::default(),
        }
    }
}

/// Get the XDG config directory for dendromerge.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dendromerge").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dendromerge.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge a local config onto self: scalars replace, candidate pool unions.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            entities: overlay
                .entities
                .clone()
                .unwrap_or_else(|| self.entities.clone()),
            seed: overlay.seed.or(self.seed),
            generator: self.generator.merge(&overlay.generator),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            generator: self.generator.apply_global(&global.generator),
            ..self.merge_with(&RawSettings {
                generator: RawGeneratorSettings::default(),
                ..global.clone()
            })
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line; must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config (lists REPLACE defaults)
    /// 3. Local config (`candidate_groups` UNION with global, `!name` removes)
    /// 4. Environment variables `DENDROMERGE_*` (REPLACE)
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(local_path) = local {
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Load a single config file on top of the defaults, ignoring global config
    /// and environment.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        let settings = Self::default().merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply DENDROMERGE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`, lists use `,`:
    /// `DENDROMERGE_GENERATOR__CANDIDATE_GROUPS="OU=A,OU=B"`.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("entities")
                .with_list_parse_key("generator.candidate_groups"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("entities") {
            settings.entities = val;
        }
        if let Ok(val) = config.get::<u64>("seed") {
            settings.seed = Some(val);
        }
        if let Ok(val) = config.get_string("generator.shared_group") {
            settings.generator.shared_group = val;
        }
        if let Ok(val) = config.get_string("generator.shared_leaf") {
            settings.generator.shared_leaf = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("generator.candidate_groups") {
            settings.generator.candidate_groups = val;
        }
        for (key, field) in [
            ("generator.min_groups", &mut settings.generator.min_groups),
            ("generator.max_groups", &mut settings.generator.max_groups),
            ("generator.min_leaves", &mut settings.generator.min_leaves),
            ("generator.max_leaves", &mut settings.generator.max_leaves),
        ] {
            if let Ok(val) = config.get::<usize>(key) {
                *field = val;
            }
        }

        Ok(settings)
    }

    /// Check the generator policy and that the root name does not shadow a group.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.root_name.is_empty() {
            return Err(ApplicationError::Config {
                message: "root_name must not be empty".into(),
            });
        }
        let generator = &self.generator;
        if self.root_name == generator.shared_group
            || generator.candidate_groups.contains(&self.root_name)
        {
            return Err(ApplicationError::Config {
                message: format!("root_name collides with a group: {}", self.root_name),
            });
        }
        generator.policy()?;
        Ok(())
    }

    /// Builder for the configured root name and generator policy.
    pub fn builder(&self) -> Result<DendrogramBuilder, ApplicationError> {
        Ok(DendrogramBuilder::new(
            self.root_name.as_str(),
            self.generator.policy()?,
        ))
    }

    /// TOML template with the compiled defaults.
    pub fn template() -> Result<String, ApplicationError> {
        toml::to_string_pretty(&Self::default()).map_err(|e| ApplicationError::Config {
            message: format!("render template: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_array_appends_and_negates() {
        let base = strings(&["a", "b"]);
        assert_eq!(
            GeneratorSettings::merge_array(&base, &strings(&["c"])),
            strings(&["a", "b", "c"])
        );
        assert_eq!(
            GeneratorSettings::merge_array(&base, &strings(&["!a", "c", "b"])),
            strings(&["b", "c"])
        );
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.root_name, "Permissions");
    }

    #[test]
    fn test_template_parses_back_to_defaults() {
        let template = Settings::template().unwrap();
        let parsed: Settings = toml::from_str(&template).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
