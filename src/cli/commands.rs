//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::TreeDisplay;
use crate::config::{global_config_path, Settings};
use crate::domain::{Category, Dendrogram};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".into()));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => execute_config(cli, command),
        Commands::Build {
            entities,
            seed,
            output,
            pretty,
        } => {
            let container = container(cli, *seed)?;
            cmd_build(&container, entities, output.as_deref(), *pretty)
        }
        Commands::Tree {
            entities,
            seed,
            no_legend,
        } => {
            let container = container(cli, *seed)?;
            cmd_tree(&container, entities, !*no_legend)
        }
        Commands::Entity { name, seed } => {
            let container = container(cli, *seed)?;
            cmd_entity(&container, name)
        }
        Commands::Stats {
            entities,
            runs,
            seed,
        } => {
            let container = container(cli, *seed)?;
            cmd_stats(&container, entities, *runs)
        }
    }
}

/// Load settings, apply a command-line seed, and wire services.
fn container(cli: &Cli, seed: Option<u64>) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if seed.is_some() {
        settings.seed = seed;
    }
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings)?)
}

#[instrument(skip(container))]
fn cmd_build(
    container: &ServiceContainer,
    entities: &[String],
    output_path: Option<&Path>,
    pretty: bool,
) -> CliResult<()> {
    let entities = container.entities_or_default(entities);
    let json = container.dendrogram.build_json(&entities, pretty)?;

    match output_path {
        Some(path) => {
            container
                .fs
                .ensure_parent(path)
                .and_then(|_| container.fs.write(path, &json))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&json),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, entities: &[String], legend: bool) -> CliResult<()> {
    let entities = container.entities_or_default(entities);
    let dendrogram = container.dendrogram.build(&entities)?;
    output::info(&dendrogram.to_tree_string());
    if legend {
        output::info(&"");
        output::info(&legend_line(&dendrogram));
    }
    Ok(())
}

fn legend_line(dendrogram: &Dendrogram) -> String {
    let tree = dendrogram.tree();
    let counts = dendrogram
        .category_counts()
        .into_iter()
        .map(|(category, count)| format!("{} {}", output::paint(&category.to_string(), category), count))
        .join("  ");
    format!(
        "{}  (depth {}, {} leaves)",
        counts,
        tree.depth(),
        tree.leaf_nodes().len()
    )
}

#[instrument(skip(container))]
fn cmd_entity(container: &ServiceContainer, name: &str) -> CliResult<()> {
    let tree = container.dendrogram.entity_tree(name)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_stats(container: &ServiceContainer, entities: &[String], runs: usize) -> CliResult<()> {
    if runs == 0 {
        return Err(CliError::InvalidArgs("--runs must be at least 1".into()));
    }
    let entities = container.entities_or_default(entities);
    let summary = container.dendrogram.sample(&entities, runs)?;

    output::header(&format!(
        "{} runs, {} entities: {}",
        summary.runs,
        entities.len(),
        entities.iter().join(", ")
    ));
    for category in Category::ALL {
        let count = summary.counts.get(&category).copied().unwrap_or_default();
        output::detail(&format!(
            "{:<13} {:>8} total {:>8.2} per run",
            output::paint(&category.to_string(), category),
            count,
            count as f64 / summary.runs as f64
        ));
    }
    output::detail(&format!(
        "{:<13} {:>8} total {:>8.2} per run",
        "nodes",
        summary.nodes,
        summary.nodes as f64 / summary.runs as f64
    ));
    Ok(())
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            let rendered = toml::to_string_pretty(&settings).map_err(|e| ApplicationError::Config {
                message: format!("render settings: {e}"),
            })?;
            output::info(&rendered);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::info(&format!("global: {}{}", path.display(), state));
                }
                None => output::warning("no config directory for this platform"),
            }
            if let Some(local) = &cli.config {
                output::info(&format!("local:  {}", local.display()));
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("no config directory for this platform".into()))?;
            let container = ServiceContainer::new(Settings::default())?;
            if container.fs.exists(&path) && !*force {
                return Err(CliError::Usage(format!(
                    "config exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            let template = Settings::template()?;
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &template))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}
