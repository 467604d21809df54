//! Subcommand dispatch and handlers

use std::io;
use std::path::PathBuf;
use std::process;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings, SettingsError};
use crate::domain::builder::{Forest, HierarchyBuilder};
use crate::domain::error::DomainError;
use crate::domain::record::FieldSpec;
use crate::domain::render::ToTermTree;
use crate::exitcode;
use crate::loader::load_records;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree) => tree(cli),
        Some(Commands::Nest) => nest(cli),
        Some(Commands::Roots) => roots(cli),
        Some(Commands::Leaves) => leaves(cli),
        Some(Commands::Branches) => branches(cli),
        Some(Commands::Orphans) => orphans(cli),
        Some(Commands::Check) => check(cli),
        Some(Commands::Stats) => stats(cli),
        Some(Commands::Config { command }) => config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "kitree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// Resolve the effective field spec: config layers, then CLI flag overrides.
fn effective_fields(cli: &Cli) -> CliResult<FieldSpec> {
    let mut settings = Settings::load()?;
    if let Some(id_field) = &cli.id_field {
        settings.id_field = id_field.clone();
    }
    if let Some(parent_field) = &cli.parent_field {
        settings.parent_field = parent_field.clone();
    }
    if let Some(root_marker) = &cli.root_marker {
        settings.root_marker = root_marker.clone();
    }
    if let Some(label_field) = &cli.label_field {
        settings.label_field = label_field.clone();
    }
    Ok(settings.field_spec()?)
}

fn records_file(cli: &Cli) -> CliResult<PathBuf> {
    cli.file
        .clone()
        .ok_or_else(|| CliError::Usage("missing records file, pass --file <FILE>".to_string()))
}

fn load_forest(cli: &Cli) -> CliResult<(Forest, FieldSpec)> {
    let fields = effective_fields(cli)?;
    let path = records_file(cli)?;
    let records = load_records(&path)?;
    debug!(records = records.len(), ?path, "loaded");

    let mut builder = HierarchyBuilder::new();
    let forest = builder.build_forest(&records, &fields)?;
    Ok((forest, fields))
}

#[instrument(skip(cli))]
fn tree(cli: &Cli) -> CliResult<()> {
    let (forest, _) = load_forest(cli)?;
    for tree in &forest.trees {
        print!("{}", tree.to_tree_string());
    }
    Ok(())
}

#[instrument(skip(cli))]
fn nest(cli: &Cli) -> CliResult<()> {
    let (forest, _) = load_forest(cli)?;
    let nested = forest.to_nested();
    let rendered = serde_json::to_string_pretty(&nested)?;
    output::info(&rendered);
    Ok(())
}

#[instrument(skip(cli))]
fn roots(cli: &Cli) -> CliResult<()> {
    let (forest, _) = load_forest(cli)?;
    for tree in &forest.trees {
        if let Some(node) = tree.root().and_then(|r| tree.get_node(r)) {
            output::info(&node.data.label);
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn leaves(cli: &Cli) -> CliResult<()> {
    let (forest, _) = load_forest(cli)?;
    for leaf in forest.leaf_nodes() {
        output::info(&leaf);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn branches(cli: &Cli) -> CliResult<()> {
    let (forest, _) = load_forest(cli)?;
    for branch in forest.branches() {
        output::info(&branch.iter().join(" <- "));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn orphans(cli: &Cli) -> CliResult<()> {
    let (forest, fields) = load_forest(cli)?;
    if forest.orphans.is_empty() {
        output::success("no orphaned records");
        return Ok(());
    }
    for record in &forest.orphans {
        output::info(&describe_orphan(record, &fields));
    }
    process::exit(exitcode::FINDINGS)
}

fn describe_orphan(record: &crate::domain::record::Record, fields: &FieldSpec) -> String {
    let parent = record
        .get(&fields.parent_field)
        .cloned()
        .unwrap_or(Value::Null);
    format!("{} (parent: {})", fields.label(record), parent)
}

#[instrument(skip(cli))]
fn check(cli: &Cli) -> CliResult<()> {
    let fields = effective_fields(cli)?;
    let path = records_file(cli)?;
    let records = load_records(&path)?;

    let mut builder = HierarchyBuilder::new();
    match builder.build_forest(&records, &fields) {
        Err(e @ (DomainError::DuplicateId(_) | DomainError::CycleDetected(_))) => {
            output::failure(&e);
            process::exit(exitcode::FINDINGS)
        }
        Err(e) => Err(e.into()),
        Ok(forest) => {
            if forest.orphans.is_empty() {
                output::success(&format!(
                    "hierarchy OK: {} trees, {} nodes",
                    forest.trees.len(),
                    forest.node_count()
                ));
                return Ok(());
            }
            output::warning(&format!("{} orphaned records", forest.orphans.len()));
            for record in &forest.orphans {
                output::failure(&describe_orphan(record, &fields));
            }
            process::exit(exitcode::FINDINGS)
        }
    }
}

#[instrument(skip(cli))]
fn stats(cli: &Cli) -> CliResult<()> {
    let (forest, _) = load_forest(cli)?;
    output::header("Forest");
    output::detail(&format!("trees:   {}", forest.trees.len()));
    output::detail(&format!("nodes:   {}", forest.node_count()));
    output::detail(&format!("depth:   {}", forest.depth()));
    output::detail(&format!("leaves:  {}", forest.leaf_nodes().len()));
    output::detail(&format!("orphans: {}", forest.orphans.len()));
    Ok(())
}

fn config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Config(SettingsError::Message(
                    "cannot determine config directory".to_string(),
                ))
            })?;
            if path.exists() {
                output::warning(&format!("config already exists: {}", path.display()));
                return Ok(());
            }
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(&path, Settings::template())?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&path.display()),
                None => output::warning("cannot determine config directory"),
            }
            Ok(())
        }
    }
}
