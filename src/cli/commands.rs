//! Command dispatch

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, AuditLog, ScoringService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::audit::{diff, EntityType};
use crate::domain::identity::assign_identifiers;
use crate::domain::node::{forest_depth, leaf_names, node_count, TreeNode};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Assign {
            file,
            output,
            in_place,
        }) => _assign(file, output.as_deref(), *in_place),
        Some(Commands::Tree { file }) => _tree(file),
        Some(Commands::Score { file, scores }) => _score(file, scores),
        Some(Commands::Diff {
            before,
            after,
            entity_type,
            entity_id,
            entity_name,
            actor,
            json,
            log,
        }) => _diff(
            before.as_deref(),
            after.as_deref(),
            entity_type,
            entity_id,
            entity_name,
            actor.as_deref(),
            *json,
            *log,
        ),
        Some(Commands::Log {
            file,
            entity,
            entity_type,
        }) => _log(file.as_deref(), entity.as_deref(), entity_type.as_deref()),
        Some(Commands::Config { command }) => _config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "rstax", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument(level = "debug")]
fn _assign(file: &Path, output: Option<&Path>, in_place: bool) -> CliResult<()> {
    let forest = load_forest(file)?;
    let assigned = assign_identifiers(&forest, None);
    let json = to_pretty_json(&assigned)?;

    let target = if in_place { Some(file) } else { output };
    match target {
        Some(path) => {
            write_file(path, &json)?;
            output::success(&format!(
                "assigned identifiers for {} nodes -> {}",
                node_count(&assigned),
                path.display()
            ));
        }
        None => output::info(&json),
    }
    Ok(())
}

#[instrument(level = "debug")]
fn _tree(file: &Path) -> CliResult<()> {
    let forest = load_forest(file)?;
    let assigned = assign_identifiers(&forest, None);
    print!("{}", output::render_forest(&assigned));
    output::detail(&format!(
        "{} nodes, {} leaves, depth {}",
        node_count(&assigned),
        leaf_names(&assigned).len(),
        forest_depth(&assigned)
    ));
    Ok(())
}

#[instrument(level = "debug")]
fn _score(file: &Path, scores_file: &Path) -> CliResult<()> {
    let settings = Settings::load(Some(Path::new(".")))?;
    let weights = settings.weight_config()?;

    let forest = load_forest(file)?;
    let assigned = assign_identifiers(&forest, None);

    let content = read_file(scores_file)?;
    let scores: BTreeMap<String, f64> =
        serde_json::from_str(&content).map_err(|e| CliError::Json {
            path: scores_file.to_path_buf(),
            source: e,
        })?;
    debug!(scores = scores.len(), "loaded leaf scores");

    let service = ScoringService::new(weights);
    let values = service.rollup(&assigned, &scores)?;

    print_rollup(&assigned, &values);
    Ok(())
}

fn print_rollup(forest: &[TreeNode], values: &BTreeMap<String, f64>) {
    for node in forest {
        if let Some(value) = values.get(&node.id) {
            let path = node.hierarchical_id.as_deref().unwrap_or("-");
            output::info(&format!("{value:>10.3}  {path}  {}", node.name));
        }
        print_rollup(node.child_nodes(), values);
    }
}

#[allow(clippy::too_many_arguments)]
#[instrument(level = "debug", skip_all)]
fn _diff(
    before: Option<&Path>,
    after: Option<&Path>,
    entity_type: &str,
    entity_id: &str,
    entity_name: &str,
    actor: Option<&str>,
    json: bool,
    log: bool,
) -> CliResult<()> {
    if before.is_none() && after.is_none() {
        return Err(CliError::InvalidArgs(
            "at least one of --before/--after is required".to_string(),
        ));
    }
    let entity_type: EntityType = entity_type
        .parse()
        .map_err(|e: crate::domain::DomainError| CliError::InvalidArgs(e.to_string()))?;

    let settings = Settings::load(Some(Path::new(".")))?;
    let actor = actor.unwrap_or(&settings.actor);

    let before_value = before.map(load_value).transpose()?;
    let after_value = after.map(load_value).transpose()?;

    let entry = diff(
        before_value.as_ref(),
        after_value.as_ref(),
        entity_type,
        actor,
        entity_id,
        entity_name,
    )
    .map_err(ApplicationError::from)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&entry).map_err(|e| ApplicationError::OperationFailed {
                context: "serialize audit entry".to_string(),
                source: Box::new(e),
            })?;
        output::info(&rendered);
    } else {
        output::header(&format!(
            "{} {} {} ({})",
            entry.change_type, entry.entity_type, entry.entity_id, entry.entity_name
        ));
        for change in &entry.field_changes {
            if let Some(old) = &change.old_value {
                output::diff_remove(&format!("{}: {}", change.field, old));
            }
            if let Some(new) = &change.new_value {
                output::diff_add(&format!("{}: {}", change.field, new));
            }
        }
        if entry.field_changes.is_empty() {
            output::detail(&"no field changes");
        }
    }

    if log {
        append_to_log(&settings.log_path, entry)?;
        output::success(&format!("appended to {}", settings.log_path.display()));
    }
    Ok(())
}

fn append_to_log(path: &Path, entry: crate::domain::AuditEntry) -> CliResult<()> {
    let mut log = if path.exists() {
        AuditLog::from_jsonl(&read_file(path)?)?
    } else {
        AuditLog::new()
    };
    log.append(entry);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CliError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    write_file(path, &log.to_jsonl()?)?;
    Ok(())
}

#[instrument(level = "debug", skip_all)]
fn _log(file: Option<&Path>, entity: Option<&str>, entity_type: Option<&str>) -> CliResult<()> {
    let settings = Settings::load(Some(Path::new(".")))?;
    let path: PathBuf = file
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.log_path.clone());

    if !path.exists() {
        output::info(&format!("no audit log at {}", path.display()));
        return Ok(());
    }
    let log = AuditLog::from_jsonl(&read_file(&path)?)?;

    let type_filter: Option<EntityType> = entity_type
        .map(|s| {
            s.parse()
                .map_err(|e: crate::domain::DomainError| CliError::InvalidArgs(e.to_string()))
        })
        .transpose()?;

    let mut shown = 0usize;
    for entry in log.entries() {
        if let Some(id) = entity {
            if entry.entity_id != id {
                continue;
            }
        }
        if let Some(ty) = type_filter {
            if entry.entity_type != ty {
                continue;
            }
        }
        shown += 1;
        let what = match &entry.summary {
            Some(summary) => summary.clone(),
            None => {
                let fields = entry
                    .field_changes
                    .iter()
                    .map(|c| c.field.as_str())
                    .join(", ");
                if fields.is_empty() {
                    "-".to_string()
                } else {
                    fields
                }
            }
        };
        output::info(&format!(
            "{}  {:7} {:12} {} ({}) by {}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.change_type.to_string(),
            entry.entity_type.to_string(),
            entry.entity_id,
            entry.entity_name,
            entry.user,
            what
        ));
    }
    output::detail(&format!("{shown} of {} entries", log.len()));
    Ok(())
}

fn _config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(Path::new(".")))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { path } => {
            let target = match path {
                Some(p) => p.clone(),
                None => crate::config::global_config_path().ok_or_else(|| {
                    CliError::InvalidArgs("cannot determine global config directory".to_string())
                })?,
            };
            if target.exists() {
                return Err(CliError::InvalidArgs(format!(
                    "config file already exists: {}",
                    target.display()
                )));
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CliError::Write {
                    path: target.clone(),
                    source: e,
                })?;
            }
            write_file(&target, &Settings::template())?;
            output::success(&format!("wrote {}", target.display()));
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, content: &str) -> CliResult<()> {
    std::fs::write(path, content).map_err(|e| CliError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

fn load_forest(path: &Path) -> CliResult<Vec<TreeNode>> {
    let content = read_file(path)?;
    let forest: Vec<TreeNode> = serde_json::from_str(&content).map_err(|e| CliError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(
        nodes = node_count(&forest),
        depth = forest_depth(&forest),
        "loaded taxonomy"
    );
    Ok(forest)
}

fn load_value(path: &Path) -> CliResult<serde_json::Value> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|e| CliError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

fn to_pretty_json(forest: &[TreeNode]) -> CliResult<String> {
    let mut json =
        serde_json::to_string_pretty(forest).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize taxonomy".to_string(),
            source: Box::new(e),
        })?;
    json.push('\n');
    Ok(json)
}
