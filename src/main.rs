//! # parley
//!
//! Command-line front end for recording, rendering and persisting
//! conversation history.

#![deny(unsafe_code)]

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parley_memory::{EntityLog, MessageLog};
use parley_script::{Interaction, InteractionParser, PatternParser};
use parley_settings::ParleySettings;

/// Conversation history for prompting language models.
#[derive(Parser, Debug)]
#[command(name = "parley", about = "Conversation history for prompting language models")]
struct Cli {
    /// Single-stream history file (overrides settings).
    #[arg(long, global = true)]
    message_log: Option<PathBuf>,

    /// Per-entity history file (overrides settings).
    #[arg(long, global = true)]
    entity_log: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `parley_memory=trace` (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work with the single-stream history.
    #[command(subcommand)]
    Log(LogCommand),
    /// Work with per-entity histories.
    #[command(subcommand)]
    Entity(EntityCommand),
}

#[derive(Subcommand, Debug)]
enum LogCommand {
    /// Append a message.
    Append { role: String, content: String },
    /// Print recent messages as `role: content` lines.
    Render {
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// Print recent messages as JSON lines.
    Recent {
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
enum EntityCommand {
    /// Append a message for an entity.
    Append {
        entity: String,
        role: String,
        content: String,
    },
    /// Print an entity's recent messages as `role: content` lines.
    Render {
        entity: String,
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },
    /// List known entities with their message counts.
    List,
    /// Extract `Entity (role): content` lines from a file (or stdin) and record them.
    Ingest { file: Option<PathBuf> },
}

/// Map a user-supplied limit onto the log API; negative means "nothing".
fn resolve_limit(limit: Option<i64>, default: usize) -> usize {
    limit.map_or(default, |n| usize::try_from(n).unwrap_or(0))
}

fn write_block(out: &mut impl Write, text: &str) -> Result<()> {
    if !text.is_empty() {
        writeln!(out, "{text}")?;
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn run_log(
    command: LogCommand,
    path: &Path,
    default_limit: usize,
    out: &mut impl Write,
) -> Result<()> {
    let mut log = MessageLog::load(path)
        .with_context(|| format!("Failed to load message log {}", path.display()))?;

    match command {
        LogCommand::Append { role, content } => {
            log.append(role, content);
            ensure_parent_dir(path)?;
            log.save(path)
                .with_context(|| format!("Failed to save message log {}", path.display()))?;
            tracing::info!(path = %path.display(), records = log.len(), "appended message");
        }
        LogCommand::Render { limit } => {
            write_block(out, &log.render(resolve_limit(limit, default_limit)))?;
        }
        LogCommand::Recent { limit } => {
            for record in log.recent(resolve_limit(limit, default_limit)) {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
        }
    }
    Ok(())
}

fn run_entity(
    command: EntityCommand,
    path: &Path,
    default_limit: usize,
    input: &mut impl Read,
    out: &mut impl Write,
) -> Result<()> {
    let mut entities = EntityLog::load(path)
        .with_context(|| format!("Failed to load entity log {}", path.display()))?;
    let save = |entities: &EntityLog| -> Result<()> {
        ensure_parent_dir(path)?;
        entities
            .save(path)
            .with_context(|| format!("Failed to save entity log {}", path.display()))
    };

    match command {
        EntityCommand::Append {
            entity,
            role,
            content,
        } => {
            entities.append(entity, role, content);
            save(&entities)?;
        }
        EntityCommand::Render { entity, limit } => {
            write_block(out, &entities.render(&entity, resolve_limit(limit, default_limit)))?;
        }
        EntityCommand::List => {
            for (entity, log) in entities.iter() {
                writeln!(out, "{entity}\t{}", log.len())?;
            }
        }
        EntityCommand::Ingest { file } => {
            let text = match file {
                Some(file) => std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read script {}", file.display()))?,
                None => {
                    let mut text = String::new();
                    let _ = input.read_to_string(&mut text).context("Failed to read stdin")?;
                    text
                }
            };
            let interactions = PatternParser.parse(&text);
            let count = interactions.len();
            entities.append_all(interactions.into_iter().map(Interaction::into_parts));
            save(&entities)?;
            tracing::info!(path = %path.display(), interactions = count, "ingested script");
            writeln!(out, "ingested {count} interactions")?;
        }
    }
    Ok(())
}

fn run(
    cli: Cli,
    settings: &ParleySettings,
    input: &mut impl Read,
    out: &mut impl Write,
) -> Result<()> {
    let default_limit = settings.history.recent_limit;
    match cli.command {
        Command::Log(command) => {
            let path = cli
                .message_log
                .unwrap_or_else(|| settings.history.message_log.clone());
            run_log(command, &path, default_limit, out)
        }
        Command::Entity(command) => {
            let path = cli
                .entity_log
                .unwrap_or_else(|| settings.history.entity_log.clone());
            run_entity(command, &path, default_limit, input, out)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = parley_settings::load_settings();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    parley_core::logging::init_subscriber(level);
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "failed to load settings, using defaults");
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run(cli, &settings, &mut stdin.lock(), &mut stdout.lock())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
