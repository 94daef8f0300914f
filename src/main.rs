//! Binary entry point for uado.
//!
//! This binary provides the CLI interface for cooldown-aware prompting.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use uado::config::UadoConfig;
use uado::cooldown::CooldownEngine;
use uado::models::{Difficulty, PatternEntry};
use uado::observability::{self, LoggingConfig};
use uado::orchestrator::PromptOrchestrator;
use uado::services::{ContentHasher, explain_pattern, find_best_matches, inject_examples, rank_matches};
use uado::signals::lsp::scan_tsserver_output;
use uado::storage::{
    DataStatus, PasteLog, PatternStore, SnapshotStore, UserStore, paste_output,
};

/// Uado - cooldown-aware prompting for AI coding assistants.
#[derive(Parser)]
#[command(name = "uado")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Submit a prompt, waiting out any active cooldown.
    Prompt {
        /// The prompt text.
        text: String,

        /// tsserver log to replay before submitting.
        #[arg(long)]
        lsp_log: Option<PathBuf>,
    },

    /// Read tsserver output on stdin and print cooldown transitions.
    WatchLsp,

    /// Manage stored prompt patterns.
    Patterns {
        #[command(subcommand)]
        action: PatternsAction,
    },

    /// Print the canonical content hash of a JSON value.
    Hash {
        /// JSON value (read from stdin when omitted).
        json: Option<String>,
    },

    /// Save a file's content as a content-addressed snapshot.
    Snapshot {
        /// File to snapshot.
        file: PathBuf,
    },

    /// Write assistant output (read from stdin) to a project file.
    Paste {
        /// Destination file, relative to the working directory.
        file: String,

        /// The prompt that produced the output.
        #[arg(long, default_value = "")]
        prompt: String,

        /// Replace the file if it already exists.
        #[arg(long)]
        force: bool,
    },

    /// Show paste history, newest first.
    History,

    /// Show configuration and stored data.
    Status,

    /// Set your skill level (beginner, intermediate, or advanced).
    Level {
        /// The new level.
        difficulty: Difficulty,
    },

    /// Show the resolved configuration.
    Config,
}

/// Pattern subcommands.
#[derive(Subcommand)]
enum PatternsAction {
    /// Show stored patterns similar to a prompt.
    Suggest {
        /// Prompt to match against.
        text: String,

        /// Maximum number of suggestions.
        #[arg(short, long, default_value = "3")]
        limit: usize,

        /// Describe each suggestion.
        #[arg(long)]
        explain: bool,
    },

    /// Record a prompt that produced good output.
    Log {
        /// The prompt.
        #[arg(long)]
        prompt: String,

        /// File the output was written to.
        #[arg(long)]
        file: String,

        /// Snippet of the generated output.
        #[arg(long)]
        snippet: String,

        /// Pattern tag.
        #[arg(long)]
        tag: Option<String>,

        /// Difficulty label (defaults to your skill level).
        #[arg(long)]
        difficulty: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = UadoConfig::load(cli.config.as_deref());

    if let Err(e) = observability::init(LoggingConfig::from_level(config.log_level, cli.verbose)) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: UadoConfig) -> Result<()> {
    match command {
        Commands::Prompt { text, lsp_log } => cmd_prompt(&config, text, lsp_log).await,
        Commands::WatchLsp => cmd_watch_lsp(&config).await,
        Commands::Patterns { action } => match action {
            PatternsAction::Suggest {
                text,
                limit,
                explain,
            } => cmd_patterns_suggest(&text, limit, explain),
            PatternsAction::Log {
                prompt,
                file,
                snippet,
                tag,
                difficulty,
            } => cmd_patterns_log(prompt, file, snippet, tag, difficulty),
        },
        Commands::Hash { json } => cmd_hash(json),
        Commands::Snapshot { file } => cmd_snapshot(&file),
        Commands::Paste {
            file,
            prompt,
            force,
        } => cmd_paste(&config, &file, &prompt, force).await,
        Commands::History => cmd_history(),
        Commands::Status => cmd_status(&config),
        Commands::Level { difficulty } => cmd_level(difficulty),
        Commands::Config => {
            cmd_config(&config);
            Ok(())
        },
    }
}

fn project_root() -> Result<PathBuf> {
    std::env::current_dir().context("cannot determine working directory")
}

/// Submits a prompt through the orchestrator.
async fn cmd_prompt(config: &UadoConfig, text: String, lsp_log: Option<PathBuf>) -> Result<()> {
    let engine = CooldownEngine::new(config.cooldown);
    let orchestrator = PromptOrchestrator::new(engine.clone());

    if let Some(path) = lsp_log {
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("cannot open {}", path.display()))?;
        let signals = scan_tsserver_output(BufReader::new(file), &engine).await?;
        info!(signals, path = %path.display(), "replayed tsserver log");
    }

    let rendered = if config.enable_pattern_injection {
        let entries = PatternStore::new(project_root()?).entries()?;
        let examples = find_best_matches(&text, &entries, config.pattern_top_n);
        info!(injected = examples.len(), "pattern injection");
        inject_examples(&text, &examples)
    } else {
        text
    };

    if engine.is_active() {
        eprintln!("Cooldown active; prompt queued until the project settles.");
    }
    let mode = config.mode;
    orchestrator
        .wrap_prompt(move || async move {
            info!(mode = mode.as_str(), "submitting prompt");
            println!("{rendered}");
        })
        .await;

    orchestrator.close();
    Ok(())
}

/// Prints cooldown transitions while tsserver output arrives on stdin.
///
/// After EOF, waits for an active cooldown to end before exiting.
async fn cmd_watch_lsp(config: &UadoConfig) -> Result<()> {
    let engine = CooldownEngine::new(config.cooldown);
    let mut events = engine.subscribe();

    let scan_engine = engine.clone();
    let mut scanner = tokio::spawn(async move {
        scan_tsserver_output(BufReader::new(tokio::io::stdin()), &scan_engine).await
    });
    let mut input_done = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => println!("{event}"),
                Err(RecvError::Lagged(skipped)) => eprintln!("({skipped} events skipped)"),
                Err(RecvError::Closed) => break,
            },
            result = &mut scanner, if !input_done => {
                let signals = result.context("tsserver reader task failed")??;
                info!(signals, "tsserver output closed");
                input_done = true;
            },
        }

        // State is published under the engine lock, so once it reads idle
        // every transition is already in the channel.
        if input_done && !engine.is_active() {
            while let Ok(event) = events.try_recv() {
                println!("{event}");
            }
            break;
        }
    }
    Ok(())
}

fn cmd_patterns_suggest(text: &str, limit: usize, explain: bool) -> Result<()> {
    let entries = PatternStore::new(project_root()?).entries()?;
    let ranked = rank_matches(text, &entries, limit);
    if ranked.is_empty() {
        println!("No similar patterns found.");
        return Ok(());
    }
    for (i, scored) in ranked.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} ({})",
            i + 1,
            scored.score,
            scored.entry.prompt,
            scored.entry.file
        );
        if explain {
            println!("   {}", explain_pattern(scored.entry));
        }
    }
    Ok(())
}

fn cmd_patterns_log(
    prompt: String,
    file: String,
    snippet: String,
    tag: Option<String>,
    difficulty: Option<String>,
) -> Result<()> {
    let root = project_root()?;
    let user = UserStore::new(&root);
    let difficulty = difficulty.unwrap_or_else(|| user.level().to_string());

    let mut entry = PatternEntry::new(prompt, file, snippet).with_difficulty(difficulty.clone());
    if let Some(tag) = tag {
        entry = entry.with_tag(tag);
    }

    let store = PatternStore::new(&root);
    if store.log_pattern(entry)? {
        println!("Pattern logged to {}", store.path().display());
        if let Ok(level) = difficulty.parse::<Difficulty>() {
            let count = user.increment(level)?;
            info!(level = %level, count, "pattern count updated");
        }
    } else {
        println!("Pattern already logged.");
    }
    Ok(())
}

fn cmd_hash(json: Option<String>) -> Result<()> {
    let raw = if let Some(json) = json {
        json
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read stdin")?;
        buf
    };
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| uado::Error::InvalidInput(format!("not valid JSON: {e}")))?;
    println!("{}", ContentHasher::compute_hash(&value));
    Ok(())
}

fn cmd_snapshot(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let path = SnapshotStore::new(project_root()?).save(&content)?;
    println!("{}", path.display());
    Ok(())
}

/// Writes stdin to `file`, then waits out the configured write pause.
async fn cmd_paste(config: &UadoConfig, file: &str, prompt: &str, force: bool) -> Result<()> {
    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("cannot read stdin")?;

    let entry = paste_output(&project_root()?, file, &content, prompt, force)
        .with_context(|| format!("cannot paste into {file} (use --force to replace it)"))?;
    let verb = if entry.was_overwrite { "Replaced" } else { "Wrote" };
    println!("{verb} ./{} ({} bytes)", entry.file, entry.bytes_written);

    if let Some(pause) = config.write_pause() {
        eprintln!(
            "Cooling down for {}s to let linters settle...",
            pause.as_secs_f64().round()
        );
        tokio::time::sleep(pause).await;
    }
    Ok(())
}

fn cmd_history() -> Result<()> {
    let log = PasteLog::new(project_root()?);
    let entries = log.history()?;
    if entries.is_empty() {
        println!("No paste history found yet.");
        println!("Try running `uado paste` first.");
        return Ok(());
    }
    for entry in entries {
        println!("{}", entry.file);
        println!(
            "  {}  {} bytes",
            entry.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            entry.bytes_written
        );
        println!("  {}", entry.prompt_preview(100));
        if let Some(index) = entry.queue_index {
            println!("  #{index}");
        }
        if let Some(error) = &entry.error {
            println!("  failed: {error}");
        }
        println!();
    }
    Ok(())
}

fn cmd_status(config: &UadoConfig) -> Result<()> {
    println!("Configuration:");
    for (key, value, _) in config.describe() {
        println!("- {key}: {value}");
    }

    let status = DataStatus::collect(project_root()?);
    println!();
    println!("Skill level: {}", status.level);
    println!("Snapshots: {}", status.snapshots);
    println!();
    println!("Active logs:");
    for (name, count) in [
        (uado::storage::PASTE_LOG_FILE, status.pastes),
        (uado::storage::PATTERNS_FILE, status.patterns),
    ] {
        if let Some(count) = count {
            println!("- {name} ({count} entries)");
        }
    }
    Ok(())
}

fn cmd_level(difficulty: Difficulty) -> Result<()> {
    UserStore::new(project_root()?).set_level(difficulty)?;
    println!("Difficulty set to {difficulty}");
    Ok(())
}

fn cmd_config(config: &UadoConfig) {
    let width = config
        .describe()
        .iter()
        .map(|(key, value, _)| key.len() + value.len() + 2)
        .max()
        .unwrap_or(0);
    for (key, value, explanation) in config.describe() {
        let pair = format!("{key}: {value}");
        println!("{pair:<width$}  # {explanation}");
    }
}
