//! Command-line interface for par-annotate.
//!
//! `replay` feeds captured command output through the built-in matchers and
//! prints the regions they create; `list` shows the registered matchers.

use crate::invocation::CommandInvocation;
use crate::matcher::MatcherFactory;
use crate::matchers::register_builtin_matchers;
use crate::region::Region;
use crate::registry::MatcherRegistry;
use crate::tracker::InvocationTracker;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use par_annotate_config::Config;
use std::fmt::Write as _;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;

/// par-annotate - Tag command output with actionable regions
#[derive(Parser)]
#[command(name = "par-annotate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set debug log level (overrides config and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Configuration file (default: ~/.config/par-annotate/config.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Output format for `replay`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Text,
}

/// Invocation attributes and input for `replay`
#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArgs {
    /// Command line the output was produced by
    #[arg(long, value_name = "CMD")]
    pub command: String,

    /// Working directory of the command
    #[arg(long, value_name = "DIR", default_value = "")]
    pub cwd: String,

    /// Exit code of the command
    #[arg(long, value_name = "N", default_value_t = 0, allow_negative_numbers = true)]
    pub exit_code: i32,

    /// Server identifier embedded in actions
    #[arg(long, value_name = "ID", default_value = "local")]
    pub server: String,

    /// Terminal identifier embedded in actions
    #[arg(long, value_name = "ID", default_value = "")]
    pub terminal: String,

    /// Host name for file URIs (default: this machine)
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// File holding the captured output (default: stdin)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run captured command output through the built-in matchers
    Replay(ReplayArgs),

    /// List the registered matchers
    List,

    /// Print the configuration file path
    ConfigPath,
}

/// Work left for `main` once logging is up
#[derive(Debug, Clone)]
pub enum Task {
    Replay(ReplayArgs),
    List,
}

/// Runtime options passed from CLI to the application
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub task: Task,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with the given task
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands that need no engine
pub fn process_cli() -> CliResult {
    resolve(Cli::parse())
}

fn resolve(cli: Cli) -> CliResult {
    let log_level = cli.log_level.map(|l| l.to_level_filter());
    let task = match cli.command {
        Commands::ConfigPath => {
            let path = cli.config.unwrap_or_else(Config::config_path);
            println!("{}", path.display());
            return CliResult::Exit(0);
        }
        Commands::List => Task::List,
        Commands::Replay(args) => Task::Replay(args),
    };
    CliResult::Continue(RuntimeOptions {
        task,
        config: cli.config,
        log_level,
    })
}

/// Load the configuration named on the command line, or the default one.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Registry holding every enabled built-in matcher.
pub fn builtin_registry(config: &Config) -> Result<MatcherRegistry> {
    let mut registry = MatcherRegistry::new();
    register_builtin_matchers(&mut registry, config)?;
    Ok(registry)
}

/// Execute a task and write its output to stdout.
pub fn run(task: Task, config: &Config) -> Result<()> {
    let registry = builtin_registry(config)?;
    let output = match task {
        Task::List => list(&registry),
        Task::Replay(args) => {
            let input: Box<dyn Read> = match &args.input {
                Some(path) => Box::new(
                    std::fs::File::open(path)
                        .with_context(|| format!("Failed to open {}", path.display()))?,
                ),
                None => Box::new(io::stdin()),
            };
            let regions = replay(registry, config, &args, BufReader::new(input))?;
            match args.format {
                OutputFormat::Json => serde_json::to_string_pretty(&regions)?,
                OutputFormat::Text => render_text(&regions),
            }
        }
    };
    println!("{output}");
    Ok(())
}

/// Table of registered matchers.
pub fn list(registry: &MatcherRegistry) -> String {
    let mut out = String::new();
    for factory in registry.factories() {
        let _ = writeln!(
            out,
            "{:<26} {:<5} {:?}",
            factory.name(),
            if factory.fast() { "fast" } else { "" },
            factory.finish_policy()
        );
    }
    out.trim_end().to_string()
}

/// Feed `input` through a tracker as one invocation and return its regions.
pub fn replay(
    registry: MatcherRegistry,
    config: &Config,
    args: &ReplayArgs,
    input: impl BufRead,
) -> Result<Vec<Region>> {
    let host = match &args.host {
        Some(host) => host.clone(),
        None => hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "localhost".to_string()),
    };
    let invocation = CommandInvocation::new(args.command.as_str())
        .with_working_dir(args.cwd.as_str())
        .with_server(args.server.as_str())
        .with_terminal(args.terminal.as_str())
        .with_host(host);

    let mut tracker = InvocationTracker::from_config(registry, config);
    let id = tracker.begin(invocation);
    log::info!(
        "Replaying {:?} as {} with matchers {:?}",
        args.command,
        id,
        tracker.active_matchers(id)
    );

    let mut rows = 0;
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        tracker.push_line(id, line.trim_end_matches('\r'))?;
        rows += 1;
    }
    tracker.finish(id, args.exit_code, rows)?;

    Ok(tracker.regions().regions_for_invocation(id).cloned().collect())
}

/// One line per region: id, span, matcher, icon and primary action.
pub fn render_text(regions: &[Region]) -> String {
    if regions.is_empty() {
        return "no regions".to_string();
    }
    let mut out = String::new();
    for region in regions {
        let action = region
            .metadata
            .primary_action
            .as_ref()
            .and_then(|a| a.to_wire().ok())
            .unwrap_or_default()
            .replace('\x1f', " ");
        let _ = writeln!(
            out,
            "#{:<4} {}:{}-{}:{}  {:<24} {:<10} {}",
            region.id.0,
            region.start.row,
            region.start.offset,
            region.end.row,
            region.end.offset,
            region.matcher,
            region.metadata.icon.as_deref().unwrap_or("-"),
            action
        );
    }
    out.trim_end().to_string()
}
