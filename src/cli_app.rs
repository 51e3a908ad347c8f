//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use advent_calendar::calendar::session::{CalendarSnapshot, CellView, Session};
use advent_calendar::calendar::state::OpenOutcome;
use advent_calendar::core::clock::CurrentDay;
use advent_calendar::core::config::Config;
use advent_calendar::core::errors::AdventError;
use advent_calendar::logger::journal::{JournalHandle, spawn_journal};
use advent_calendar::producer::command::CommandProducer;

/// Advent calendar: batch-gated daily reveals.
#[derive(Debug, Parser)]
#[command(
    name = "advent",
    author,
    version,
    about = "Advent calendar - batch-gated daily reveals",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Evaluate as if today were this day of the event month (0 = before the event).
    #[arg(long, global = true, value_name = "DAY")]
    today: Option<u32>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show every cell and whether it can be opened today.
    Grid,
    /// Show the lock state of one day.
    Check(CheckArgs),
    /// Open days in order and show the last one opened.
    Open(OpenArgs),
    /// View and validate configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct CheckArgs {
    /// Day to check.
    day: u32,
}

#[derive(Debug, Clone, Args)]
struct OpenArgs {
    /// Days to open, in order.
    #[arg(required = true)]
    days: Vec<u32>,
    /// Regenerate the active cell's text with the configured producer.
    #[arg(long)]
    generate: bool,
    /// How long to wait for generated content.
    #[arg(long, default_value_t = 10_000, value_name = "MILLISECONDS")]
    wait_ms: u64,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
    /// Validate the configuration.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<AdventError> for CliError {
    fn from(value: AdventError) -> Self {
        match value {
            AdventError::NotFound { .. }
            | AdventError::Locked { .. }
            | AdventError::InvalidConfig { .. }
            | AdventError::MissingConfig { .. }
            | AdventError::ConfigParse { .. } => Self::User(value.to_string()),
            other => Self::Runtime(other.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Grid => run_grid(cli),
        Command::Check(args) => run_check(cli, args),
        Command::Open(args) => run_open(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── session setup ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(today) = cli.today {
        config.calendar.today = Some(today);
    }
    Ok(config)
}

fn current_day(config: &Config) -> CurrentDay {
    config.resolve_current_day(chrono::Local::now().date_naive())
}

struct Journal {
    handle: JournalHandle,
    join: thread::JoinHandle<()>,
}

impl Journal {
    fn start(config: &Config) -> Option<Self> {
        if !config.journal.enabled {
            return None;
        }
        match spawn_journal(config.journal_config()) {
            Ok((handle, join)) => Some(Self { handle, join }),
            Err(e) => {
                eprintln!("[ADV-CLI] journal disabled: {e}");
                None
            }
        }
    }

    fn stop(self) {
        self.handle.shutdown();
        let _ = self.join.join();
    }
}

// ──────────────────── grid / check ────────────────────

fn run_grid(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let session = Session::from_config(&config, current_day(&config))?;
    let snapshot = session.snapshot();

    match output_mode(cli) {
        OutputMode::Human => print_grid(&snapshot),
        OutputMode::Json => {
            let payload = json!({
                "command": "grid",
                "snapshot": serde_json::to_value(&snapshot)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_check(cli: &Cli, args: &CheckArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let session = Session::from_config(&config, current_day(&config))?;
    session.cell(args.day)?;
    let locked = session.is_locked(args.day);
    let unlocks_on = session.policy().unlocks_on(args.day);

    match output_mode(cli) {
        OutputMode::Human => {
            let label = if locked {
                "locked".red().bold()
            } else {
                "available".green().bold()
            };
            println!("Day {}: {label}", args.day);
            println!("  Today: {}", session.current_day());
            if unlocks_on > 0 {
                println!("  Unlocks on day {unlocks_on}");
            } else {
                println!("  Always available");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "check",
                "day": args.day,
                "locked": locked,
                "unlocks_on": unlocks_on,
                "current_day": session.current_day(),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn print_grid(snapshot: &CalendarSnapshot) {
    println!("{} (today: {})", "Advent calendar".bold(), snapshot.current_day);
    for row in snapshot.cells.chunks(5) {
        let line: Vec<String> = row.iter().map(cell_badge).collect();
        println!("  {}", line.join("  "));
    }
    println!(
        "  {} available, {} locked",
        snapshot.cells.len() - snapshot.locked_count(),
        snapshot.locked_count()
    );
}

fn cell_badge(cell: &CellView) -> String {
    let label = format!("{:>2}", cell.index);
    if cell.locked {
        format!("[{}]", label.dimmed())
    } else if cell.opened {
        format!("[{}]", label.yellow())
    } else {
        format!("[{}]", label.green())
    }
}

// ──────────────────── open ────────────────────

fn run_open(cli: &Cli, args: &OpenArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    if args.generate && (!config.producer.enabled || config.producer.command.is_empty()) {
        return Err(CliError::User(
            "--generate needs an enabled producer with a command in the configuration"
                .to_string(),
        ));
    }

    let journal = Journal::start(&config);
    let mut session = Session::from_config(&config, current_day(&config))?;
    if let Some(j) = &journal {
        session = session.with_journal(j.handle.clone());
    }
    if args.generate {
        let producer = CommandProducer::new(
            config.producer.command.clone(),
            config.producer.max_chars,
        );
        session = session.with_producer(Arc::new(producer), config.producer.queue_capacity)?;
    }

    let mut results = Vec::with_capacity(args.days.len());
    for &day in &args.days {
        let result = session.select(day);
        if matches!(result, Err(AdventError::NotFound { .. })) {
            finish(session, journal);
            return result.map(|_| ()).map_err(CliError::from);
        }
        results.push((day, result));
    }

    if args.generate
        && let Some(day) = session.active_index()
        && session.request_content(day)?
    {
        session.wait_for_completions(Duration::from_millis(args.wait_ms));
    }

    let active = session.active_cell().cloned();
    match output_mode(cli) {
        OutputMode::Human => {
            for (day, result) in &results {
                match result {
                    Ok(OpenOutcome::Opened) => println!("Day {day}: {}", "opened".green()),
                    Ok(OpenOutcome::AlreadyOpen) => println!("Day {day}: already open"),
                    Err(e) => println!("Day {day}: {} ({e})", "locked".red()),
                }
            }
            if let Some(cell) = &active {
                let source = if cell.content_is_generated() {
                    " (generated)"
                } else {
                    ""
                };
                println!();
                println!("{}{source}", format!("Day {}", cell.index()).bold());
                println!("  {}", cell.content());
            }
        }
        OutputMode::Json => {
            let opened: Vec<Value> = results
                .iter()
                .map(|(day, result)| match result {
                    Ok(outcome) => json!({
                        "day": day,
                        "ok": true,
                        "already_open": *outcome == OpenOutcome::AlreadyOpen,
                    }),
                    Err(e) => json!({
                        "day": day,
                        "ok": false,
                        "error_code": e.code(),
                        "error": e.to_string(),
                    }),
                })
                .collect();
            let payload = json!({
                "command": "open",
                "current_day": session.current_day(),
                "results": opened,
                "active": active.as_ref().map(serde_json::to_value).transpose()?,
            });
            write_json_line(&payload)?;
        }
    }

    finish(session, journal);
    Ok(())
}

fn finish(session: Session, journal: Option<Journal>) {
    let _ = session.finish();
    if let Some(j) = journal {
        j.stop();
    }
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Runtime(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match load_config(cli) {
            Ok(config) => {
                let hash = config.stable_hash()?;
                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => eprintln!("Configuration is INVALID: {e}"),
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(e.to_string()))
            }
        },
    }
}

// ──────────────────── output ────────────────────

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("ADVENT_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match env_mode.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ if stdout_is_tty => OutputMode::Human,
        _ => OutputMode::Json,
    }
}
