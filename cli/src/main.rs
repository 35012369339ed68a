use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sqlward_client::{Db, DbConfig};
use sqlward_migrate::{DownOutcome, MigrateError, Runner, SetupOutcome, StatusReport};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sqlward")]
#[command(about = "Schema setup and ordered, reversible database migrations")]
struct Cli {
    /// Migrations directory.
    #[arg(long, global = true, default_value = "migrations")]
    dir: PathBuf,
    /// Print underlying error causes and enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show applied/pending state for every discovered migration.
    Status(StatusArgs),
    /// Apply all pending migrations in order (the default).
    Up,
    /// Roll back the single most-recently-applied migration.
    Down,
    /// Scaffold a new timestamped migration pair.
    Create(CreateArgs),
    /// Create the application schema if it does not exist.
    Setup,
    /// Drop and recreate the application schema. Destructive.
    Reset,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Output format for the status report.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Human-readable migration name; slugged into the file stem.
    name: String,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // `up` is the default when no subcommand is given.
    let command = cli.command.unwrap_or(Command::Up);
    let result = match command {
        Command::Status(args) => run_status(&cli.dir, args, cli.verbose),
        Command::Up => run_up(&cli.dir, cli.verbose),
        Command::Down => run_down(&cli.dir, cli.verbose),
        Command::Create(args) => run_create(&cli.dir, args),
        Command::Setup => run_setup(cli.verbose),
        Command::Reset => run_reset(cli.verbose),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the database handle from the environment. Configuration errors
/// already name the missing variable, so they pass through unchanged.
fn open_db() -> Result<Db, String> {
    let config = DbConfig::from_env().map_err(|e| e.to_string())?;
    Ok(Db::new(config))
}

fn run_status(dir: &PathBuf, args: StatusArgs, verbose: bool) -> Result<(), String> {
    let db = open_db()?;
    let runner = Runner::new(&db, dir);
    let status = runner.status().map_err(|e| render_error(&e, verbose))?;

    match args.format {
        CliOutputFormat::Json => {
            let raw = serde_json::to_string_pretty(&status)
                .map_err(|e| format!("Failed to serialize status report: {e}"))?;
            println!("{raw}");
        }
        CliOutputFormat::Table => print_status_table(&status),
    }
    Ok(())
}

fn print_status_table(status: &StatusReport) {
    if status.entries.is_empty() && status.orphaned_records.is_empty() {
        println!("No migrations discovered.");
        return;
    }
    for entry in &status.entries {
        let state = if entry.applied { "applied" } else { "pending" };
        let down = if entry.has_down { "" } else { "  (no down script)" };
        println!("{state:>8}  {}{down}", entry.name);
    }
    for name in &status.orphaned_records {
        println!("orphaned  {name}  (applied record without a migration file)");
    }
    println!(
        "{} applied, {} pending.",
        status.applied_count, status.pending_count
    );
}

fn run_up(dir: &PathBuf, verbose: bool) -> Result<(), String> {
    let db = open_db()?;
    let runner = Runner::new(&db, dir);
    let report = runner.up().map_err(|e| render_error(&e, verbose))?;

    if report.applied.is_empty() {
        println!("Nothing to apply ({} already applied).", report.skipped);
    } else {
        for name in &report.applied {
            println!("applied  {name}");
        }
        println!("Applied {} migration(s).", report.applied.len());
    }
    Ok(())
}

fn run_down(dir: &PathBuf, verbose: bool) -> Result<(), String> {
    let db = open_db()?;
    let runner = Runner::new(&db, dir);
    match runner.down().map_err(|e| render_error(&e, verbose))? {
        DownOutcome::RolledBack { name, script_ran: true } => {
            println!("Rolled back '{name}'.");
        }
        DownOutcome::RolledBack { name, script_ran: false } => {
            println!("Removed record for '{name}' (no down script; schema unchanged).");
        }
        DownOutcome::NothingToRollBack => {
            println!("Nothing to roll back.");
        }
    }
    Ok(())
}

fn run_create(dir: &PathBuf, args: CreateArgs) -> Result<(), String> {
    let (up, down) = sqlward_migrate::create(dir, &args.name).map_err(|e| e.to_string())?;
    println!("Created '{}'.", up.display());
    println!("Created '{}'.", down.display());
    Ok(())
}

fn run_setup(verbose: bool) -> Result<(), String> {
    let db = open_db()?;
    match sqlward_migrate::setup_schema(&db).map_err(|e| render_error(&e, verbose))? {
        SetupOutcome::Created => println!("Schema created."),
        SetupOutcome::AlreadyExists => println!("Schema already exists, nothing to do."),
    }
    Ok(())
}

fn run_reset(verbose: bool) -> Result<(), String> {
    let db = open_db()?;
    sqlward_migrate::reset_schema(&db).map_err(|e| render_error(&e, verbose))?;
    println!("Schema dropped and recreated.");
    Ok(())
}

/// Formats an error for the terminal: concise and non-sensitive by default,
/// with the driver-level cause appended only when `--verbose` was given.
fn render_error(err: &MigrateError, verbose: bool) -> String {
    match err.detail() {
        Some(detail) if verbose => format!("{err}\n  caused by: {detail}"),
        _ => err.to_string(),
    }
}
