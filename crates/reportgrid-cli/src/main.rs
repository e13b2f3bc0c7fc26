use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reportgrid_engine::{AggregationConfig, FetchExecution, GridError, ReportGridService};
use reportgrid_model::{EntityKind, GridIdentifier, RowScope};
use reportgrid_storage::{Storage, StorageError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "reportgrid-cli")]
#[command(about = "Build report grids from a SQLite database and emit them as JSON.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Aggregate one grid over a row scope and print the result.
    Grid(GridArgs),
    /// Print every grid definition with its resolved, ordered columns.
    List(ListArgs),
    /// Execute a SQL script against the database, then rebuild the taxonomy hierarchies.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
struct DbArgs {
    /// Path to the SQLite database. Created (with schema) if missing.
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct GridSelector {
    /// Numeric grid id.
    #[arg(long)]
    id: Option<i64>,

    /// Grid external id.
    #[arg(long = "external-id")]
    external_id: Option<String>,
}

impl GridSelector {
    /// The argument group makes exactly one of `--id` and `--external-id` present.
    fn identifier(&self) -> GridIdentifier {
        match &self.external_id {
            Some(external_id) => GridIdentifier::ExternalId(external_id.clone()),
            None => GridIdentifier::Id(self.id.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Args)]
struct GridArgs {
    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    grid: GridSelector,

    /// Rows to include: `all`, `org-unit:<id>` or `apps:<id>,<id>,...`.
    #[arg(long, default_value = "all")]
    scope: RowScope,

    /// Abort if fetching takes longer than this many milliseconds. Must be at least 1.
    #[arg(long = "timeout-ms", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,

    /// Run the fetchers one after another instead of concurrently.
    #[arg(long)]
    sequential: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    db: DbArgs,

    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct ImportArgs {
    #[command(flatten)]
    db: DbArgs,

    /// SQL script to execute.
    #[arg(long)]
    sql: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportReport {
    measurable_hierarchy_rows: usize,
    org_unit_hierarchy_rows: usize,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("failed to start runtime: {0}")]
    Runtime(io::Error),
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn open_service(db: &Path, config: AggregationConfig) -> Result<ReportGridService<Storage, Storage>, CliError> {
    let storage = Arc::new(Storage::open_path(db)?);
    Ok(ReportGridService::new(Arc::clone(&storage), storage, config))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{text}").and_then(|()| stdout.flush()) {
        // A closed pipe (e.g. `| head`) is not a failure of the command.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}

fn run_grid(args: GridArgs) -> Result<(), CliError> {
    let mut config = AggregationConfig::from_env();
    if args.sequential {
        config = config.with_execution(FetchExecution::Sequential);
    }
    if let Some(ms) = args.timeout_ms {
        config = config.with_fetch_timeout(Duration::from_millis(ms));
    }

    let service = open_service(&args.db.db, config)?;
    let identifier = args.grid.identifier();
    log::info!("building grid {identifier} for scope {}", args.scope);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let grid = runtime.block_on(service.get_report_grid(&identifier, &args.scope))?;
    log::info!(
        "grid {} has {} cells over {} rows",
        grid.definition.id,
        grid.cells.len(),
        grid.row_ids().len()
    );
    print_json(&grid, args.pretty)
}

fn run_list(args: ListArgs) -> Result<(), CliError> {
    let service = open_service(&args.db.db, AggregationConfig::default())?;
    let definitions = service.list_definitions()?;
    print_json(&definitions, args.pretty)
}

fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let sql = std::fs::read_to_string(&args.sql).map_err(|source| CliError::Read {
        path: args.sql.clone(),
        source,
    })?;
    let storage = Storage::open_path(&args.db.db)?;
    storage.load_fixture_sql(&sql)?;
    let report = ImportReport {
        measurable_hierarchy_rows: storage.rebuild_hierarchy(EntityKind::Measurable)?,
        org_unit_hierarchy_rows: storage.rebuild_hierarchy(EntityKind::OrgUnit)?,
    };
    print_json(&report, false)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Grid(args) => run_grid(args),
        Command::List(args) => run_list(args),
        Command::Import(args) => run_import(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
