//! gridstore CLI
//!
//! Runs one operation against a workbook snapshot file and prints the
//! result as JSON.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gridstore::{
    Config, Coordinator, GridError, MemoryWorkbook, Operation, StaticIdentity, SystemClock,
    Workbook,
};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// Name the CLI registers its workbook under
const WORKBOOK: &str = "local";

/// gridstore CLI
#[derive(Parser, Debug)]
#[command(name = "gridstore-cli")]
#[command(about = "Versioned row store over a workbook snapshot")]
#[command(version)]
struct Args {
    /// Snapshot file holding the workbook
    #[arg(short, long, default_value = "./gridstore.snap")]
    snapshot: PathBuf,

    /// Principal recorded in CreatedBy / ModifiedBy
    #[arg(short, long, default_value = "cli")]
    user: String,

    /// Seconds to wait for the store lock
    #[arg(long, default_value = "30")]
    lock_timeout_secs: u64,

    /// Hours a soft-deleted row survives compaction
    #[arg(long, default_value = "24")]
    retention_hours: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a collection
    CreateSheet {
        /// Collection name
        sheet: String,

        /// Extra columns after the reserved ones
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// List collections
    List,

    /// Insert rows (JSON object or array of objects)
    Create { sheet: String, rows: String },

    /// Read valid rows whose column matches one of the values (JSON array)
    Read {
        sheet: String,
        column: String,
        values: Option<String>,
    },

    /// Replace the current version of an entity (JSON object with ID)
    Update { sheet: String, fields: String },

    /// Soft-delete rows whose column matches one of the values (JSON array)
    Delete {
        sheet: String,
        column: String,
        values: String,
    },

    /// Revalidate the most recent row per value (JSON array)
    UndoDelete {
        sheet: String,
        column: String,
        values: String,
    },

    /// Compact one collection under the store lock
    Clean { sheet: String },

    /// Compact every collection
    CleanAll,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gridstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> gridstore::Result<()> {
    let retention_secs = args.retention_hours.checked_mul(60 * 60).ok_or_else(|| {
        GridError::Config(format!("retention of {} hours is too large", args.retention_hours))
    })?;

    let config = Config::builder()
        .snapshot_path(&args.snapshot)
        .lock_timeout(Duration::from_secs(args.lock_timeout_secs))
        .retention(Duration::from_secs(retention_secs))
        .build();

    let workbook = Arc::new(MemoryWorkbook::open_or_new(&config.snapshot_path)?);
    let snapshot_path = config.snapshot_path.clone();

    let coordinator = Coordinator::new(
        config,
        Arc::new(StaticIdentity::new(args.user)),
        Arc::new(SystemClock),
    );
    coordinator.register_workbook(WORKBOOK, workbook.clone());

    let (operation, sheet, params) = match args.command {
        Commands::List => {
            print_json(&Value::from(workbook.sheet_names()));
            return Ok(());
        }
        Commands::CleanAll => {
            let removed = coordinator.compactor().compact(&workbook.sheets())?;
            workbook.save(&snapshot_path)?;
            print_json(&Value::from(removed));
            return Ok(());
        }
        Commands::CreateSheet { sheet, columns } => {
            (Operation::CreateSheet, sheet, vec![Value::from(columns)])
        }
        Commands::Create { sheet, rows } => (Operation::Create, sheet, vec![parse_json(&rows)?]),
        Commands::Read {
            sheet,
            column,
            values,
        } => {
            let values = match values {
                Some(values) => parse_json(&values)?,
                None => Value::Array(Vec::new()),
            };
            (Operation::Read, sheet, vec![Value::from(column), values])
        }
        Commands::Update { sheet, fields } => {
            (Operation::Update, sheet, vec![parse_json(&fields)?])
        }
        Commands::Delete {
            sheet,
            column,
            values,
        } => (
            Operation::Delete,
            sheet,
            vec![Value::from(column), parse_json(&values)?],
        ),
        Commands::UndoDelete {
            sheet,
            column,
            values,
        } => (
            Operation::UndoDelete,
            sheet,
            vec![Value::from(column), parse_json(&values)?],
        ),
        Commands::Clean { sheet } => (Operation::CleanSheet, sheet, Vec::new()),
    };

    let response = coordinator.dispatch(operation.as_str(), WORKBOOK, &sheet, &params)?;

    if operation.is_mutating() {
        workbook.save(&snapshot_path)?;
    }

    print_json(&response.to_json());
    Ok(())
}

fn parse_json(text: &str) -> gridstore::Result<Value> {
    serde_json::from_str(text).map_err(|e| {
        GridError::InvalidInput(format!("invalid JSON argument '{}': {}", text, e))
    })
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: failed to render output: {}", e),
    }
}
