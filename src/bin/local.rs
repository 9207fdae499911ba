//! NestDB local tool
//!
//! Runs a single operation against a data directory, without a server.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use nestdb::{Database, Result};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// NestDB local mode
#[derive(Parser, Debug)]
#[command(name = "nestdb")]
#[command(about = "Run one operation directly against a NestDB data directory")]
#[command(version)]
#[command(after_help = "Examples:\n  \
    nestdb mydb insert '{\"name\": \"Alice\", \"age\": 25}'\n  \
    nestdb mydb find '{\"age\": {\"$gt\": 20}}'\n  \
    nestdb mydb delete '{\"name\": \"Alice\"}'")]
struct Args {
    /// Data directory (one sub-directory per database)
    #[arg(short, long, default_value = "./databases")]
    data_dir: PathBuf,

    /// Collection to operate on (defaults to the database name)
    #[arg(short, long)]
    collection: Option<String>,

    /// Database name
    database: String,

    /// Operation to run
    operation: Operation,

    /// JSON document (insert) or filter (find, delete)
    argument: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Operation {
    Insert,
    Find,
    Delete,
}

fn main() -> ExitCode {
    let started = Instant::now();

    // Keep stdout for results; only warnings and errors are logged
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Usage errors exit with 1 like any other failure; --help/--version still exit 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    println!();
    println!(
        "Operation finished in {} microseconds",
        started.elapsed().as_micros()
    );
    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let db = Database::open(&args.data_dir, &args.database)?;
    let collection = args.collection.as_deref().unwrap_or(&args.database);
    let argument = parse_argument(&args.argument)?;

    match args.operation {
        Operation::Insert => {
            let document = db.insert(collection, argument)?;
            println!("Document inserted successfully (_id: {})", document.id());
        }
        Operation::Find => {
            let documents = db.find(collection, &argument)?;
            if documents.is_empty() {
                println!("No documents found");
            } else {
                println!("Found {} document(s)", documents.len());
                for document in &documents {
                    println!("{}", serde_json::to_string_pretty(document)?);
                }
            }
        }
        Operation::Delete => {
            let removed = db.remove(collection, &argument)?;
            println!("Deleted {} document(s)", removed);
        }
    }
    Ok(())
}

fn parse_argument(text: &str) -> Result<Value> {
    let text = text.trim();
    let text = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text);
    serde_json::from_str(text)
        .map_err(|e| nestdb::NestError::Parse(format!("invalid JSON: {}", e)))
}
