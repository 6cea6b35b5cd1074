//! Creates the four dashboard tables if they do not exist yet.
//!
//! Safe to run repeatedly; existing tables and rows are left alone.

use anyhow::{Context, Result};
use clap::Parser;
use foodshare::{Database, DbConfig, logging, schema};
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "foodshare-setup", version, about = "Create the foodshare tables")]
struct Cli {
    /// Database file; overrides FOODSHARE_DB_PATH and friends.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let db = Database::new(&DbConfig::from_env().with_override(cli.db));
    db.ensure_schema()
        .with_context(|| format!("creating tables in {}", db.path().display()))?;
    let names: Vec<&str> = schema::TABLES.iter().map(|table| table.name).collect();
    info!(path = %db.path().display(), tables = ?names, "schema ready");
    println!("Tables ready in {}", db.path().display());
    Ok(())
}
