//! Bulk-loads the four source CSV files into the database.
//!
//! Files are read from `--dir` in foreign-key order: providers, receivers,
//! food listings, claims. Tables are created first if missing. One line per
//! table is printed; any rejected row makes the process exit non-zero after
//! everything else has loaded.

use anyhow::{Context, Result, bail};
use clap::Parser;
use foodshare::{Database, DbConfig, load_all, logging};
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "foodshare-load", version, about = "Load the foodshare CSV files")]
struct Cli {
    /// Directory holding providers_data.csv, receivers_data.csv,
    /// food_listings_data.csv and claims_data.csv.
    #[arg(long, default_value = "data")]
    dir: PathBuf,

    /// Database file; overrides FOODSHARE_DB_PATH and friends.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Print every rejected row, not just the count.
    #[arg(long)]
    verbose: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let db = Database::new(&DbConfig::from_env().with_override(cli.db));
    db.ensure_schema()
        .with_context(|| format!("creating tables in {}", db.path().display()))?;
    let reports = load_all(&db, &cli.dir)
        .with_context(|| format!("loading CSV files from {}", cli.dir.display()))?;

    let mut rejected = 0;
    for report in &reports {
        println!("{report}");
        if cli.verbose {
            for row in &report.rejected {
                println!("  line {}: {}", row.line, row.reason);
            }
        }
        rejected += report.rejected.len();
    }

    if rejected > 0 {
        bail!("{rejected} row(s) were rejected; rerun with --verbose for details");
    }
    Ok(())
}
