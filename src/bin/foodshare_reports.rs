//! Runs every catalog report, previews each result and writes `<key>.csv`.
//!
//! A failing report is reported on stderr and the rest still run; the exit
//! status is non-zero if any report failed.

use anyhow::{Context, Result, bail};
use clap::Parser;
use foodshare::{
    Dashboard, Database, DbConfig, ParamOverrides, ReportCatalog, export_csv, logging,
};
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "foodshare-reports", version, about = "Run and export all foodshare reports")]
struct Cli {
    /// Directory for the exported CSV files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Rows shown per report preview.
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Parameter override as REPORT.PARAM=VALUE, e.g. q3.city=Chennai.
    #[arg(long = "set")]
    assignments: Vec<String>,

    /// Database file; overrides FOODSHARE_DB_PATH and friends.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut overrides = ParamOverrides::new();
    for raw in &cli.assignments {
        overrides.apply_assignment(raw)?;
    }

    let db = Database::new(&DbConfig::from_env().with_override(cli.db));
    let mut dashboard = Dashboard::new(db, ReportCatalog::builtin()?);
    dashboard
        .catalog()
        .check_overrides(&overrides)
        .context("checking report parameter overrides")?;

    let mut errors: Vec<String> = Vec::new();
    for (key, outcome) in dashboard.run_all_reports(&overrides) {
        let written = outcome.map_err(anyhow::Error::from).and_then(|output| {
            println!("== {}: {}", output.key, output.description);
            println!("{}", output.table.render_text(Some(cli.preview)));
            Ok(export_csv(&output, &cli.out_dir)?)
        });
        match written {
            Ok(path) => println!("wrote {}\n", path.display()),
            Err(err) => {
                let message = format!("report {key} failed: {err:#}");
                eprintln!("foodshare-reports: {message}");
                errors.push(message);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!(
            "{} report(s) failed; see stderr for details:\n{}",
            errors.len(),
            errors.join("\n")
        )
    }
}
