//! Interactive-style front end for the dashboard.
//!
//! Each subcommand is one dashboard action: browse listings, add, update or
//! delete a listing, or run the report catalog. Tables go to stdout; logs and
//! errors go to stderr.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use foodshare::{
    Dashboard, Database, DbConfig, ListingFilter, ListingUpdate, NewListing, ParamName,
    ParamOverrides, ReportCatalog, ReportKey, ResultTable, SqlValue, export_csv, logging,
};
use std::io;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "foodshare", version, about = "Food donation dashboard")]
struct Cli {
    /// Database file; overrides FOODSHARE_DB_PATH and friends.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Report catalog JSON to use instead of the built-in one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List food listings with provider name and contact.
    View(ViewArgs),
    /// Insert a new food listing.
    Add(AddArgs),
    /// Change quantity and expiry of a listing.
    Update {
        food_id: i64,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        expiry: NaiveDate,
    },
    /// Remove a listing. Fails if a claim references it.
    Delete { food_id: i64 },
    /// Run catalog reports.
    Reports(ReportArgs),
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Restrict to these listing cities (repeat or comma-separate).
    #[arg(long = "city", value_delimiter = ',')]
    cities: Vec<String>,
    /// Restrict to these food types (repeat or comma-separate).
    #[arg(long = "food-type", value_delimiter = ',')]
    food_types: Vec<String>,
    /// Print the available filter values instead of listings.
    #[arg(long)]
    options: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Maximum rows shown in text format.
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    id: i64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    quantity: u32,
    /// Expiry date as YYYY-MM-DD.
    #[arg(long)]
    expiry: NaiveDate,
    #[arg(long)]
    provider_id: i64,
    #[arg(long, default_value = "")]
    provider_type: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    food_type: String,
    #[arg(long, default_value = "")]
    meal_type: String,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Run only these report keys, in the order given.
    #[arg(long = "only", value_delimiter = ',')]
    only: Vec<String>,
    /// City for the provider contacts report (q3).
    #[arg(long)]
    city: Option<String>,
    /// Parameter override as REPORT.PARAM=VALUE, e.g. q14.days=7.
    #[arg(long = "set")]
    assignments: Vec<String>,
    /// Also write <key>.csv for each report into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Csv,
    Json,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let config = DbConfig::from_env().with_override(cli.db);
    let db = Database::new(&config);
    let catalog = match &cli.catalog {
        Some(path) => ReportCatalog::load(path)?,
        None => ReportCatalog::builtin()?,
    };
    let mut dashboard = Dashboard::new(db, catalog);

    match cli.command {
        Command::View(args) => view(&mut dashboard, args),
        Command::Add(args) => {
            let listing = NewListing {
                food_id: args.id,
                food_name: args.name,
                quantity: args.quantity,
                expiry_date: args.expiry,
                provider_id: args.provider_id,
                provider_type: args.provider_type,
                location: args.location,
                food_type: args.food_type,
                meal_type: args.meal_type,
            };
            dashboard
                .add_listing(&listing)
                .with_context(|| format!("adding listing {}", listing.food_id))?;
            println!("Added listing {}", listing.food_id);
            Ok(())
        }
        Command::Update {
            food_id,
            quantity,
            expiry,
        } => {
            let update = ListingUpdate {
                quantity,
                expiry_date: expiry,
            };
            dashboard
                .update_listing(food_id, &update)
                .with_context(|| format!("updating listing {food_id}"))?;
            println!("Updated listing {food_id}");
            Ok(())
        }
        Command::Delete { food_id } => {
            dashboard
                .delete_listing(food_id)
                .with_context(|| format!("deleting listing {food_id}"))?;
            println!("Deleted listing {food_id}");
            Ok(())
        }
        Command::Reports(args) => reports(&mut dashboard, args),
    }
}

fn view(dashboard: &mut Dashboard, args: ViewArgs) -> Result<()> {
    if args.options {
        let options = dashboard.filter_options()?;
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }
    let filter = ListingFilter {
        cities: args.cities,
        food_types: args.food_types,
    };
    let table = dashboard.view_listings(&filter)?;
    print_table(&table, args.format, args.limit)
}

fn reports(dashboard: &mut Dashboard, args: ReportArgs) -> Result<()> {
    let mut overrides = ParamOverrides::new();
    if let Some(city) = args.city {
        overrides.set(ReportKey::new("q3"), ParamName::new("city"), SqlValue::Text(city));
    }
    for raw in &args.assignments {
        overrides.apply_assignment(raw)?;
    }
    dashboard
        .catalog()
        .check_overrides(&overrides)
        .context("checking report parameter overrides")?;

    let keys: Vec<ReportKey> = if args.only.is_empty() {
        dashboard.catalog().keys().cloned().collect()
    } else {
        args.only.iter().map(ReportKey::new).collect()
    };
    if keys.is_empty() {
        bail!("no reports selected");
    }

    let mut errors = Vec::new();
    for key in keys {
        let outcome = dashboard
            .run_report(&key, &overrides)
            .map_err(anyhow::Error::from)
            .and_then(|output| {
                if args.format == Format::Text {
                    println!("== {}: {}", output.key, output.description);
                }
                print_table(&output.table, args.format, args.limit)?;
                if let Some(dir) = &args.export_dir {
                    let path = export_csv(&output, dir)?;
                    eprintln!("wrote {}", path.display());
                }
                Ok(())
            });
        if let Err(err) = outcome {
            let message = format!("report {key} failed: {err:#}");
            eprintln!("foodshare: {message}");
            errors.push(message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("{} report(s) failed:\n{}", errors.len(), errors.join("\n"))
    }
}

fn print_table(table: &ResultTable, format: Format, limit: Option<usize>) -> Result<()> {
    match format {
        Format::Text => println!("{}", table.render_text(limit)),
        Format::Csv => table.write_csv(io::stdout().lock())?,
        Format::Json => println!("{}", serde_json::to_string_pretty(&table.to_json_records())?),
    }
    Ok(())
}
