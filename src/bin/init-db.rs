//! Create the catalog database and seed it from a fixture set.

use std::{fs, path::PathBuf, process::ExitCode};

use acme_basket::{catalog::SqliteCatalog, fixtures::Fixture};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "init-db",
    about = "Create and seed the basket catalog database",
    long_about = None
)]
struct Cli {
    /// Path of the `SQLite` database file
    #[arg(long, env = "BASKET_DATABASE", default_value = "database/cart.sqlite")]
    database: PathBuf,

    /// Directory holding the fixture categories
    #[arg(long, env = "BASKET_FIXTURES", default_value = "fixtures")]
    fixtures: PathBuf,

    /// Fixture set to seed from
    #[arg(long = "set", env = "BASKET_FIXTURE_SET", default_value = "acme")]
    fixture_set: String,

    /// Log level used when `RUST_LOG` is unset
    #[arg(long, env = "BASKET_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_err| EnvFilter::new(format!("{},acme_basket=debug", cli.log_level)));

    let _init = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact().with_target(true))
        .with(filter)
        .try_init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "database initialisation failed");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    if let Some(parent) = cli.database.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|error| format!("failed to create {}: {error}", parent.display()))?;
    }

    let fixture = Fixture::from_set_in(&cli.fixtures, &cli.fixture_set)
        .map_err(|error| format!("failed to load fixture set {}: {error}", cli.fixture_set))?;

    let source = fixture
        .catalog()
        .map_err(|error| format!("invalid fixture set {}: {error}", cli.fixture_set))?;

    let currency = fixture.currency().map_err(|error| error.to_string())?;

    let mut catalog = SqliteCatalog::open(&cli.database, currency)
        .map_err(|error| format!("failed to open {}: {error}", cli.database.display()))?;

    catalog
        .initialize()
        .map_err(|error| format!("failed to create schema: {error}"))?;

    let summary = catalog
        .seed(&source)
        .map_err(|error| format!("failed to seed catalog: {error}"))?;

    info!(
        database = %cli.database.display(),
        products = summary.products,
        offers = summary.offers,
        delivery_rules = summary.delivery_rules,
        "database initialised"
    );

    Ok(())
}
