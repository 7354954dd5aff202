//! Apply the storefront schema migrations to PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;

use clap::Parser;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ortho_config::OrthoConfig;
use storefront::config::StorefrontSettings;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// `storefront-migrate` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "storefront-migrate",
    about = "Apply pending storefront schema migrations",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `STOREFRONT_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// List pending migrations without applying them.
    #[arg(long)]
    list: bool,
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(url) = explicit {
        return Ok(url);
    }
    let settings = StorefrontSettings::load_from_iter([OsString::from("storefront-migrate")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    Ok(settings.database_url().to_owned())
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        eprintln!("tracing init failed: {error}");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let mut conn = PgConnection::establish(&database_url)
        .map_err(|error| io::Error::other(format!("connect to database: {error}")))?;

    if args.list {
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|error| io::Error::other(format!("list migrations: {error}")))?;
        for migration in &pending {
            println!("{}", migration.name());
        }
        return Ok(());
    }

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|error| io::Error::other(format!("run migrations: {error}")))?;
    for version in &applied {
        info!(%version, "migration applied");
    }
    info!(count = applied.len(), "storefront schema up to date");
    Ok(())
}
