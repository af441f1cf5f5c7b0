//! comicdex CLI
//!
//! Local administration of a comic catalog: schema setup, reference data,
//! categories, tags, and comics with their titles, links, and chapters.

mod cli_types;
mod commands;
mod error;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use comicdex_lib::{write_key, Catalog, CancelToken, Grants, Settings};

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = comicdex_lib::load_settings()?;
    if let Some(db) = cli.db {
        settings.database.path = Some(db);
    }

    // Settings commands never touch the database.
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::run_config_show(&settings),
            ConfigAction::Path => commands::config::run_config_path(),
        };
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))?;
    rt.block_on(async {
        let catalog = open_catalog(&settings)?;
        let sweeper = catalog.spawn_cache_sweeper(settings.cache.sweep_interval());
        let cx = CancelToken::new();
        let db_path = settings.database.resolved_path();
        let result = dispatch(&catalog, &cx, &db_path, cli.command).await;
        if let Some(handle) = sweeper {
            handle.abort();
        }
        result
    })
}

/// A local administrative tool holds the write capability for its own prefix.
fn open_catalog(settings: &Settings) -> Result<Catalog, CliError> {
    let grants = Grants::new([write_key(&settings.auth.permission_prefix)]);
    Ok(Catalog::open(settings, Arc::new(grants))?)
}

async fn dispatch(
    catalog: &Catalog,
    cx: &CancelToken,
    db_path: &Path,
    command: Commands,
) -> Result<(), CliError> {
    use commands::{category, comic, reference};
    use comicdex_lib::TypeKind;

    match command {
        Commands::Init => reference::run_init(catalog, cx, db_path).await,
        Commands::Seed { path } => reference::run_seed(catalog, cx, &path).await,
        Commands::Language { action } => reference::run_language(catalog, cx, action).await,
        Commands::Website { action } => reference::run_website(catalog, cx, action).await,
        Commands::CategoryType { action } => {
            reference::run_type(catalog, cx, TypeKind::Category, action).await
        }
        Commands::TagType { action } => {
            reference::run_type(catalog, cx, TypeKind::Tag, action).await
        }
        Commands::RelationType { action } => {
            reference::run_type(catalog, cx, TypeKind::ComicRelation, action).await
        }
        Commands::Category { action } => category::run_category(catalog, cx, action).await,
        Commands::Tag { action } => category::run_tag(catalog, cx, action).await,
        Commands::Comic { action } => comic::run_comic(catalog, cx, action).await,
        Commands::Config { .. } => Ok(()),
    }
}
