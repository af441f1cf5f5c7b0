//! Schema setup, seeding, and the code/name keyed reference tables.

use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use comicdex_catalog::{AddLanguage, AddTypeDef, AddWebsite};
use comicdex_lib::{CancelToken, Catalog, Condition, TypeKind};

use super::{list_params, print_json};
use crate::cli_types::ReferenceAction;
use crate::CliError;

pub(crate) async fn run_init(
    catalog: &Catalog,
    cx: &CancelToken,
    db_path: &Path,
) -> Result<(), CliError> {
    let languages = catalog.count_language(cx, Condition::none()).await?;
    let comics = catalog.count_comic(cx, Condition::none(), None).await?;
    log::info!(
        "Catalog ready at {}",
        db_path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!("  Languages: {:>8}", languages);
    log::info!("  Comics:    {:>8}", comics);
    Ok(())
}

pub(crate) async fn run_seed(
    catalog: &Catalog,
    cx: &CancelToken,
    path: &Path,
) -> Result<(), CliError> {
    let report = catalog.seed_from_path(cx, path).await?;
    log::info!(
        "{}",
        "Seeded reference data".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Languages:            {:>4}", report.languages);
    log::info!("  Websites:             {:>4}", report.websites);
    log::info!("  Category types:       {:>4}", report.category_types);
    log::info!("  Tag types:            {:>4}", report.tag_types);
    log::info!("  Comic relation types: {:>4}", report.comic_relation_types);
    if report.total() == 0 {
        log::info!(
            "{}",
            "Nothing new; every entry was already present."
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

pub(crate) async fn run_language(
    catalog: &Catalog,
    cx: &CancelToken,
    action: ReferenceAction,
) -> Result<(), CliError> {
    match action {
        ReferenceAction::Add { code, name } => {
            let added = catalog
                .add_language(cx, AddLanguage { ietf: code, name })
                .await?;
            print_json(&added)
        }
        ReferenceAction::List { list } => {
            let rows = catalog
                .list_language(cx, Condition::none(), list_params(&list)?)
                .await?;
            print_json(&rows)
        }
    }
}

pub(crate) async fn run_website(
    catalog: &Catalog,
    cx: &CancelToken,
    action: ReferenceAction,
) -> Result<(), CliError> {
    match action {
        ReferenceAction::Add { code, name } => {
            let added = catalog
                .add_website(cx, AddWebsite { domain: code, name })
                .await?;
            print_json(&added)
        }
        ReferenceAction::List { list } => {
            let rows = catalog
                .list_website(cx, Condition::none(), list_params(&list)?)
                .await?;
            print_json(&rows)
        }
    }
}

pub(crate) async fn run_type(
    catalog: &Catalog,
    cx: &CancelToken,
    kind: TypeKind,
    action: ReferenceAction,
) -> Result<(), CliError> {
    match action {
        ReferenceAction::Add { code, name } => {
            let added = catalog.add_type(cx, kind, AddTypeDef { code, name }).await?;
            print_json(&added)
        }
        ReferenceAction::List { list } => {
            let rows = catalog
                .list_type(cx, kind, Condition::none(), list_params(&list)?)
                .await?;
            print_json(&rows)
        }
    }
}
