//! Category and tag commands.

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use comicdex_catalog::{AddCategory, AddCategoryRelation, AddTag, CategorySid};
use comicdex_lib::{CancelToken, Catalog, Condition};

use super::{list_params, print_json};
use crate::cli_types::{CategoryAction, TagAction};
use crate::CliError;

/// Restrict a category or tag listing to one type code.
fn of_type(type_code: Option<String>) -> Condition {
    match type_code {
        Some(code) => Condition::eq("type_code", code),
        None => Condition::none(),
    }
}

pub(crate) async fn run_category(
    catalog: &Catalog,
    cx: &CancelToken,
    action: CategoryAction,
) -> Result<(), CliError> {
    match action {
        CategoryAction::Add {
            type_code,
            code,
            name,
        } => {
            let added = catalog
                .add_category(
                    cx,
                    AddCategory {
                        type_id: None,
                        type_code: Some(type_code),
                        code,
                        name,
                    },
                )
                .await?;
            print_json(&added)
        }
        CategoryAction::Show { type_code, code } => {
            let category = catalog
                .get_category_by_sid(
                    cx,
                    CategorySid {
                        type_id: None,
                        type_code: Some(type_code),
                        code,
                    },
                )
                .await?;
            print_json(&category)
        }
        CategoryAction::List { type_code, list } => {
            let cond = of_type(type_code);
            let rows = catalog
                .list_category(cx, cond, list_params(&list)?)
                .await?;
            print_json(&rows)
        }
        CategoryAction::Relate {
            type_code,
            parent,
            child,
        } => {
            let edge = catalog
                .add_category_relation(
                    cx,
                    AddCategoryRelation {
                        type_code: Some(type_code),
                        parent_code: Some(parent.clone()),
                        child_code: Some(child.clone()),
                        ..Default::default()
                    },
                )
                .await?;
            log::info!(
                "{} {} {}",
                parent.if_supports_color(Stdout, |t| t.bold()),
                "->".if_supports_color(Stdout, |t| t.dimmed()),
                edge.child_code.if_supports_color(Stdout, |t| t.bold()),
            );
            Ok(())
        }
    }
}

pub(crate) async fn run_tag(
    catalog: &Catalog,
    cx: &CancelToken,
    action: TagAction,
) -> Result<(), CliError> {
    match action {
        TagAction::Add {
            type_code,
            code,
            name,
        } => {
            let added = catalog
                .add_tag(
                    cx,
                    AddTag {
                        type_id: None,
                        type_code: Some(type_code),
                        code,
                        name,
                    },
                )
                .await?;
            print_json(&added)
        }
        TagAction::List { type_code, list } => {
            let cond = of_type(type_code);
            let rows = catalog.list_tag(cx, cond, list_params(&list)?).await?;
            print_json(&rows)
        }
    }
}
