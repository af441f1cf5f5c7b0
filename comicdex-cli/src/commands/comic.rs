//! Comic commands.

use chrono::Utc;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use comicdex_catalog::{
    AddComic, AddComicCategory, AddComicChapter, AddComicRelation, AddComicTag, AddComicTitle,
};
use comicdex_lib::{CancelToken, Catalog, Condition};

use super::{list_params, parse_timestamp, print_json};
use crate::cli_types::ComicAction;
use crate::CliError;

pub(crate) async fn run_comic(
    catalog: &Catalog,
    cx: &CancelToken,
    action: ComicAction,
) -> Result<(), CliError> {
    match action {
        ComicAction::Add { code, language } => {
            let added = catalog
                .add_comic(
                    cx,
                    AddComic {
                        code,
                        language_ietf: language,
                        ..Default::default()
                    },
                )
                .await?;
            log::info!(
                "Added comic {}",
                added.code.if_supports_color(Stdout, |t| t.bold()),
            );
            print_json(&added)
        }
        ComicAction::Show { code } => {
            let comic = catalog.get_comic_by_code(cx, code).await?;
            print_json(&comic)
        }
        ComicAction::List { list, website } => {
            let external = website.map(|domain| Condition::eq("website_domain", domain));
            let params = list_params(&list)?;
            let total = catalog
                .count_comic(cx, Condition::none(), external.clone())
                .await?;
            let comics = catalog
                .list_comic(cx, Condition::none(), external, params)
                .await?;
            log::info!(
                "{} of {} comic(s)",
                comics.len(),
                total.if_supports_color(Stdout, |t| t.bold()),
            );
            print_json(&comics)
        }
        ComicAction::Title { code, ietf, title } => {
            let added = catalog
                .add_comic_title(
                    cx,
                    AddComicTitle {
                        comic_code: Some(code),
                        language_ietf: Some(ietf),
                        title,
                        ..Default::default()
                    },
                )
                .await?;
            print_json(&added)
        }
        ComicAction::LinkCategory {
            code,
            type_code,
            category,
        } => {
            let link = catalog
                .add_comic_category(
                    cx,
                    AddComicCategory {
                        comic_code: Some(code),
                        category_type_code: Some(type_code),
                        category_code: Some(category),
                        ..Default::default()
                    },
                )
                .await?;
            print_json(&link)
        }
        ComicAction::LinkTag {
            code,
            type_code,
            tag,
        } => {
            let link = catalog
                .add_comic_tag(
                    cx,
                    AddComicTag {
                        comic_code: Some(code),
                        tag_type_code: Some(type_code),
                        tag_code: Some(tag),
                        ..Default::default()
                    },
                )
                .await?;
            print_json(&link)
        }
        ComicAction::Relate {
            type_code,
            parent,
            child,
        } => {
            let edge = catalog
                .add_comic_relation(
                    cx,
                    AddComicRelation {
                        type_code: Some(type_code.clone()),
                        parent_code: Some(parent.clone()),
                        child_code: Some(child),
                        ..Default::default()
                    },
                )
                .await?;
            log::info!(
                "{} {} {}",
                parent.if_supports_color(Stdout, |t| t.bold()),
                format!("-[{type_code}]->").if_supports_color(Stdout, |t| t.dimmed()),
                edge.child_code.if_supports_color(Stdout, |t| t.bold()),
            );
            Ok(())
        }
        ComicAction::Chapter {
            code,
            chapter,
            version,
            volume,
            released_at,
        } => {
            let released_at = match released_at {
                Some(t) => parse_timestamp(&t)?,
                None => Utc::now(),
            };
            let added = catalog
                .add_comic_chapter(
                    cx,
                    AddComicChapter {
                        comic_id: None,
                        comic_code: Some(code),
                        chapter,
                        version,
                        volume,
                        released_at: Some(released_at),
                    },
                )
                .await?;
            print_json(&added)
        }
    }
}
