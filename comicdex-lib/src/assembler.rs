//! Aggregate assembly.
//!
//! A comic is stored as a root row plus eight dependent collections. The
//! assembler fetches the roots first, then issues one fetch per collection
//! concurrently, filtered by the owners' ids, and distributes each row back
//! to its owner through an id-keyed index. Categories and tags are reached
//! through join rows, so each of those fetches runs two queries in sequence.
//!
//! The first failing fetch fails the whole aggregate; fetches already handed
//! to the blocking pool run to completion and their rows are dropped.

use std::collections::HashMap;

use comicdex_catalog::{
    Category, CategorySid, Comic, ComicChapter, ComicCover, ComicExternal, ComicRelation,
    ComicSynopsis, ComicTitle, ListParams, Tag,
};
use comicdex_db::condition::Condition;
use comicdex_db::{category, chapter, comic, comic_links, comic_parts, comic_relation, tag};
use comicdex_db::DataError;
use futures::future::{try_join_all, BoxFuture};
use rusqlite::Connection;

use crate::cancel::CancelToken;
use crate::error::ServiceError;
use crate::store::Store;

/// One fetched dependent collection. Join-table collections carry the
/// owning comic id next to each referenced row.
enum Part {
    Titles(Vec<ComicTitle>),
    Covers(Vec<ComicCover>),
    Synopses(Vec<ComicSynopsis>),
    Chapters(Vec<ComicChapter>),
    Externals(Vec<ComicExternal>),
    Categories(Vec<(i64, Category)>),
    Tags(Vec<(i64, Tag)>),
    Relations(Vec<ComicRelation>),
}

type PartFuture = BoxFuture<'static, Result<Part, ServiceError>>;

/// `key = id` for a single owner, `key = id1 OR key = id2 ...` for a batch.
fn owned_by(key: &'static str, ids: &[i64]) -> Condition {
    match ids {
        [id] => Condition::eq(key, *id),
        _ => Condition::any_id(key, ids.iter().copied()),
    }
}

fn fetch<T, F>(
    store: &Store,
    cx: &CancelToken,
    cond: Condition,
    list: F,
    wrap: fn(Vec<T>) -> Part,
) -> PartFuture
where
    T: Send + 'static,
    F: FnOnce(&Connection, &Condition, &ListParams) -> Result<Vec<T>, DataError> + Send + 'static,
{
    let store = store.clone();
    let cx = cx.clone();
    Box::pin(async move {
        let rows = store
            .run(&cx, move |c| list(c, &cond, &ListParams::default()))
            .await?;
        Ok(wrap(rows))
    })
}

fn unique_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn fetch_categories(store: &Store, cx: &CancelToken, cond: Condition) -> PartFuture {
    let store = store.clone();
    let cx = cx.clone();
    Box::pin(async move {
        let links = store
            .run(&cx, move |c| {
                comic_links::list_comic_category(c, &cond, &ListParams::default())
            })
            .await?;
        let ids = unique_ids(links.iter().map(|l| l.category_id));
        if ids.is_empty() {
            return Ok(Part::Categories(Vec::new()));
        }
        let found = store
            .run(&cx, move |c| {
                category::list_category(c, &owned_by("id", &ids), &ListParams::default())
            })
            .await?;
        let by_id: HashMap<i64, Category> = found.into_iter().map(|c| (c.id, c)).collect();
        let rows = links
            .into_iter()
            .filter_map(|l| by_id.get(&l.category_id).map(|c| (l.comic_id, c.clone())))
            .collect();
        Ok(Part::Categories(rows))
    })
}

fn fetch_tags(store: &Store, cx: &CancelToken, cond: Condition) -> PartFuture {
    let store = store.clone();
    let cx = cx.clone();
    Box::pin(async move {
        let links = store
            .run(&cx, move |c| {
                comic_links::list_comic_tag(c, &cond, &ListParams::default())
            })
            .await?;
        let ids = unique_ids(links.iter().map(|l| l.tag_id));
        if ids.is_empty() {
            return Ok(Part::Tags(Vec::new()));
        }
        let found = store
            .run(&cx, move |c| {
                tag::list_tag(c, &owned_by("id", &ids), &ListParams::default())
            })
            .await?;
        let by_id: HashMap<i64, Tag> = found.into_iter().map(|t| (t.id, t)).collect();
        let rows = links
            .into_iter()
            .filter_map(|l| by_id.get(&l.tag_id).map(|t| (l.comic_id, t.clone())))
            .collect();
        Ok(Part::Tags(rows))
    })
}

/// Hand each row to the comic that owns it. Rows whose owner is not in
/// `comics` are dropped.
fn distribute<R>(
    comics: &mut [Comic],
    index: &HashMap<i64, usize>,
    rows: Vec<R>,
    owner: impl Fn(&R) -> i64,
    mut place: impl FnMut(&mut Comic, R),
) {
    for row in rows {
        if let Some(&i) = index.get(&owner(&row)) {
            place(&mut comics[i], row);
        }
    }
}

/// Fill every dependent collection of `comics` in place.
pub async fn attach_comic_dependents(
    store: &Store,
    cx: &CancelToken,
    comics: &mut [Comic],
) -> Result<(), ServiceError> {
    let ids: Vec<i64> = comics.iter().map(|c| c.id).collect();
    if ids.is_empty() {
        return Ok(());
    }
    let by_comic = owned_by("comic_id", &ids);

    let fetches: Vec<PartFuture> = vec![
        fetch(store, cx, by_comic.clone(), comic_parts::list_comic_title, Part::Titles),
        fetch(store, cx, by_comic.clone(), comic_parts::list_comic_cover, Part::Covers),
        fetch(store, cx, by_comic.clone(), comic_parts::list_comic_synopsis, Part::Synopses),
        fetch(store, cx, by_comic.clone(), chapter::list_comic_chapter, Part::Chapters),
        fetch(store, cx, by_comic.clone(), comic_parts::list_comic_external, Part::Externals),
        fetch_categories(store, cx, by_comic.clone()),
        fetch_tags(store, cx, by_comic),
        fetch(
            store,
            cx,
            owned_by("parent_id", &ids),
            comic_relation::list_comic_relation,
            Part::Relations,
        ),
    ];
    let parts = try_join_all(fetches).await?;

    let index: HashMap<i64, usize> = comics.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
    for part in parts {
        match part {
            Part::Titles(rows) => {
                distribute(comics, &index, rows, |r| r.comic_id, |c, r| c.titles.push(r))
            }
            Part::Covers(rows) => {
                distribute(comics, &index, rows, |r| r.comic_id, |c, r| c.covers.push(r))
            }
            Part::Synopses(rows) => {
                distribute(comics, &index, rows, |r| r.comic_id, |c, r| c.synopses.push(r))
            }
            Part::Chapters(rows) => {
                distribute(comics, &index, rows, |r| r.comic_id, |c, r| c.chapters.push(r))
            }
            Part::Externals(rows) => {
                distribute(comics, &index, rows, |r| r.comic_id, |c, r| c.externals.push(r))
            }
            Part::Categories(rows) => distribute(
                comics,
                &index,
                rows,
                |r| r.0,
                |c, (_, category)| c.categories.push(category),
            ),
            Part::Tags(rows) => {
                distribute(comics, &index, rows, |r| r.0, |c, (_, t)| c.tags.push(t))
            }
            Part::Relations(rows) => {
                distribute(comics, &index, rows, |r| r.parent_id, |c, r| c.relations.push(r))
            }
        }
    }
    log::debug!("assembled {} comic aggregate(s)", comics.len());
    Ok(())
}

/// Single-parent fetch of a comic aggregate.
pub async fn comic_by_code(
    store: &Store,
    cx: &CancelToken,
    code: String,
) -> Result<Comic, ServiceError> {
    let root = store
        .run(cx, move |c| comic::get_comic_by_code(c, &code))
        .await?;
    let mut comics = [root];
    attach_comic_dependents(store, cx, &mut comics).await?;
    let [comic] = comics;
    Ok(comic)
}

/// Attach each category's outgoing hierarchy edges.
pub async fn attach_category_relations(
    store: &Store,
    cx: &CancelToken,
    categories: &mut [Category],
) -> Result<(), ServiceError> {
    let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
    if ids.is_empty() {
        return Ok(());
    }
    let cond = owned_by("parent_id", &ids);
    let edges = store
        .run(cx, move |c| {
            category::list_category_relation(c, &cond, &ListParams::default())
        })
        .await?;
    let index: HashMap<i64, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();
    for edge in edges {
        if let Some(&i) = index.get(&edge.parent_id) {
            categories[i].relations.push(edge);
        }
    }
    Ok(())
}

pub async fn category_by_sid(
    store: &Store,
    cx: &CancelToken,
    sid: CategorySid,
) -> Result<Category, ServiceError> {
    let root = store
        .run(cx, move |c| category::get_category_by_sid(c, &sid))
        .await?;
    let mut categories = [root];
    attach_category_relations(store, cx, &mut categories).await?;
    let [category] = categories;
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_owner_uses_equality() {
        assert_eq!(owned_by("comic_id", &[7]), Condition::eq("comic_id", 7));
        assert_eq!(
            owned_by("comic_id", &[7, 8]),
            Condition::any_id("comic_id", [7, 8])
        );
    }

    #[test]
    fn ids_are_deduplicated() {
        assert_eq!(unique_ids([3, 1, 3, 2, 1].into_iter()), vec![1, 2, 3]);
    }
}
