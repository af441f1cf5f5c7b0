//! Comic chapters, identified by comic plus chapter label plus version.
//! A missing version is a distinct identity, not a wildcard.

use comicdex_catalog::validate::COMIC_CHAPTER_SET_NULL_ALLOW;
use comicdex_catalog::{
    AddComicChapter, ComicChapter, ComicChapterSid, ListParams, SetComicChapter, Validate,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

use crate::builder::{self, Columns};
use crate::classify::Rule;
use crate::comic::{code_to_id, comic_ref};
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;

pub const COMIC_CHAPTER: Table = Table {
    name: "comic_chapter",
    entity: "comic chapter",
    view: "comic_chapter",
    key: &["id"],
    rules: &[
        Rule::unique(
            "comic_chapter_comic_id_chapter_version_key",
            "same comic id + chapter + version already exists",
        ),
        Rule::foreign_key("comic does not exist"),
    ],
};

impl Record for ComicChapter {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicChapter {
            id: row.get("id")?,
            comic_id: row.get("comic_id")?,
            chapter: row.get("chapter")?,
            version: row.get("version")?,
            volume: row.get("volume")?,
            released_at: row.get("released_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub fn by_sid(sid: &ComicChapterSid) -> Condition {
    Condition::all(vec![
        comic_ref(sid.comic_id, sid.comic_code.as_deref()),
        Condition::eq("chapter", sid.chapter.clone()),
        Condition::not_distinct("version", Value::from(sid.version.clone())),
    ])
}

/// Resolve (comic, chapter, version) to the chapter id inside a statement.
pub fn sid_to_id(sid: &ComicChapterSid) -> SubLookup {
    SubLookup::id("comic_chapter", by_sid(sid))
}

pub fn add_comic_chapter(
    conn: &Connection,
    v: &AddComicChapter,
) -> Result<ComicChapter, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference("comic_id", v.comic_id, v.comic_code.as_deref().map(code_to_id))
        .set("chapter", v.chapter.clone())
        .set_opt("version", v.version.clone())
        .set_opt("volume", v.volume.clone())
        .set_opt("released_at", v.released_at.as_ref().map(builder::timestamp));
    engine::add_returning(conn, &COMIC_CHAPTER, &cols)
}

pub fn get_comic_chapter(
    conn: &Connection,
    sid: &ComicChapterSid,
) -> Result<ComicChapter, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_CHAPTER, &by_sid(sid))
}

pub fn update_comic_chapter(
    conn: &Connection,
    sid: &ComicChapterSid,
    v: &SetComicChapter,
) -> Result<ComicChapter, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference("comic_id", v.comic_id, v.comic_code.as_deref().map(code_to_id))
        .set_opt("chapter", v.chapter.clone())
        .set_opt("version", v.version.clone())
        .set_opt("volume", v.volume.clone())
        .set_opt("released_at", v.released_at.as_ref().map(builder::timestamp))
        .set_null(&v.set_null, COMIC_CHAPTER_SET_NULL_ALLOW);
    engine::update_returning(conn, &COMIC_CHAPTER, &cols, &by_sid(sid))
}

pub fn delete_comic_chapter(
    conn: &Connection,
    sid: &ComicChapterSid,
) -> Result<ComicChapter, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_CHAPTER, &by_sid(sid))
}

pub fn list_comic_chapter(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicChapter>, DataError> {
    engine::list(conn, &COMIC_CHAPTER, cond, &engine::ordered(params, &["released_at"]))
}

pub fn count_comic_chapter(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_CHAPTER, cond)
}
