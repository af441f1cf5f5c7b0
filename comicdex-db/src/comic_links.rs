//! Join rows attaching categories and tags to comics.

use comicdex_catalog::{
    AddComicCategory, AddComicTag, ComicCategory, ComicCategorySid, ComicTag, ComicTagSid,
    ListParams, SetComicCategory, SetComicTag, Validate,
};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::category;
use crate::classify::Rule;
use crate::comic::{code_to_id, comic_ref};
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;
use crate::tag;

pub const COMIC_CATEGORY: Table = Table {
    name: "comic_category",
    entity: "comic category",
    view: "(SELECT cc.*, c.type_id AS category_type_id, c.code AS category_code \
           FROM comic_category cc JOIN category c ON c.id = cc.category_id) comic_category",
    key: &["comic_id", "category_id"],
    rules: &[
        Rule::unique("comic_category_pkey", "same category id already exists"),
        Rule::foreign_key("comic or category does not exist"),
    ],
};

pub const COMIC_TAG: Table = Table {
    name: "comic_tag",
    entity: "comic tag",
    view: "(SELECT ct.*, t.type_id AS tag_type_id, t.code AS tag_code \
           FROM comic_tag ct JOIN tag t ON t.id = ct.tag_id) comic_tag",
    key: &["comic_id", "tag_id"],
    rules: &[
        Rule::unique("comic_tag_pkey", "same tag id already exists"),
        Rule::foreign_key("comic or tag does not exist"),
    ],
};

impl Record for ComicCategory {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicCategory {
            comic_id: row.get("comic_id")?,
            category_id: row.get("category_id")?,
            category_type_id: row.get("category_type_id")?,
            category_code: row.get("category_code")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl Record for ComicTag {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicTag {
            comic_id: row.get("comic_id")?,
            tag_id: row.get("tag_id")?,
            tag_type_id: row.get("tag_type_id")?,
            tag_code: row.get("tag_code")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

// ── Categories ──────────────────────────────────────────────────────────────

fn category_lookup(
    type_id: Option<i64>,
    type_code: Option<&str>,
    code: Option<&str>,
) -> Option<SubLookup> {
    code.map(|c| category::sid_to_id(type_id, type_code, c))
}

pub fn category_by_sid(sid: &ComicCategorySid) -> Condition {
    Condition::all(vec![
        comic_ref(sid.comic_id, sid.comic_code.as_deref()),
        Condition::reference(
            "category_id",
            sid.category_id,
            category_lookup(
                sid.category_type_id,
                sid.category_type_code.as_deref(),
                sid.category_code.as_deref(),
            ),
        ),
    ])
}

pub fn add_comic_category(
    conn: &Connection,
    v: &AddComicCategory,
) -> Result<ComicCategory, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference("comic_id", v.comic_id, v.comic_code.as_deref().map(code_to_id))
        .reference(
            "category_id",
            v.category_id,
            category_lookup(
                v.category_type_id,
                v.category_type_code.as_deref(),
                v.category_code.as_deref(),
            ),
        );
    engine::add_returning(conn, &COMIC_CATEGORY, &cols)
}

pub fn get_comic_category(
    conn: &Connection,
    sid: &ComicCategorySid,
) -> Result<ComicCategory, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_CATEGORY, &category_by_sid(sid))
}

pub fn update_comic_category(
    conn: &Connection,
    sid: &ComicCategorySid,
    v: &SetComicCategory,
) -> Result<ComicCategory, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference("comic_id", v.comic_id, v.comic_code.as_deref().map(code_to_id))
        .reference(
            "category_id",
            v.category_id,
            category_lookup(
                v.category_type_id,
                v.category_type_code.as_deref(),
                v.category_code.as_deref(),
            ),
        );
    engine::update_returning(conn, &COMIC_CATEGORY, &cols, &category_by_sid(sid))
}

pub fn delete_comic_category(
    conn: &Connection,
    sid: &ComicCategorySid,
) -> Result<ComicCategory, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_CATEGORY, &category_by_sid(sid))
}

pub fn list_comic_category(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicCategory>, DataError> {
    engine::list(
        conn,
        &COMIC_CATEGORY,
        cond,
        &engine::ordered(params, &["category_id"]),
    )
}

pub fn count_comic_category(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_CATEGORY, cond)
}

// ── Tags ────────────────────────────────────────────────────────────────────

fn tag_lookup(
    type_id: Option<i64>,
    type_code: Option<&str>,
    code: Option<&str>,
) -> Option<SubLookup> {
    code.map(|c| tag::sid_to_id(type_id, type_code, c))
}

pub fn tag_by_sid(sid: &ComicTagSid) -> Condition {
    Condition::all(vec![
        comic_ref(sid.comic_id, sid.comic_code.as_deref()),
        Condition::reference(
            "tag_id",
            sid.tag_id,
            tag_lookup(sid.tag_type_id, sid.tag_type_code.as_deref(), sid.tag_code.as_deref()),
        ),
    ])
}

pub fn add_comic_tag(conn: &Connection, v: &AddComicTag) -> Result<ComicTag, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference("comic_id", v.comic_id, v.comic_code.as_deref().map(code_to_id))
        .reference(
            "tag_id",
            v.tag_id,
            tag_lookup(v.tag_type_id, v.tag_type_code.as_deref(), v.tag_code.as_deref()),
        );
    engine::add_returning(conn, &COMIC_TAG, &cols)
}

pub fn get_comic_tag(conn: &Connection, sid: &ComicTagSid) -> Result<ComicTag, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_TAG, &tag_by_sid(sid))
}

pub fn update_comic_tag(
    conn: &Connection,
    sid: &ComicTagSid,
    v: &SetComicTag,
) -> Result<ComicTag, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference("comic_id", v.comic_id, v.comic_code.as_deref().map(code_to_id))
        .reference(
            "tag_id",
            v.tag_id,
            tag_lookup(v.tag_type_id, v.tag_type_code.as_deref(), v.tag_code.as_deref()),
        );
    engine::update_returning(conn, &COMIC_TAG, &cols, &tag_by_sid(sid))
}

pub fn delete_comic_tag(conn: &Connection, sid: &ComicTagSid) -> Result<ComicTag, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_TAG, &tag_by_sid(sid))
}

pub fn list_comic_tag(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicTag>, DataError> {
    engine::list(conn, &COMIC_TAG, cond, &engine::ordered(params, &["tag_id"]))
}

pub fn count_comic_tag(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_TAG, cond)
}
