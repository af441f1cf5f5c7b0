//! Comic child rows keyed by (comic, RID): titles, covers, synopses and
//! external links.
//!
//! Each row is addressed by a [`ComicGenericSid`]: the owning comic (by id or
//! code) plus the row's RID. An RID omitted on add is generated.

use comicdex_catalog::validate::{
    COMIC_COVER_SET_NULL_ALLOW, COMIC_EXTERNAL_SET_NULL_ALLOW, COMIC_RID_LENGTH,
    COMIC_SYNOPSIS_SET_NULL_ALLOW, COMIC_TITLE_SET_NULL_ALLOW,
};
use comicdex_catalog::{
    AddComicCover, AddComicExternal, AddComicSynopsis, AddComicTitle, ComicCover, ComicExternal,
    ComicGenericSid, ComicSynopsis, ComicTitle, ListParams, SetComicCover, SetComicExternal,
    SetComicSynopsis, SetComicTitle, Validate,
};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::comic::{code_to_id, comic_ref, random_code};
use crate::condition::Condition;
use crate::engine::{self, Record, Table};
use crate::error::DataError;
use crate::language::ietf_to_id;
use crate::website::domain_to_id;

const DEFAULT_ORDER: &[&str] = &["rid", "id"];

pub const COMIC_TITLE: Table = Table {
    name: "comic_title",
    entity: "comic title",
    view: "(SELECT t.*, l.ietf AS language_ietf FROM comic_title t \
           JOIN language l ON l.id = t.language_id) comic_title",
    key: &["id"],
    rules: &[
        Rule::unique("comic_title_comic_id_rid_key", "same comic id + rid already exists"),
        Rule::unique("comic_title_comic_id_title_key", "same comic id + title already exists"),
        Rule::foreign_key("comic or language does not exist"),
    ],
};

pub const COMIC_COVER: Table = Table {
    name: "comic_cover",
    entity: "comic cover",
    view: "(SELECT v.*, w.domain AS website_domain FROM comic_cover v \
           JOIN website w ON w.id = v.website_id) comic_cover",
    key: &["id"],
    rules: &[
        Rule::unique("comic_cover_comic_id_rid_key", "same comic id + rid already exists"),
        Rule::unique(
            "comic_cover_comic_id_website_id_relative_url_key",
            "same comic id + website id + relative url already exists",
        ),
        Rule::foreign_key("comic or website does not exist"),
    ],
};

pub const COMIC_SYNOPSIS: Table = Table {
    name: "comic_synopsis",
    entity: "comic synopsis",
    view: "(SELECT s.*, l.ietf AS language_ietf FROM comic_synopsis s \
           JOIN language l ON l.id = s.language_id) comic_synopsis",
    key: &["id"],
    rules: &[
        Rule::unique("comic_synopsis_comic_id_rid_key", "same comic id + rid already exists"),
        Rule::unique(
            "comic_synopsis_comic_id_synopsis_key",
            "same comic id + synopsis already exists",
        ),
        Rule::foreign_key("comic or language does not exist"),
    ],
};

pub const COMIC_EXTERNAL: Table = Table {
    name: "comic_external",
    entity: "comic external",
    view: "(SELECT e.*, w.domain AS website_domain FROM comic_external e \
           JOIN website w ON w.id = e.website_id) comic_external",
    key: &["id"],
    rules: &[
        Rule::unique("comic_external_comic_id_rid_key", "same comic id + rid already exists"),
        Rule::unique(
            "comic_external_comic_id_website_id_relative_url_key",
            "same comic id + website id + relative url already exists",
        ),
        Rule::foreign_key("comic or website does not exist"),
    ],
};

// ── Row mapping ─────────────────────────────────────────────────────────────

impl Record for ComicTitle {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicTitle {
            id: row.get("id")?,
            comic_id: row.get("comic_id")?,
            rid: row.get("rid")?,
            language_id: row.get("language_id")?,
            language_ietf: row.get("language_ietf")?,
            title: row.get("title")?,
            synonym: row.get("synonym")?,
            romanized: row.get("romanized")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl Record for ComicCover {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicCover {
            id: row.get("id")?,
            comic_id: row.get("comic_id")?,
            rid: row.get("rid")?,
            website_id: row.get("website_id")?,
            website_domain: row.get("website_domain")?,
            relative_url: row.get("relative_url")?,
            priority: row.get("priority")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl Record for ComicSynopsis {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicSynopsis {
            id: row.get("id")?,
            comic_id: row.get("comic_id")?,
            rid: row.get("rid")?,
            language_id: row.get("language_id")?,
            language_ietf: row.get("language_ietf")?,
            synopsis: row.get("synopsis")?,
            version: row.get("version")?,
            romanized: row.get("romanized")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl Record for ComicExternal {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicExternal {
            id: row.get("id")?,
            comic_id: row.get("comic_id")?,
            rid: row.get("rid")?,
            website_id: row.get("website_id")?,
            website_domain: row.get("website_domain")?,
            relative_url: row.get("relative_url")?,
            official: row.get("official")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

// ── Shared helpers ──────────────────────────────────────────────────────────

pub fn by_sid(sid: &ComicGenericSid) -> Condition {
    Condition::all(vec![
        comic_ref(sid.comic_id, sid.comic_code.as_deref()),
        Condition::eq("rid", sid.rid.clone()),
    ])
}

/// Columns every child add carries: the owning comic and the RID.
fn owner_columns(comic_id: Option<i64>, comic_code: Option<&str>, rid: Option<&str>) -> Columns {
    let mut cols = Columns::new();
    cols.reference("comic_id", comic_id, comic_code.map(code_to_id))
        .set(
            "rid",
            rid.map(str::to_string)
                .unwrap_or_else(|| random_code(COMIC_RID_LENGTH)),
        );
    cols
}

/// Columns a child update may move: the owning comic and the RID.
fn owner_changes(comic_id: Option<i64>, comic_code: Option<&str>, rid: Option<&str>) -> Columns {
    let mut cols = Columns::new();
    cols.reference("comic_id", comic_id, comic_code.map(code_to_id))
        .set_opt("rid", rid.map(str::to_string));
    cols
}

// ── Titles ──────────────────────────────────────────────────────────────────

fn title_columns(v: &AddComicTitle) -> Columns {
    let mut cols = owner_columns(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("language_id", v.language_id, v.language_ietf.as_deref().map(ietf_to_id))
        .set("title", v.title.clone())
        .set_opt("synonym", v.synonym)
        .set_opt("romanized", v.romanized);
    cols
}

pub fn add_comic_title(conn: &Connection, v: &AddComicTitle) -> Result<ComicTitle, DataError> {
    v.validate()?;
    engine::add_returning(conn, &COMIC_TITLE, &title_columns(v))
}

/// Insert several titles in one unit of work, returning them in order.
pub fn batch_add_comic_title(
    conn: &Connection,
    vs: &[AddComicTitle],
) -> Result<Vec<ComicTitle>, DataError> {
    for v in vs {
        v.validate()?;
    }
    let rows: Vec<Columns> = vs.iter().map(title_columns).collect();
    engine::batch_add_returning(conn, &COMIC_TITLE, &rows)
}

pub fn get_comic_title(conn: &Connection, sid: &ComicGenericSid) -> Result<ComicTitle, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_TITLE, &by_sid(sid))
}

pub fn update_comic_title(
    conn: &Connection,
    sid: &ComicGenericSid,
    v: &SetComicTitle,
) -> Result<ComicTitle, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = owner_changes(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("language_id", v.language_id, v.language_ietf.as_deref().map(ietf_to_id))
        .set_opt("title", v.title.clone())
        .set_opt("synonym", v.synonym)
        .set_opt("romanized", v.romanized)
        .set_null(&v.set_null, COMIC_TITLE_SET_NULL_ALLOW);
    engine::update_returning(conn, &COMIC_TITLE, &cols, &by_sid(sid))
}

pub fn delete_comic_title(
    conn: &Connection,
    sid: &ComicGenericSid,
) -> Result<ComicTitle, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_TITLE, &by_sid(sid))
}

pub fn list_comic_title(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicTitle>, DataError> {
    engine::list(conn, &COMIC_TITLE, cond, &engine::ordered(params, DEFAULT_ORDER))
}

pub fn count_comic_title(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_TITLE, cond)
}

// ── Covers ──────────────────────────────────────────────────────────────────

pub fn add_comic_cover(conn: &Connection, v: &AddComicCover) -> Result<ComicCover, DataError> {
    v.validate()?;
    let mut cols = owner_columns(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("website_id", v.website_id, v.website_domain.as_deref().map(domain_to_id))
        .set("relative_url", v.relative_url.clone())
        .set_opt("priority", v.priority);
    engine::add_returning(conn, &COMIC_COVER, &cols)
}

pub fn get_comic_cover(conn: &Connection, sid: &ComicGenericSid) -> Result<ComicCover, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_COVER, &by_sid(sid))
}

pub fn update_comic_cover(
    conn: &Connection,
    sid: &ComicGenericSid,
    v: &SetComicCover,
) -> Result<ComicCover, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = owner_changes(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("website_id", v.website_id, v.website_domain.as_deref().map(domain_to_id))
        .set_opt("relative_url", v.relative_url.clone())
        .set_opt("priority", v.priority)
        .set_null(&v.set_null, COMIC_COVER_SET_NULL_ALLOW);
    engine::update_returning(conn, &COMIC_COVER, &cols, &by_sid(sid))
}

pub fn delete_comic_cover(
    conn: &Connection,
    sid: &ComicGenericSid,
) -> Result<ComicCover, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_COVER, &by_sid(sid))
}

pub fn list_comic_cover(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicCover>, DataError> {
    engine::list(conn, &COMIC_COVER, cond, &engine::ordered(params, DEFAULT_ORDER))
}

pub fn count_comic_cover(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_COVER, cond)
}

// ── Synopses ────────────────────────────────────────────────────────────────

pub fn add_comic_synopsis(
    conn: &Connection,
    v: &AddComicSynopsis,
) -> Result<ComicSynopsis, DataError> {
    v.validate()?;
    let mut cols = owner_columns(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("language_id", v.language_id, v.language_ietf.as_deref().map(ietf_to_id))
        .set("synopsis", v.synopsis.clone())
        .set_opt("version", v.version.clone())
        .set_opt("romanized", v.romanized);
    engine::add_returning(conn, &COMIC_SYNOPSIS, &cols)
}

pub fn get_comic_synopsis(
    conn: &Connection,
    sid: &ComicGenericSid,
) -> Result<ComicSynopsis, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_SYNOPSIS, &by_sid(sid))
}

pub fn update_comic_synopsis(
    conn: &Connection,
    sid: &ComicGenericSid,
    v: &SetComicSynopsis,
) -> Result<ComicSynopsis, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = owner_changes(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("language_id", v.language_id, v.language_ietf.as_deref().map(ietf_to_id))
        .set_opt("synopsis", v.synopsis.clone())
        .set_opt("version", v.version.clone())
        .set_opt("romanized", v.romanized)
        .set_null(&v.set_null, COMIC_SYNOPSIS_SET_NULL_ALLOW);
    engine::update_returning(conn, &COMIC_SYNOPSIS, &cols, &by_sid(sid))
}

pub fn delete_comic_synopsis(
    conn: &Connection,
    sid: &ComicGenericSid,
) -> Result<ComicSynopsis, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_SYNOPSIS, &by_sid(sid))
}

pub fn list_comic_synopsis(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicSynopsis>, DataError> {
    engine::list(conn, &COMIC_SYNOPSIS, cond, &engine::ordered(params, DEFAULT_ORDER))
}

pub fn count_comic_synopsis(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_SYNOPSIS, cond)
}

// ── External links ──────────────────────────────────────────────────────────

pub fn add_comic_external(
    conn: &Connection,
    v: &AddComicExternal,
) -> Result<ComicExternal, DataError> {
    v.validate()?;
    let mut cols = owner_columns(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("website_id", v.website_id, v.website_domain.as_deref().map(domain_to_id))
        .set_opt("relative_url", v.relative_url.clone())
        .set_opt("official", v.official);
    engine::add_returning(conn, &COMIC_EXTERNAL, &cols)
}

pub fn get_comic_external(
    conn: &Connection,
    sid: &ComicGenericSid,
) -> Result<ComicExternal, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_EXTERNAL, &by_sid(sid))
}

pub fn update_comic_external(
    conn: &Connection,
    sid: &ComicGenericSid,
    v: &SetComicExternal,
) -> Result<ComicExternal, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = owner_changes(v.comic_id, v.comic_code.as_deref(), v.rid.as_deref());
    cols.reference("website_id", v.website_id, v.website_domain.as_deref().map(domain_to_id))
        .set_opt("relative_url", v.relative_url.clone())
        .set_opt("official", v.official)
        .set_null(&v.set_null, COMIC_EXTERNAL_SET_NULL_ALLOW);
    engine::update_returning(conn, &COMIC_EXTERNAL, &cols, &by_sid(sid))
}

pub fn delete_comic_external(
    conn: &Connection,
    sid: &ComicGenericSid,
) -> Result<ComicExternal, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_EXTERNAL, &by_sid(sid))
}

pub fn list_comic_external(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicExternal>, DataError> {
    engine::list(conn, &COMIC_EXTERNAL, cond, &engine::ordered(params, DEFAULT_ORDER))
}

pub fn count_comic_external(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_EXTERNAL, cond)
}
