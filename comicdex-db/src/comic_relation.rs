//! Typed comic-to-comic relations. Edges of one relation type must stay
//! acyclic; every edge write runs the cycle guard for that type.

use comicdex_catalog::{
    AddComicRelation, ComicRelation, ComicRelationSid, ListParams, SetComicRelation, Validate,
};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::comic::code_to_id;
use crate::condition::Condition;
use crate::engine::{self, Record, Table};
use crate::error::DataError;
use crate::guard::{self, Scope};
use crate::type_def::{self, COMIC_RELATION_TYPE};
use crate::unit::UnitOfWork;

pub const COMIC_RELATION: Table = Table {
    name: "comic_relation",
    entity: "comic relation",
    view: "(SELECT r.*, c.code AS child_code FROM comic_relation r \
           JOIN comic c ON c.id = r.child_id) comic_relation",
    key: &["type_id", "parent_id", "child_id"],
    rules: &[
        Rule::unique("comic_relation_pkey", "same type id + child id already exists"),
        Rule::foreign_key("comic relation type, parent comic or child comic does not exist"),
        Rule::check(
            "comic_relation_parent_id_child_id_check",
            "parent comic and child comic cannot be same",
        ),
    ],
};

impl Record for ComicRelation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ComicRelation {
            type_id: row.get("type_id")?,
            parent_id: row.get("parent_id")?,
            child_id: row.get("child_id")?,
            child_code: row.get("child_code")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub fn by_sid(sid: &ComicRelationSid) -> Condition {
    Condition::all(vec![
        type_def::type_ref(
            "type_id",
            &COMIC_RELATION_TYPE,
            sid.type_id,
            sid.type_code.as_deref(),
        ),
        Condition::reference(
            "parent_id",
            sid.parent_id,
            sid.parent_code.as_deref().map(code_to_id),
        ),
        Condition::reference(
            "child_id",
            sid.child_id,
            sid.child_code.as_deref().map(code_to_id),
        ),
    ])
}

fn edge_columns(
    type_id: Option<i64>,
    type_code: Option<&str>,
    parent_id: Option<i64>,
    parent_code: Option<&str>,
    child_id: Option<i64>,
    child_code: Option<&str>,
) -> Columns {
    let mut cols = Columns::new();
    cols.reference(
        "type_id",
        type_id,
        type_code.map(|c| type_def::code_to_id(&COMIC_RELATION_TYPE, c)),
    )
    .reference("parent_id", parent_id, parent_code.map(code_to_id))
    .reference("child_id", child_id, child_code.map(code_to_id));
    cols
}

pub fn add_comic_relation(
    conn: &Connection,
    v: &AddComicRelation,
) -> Result<ComicRelation, DataError> {
    v.validate()?;
    let cols = edge_columns(
        v.type_id,
        v.type_code.as_deref(),
        v.parent_id,
        v.parent_code.as_deref(),
        v.child_id,
        v.child_code.as_deref(),
    );
    let unit = UnitOfWork::begin(conn)?;
    let rel: ComicRelation = engine::add_returning(&unit, &COMIC_RELATION, &cols)?;
    guard::ensure_acyclic(
        &unit,
        Scope::Comic { type_id: rel.type_id },
        rel.parent_id,
        rel.child_id,
    )?;
    unit.commit()?;
    Ok(rel)
}

pub fn get_comic_relation(
    conn: &Connection,
    sid: &ComicRelationSid,
) -> Result<ComicRelation, DataError> {
    sid.validate()?;
    engine::get(conn, &COMIC_RELATION, &by_sid(sid))
}

/// Repoint or retype an edge. Nothing else is pruned on a type change; the
/// edge itself is re-validated under its new type.
pub fn update_comic_relation(
    conn: &Connection,
    sid: &ComicRelationSid,
    v: &SetComicRelation,
) -> Result<ComicRelation, DataError> {
    sid.validate()?;
    v.validate()?;
    let cols = edge_columns(
        v.type_id,
        v.type_code.as_deref(),
        v.parent_id,
        v.parent_code.as_deref(),
        v.child_id,
        v.child_code.as_deref(),
    );
    let unit = UnitOfWork::begin(conn)?;
    let rel: ComicRelation = engine::update_returning(&unit, &COMIC_RELATION, &cols, &by_sid(sid))?;
    guard::ensure_acyclic(
        &unit,
        Scope::Comic { type_id: rel.type_id },
        rel.parent_id,
        rel.child_id,
    )?;
    unit.commit()?;
    Ok(rel)
}

pub fn delete_comic_relation(
    conn: &Connection,
    sid: &ComicRelationSid,
) -> Result<ComicRelation, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &COMIC_RELATION, &by_sid(sid))
}

pub fn list_comic_relation(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<ComicRelation>, DataError> {
    engine::list(conn, &COMIC_RELATION, cond, &engine::ordered(params, &["child_id"]))
}

pub fn count_comic_relation(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &COMIC_RELATION, cond)
}
