//! Tags, identified by tag type plus code.

use comicdex_catalog::{AddTag, ListParams, SetTag, Tag, TagSid, Validate};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;
use crate::type_def::{code_to_id, type_ref, TAG_TYPE};

pub const TAG: Table = Table {
    name: "tag",
    entity: "tag",
    view: "(SELECT g.*, t.code AS type_code FROM tag g \
           JOIN tag_type t ON t.id = g.type_id) tag",
    key: &["id"],
    rules: &[
        Rule::unique("tag_type_id_code_key", "same type id + code already exists"),
        Rule::foreign_key("tag type does not exist"),
    ],
};

impl Record for Tag {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Tag {
            id: row.get("id")?,
            type_id: row.get("type_id")?,
            type_code: row.get("type_code")?,
            code: row.get("code")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

fn type_cond(type_id: Option<i64>, type_code: Option<&str>) -> Condition {
    type_ref("type_id", &TAG_TYPE, type_id, type_code)
}

pub fn sid_to_id(type_id: Option<i64>, type_code: Option<&str>, code: &str) -> SubLookup {
    SubLookup::id(
        "tag",
        Condition::all(vec![
            type_cond(type_id, type_code),
            Condition::eq("code", code.to_string()),
        ]),
    )
}

pub fn by_sid(sid: &TagSid) -> Condition {
    Condition::all(vec![
        type_cond(sid.type_id, sid.type_code.as_deref()),
        Condition::eq("code", sid.code.clone()),
    ])
}

pub fn add_tag(conn: &Connection, v: &AddTag) -> Result<Tag, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference(
        "type_id",
        v.type_id,
        v.type_code.as_deref().map(|c| code_to_id(&TAG_TYPE, c)),
    )
    .set("code", v.code.clone())
    .set("name", v.name.clone());
    engine::add_returning(conn, &TAG, &cols)
}

pub fn get_tag_by_sid(conn: &Connection, sid: &TagSid) -> Result<Tag, DataError> {
    sid.validate()?;
    engine::get(conn, &TAG, &by_sid(sid))
}

pub fn update_tag(conn: &Connection, sid: &TagSid, v: &SetTag) -> Result<Tag, DataError> {
    sid.validate()?;
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference(
        "type_id",
        v.type_id,
        v.type_code.as_deref().map(|c| code_to_id(&TAG_TYPE, c)),
    )
    .set_opt("code", v.code.clone())
    .set_opt("name", v.name.clone());
    engine::update_returning(conn, &TAG, &cols, &by_sid(sid))
}

pub fn delete_tag(conn: &Connection, sid: &TagSid) -> Result<Tag, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &TAG, &by_sid(sid))
}

pub fn list_tag(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<Tag>, DataError> {
    engine::list(conn, &TAG, cond, &engine::ordered(params, &["code", "id"]))
}

pub fn count_tag(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &TAG, cond)
}

pub fn exists_tag(conn: &Connection, sid: &TagSid) -> Result<bool, DataError> {
    engine::exists(conn, &TAG, &by_sid(sid))
}
