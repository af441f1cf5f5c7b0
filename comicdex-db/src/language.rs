//! Languages, keyed by IETF tag.

use comicdex_catalog::{AddLanguage, Language, ListParams, SetLanguage, Validate};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;

pub const LANGUAGE: Table = Table {
    name: "language",
    entity: "language",
    view: "language",
    key: &["id"],
    rules: &[Rule::unique("language_ietf_key", "same ietf already exists")],
};

const DEFAULT_ORDER: &[&str] = &["ietf"];

impl Record for Language {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Language {
            id: row.get("id")?,
            ietf: row.get("ietf")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Resolve an IETF tag to the language id inside a statement.
pub fn ietf_to_id(ietf: &str) -> SubLookup {
    SubLookup::id("language", Condition::eq("ietf", ietf.to_string()))
}

pub fn by_ietf(ietf: &str) -> Condition {
    Condition::eq("ietf", ietf.to_string())
}

fn add_columns(v: &AddLanguage) -> Columns {
    let mut cols = Columns::new();
    cols.set("ietf", v.ietf.clone()).set("name", v.name.clone());
    cols
}

pub fn add_language(conn: &Connection, v: &AddLanguage) -> Result<Language, DataError> {
    v.validate()?;
    engine::add_returning(conn, &LANGUAGE, &add_columns(v))
}

/// Insert several languages in one unit of work.
pub fn batch_add_language(conn: &Connection, vs: &[AddLanguage]) -> Result<usize, DataError> {
    for v in vs {
        v.validate()?;
    }
    let rows: Vec<Columns> = vs.iter().map(add_columns).collect();
    engine::batch_add(conn, &LANGUAGE, &rows)
}

pub fn get_language_by_ietf(conn: &Connection, ietf: &str) -> Result<Language, DataError> {
    engine::get(conn, &LANGUAGE, &by_ietf(ietf))
}

pub fn update_language(
    conn: &Connection,
    ietf: &str,
    v: &SetLanguage,
) -> Result<Language, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.set_opt("ietf", v.ietf.clone())
        .set_opt("name", v.name.clone());
    engine::update_returning(conn, &LANGUAGE, &cols, &by_ietf(ietf))
}

pub fn delete_language(conn: &Connection, ietf: &str) -> Result<Language, DataError> {
    engine::delete_returning(conn, &LANGUAGE, &by_ietf(ietf))
}

pub fn list_language(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<Language>, DataError> {
    engine::list(conn, &LANGUAGE, cond, &engine::ordered(params, DEFAULT_ORDER))
}

pub fn count_language(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &LANGUAGE, cond)
}

pub fn exists_language(conn: &Connection, ietf: &str) -> Result<bool, DataError> {
    engine::exists(conn, &LANGUAGE, &by_ietf(ietf))
}
