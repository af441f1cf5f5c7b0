//! Code + name type tables: category types, tag types and comic relation
//! types share one row shape and one set of operations.

use comicdex_catalog::{AddTypeDef, ListParams, SetTypeDef, TypeDef, Validate};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;

pub const CATEGORY_TYPE: Table = Table {
    name: "category_type",
    entity: "category type",
    view: "category_type",
    key: &["id"],
    rules: &[Rule::unique("category_type_code_key", "same code already exists")],
};

pub const TAG_TYPE: Table = Table {
    name: "tag_type",
    entity: "tag type",
    view: "tag_type",
    key: &["id"],
    rules: &[Rule::unique("tag_type_code_key", "same code already exists")],
};

pub const COMIC_RELATION_TYPE: Table = Table {
    name: "comic_relation_type",
    entity: "comic relation type",
    view: "comic_relation_type",
    key: &["id"],
    rules: &[Rule::unique("comic_relation_type_code_key", "same code already exists")],
};

impl Record for TypeDef {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TypeDef {
            id: row.get("id")?,
            code: row.get("code")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Resolve a type code to its id in `table`.
pub fn code_to_id(table: &Table, code: &str) -> SubLookup {
    SubLookup::id(table.name, Condition::eq("code", code.to_string()))
}

/// `column` refers to a type given by id or by code.
pub fn type_ref(
    column: &'static str,
    table: &Table,
    id: Option<i64>,
    code: Option<&str>,
) -> Condition {
    Condition::reference(column, id, code.map(|c| code_to_id(table, c)))
}

pub fn by_code(code: &str) -> Condition {
    Condition::eq("code", code.to_string())
}

fn add_columns(v: &AddTypeDef) -> Columns {
    let mut cols = Columns::new();
    cols.set("code", v.code.clone()).set("name", v.name.clone());
    cols
}

pub fn add_type(conn: &Connection, table: &Table, v: &AddTypeDef) -> Result<TypeDef, DataError> {
    v.validate()?;
    engine::add_returning(conn, table, &add_columns(v))
}

pub fn batch_add_type(
    conn: &Connection,
    table: &Table,
    vs: &[AddTypeDef],
) -> Result<usize, DataError> {
    for v in vs {
        v.validate()?;
    }
    let rows: Vec<Columns> = vs.iter().map(add_columns).collect();
    engine::batch_add(conn, table, &rows)
}

pub fn get_type_by_code(
    conn: &Connection,
    table: &Table,
    code: &str,
) -> Result<TypeDef, DataError> {
    engine::get(conn, table, &by_code(code))
}

pub fn update_type(
    conn: &Connection,
    table: &Table,
    code: &str,
    v: &SetTypeDef,
) -> Result<TypeDef, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.set_opt("code", v.code.clone())
        .set_opt("name", v.name.clone());
    engine::update_returning(conn, table, &cols, &by_code(code))
}

pub fn delete_type(conn: &Connection, table: &Table, code: &str) -> Result<TypeDef, DataError> {
    engine::delete_returning(conn, table, &by_code(code))
}

pub fn list_type(
    conn: &Connection,
    table: &Table,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<TypeDef>, DataError> {
    engine::list(conn, table, cond, &engine::ordered(params, &["code"]))
}

pub fn count_type(conn: &Connection, table: &Table, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, table, cond)
}

pub fn exists_type(conn: &Connection, table: &Table, code: &str) -> Result<bool, DataError> {
    engine::exists(conn, table, &by_code(code))
}
