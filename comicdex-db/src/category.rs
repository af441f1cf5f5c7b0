//! Categories and the category hierarchy.
//!
//! A category is identified by its type (id or code) plus its own code.
//! Hierarchy edges must stay acyclic within one category type; every edge
//! write runs the cycle guard inside the same unit of work.

use comicdex_catalog::{
    AddCategory, AddCategoryRelation, Category, CategoryRelation, CategoryRelationSid,
    CategorySid, ListParams, SetCategory, SetCategoryRelation, Validate,
};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;
use crate::guard::{self, Scope};
use crate::type_def::{code_to_id, type_ref, CATEGORY_TYPE};
use crate::unit::UnitOfWork;

pub const CATEGORY: Table = Table {
    name: "category",
    entity: "category",
    view: "(SELECT c.*, t.code AS type_code FROM category c \
           JOIN category_type t ON t.id = c.type_id) category",
    key: &["id"],
    rules: &[
        Rule::unique("category_type_id_code_key", "same type id + code already exists"),
        Rule::foreign_key("category type does not exist"),
    ],
};

pub const CATEGORY_RELATION: Table = Table {
    name: "category_relation",
    entity: "category relation",
    view: "(SELECT r.*, c.code AS child_code FROM category_relation r \
           JOIN category c ON c.id = r.child_id) category_relation",
    key: &["parent_id", "child_id"],
    rules: &[
        Rule::unique("category_relation_pkey", "same child id already exists"),
        Rule::foreign_key("parent or child category does not exist"),
        Rule::check(
            "category_relation_parent_id_child_id_check",
            "parent category and child category cannot be same",
        ),
    ],
};

impl Record for Category {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get("id")?,
            type_id: row.get("type_id")?,
            type_code: row.get("type_code")?,
            code: row.get("code")?,
            name: row.get("name")?,
            relations: Vec::new(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl Record for CategoryRelation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(CategoryRelation {
            parent_id: row.get("parent_id")?,
            child_id: row.get("child_id")?,
            child_code: row.get("child_code")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

// ── Natural keys ────────────────────────────────────────────────────────────

fn type_cond(type_id: Option<i64>, type_code: Option<&str>) -> Condition {
    type_ref("type_id", &CATEGORY_TYPE, type_id, type_code)
}

/// Resolve (type, code) to the category id inside a statement.
pub fn sid_to_id(type_id: Option<i64>, type_code: Option<&str>, code: &str) -> SubLookup {
    SubLookup::id(
        "category",
        Condition::all(vec![
            type_cond(type_id, type_code),
            Condition::eq("code", code.to_string()),
        ]),
    )
}

pub fn by_sid(sid: &CategorySid) -> Condition {
    Condition::all(vec![
        type_cond(sid.type_id, sid.type_code.as_deref()),
        Condition::eq("code", sid.code.clone()),
    ])
}

// ── Category ────────────────────────────────────────────────────────────────

pub fn add_category(conn: &Connection, v: &AddCategory) -> Result<Category, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.reference(
        "type_id",
        v.type_id,
        v.type_code.as_deref().map(|c| code_to_id(&CATEGORY_TYPE, c)),
    )
    .set("code", v.code.clone())
    .set("name", v.name.clone());
    engine::add_returning(conn, &CATEGORY, &cols)
}

pub fn get_category_by_sid(conn: &Connection, sid: &CategorySid) -> Result<Category, DataError> {
    sid.validate()?;
    engine::get(conn, &CATEGORY, &by_sid(sid))
}

/// Update a category. Moving it to another type deletes every hierarchy
/// edge touching it, in the same unit of work, since those edges would
/// otherwise cross type scopes.
pub fn update_category(
    conn: &Connection,
    sid: &CategorySid,
    v: &SetCategory,
) -> Result<Category, DataError> {
    sid.validate()?;
    v.validate()?;
    let unit = UnitOfWork::begin(conn)?;
    let before: Category = engine::get(&unit, &CATEGORY, &by_sid(sid))?;
    let mut cols = Columns::new();
    cols.reference(
        "type_id",
        v.type_id,
        v.type_code.as_deref().map(|c| code_to_id(&CATEGORY_TYPE, c)),
    )
    .set_opt("code", v.code.clone())
    .set_opt("name", v.name.clone());
    let after: Category =
        engine::update_returning(&unit, &CATEGORY, &cols, &Condition::eq("id", before.id))?;
    if after.type_id != before.type_id {
        let pruned = engine::delete(
            &unit,
            &CATEGORY_RELATION,
            &Condition::any(vec![
                Condition::eq("parent_id", after.id),
                Condition::eq("child_id", after.id),
            ]),
        )?;
        log::info!(
            "category {} moved from type {} to {}, {pruned} relation(s) removed",
            after.code,
            before.type_code,
            after.type_code
        );
    }
    unit.commit()?;
    Ok(after)
}

pub fn delete_category(conn: &Connection, sid: &CategorySid) -> Result<Category, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &CATEGORY, &by_sid(sid))
}

pub fn list_category(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<Category>, DataError> {
    engine::list(conn, &CATEGORY, cond, &engine::ordered(params, &["code", "id"]))
}

pub fn count_category(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &CATEGORY, cond)
}

pub fn exists_category(conn: &Connection, sid: &CategorySid) -> Result<bool, DataError> {
    engine::exists(conn, &CATEGORY, &by_sid(sid))
}

// ── Hierarchy ───────────────────────────────────────────────────────────────

fn endpoint(
    type_id: Option<i64>,
    type_code: Option<&str>,
    id: Option<i64>,
    code: Option<&str>,
) -> (Option<i64>, Option<SubLookup>) {
    (id, code.map(|c| sid_to_id(type_id, type_code, c)))
}

pub fn relation_by_sid(sid: &CategoryRelationSid) -> Condition {
    let t = (sid.type_id, sid.type_code.as_deref());
    let (pid, plook) = endpoint(t.0, t.1, sid.parent_id, sid.parent_code.as_deref());
    let (cid, clook) = endpoint(t.0, t.1, sid.child_id, sid.child_code.as_deref());
    Condition::all(vec![
        Condition::reference("parent_id", pid, plook),
        Condition::reference("child_id", cid, clook),
    ])
}

pub fn add_category_relation(
    conn: &Connection,
    v: &AddCategoryRelation,
) -> Result<CategoryRelation, DataError> {
    v.validate()?;
    let t = (v.type_id, v.type_code.as_deref());
    let (pid, plook) = endpoint(t.0, t.1, v.parent_id, v.parent_code.as_deref());
    let (cid, clook) = endpoint(t.0, t.1, v.child_id, v.child_code.as_deref());
    let mut cols = Columns::new();
    cols.reference("parent_id", pid, plook)
        .reference("child_id", cid, clook);

    let unit = UnitOfWork::begin(conn)?;
    let rel: CategoryRelation = engine::add_returning(&unit, &CATEGORY_RELATION, &cols)?;
    guard::ensure_acyclic(&unit, Scope::Category, rel.parent_id, rel.child_id)?;
    unit.commit()?;
    Ok(rel)
}

pub fn get_category_relation(
    conn: &Connection,
    sid: &CategoryRelationSid,
) -> Result<CategoryRelation, DataError> {
    sid.validate()?;
    engine::get(conn, &CATEGORY_RELATION, &relation_by_sid(sid))
}

/// Repoint an edge and re-run the cycle guard on its new endpoints.
pub fn update_category_relation(
    conn: &Connection,
    sid: &CategoryRelationSid,
    v: &SetCategoryRelation,
) -> Result<CategoryRelation, DataError> {
    sid.validate()?;
    v.validate()?;
    let (type_id, type_code) = match (v.type_id, v.type_code.as_deref()) {
        (None, None) => (sid.type_id, sid.type_code.as_deref()),
        t => t,
    };
    let (pid, plook) = endpoint(type_id, type_code, v.parent_id, v.parent_code.as_deref());
    let (cid, clook) = endpoint(type_id, type_code, v.child_id, v.child_code.as_deref());
    let mut cols = Columns::new();
    cols.reference("parent_id", pid, plook)
        .reference("child_id", cid, clook);

    let unit = UnitOfWork::begin(conn)?;
    let rel: CategoryRelation =
        engine::update_returning(&unit, &CATEGORY_RELATION, &cols, &relation_by_sid(sid))?;
    guard::ensure_acyclic(&unit, Scope::Category, rel.parent_id, rel.child_id)?;
    unit.commit()?;
    Ok(rel)
}

pub fn delete_category_relation(
    conn: &Connection,
    sid: &CategoryRelationSid,
) -> Result<CategoryRelation, DataError> {
    sid.validate()?;
    engine::delete_returning(conn, &CATEGORY_RELATION, &relation_by_sid(sid))
}

pub fn list_category_relation(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<CategoryRelation>, DataError> {
    engine::list(
        conn,
        &CATEGORY_RELATION,
        cond,
        &engine::ordered(params, &["child_id"]),
    )
}

pub fn count_category_relation(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &CATEGORY_RELATION, cond)
}
