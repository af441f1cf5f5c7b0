//! Websites, keyed by domain.

use comicdex_catalog::{AddWebsite, ListParams, SetWebsite, Validate, Website};
use rusqlite::{Connection, Row};

use crate::builder::Columns;
use crate::classify::Rule;
use crate::condition::{Condition, SubLookup};
use crate::engine::{self, Record, Table};
use crate::error::DataError;

pub const WEBSITE: Table = Table {
    name: "website",
    entity: "website",
    view: "website",
    key: &["id"],
    rules: &[Rule::unique("website_domain_key", "same domain already exists")],
};

impl Record for Website {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Website {
            id: row.get("id")?,
            domain: row.get("domain")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

pub fn domain_to_id(domain: &str) -> SubLookup {
    SubLookup::id("website", Condition::eq("domain", domain.to_string()))
}

pub fn by_domain(domain: &str) -> Condition {
    Condition::eq("domain", domain.to_string())
}

fn add_columns(v: &AddWebsite) -> Columns {
    let mut cols = Columns::new();
    cols.set("domain", v.domain.clone()).set("name", v.name.clone());
    cols
}

pub fn add_website(conn: &Connection, v: &AddWebsite) -> Result<Website, DataError> {
    v.validate()?;
    engine::add_returning(conn, &WEBSITE, &add_columns(v))
}

pub fn batch_add_website(conn: &Connection, vs: &[AddWebsite]) -> Result<usize, DataError> {
    for v in vs {
        v.validate()?;
    }
    let rows: Vec<Columns> = vs.iter().map(add_columns).collect();
    engine::batch_add(conn, &WEBSITE, &rows)
}

pub fn get_website_by_domain(conn: &Connection, domain: &str) -> Result<Website, DataError> {
    engine::get(conn, &WEBSITE, &by_domain(domain))
}

pub fn update_website(
    conn: &Connection,
    domain: &str,
    v: &SetWebsite,
) -> Result<Website, DataError> {
    v.validate()?;
    let mut cols = Columns::new();
    cols.set_opt("domain", v.domain.clone())
        .set_opt("name", v.name.clone());
    engine::update_returning(conn, &WEBSITE, &cols, &by_domain(domain))
}

pub fn delete_website(conn: &Connection, domain: &str) -> Result<Website, DataError> {
    engine::delete_returning(conn, &WEBSITE, &by_domain(domain))
}

pub fn list_website(
    conn: &Connection,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<Website>, DataError> {
    engine::list(conn, &WEBSITE, cond, &engine::ordered(params, &["domain"]))
}

pub fn count_website(conn: &Connection, cond: &Condition) -> Result<i64, DataError> {
    engine::count(conn, &WEBSITE, cond)
}

pub fn exists_website(conn: &Connection, domain: &str) -> Result<bool, DataError> {
    engine::exists(conn, &WEBSITE, &by_domain(domain))
}
