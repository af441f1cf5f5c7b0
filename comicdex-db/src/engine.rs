//! Generic CRUD engine over table descriptors.
//!
//! Reads go through a table's `view`, which may be a joined subquery adding
//! natural-key columns. Writes target the base table; when a write must
//! return a row it returns the key columns and the row is re-read from the
//! view inside the same unit of work.

use comicdex_catalog::{ListParams, OrderBy};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

use crate::builder::{self, ColumnValue, Columns, Statement};
use crate::classify::{classify, Rule};
use crate::condition::Condition;
use crate::error::DataError;
use crate::unit::UnitOfWork;

/// Static description of one table.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    /// Used in "<entity> not found".
    pub entity: &'static str,
    /// FROM clause for reads: the table itself or a joined subquery.
    pub view: &'static str,
    /// Columns identifying one row.
    pub key: &'static [&'static str],
    /// Constraint-violation wording for writes.
    pub rules: &'static [Rule],
}

/// A row type that can be read from its table's view.
pub trait Record: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

// ── Storage boundary ────────────────────────────────────────────────────────

/// Run a statement that returns no rows.
pub fn execute(conn: &Connection, stmt: &Statement) -> rusqlite::Result<usize> {
    log::debug!("{} ({} args)", stmt.sql, stmt.args.len());
    conn.prepare_cached(&stmt.sql)?
        .execute(params_from_iter(stmt.args.iter()))
}

/// Scan every row.
pub fn query_all<T, F>(conn: &Connection, stmt: &Statement, f: F) -> rusqlite::Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    log::debug!("{} ({} args)", stmt.sql, stmt.args.len());
    let mut prepared = conn.prepare_cached(&stmt.sql)?;
    let rows = prepared.query_map(params_from_iter(stmt.args.iter()), f)?;
    rows.collect()
}

/// Scan a single row; `None` when nothing matched.
pub fn query_one<T, F>(conn: &Connection, stmt: &Statement, f: F) -> rusqlite::Result<Option<T>>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    log::debug!("{} ({} args)", stmt.sql, stmt.args.len());
    let mut prepared = conn.prepare_cached(&stmt.sql)?;
    match prepared.query_row(params_from_iter(stmt.args.iter()), f) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

fn require(table: &Table, cond: &Condition) -> Result<(), DataError> {
    if cond.is_empty() {
        return Err(DataError::generic(format!(
            "{} condition cannot be empty",
            table.entity
        )));
    }
    Ok(())
}

fn key_row(table: &Table, row: &Row<'_>) -> rusqlite::Result<Condition> {
    let mut terms = Vec::with_capacity(table.key.len());
    for (i, col) in table.key.iter().enumerate() {
        terms.push(Condition::eq(*col, row.get::<_, Value>(i)?));
    }
    Ok(Condition::all(terms))
}

fn stamp() -> Columns {
    let mut cols = Columns::new();
    cols.put(
        "updated_at",
        ColumnValue::Value(builder::timestamp(&chrono::Utc::now())),
    );
    cols
}

// ── Add ─────────────────────────────────────────────────────────────────────

pub fn add(conn: &Connection, table: &Table, cols: &Columns) -> Result<(), DataError> {
    let stmt = builder::insert(table.name, cols, None);
    execute(conn, &stmt).map_err(|e| classify(e, table.rules))?;
    Ok(())
}

pub fn add_returning<T: Record>(
    conn: &Connection,
    table: &Table,
    cols: &Columns,
) -> Result<T, DataError> {
    let unit = UnitOfWork::begin(conn)?;
    let stmt = builder::insert(table.name, cols, Some(table.key));
    let key = query_one(&unit, &stmt, |row| key_row(table, row))
        .map_err(|e| classify(e, table.rules))?
        .ok_or_else(|| DataError::not_found(table.entity))?;
    let row = get(&unit, table, &key)?;
    unit.commit()?;
    Ok(row)
}

/// Insert many rows in one unit of work. Returns the number inserted.
pub fn batch_add(conn: &Connection, table: &Table, rows: &[Columns]) -> Result<usize, DataError> {
    let unit = UnitOfWork::begin(conn)?;
    let mut n = 0;
    for stmt in builder::insert_many(table.name, rows, None) {
        n += execute(&unit, &stmt).map_err(|e| classify(e, table.rules))?;
    }
    unit.commit()?;
    Ok(n)
}

pub fn batch_add_returning<T: Record>(
    conn: &Connection,
    table: &Table,
    rows: &[Columns],
) -> Result<Vec<T>, DataError> {
    let unit = UnitOfWork::begin(conn)?;
    let mut keys = Vec::with_capacity(rows.len());
    for stmt in builder::insert_many(table.name, rows, Some(table.key)) {
        let batch = query_all(&unit, &stmt, |row| key_row(table, row))
            .map_err(|e| classify(e, table.rules))?;
        keys.extend(batch);
    }
    let mut out = Vec::with_capacity(keys.len());
    for key in &keys {
        out.push(get(&unit, table, key)?);
    }
    unit.commit()?;
    Ok(out)
}

// ── Get / Update / Delete ───────────────────────────────────────────────────

/// Exactly one row, or `NotFound`.
pub fn get<T: Record>(conn: &Connection, table: &Table, cond: &Condition) -> Result<T, DataError> {
    require(table, cond)?;
    let stmt = builder::select(table.view, cond, &[], None);
    query_one(conn, &stmt, T::from_row)
        .map_err(|e| classify(e, &[]))?
        .ok_or_else(|| DataError::not_found(table.entity))
}

/// Update matching rows; matching nothing is not an error. Returns the
/// number of rows changed.
pub fn update(
    conn: &Connection,
    table: &Table,
    cols: &Columns,
    cond: &Condition,
) -> Result<usize, DataError> {
    require(table, cond)?;
    let stmt = builder::update_touching(table.name, cols, &stamp(), cond, None);
    execute(conn, &stmt).map_err(|e| classify(e, table.rules))
}

/// Update and return the updated row, or `NotFound` when nothing matched.
/// A row that already holds every assigned value is returned as it is.
pub fn update_returning<T: Record>(
    conn: &Connection,
    table: &Table,
    cols: &Columns,
    cond: &Condition,
) -> Result<T, DataError> {
    require(table, cond)?;
    let unit = UnitOfWork::begin(conn)?;
    let stmt =
        builder::update_touching(table.name, cols, &stamp(), cond, Some(table.key));
    let keys = query_all(&unit, &stmt, |row| key_row(table, row))
        .map_err(|e| classify(e, table.rules))?;
    let row = match keys.into_iter().next() {
        Some(key) => get(&unit, table, &key)?,
        None => get(&unit, table, cond)?,
    };
    unit.commit()?;
    Ok(row)
}

pub fn delete(conn: &Connection, table: &Table, cond: &Condition) -> Result<usize, DataError> {
    require(table, cond)?;
    let stmt = builder::delete(table.name, cond, None);
    execute(conn, &stmt).map_err(|e| classify(e, table.rules))
}

/// Delete and return the deleted row as the view saw it before deletion.
pub fn delete_returning<T: Record>(
    conn: &Connection,
    table: &Table,
    cond: &Condition,
) -> Result<T, DataError> {
    require(table, cond)?;
    let unit = UnitOfWork::begin(conn)?;
    let row = get(&unit, table, cond)?;
    let stmt = builder::delete(table.name, cond, None);
    execute(&unit, &stmt).map_err(|e| classify(e, table.rules))?;
    unit.commit()?;
    Ok(row)
}

// ── List / Count / Exists ───────────────────────────────────────────────────

/// Fall back to an entity's default ordering when the caller gave none.
pub fn ordered(params: &ListParams, default: &[&str]) -> ListParams {
    let mut params = params.clone();
    if params.order_bys.is_empty() {
        params.order_bys = default.iter().map(|f| OrderBy::new(*f)).collect();
    }
    params
}

pub fn list<T: Record>(
    conn: &Connection,
    table: &Table,
    cond: &Condition,
    params: &ListParams,
) -> Result<Vec<T>, DataError> {
    let stmt = builder::select(
        table.view,
        cond,
        &params.order_bys,
        params.pagination.as_ref(),
    );
    query_all(conn, &stmt, T::from_row).map_err(|e| classify(e, &[]))
}

pub fn count(conn: &Connection, table: &Table, cond: &Condition) -> Result<i64, DataError> {
    let stmt = builder::count(table.view, cond);
    query_one(conn, &stmt, |row| row.get(0))
        .map_err(|e| classify(e, &[]))
        .map(|n| n.unwrap_or(0))
}

pub fn exists(conn: &Connection, table: &Table, cond: &Condition) -> Result<bool, DataError> {
    let stmt = builder::exists(table.view, cond);
    query_one(conn, &stmt, |row| row.get(0))
        .map_err(|e| classify(e, &[]))
        .map(|b| b.unwrap_or(false))
}
