//! Statement builder: INSERT, UPDATE, DELETE and SELECT text from column
//! sets, conditions, orderings and pagination.

use chrono::{DateTime, NaiveDate, Utc};
use comicdex_catalog::{OrderBy, Pagination};
use rusqlite::types::Value;

use crate::condition::{Args, Condition, SubLookup};

/// SQL text plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Args) -> Self {
        Self {
            sql: sql.into(),
            args: args.into_values(),
        }
    }

    /// Number of distinct `?N` placeholders in the text.
    pub fn placeholder_count(&self) -> usize {
        let mut seen = std::collections::BTreeSet::new();
        let bytes = self.sql.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'?' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if let Ok(n) = self.sql[start..end].parse::<usize>() {
                    seen.insert(n);
                }
                i = end;
            } else {
                i += 1;
            }
        }
        seen.len()
    }
}

/// New value for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Not part of the statement at all.
    Absent,
    Null,
    Value(Value),
    Lookup(SubLookup),
}

/// Ordered column set for INSERT and UPDATE.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns(Vec<(&'static str, ColumnValue)>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, col: &'static str, value: ColumnValue) -> &mut Self {
        match self.0.iter_mut().find(|(c, _)| *c == col) {
            Some(slot) => slot.1 = value,
            None => self.0.push((col, value)),
        }
        self
    }

    pub fn set(&mut self, col: &'static str, value: impl Into<Value>) -> &mut Self {
        self.put(col, ColumnValue::Value(value.into()))
    }

    /// Set when `Some`, otherwise mark the column absent.
    pub fn set_opt<V: Into<Value>>(&mut self, col: &'static str, value: Option<V>) -> &mut Self {
        match value {
            Some(v) => self.set(col, v),
            None => self.put(col, ColumnValue::Absent),
        }
    }

    pub fn lookup(&mut self, col: &'static str, lookup: SubLookup) -> &mut Self {
        self.put(col, ColumnValue::Lookup(lookup))
    }

    /// A foreign key given either directly or as a natural-key lookup.
    pub fn reference(
        &mut self,
        col: &'static str,
        id: Option<i64>,
        lookup: Option<SubLookup>,
    ) -> &mut Self {
        match (id, lookup) {
            (Some(id), _) => self.set(col, id),
            (None, Some(l)) => self.lookup(col, l),
            (None, None) => self.put(col, ColumnValue::Absent),
        }
    }

    pub fn null(&mut self, col: &'static str) -> &mut Self {
        self.put(col, ColumnValue::Null)
    }

    /// Null out each requested column found in `allow`; unknown names are
    /// ignored here because payload validation already rejected them.
    pub fn set_null(&mut self, names: &[String], allow: &[&'static str]) -> &mut Self {
        for name in names {
            if let Some(col) = allow.iter().find(|a| **a == name.as_str()) {
                self.null(*col);
            }
        }
        self
    }

    /// Columns that take part in the statement.
    pub fn present(&self) -> impl Iterator<Item = &(&'static str, ColumnValue)> {
        self.0.iter().filter(|(_, v)| *v != ColumnValue::Absent)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.present().map(|(c, _)| *c).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }
}

fn value_sql(v: &ColumnValue, args: &mut Args) -> String {
    match v {
        ColumnValue::Absent | ColumnValue::Null => "NULL".to_string(),
        ColumnValue::Value(v) => args.push(v.clone()),
        ColumnValue::Lookup(l) => l.build(args),
    }
}

/// Timestamp text in the same shape the schema defaults produce.
pub fn timestamp(t: &DateTime<Utc>) -> Value {
    Value::Text(t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}

pub fn date(d: &NaiveDate) -> Value {
    Value::Text(d.format("%Y-%m-%d").to_string())
}

fn returning(sql: &mut String, cols: Option<&[&str]>) {
    if let Some(cols) = cols {
        sql.push_str(" RETURNING ");
        sql.push_str(&cols.join(", "));
    }
}

// ── INSERT ──────────────────────────────────────────────────────────────────

pub fn insert(table: &str, cols: &Columns, ret: Option<&[&str]>) -> Statement {
    let mut args = Args::new();
    let mut sql = if cols.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        let names = cols.names().join(", ");
        let vals: Vec<String> = cols.present().map(|(_, v)| value_sql(v, &mut args)).collect();
        format!("INSERT INTO {table} ({names}) VALUES ({})", vals.join(", "))
    };
    returning(&mut sql, ret);
    Statement::new(sql, args)
}

/// Multi-row INSERT. SQLite has no `DEFAULT` inside `VALUES`, so
/// consecutive rows sharing the same column set form one statement each.
pub fn insert_many(table: &str, rows: &[Columns], ret: Option<&[&str]>) -> Vec<Statement> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let names = rows[start].names();
        let mut end = start + 1;
        while end < rows.len() && rows[end].names() == names {
            end += 1;
        }
        if names.is_empty() {
            for _ in start..end {
                out.push(insert(table, &rows[start], ret));
            }
        } else {
            let mut args = Args::new();
            let tuples: Vec<String> = rows[start..end]
                .iter()
                .map(|row| {
                    let vals: Vec<String> =
                        row.present().map(|(_, v)| value_sql(v, &mut args)).collect();
                    format!("({})", vals.join(", "))
                })
                .collect();
            let mut sql = format!(
                "INSERT INTO {table} ({}) VALUES {}",
                names.join(", "),
                tuples.join(", ")
            );
            returning(&mut sql, ret);
            out.push(Statement::new(sql, args));
        }
        start = end;
    }
    out
}

// ── UPDATE ──────────────────────────────────────────────────────────────────

/// UPDATE with an unchanged-guard: the WHERE clause only matches rows on
/// which at least one assigned column would actually change. Guard terms
/// refer to the SET placeholders instead of binding the values again.
pub fn update(table: &str, cols: &Columns, cond: &Condition, ret: Option<&[&str]>) -> Statement {
    update_touching(table, cols, &Columns::new(), cond, ret)
}

/// Like [`update`], but `touch` columns are assigned without taking part in
/// the guard, so bookkeeping such as `updated_at` never makes an otherwise
/// unchanged row match.
pub fn update_touching(
    table: &str,
    cols: &Columns,
    touch: &Columns,
    cond: &Condition,
    ret: Option<&[&str]>,
) -> Statement {
    let mut args = Args::new();
    let mut sets = Vec::new();
    let mut guard = Vec::new();
    for (col, v) in cols.present() {
        let val = value_sql(v, &mut args);
        match v {
            ColumnValue::Null => guard.push(format!("{col} IS NOT NULL")),
            _ => guard.push(format!("{col} IS DISTINCT FROM {val}")),
        }
        sets.push(format!("{col} = {val}"));
    }
    for (col, v) in touch.present() {
        if cols.names().contains(col) {
            continue;
        }
        sets.push(format!("{col} = {}", value_sql(v, &mut args)));
    }
    let filter = cond.build(&mut args);
    let mut sql = format!("UPDATE {table} SET {}", sets.join(", "));
    let guard = guard.join(" OR ");
    match (filter.is_empty(), guard.is_empty()) {
        (true, true) => {}
        (true, false) => sql.push_str(&format!(" WHERE {guard}")),
        (false, true) => sql.push_str(&format!(" WHERE {filter}")),
        (false, false) => sql.push_str(&format!(" WHERE ({filter}) AND ({guard})")),
    }
    returning(&mut sql, ret);
    Statement::new(sql, args)
}

// ── DELETE / SELECT ─────────────────────────────────────────────────────────

pub fn delete(table: &str, cond: &Condition, ret: Option<&[&str]>) -> Statement {
    let mut args = Args::new();
    let mut sql = format!("DELETE FROM {table}");
    where_clause(&mut sql, cond, &mut args);
    returning(&mut sql, ret);
    Statement::new(sql, args)
}

pub fn select(
    from: &str,
    cond: &Condition,
    order_bys: &[OrderBy],
    pagination: Option<&Pagination>,
) -> Statement {
    let mut args = Args::new();
    let mut sql = format!("SELECT * FROM {from}");
    where_clause(&mut sql, cond, &mut args);
    let obs = order_by(order_bys);
    if !obs.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&obs);
    }
    if let Some(p) = pagination {
        sql.push_str(&paginate(p, &mut args));
    }
    Statement::new(sql, args)
}

pub fn count(from: &str, cond: &Condition) -> Statement {
    let mut args = Args::new();
    let mut sql = format!("SELECT COUNT(*) FROM {from}");
    where_clause(&mut sql, cond, &mut args);
    Statement::new(sql, args)
}

pub fn exists(from: &str, cond: &Condition) -> Statement {
    let mut args = Args::new();
    let mut sql = format!("SELECT EXISTS(SELECT 1 FROM {from}");
    where_clause(&mut sql, cond, &mut args);
    sql.push(')');
    Statement::new(sql, args)
}

fn where_clause(sql: &mut String, cond: &Condition, args: &mut Args) {
    let frag = cond.build(args);
    if !frag.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&frag);
    }
}

pub fn order_by(order_bys: &[OrderBy]) -> String {
    order_bys
        .iter()
        .filter(|ob| !ob.field.is_empty())
        .map(|ob| ob.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// ` LIMIT ?n[ OFFSET ?m]`, or nothing when the limit is below 1.
pub fn paginate(p: &Pagination, args: &mut Args) -> String {
    if p.limit < 1 {
        return String::new();
    }
    let mut out = format!(" LIMIT {}", args.push(i64::from(p.limit)));
    let offset = p.offset();
    if offset > 0 {
        out.push_str(&format!(" OFFSET {}", args.push(offset as i64)));
    }
    out
}
