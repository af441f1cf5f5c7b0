//! Acyclicity check for the two self-referential relation tables.
//!
//! Run after an edge is written, inside the same unit of work: the new edge
//! must be visible to the traversal, and a detected loop is reported as an
//! error so the caller's unit rolls back on drop.

use rusqlite::Connection;

use crate::builder::Statement;
use crate::condition::Args;
use crate::engine;
use crate::error::DataError;

/// Which edge set a traversal walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Category edges whose endpoints both belong to the parent's type.
    Category,
    /// Comic edges of one relation type.
    Comic { type_id: i64 },
}

impl Scope {
    fn message(&self) -> &'static str {
        match self {
            Scope::Category => "category relation loop detected",
            Scope::Comic { .. } => "comic relation loop detected",
        }
    }

    fn edges(&self, parent: &str, args: &mut Args) -> String {
        match self {
            Scope::Category => format!(
                "SELECT r.parent_id, r.child_id FROM category_relation r \
                 JOIN category p ON p.id = r.parent_id \
                 JOIN category c ON c.id = r.child_id \
                 WHERE p.type_id = (SELECT type_id FROM category WHERE id = {parent}) \
                 AND c.type_id = p.type_id"
            ),
            Scope::Comic { type_id } => format!(
                "SELECT parent_id, child_id FROM comic_relation WHERE type_id = {}",
                args.push(*type_id)
            ),
        }
    }
}

/// Whether `parent` is reachable from `child` over the scoped edges, i.e.
/// whether the edge `parent -> child` closes a loop.
pub fn closes_loop(
    conn: &Connection,
    scope: Scope,
    parent_id: i64,
    child_id: i64,
) -> Result<bool, DataError> {
    let mut args = Args::new();
    let child = args.push(child_id);
    let parent = args.push(parent_id);
    let edges = scope.edges(&parent, &mut args);
    let sql = format!(
        "WITH RECURSIVE edges(parent_id, child_id) AS ({edges}), \
         reach(id) AS (SELECT {child} UNION SELECT e.child_id \
         FROM edges e JOIN reach r ON e.parent_id = r.id) \
         SELECT EXISTS(SELECT 1 FROM reach WHERE id = {parent})"
    );
    let stmt = Statement::new(sql, args);
    let found = engine::query_one(conn, &stmt, |row| row.get::<_, bool>(0))
        .map_err(|e| crate::classify::classify(e, &[]))?;
    Ok(found.unwrap_or(false))
}

/// Fail with a loop error when the edge `parent -> child` closes a cycle.
pub fn ensure_acyclic(
    conn: &Connection,
    scope: Scope,
    parent_id: i64,
    child_id: i64,
) -> Result<(), DataError> {
    if closes_loop(conn, scope, parent_id, child_id)? {
        log::debug!("rejecting edge {parent_id} -> {child_id}: {}", scope.message());
        return Err(DataError::generic(scope.message()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::open_memory;

    fn comic(conn: &Connection, code: &str) -> i64 {
        conn.execute("INSERT INTO comic (code) VALUES (?1)", [code]).unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn detects_loop_through_existing_path() {
        let conn = open_memory().unwrap();
        conn.execute("INSERT INTO comic_relation_type (code, name) VALUES ('seq', 'Sequel')", [])
            .unwrap();
        let t = conn.last_insert_rowid();
        let (a, b, c) = (
            comic(&conn, "AAAAAAAA"),
            comic(&conn, "BBBBBBBB"),
            comic(&conn, "CCCCCCCC"),
        );
        for (p, ch) in [(a, b), (b, c)] {
            conn.execute(
                "INSERT INTO comic_relation (type_id, parent_id, child_id) VALUES (?1, ?2, ?3)",
                [t, p, ch],
            )
            .unwrap();
        }
        let scope = Scope::Comic { type_id: t };
        assert!(closes_loop(&conn, scope, c, a).unwrap());
        assert!(!closes_loop(&conn, scope, a, c).unwrap());
        assert!(!closes_loop(&conn, Scope::Comic { type_id: t + 1 }, c, a).unwrap());
    }
}
