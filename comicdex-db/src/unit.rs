//! Unit of work: an explicit transaction handle with rollback on drop.
//!
//! A unit opened on a connection that is already inside a transaction
//! becomes a savepoint of that transaction, so helpers can open their own
//! unit without caring whether the caller did.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::Connection;

use crate::error::DataError;

static SAVEPOINT_SEQ: AtomicU64 = AtomicU64::new(1);

pub struct UnitOfWork<'c> {
    conn: &'c Connection,
    savepoint: Option<String>,
    finished: bool,
}

impl<'c> UnitOfWork<'c> {
    /// Start a write transaction, or a savepoint when one is already open.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so every read inside
    /// the unit sees the state its own writes are applied to.
    pub fn begin(conn: &'c Connection) -> Result<Self, DataError> {
        let savepoint = if conn.is_autocommit() {
            conn.execute_batch("BEGIN IMMEDIATE").map_err(interrupted)?;
            None
        } else {
            let name = format!("unit_{}", SAVEPOINT_SEQ.fetch_add(1, Ordering::Relaxed));
            conn.execute_batch(&format!("SAVEPOINT {name}"))
                .map_err(interrupted)?;
            Some(name)
        };
        Ok(Self {
            conn,
            savepoint,
            finished: false,
        })
    }

    pub fn is_nested(&self) -> bool {
        self.savepoint.is_some()
    }

    pub fn commit(mut self) -> Result<(), DataError> {
        self.finished = true;
        let sql = match &self.savepoint {
            Some(name) => format!("RELEASE {name}"),
            None => "COMMIT".to_string(),
        };
        self.conn.execute_batch(&sql).map_err(interrupted)
    }

    fn rollback(&self) -> rusqlite::Result<()> {
        match &self.savepoint {
            Some(name) => self
                .conn
                .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}")),
            None => self.conn.execute_batch("ROLLBACK"),
        }
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // An interrupted statement may already have ended the transaction.
        if let Err(e) = self.rollback() {
            if !self.conn.is_autocommit() {
                log::warn!("unit of work rollback failed: {e}");
            }
        } else {
            log::debug!("unit of work rolled back");
        }
    }
}

fn interrupted(e: rusqlite::Error) -> DataError {
    crate::classify::classify(e, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::open_memory;

    fn languages(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM language", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn drop_rolls_back() {
        let conn = open_memory().unwrap();
        {
            let unit = UnitOfWork::begin(&conn).unwrap();
            unit.execute("INSERT INTO language (ietf, name) VALUES ('en', 'English')", [])
                .unwrap();
        }
        assert!(conn.is_autocommit());
        assert_eq!(languages(&conn), 0);
    }

    #[test]
    fn nested_unit_is_a_savepoint() {
        let conn = open_memory().unwrap();
        let outer = UnitOfWork::begin(&conn).unwrap();
        outer
            .execute("INSERT INTO language (ietf, name) VALUES ('en', 'English')", [])
            .unwrap();
        {
            let inner = UnitOfWork::begin(&outer).unwrap();
            assert!(inner.is_nested());
            inner
                .execute("INSERT INTO language (ietf, name) VALUES ('ja', 'Japanese')", [])
                .unwrap();
        }
        assert_eq!(languages(&outer), 1);
        let inner = UnitOfWork::begin(&outer).unwrap();
        inner
            .execute("INSERT INTO language (ietf, name) VALUES ('id', 'Indonesian')", [])
            .unwrap();
        inner.commit().unwrap();
        outer.commit().unwrap();
        assert_eq!(languages(&conn), 2);
    }
}
