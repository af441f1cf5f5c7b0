//! Fixed-size connection pool.
//!
//! Acquisition blocks until a connection is free, so it must be called from
//! blocking context (`spawn_blocking` in the async layer). Connections go
//! back to the pool when the guard drops.

use std::ops::Deref;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use rusqlite::{Connection, InterruptHandle};

use crate::schema::{self, SchemaError};

static MEMORY_SEQ: AtomicU64 = AtomicU64::new(1);

struct Inner {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
    size: usize,
}

#[derive(Clone)]
pub struct Pool {
    inner: Arc<Inner>,
}

impl Pool {
    /// Open `size` connections to a database file, creating or migrating
    /// the schema through the first one.
    pub fn open(path: &Path, size: usize) -> Result<Self, SchemaError> {
        let size = size.max(1);
        let mut conns = Vec::with_capacity(size);
        conns.push(schema::open_database(path)?);
        for _ in 1..size {
            let conn = Connection::open(path)?;
            schema::configure(&conn)?;
            conns.push(conn);
        }
        log::debug!("opened {size} connection(s) to {}", path.display());
        Ok(Self::from_connections(conns))
    }

    /// A private in-memory database shared by `size` connections.
    pub fn memory(size: usize) -> Result<Self, SchemaError> {
        let size = size.max(1);
        let name = format!("comicdex-{}", MEMORY_SEQ.fetch_add(1, Ordering::Relaxed));
        let mut conns = Vec::with_capacity(size);
        for _ in 0..size {
            conns.push(schema::open_shared_memory(&name)?);
        }
        schema::create_schema(&conns[0])?;
        Ok(Self::from_connections(conns))
    }

    fn from_connections(conns: Vec<Connection>) -> Self {
        let size = conns.len();
        Self {
            inner: Arc::new(Inner {
                idle: Mutex::new(conns),
                available: Condvar::new(),
                size,
            }),
        }
    }

    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Check out a connection, waiting for one to be returned if all are
    /// in use.
    pub fn get(&self) -> PooledConnection {
        let mut idle = self.inner.idle.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(conn) = idle.pop() {
                return PooledConnection {
                    conn: Some(conn),
                    pool: Arc::clone(&self.inner),
                };
            }
            idle = self
                .inner
                .available
                .wait(idle)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// A checked-out connection.
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<Inner>,
}

impl PooledConnection {
    /// Handle that aborts whatever statement this connection is running.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.deref().get_interrupt_handle()
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `drop` takes the connection out.
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if !conn.is_autocommit() {
                // A unit of work that was interrupted mid-rollback can leave
                // the transaction open; never hand that to the next caller.
                if let Err(e) = conn.execute_batch("ROLLBACK") {
                    log::warn!("discarding open transaction failed: {e}");
                }
            }
            let mut idle = self.pool.idle.lock().unwrap_or_else(PoisonError::into_inner);
            idle.push(conn);
            self.pool.available.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connections_share_one_memory_database() {
        let pool = Pool::memory(2).unwrap();
        let a = pool.get();
        let b = pool.get();
        a.execute("INSERT INTO language (ietf, name) VALUES ('en', 'English')", [])
            .unwrap();
        let n: i64 = b
            .query_row("SELECT COUNT(*) FROM language", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn released_connection_is_reused() {
        let pool = Pool::memory(1).unwrap();
        drop(pool.get());
        let conn = pool.get();
        assert!(conn.is_autocommit());
        assert_eq!(pool.size(), 1);
    }
}
