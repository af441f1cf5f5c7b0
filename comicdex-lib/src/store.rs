//! Async handle over the connection pool.
//!
//! Storage calls are synchronous, so each one runs on the blocking thread
//! pool with a checked-out connection. The caller's [`CancelToken`] is raced
//! against the call; cancelling interrupts the statement in flight, which
//! makes any open unit of work roll back when it drops.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use comicdex_db::{DataError, Pool};
use rusqlite::{Connection, InterruptHandle};

use crate::cancel::CancelToken;
use crate::error::ServiceError;

/// Interrupt handle of the connection one call is using. Armed only while
/// the call holds the connection.
#[derive(Default)]
struct InFlight(Mutex<Option<InterruptHandle>>);

impl InFlight {
    fn slot(&self) -> MutexGuard<'_, Option<InterruptHandle>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn arm(&self, handle: InterruptHandle) {
        *self.slot() = Some(handle);
    }

    fn disarm(&self) {
        self.slot().take();
    }

    /// Interrupt the armed connection. Returns whether one was armed.
    fn interrupt(&self) -> bool {
        match self.slot().as_ref() {
            Some(handle) => {
                handle.interrupt();
                true
            }
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pool: Pool,
}

impl Store {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Run `f` with a pooled connection.
    pub async fn run<T, F>(&self, cx: &CancelToken, f: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DataError> + Send + 'static,
    {
        if cx.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let pool = self.pool.clone();
        let in_flight = Arc::new(InFlight::default());
        let task_in_flight = Arc::clone(&in_flight);
        let token = cx.clone();
        let task = tokio::task::spawn_blocking(move || {
            let conn = pool.get();
            task_in_flight.arm(conn.interrupt_handle());
            // Cancelled while waiting for a connection.
            let result = if token.is_cancelled() {
                Err(DataError::Cancelled)
            } else {
                f(&conn)
            };
            // `conn` returns to the pool when it drops and may then belong
            // to another call.
            task_in_flight.disarm();
            result
        });

        tokio::select! {
            biased;
            joined = task => match joined {
                Ok(result) => result.map_err(ServiceError::from),
                Err(e) => {
                    log::error!("storage task failed: {e}");
                    Err(ServiceError::Task(e))
                }
            },
            _ = cx.cancelled() => {
                if in_flight.interrupt() {
                    log::debug!("storage call cancelled, statement interrupted");
                } else {
                    log::debug!("storage call cancelled");
                }
                Err(ServiceError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    const STEPS: i64 = 3_000_000;

    fn count_to(conn: &Connection, n: i64) -> rusqlite::Result<i64> {
        conn.query_row(
            "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < ?1) \
             SELECT count(*) FROM c",
            [n],
            |row| row.get(0),
        )
    }

    #[test]
    fn disarmed_handle_leaves_the_next_user_alone() {
        let pool = Pool::memory(1).unwrap();
        let in_flight = Arc::new(InFlight::default());
        {
            let conn = pool.get();
            in_flight.arm(conn.interrupt_handle());
            in_flight.disarm();
        }

        // The same connection, now checked out by somebody else.
        let worker = std::thread::spawn(move || {
            let conn = pool.get();
            count_to(&conn, STEPS)
        });
        std::thread::sleep(Duration::from_millis(20));
        assert!(!in_flight.interrupt());
        assert_eq!(worker.join().unwrap().unwrap(), STEPS);
    }

    #[test]
    fn armed_handle_interrupts() {
        let pool = Pool::memory(1).unwrap();
        let conn = pool.get();
        let in_flight = InFlight::default();
        in_flight.arm(conn.interrupt_handle());
        assert!(in_flight.interrupt());
        in_flight.disarm();
        assert!(!in_flight.interrupt());
    }

    #[tokio::test]
    async fn finished_work_wins_over_a_late_cancel() {
        let store = Store::new(Pool::memory(1).unwrap());
        for _ in 0..50 {
            let cx = CancelToken::new();
            let inner = cx.clone();
            let n = store
                .run(&cx, move |conn| {
                    let n = count_to(conn, 10)?;
                    inner.cancel();
                    Ok(n)
                })
                .await;
            // Either outcome is allowed for a cancel racing the end of the
            // call; what matters is that the next caller is unaffected.
            assert!(matches!(n, Ok(10) | Err(ServiceError::Cancelled)));
            let fresh = CancelToken::new();
            let next = store
                .run(&fresh, |conn| Ok(count_to(conn, 100_000)?))
                .await
                .unwrap();
            assert_eq!(next, 100_000);
        }
    }
}
