//! ConnectionPool — writer + optional read pool with round-robin selection.
//!
//! The only place in the crate that holds `Mutex<Connection>`; everything
//! else goes through the `with_writer`/`with_reader` closures. The pool is
//! built by the caller and injected into the store, which never opens or
//! closes connections itself.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, InterruptHandle};

use warden_core::{DatabaseConfig, StorageError, StorageResult};

use crate::pragmas;

/// Connection pool: 1 writer + N readers.
///
/// `read_pool_size` 0 keeps the pool at the single write connection, the
/// default for embedded single-file deployments where replace-on-update
/// must not race concurrent readers. A non-zero size opens that many
/// read-only connections selected round-robin, relying on WAL snapshots.
pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
    interrupts: Vec<InterruptHandle>,
}

impl ConnectionPool {
    /// Open a file-backed pool as described by the config.
    pub fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        Self::open_path(&config.path, config.read_pool_size, config.busy_timeout_ms)
    }

    /// Open a file-backed pool with explicit settings.
    pub fn open_path(
        path: &Path,
        read_pool_size: usize,
        busy_timeout_ms: u32,
    ) -> StorageResult<Self> {
        let writer = Connection::open(path).map_err(|e| StorageError::Connection {
            message: format!("failed to open writer for {}: {}", path.display(), e),
        })?;
        pragmas::configure_connection(&writer, busy_timeout_ms)?;

        let mut interrupts = vec![writer.get_interrupt_handle()];
        let mut readers = Vec::with_capacity(read_pool_size);
        for i in 0..read_pool_size {
            let reader = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| StorageError::Connection {
                message: format!("failed to open reader {} for {}: {}", i, path.display(), e),
            })?;
            pragmas::configure_readonly_connection(&reader, busy_timeout_ms)?;
            interrupts.push(reader.get_interrupt_handle());
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
            interrupts,
        })
    }

    /// Open an in-memory pool.
    ///
    /// A plain in-memory database is not shared across connections, so the
    /// pool stays at the single writer; `with_reader` falls back to it.
    pub fn open_in_memory() -> StorageResult<Self> {
        let writer = Connection::open_in_memory().map_err(|e| StorageError::Connection {
            message: format!("failed to open in-memory writer: {}", e),
        })?;
        pragmas::configure_connection(&writer, 5_000)?;

        let interrupts = vec![writer.get_interrupt_handle()];
        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
            interrupts,
        })
    }

    /// Execute a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self.writer.lock().map_err(|e| StorageError::Connection {
            message: format!("writer lock poisoned: {}", e),
        })?;
        f(&conn)
    }

    /// Execute a closure with a reader connection (round-robin).
    ///
    /// Falls back to the writer when the pool has no readers.
    pub fn with_reader<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }

        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index].lock().map_err(|e| StorageError::Connection {
            message: format!("reader lock poisoned: {}", e),
        })?;
        f(&conn)
    }

    /// Abort every in-flight statement on this pool's connections. The
    /// interrupted operation surfaces `StorageError::Cancelled`; rows
    /// already written stay written.
    pub fn interrupt(&self) {
        for handle in &self.interrupts {
            handle.interrupt();
        }
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_pool_reads_through_writer() {
        let pool = ConnectionPool::open_in_memory().unwrap();
        assert_eq!(pool.reader_count(), 0);

        pool.with_writer(|conn| {
            conn.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1);")?;
            Ok(())
        })
        .unwrap();

        let count: i64 = pool
            .with_reader(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn file_pool_shares_data_with_readers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.db");
        let pool = ConnectionPool::open_path(&path, 2, 5_000).unwrap();
        assert_eq!(pool.reader_count(), 2);

        pool.with_writer(|conn| {
            conn.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (7);")?;
            Ok(())
        })
        .unwrap();

        let value: i64 = pool
            .with_reader(|conn| Ok(conn.query_row("SELECT id FROM t", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn readers_reject_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.db");
        let pool = ConnectionPool::open_path(&path, 1, 5_000).unwrap();

        let result = pool.with_reader(|conn| {
            conn.execute("CREATE TABLE t (id INTEGER)", [])?;
            Ok(())
        });
        assert!(result.is_err());
    }
}
