//! # engine-storage-redb
//!
//! redb-backed durable [`Store`] implementation.
//!
//! This crate provides:
//! - Durable key-value storage for chunks, relationships, co-retrieval
//!   counters, archive records, and per-project tick bookkeeping
//! - Async wrappers around redb's synchronous transactions via
//!   `spawn_blocking` with a timeout
//! - Postcard serialization for compact on-disk records
//!
//! ## Example
//!
//! ```no_run
//! use engine_storage_redb::RedbStore;
//! use std::path::Path;
//!
//! # async fn example() -> engine_core::Result<()> {
//! let store = RedbStore::open(Path::new("./memory.redb")).await?;
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod archive;
mod chunks;
mod codec;
mod coretrieval;
mod project_state;
mod relationships;
mod store_impl;

#[cfg(test)]
mod tests;

use engine_core::error::{Error, Result};
use redb::{Database, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub(crate) const CHUNKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("chunks");
pub(crate) const RELATIONSHIPS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("relationships");
pub(crate) const CORETRIEVAL_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("coretrieval");
pub(crate) const ARCHIVE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("archive");
pub(crate) const PROJECT_STATE_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("project_state");

/// Timeout for a single redb transaction run on the blocking pool.
const DB_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a synchronous redb operation on the blocking pool, bounded by
/// [`DB_OPERATION_TIMEOUT`].
///
/// Every `Store` method funnels through this so a wedged disk surfaces as
/// a recoverable [`Error::IoFailed`] instead of hanging the caller forever.
pub(crate) async fn with_db_timeout<T, F>(operation: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(DB_OPERATION_TIMEOUT, tokio::task::spawn_blocking(operation)).await
    {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(Error::IoFailed(format!("task join error: {join_err}"))),
        Err(_) => Err(Error::IoFailed(format!(
            "database operation timed out after {DB_OPERATION_TIMEOUT:?}"
        ))),
    }
}

/// Durable [`Store`](engine_core::store::Store) backed by a single redb
/// database file.
///
/// All tables live in one file; chunks, relationships, and co-retrieval
/// counters are keyed by their string-encoded UUIDs so the tables stay
/// simple key/blob maps rather than needing redb's typed-key machinery.
pub struct RedbStore {
    pub(crate) db: Arc<Database>,
}

impl RedbStore {
    /// Open (creating if absent) a redb database at `path` and ensure every
    /// table exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IoFailed`] if the file cannot be created or opened,
    /// or if table initialization fails.
    pub async fn open(path: &Path) -> Result<Self> {
        info!("opening redb store at {}", path.display());
        let path_buf = path.to_path_buf();
        let db = with_db_timeout(move || {
            Database::create(&path_buf)
                .map_err(|e| Error::IoFailed(format!("failed to create redb database: {e}")))
        })
        .await?;

        let store = Self { db: Arc::new(db) };
        store.initialize_tables().await?;
        Ok(store)
    }

    async fn initialize_tables(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let write_txn = db
                .begin_write()
                .map_err(|e| Error::IoFailed(format!("begin write failed: {e}")))?;
            {
                write_txn
                    .open_table(CHUNKS_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open chunks table failed: {e}")))?;
                write_txn.open_table(RELATIONSHIPS_TABLE).map_err(|e| {
                    Error::IoFailed(format!("open relationships table failed: {e}"))
                })?;
                write_txn.open_table(CORETRIEVAL_TABLE).map_err(|e| {
                    Error::IoFailed(format!("open coretrieval table failed: {e}"))
                })?;
                write_txn
                    .open_table(ARCHIVE_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open archive table failed: {e}")))?;
                write_txn.open_table(PROJECT_STATE_TABLE).map_err(|e| {
                    Error::IoFailed(format!("open project_state table failed: {e}"))
                })?;
            }
            write_txn
                .commit()
                .map_err(|e| Error::IoFailed(format!("commit failed: {e}")))?;
            Ok(())
        })
        .await
    }
}

pub use engine_core::store::{ArchiveRecord, CoRetrievalCounter, Store, WriteOp};
