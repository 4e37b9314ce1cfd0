//! Co-retrieval counter reads, keyed by the unordered pair's sorted UUIDs.

use crate::codec::decode;
use crate::{with_db_timeout, RedbStore, CORETRIEVAL_TABLE};
use engine_core::error::{Error, Result};
use engine_core::store::CoRetrievalCounter;
use redb::ReadableTable;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) fn pair_key(a: Uuid, b: Uuid) -> String {
    let (x, y) = CoRetrievalCounter::key(a, b);
    format!("{x}:{y}")
}

impl RedbStore {
    pub(crate) async fn get_coretrieval_impl(&self, a: Uuid, b: Uuid) -> Result<Option<CoRetrievalCounter>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(CORETRIEVAL_TABLE)
                .map_err(|e| Error::IoFailed(format!("open coretrieval table failed: {e}")))?;
            let key = pair_key(a, b);
            match table
                .get(key.as_str())
                .map_err(|e| Error::IoFailed(format!("get coretrieval failed: {e}")))?
            {
                Some(guard) => Ok(Some(decode(guard.value())?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub(crate) async fn coretrieval_for_chunk_impl(&self, chunk_id: Uuid) -> Result<Vec<CoRetrievalCounter>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(CORETRIEVAL_TABLE)
                .map_err(|e| Error::IoFailed(format!("open coretrieval table failed: {e}")))?;
            let mut out = Vec::new();
            let iter = table
                .iter()
                .map_err(|e| Error::IoFailed(format!("iterate coretrieval failed: {e}")))?;
            for entry in iter {
                let (_, guard) =
                    entry.map_err(|e| Error::IoFailed(format!("coretrieval entry failed: {e}")))?;
                let counter: CoRetrievalCounter = decode(guard.value())?;
                if counter.a == chunk_id || counter.b == chunk_id {
                    out.push(counter);
                }
            }
            Ok(out)
        })
        .await
    }
}
