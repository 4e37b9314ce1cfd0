//! Relationship reads. Like chunks, edges are keyed by string-encoded UUID
//! and the project/touching filters are full-table scans.

use crate::codec::decode;
use crate::{with_db_timeout, RedbStore, CHUNKS_TABLE, RELATIONSHIPS_TABLE};
use engine_core::error::{Error, Result};
use engine_core::types::Relationship;
use redb::ReadableTable;
use std::sync::Arc;
use uuid::Uuid;

impl RedbStore {
    pub(crate) async fn relationships_touching_impl(&self, chunk_id: Uuid) -> Result<Vec<Relationship>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(RELATIONSHIPS_TABLE)
                .map_err(|e| Error::IoFailed(format!("open relationships table failed: {e}")))?;
            let mut out = Vec::new();
            let iter = table
                .iter()
                .map_err(|e| Error::IoFailed(format!("iterate relationships failed: {e}")))?;
            for entry in iter {
                let (_, guard) =
                    entry.map_err(|e| Error::IoFailed(format!("relationship entry failed: {e}")))?;
                let rel: Relationship = decode(guard.value())?;
                if rel.from == chunk_id || rel.to == chunk_id {
                    out.push(rel);
                }
            }
            Ok(out)
        })
        .await
    }

    pub(crate) async fn all_relationships_impl(&self, project_id: Uuid) -> Result<Vec<Relationship>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let chunks = read_txn
                .open_table(CHUNKS_TABLE)
                .map_err(|e| Error::IoFailed(format!("open chunks table failed: {e}")))?;
            let table = read_txn
                .open_table(RELATIONSHIPS_TABLE)
                .map_err(|e| Error::IoFailed(format!("open relationships table failed: {e}")))?;
            let mut out = Vec::new();
            let iter = table
                .iter()
                .map_err(|e| Error::IoFailed(format!("iterate relationships failed: {e}")))?;
            for entry in iter {
                let (_, guard) =
                    entry.map_err(|e| Error::IoFailed(format!("relationship entry failed: {e}")))?;
                let rel: Relationship = decode(guard.value())?;
                let from_key = rel.from.to_string();
                let in_project = chunks
                    .get(from_key.as_str())
                    .map_err(|e| Error::IoFailed(format!("get chunk failed: {e}")))?
                    .map(|g| decode::<engine_core::types::Chunk>(g.value()))
                    .transpose()?
                    .is_some_and(|c| c.project_id == project_id);
                if in_project {
                    out.push(rel);
                }
            }
            Ok(out)
        })
        .await
    }
}
