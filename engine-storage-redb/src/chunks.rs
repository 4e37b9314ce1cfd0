//! Chunk reads. Chunks are keyed by their string-encoded UUID and scanned
//! in full for the tag/status filters — acceptable at the scale a single
//! project's working set reaches; an index table would be the next lever
//! if that stops being true.

use crate::codec::decode;
use crate::{with_db_timeout, RedbStore, CHUNKS_TABLE};
use engine_core::error::{Error, Result};
use engine_core::types::{Chunk, ChunkStatus};
use redb::ReadableTable;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

impl RedbStore {
    pub(crate) async fn get_chunk_impl(&self, id: Uuid) -> Result<Option<Chunk>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(CHUNKS_TABLE)
                .map_err(|e| Error::IoFailed(format!("open chunks table failed: {e}")))?;
            let key = id.to_string();
            match table
                .get(key.as_str())
                .map_err(|e| Error::IoFailed(format!("get chunk failed: {e}")))?
            {
                Some(guard) => Ok(Some(decode(guard.value())?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub(crate) async fn get_chunks_impl(&self, ids: Vec<Uuid>) -> Result<Vec<Chunk>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(CHUNKS_TABLE)
                .map_err(|e| Error::IoFailed(format!("open chunks table failed: {e}")))?;
            let mut out = Vec::with_capacity(ids.len());
            for id in ids {
                let key = id.to_string();
                if let Some(guard) = table
                    .get(key.as_str())
                    .map_err(|e| Error::IoFailed(format!("get chunk failed: {e}")))?
                {
                    out.push(decode(guard.value())?);
                }
            }
            Ok(out)
        })
        .await
    }

    pub(crate) async fn scan_project_impl(&self, project_id: Uuid) -> Result<Vec<Chunk>> {
        self.scan_filtered(move |c| c.project_id == project_id).await
    }

    pub(crate) async fn scan_by_status_impl(
        &self,
        project_id: Uuid,
        status: ChunkStatus,
    ) -> Result<Vec<Chunk>> {
        self.scan_filtered(move |c| c.project_id == project_id && c.status == status)
            .await
    }

    pub(crate) async fn scan_by_tags_impl(
        &self,
        project_id: Uuid,
        tags: HashSet<String>,
    ) -> Result<Vec<Chunk>> {
        self.scan_filtered(move |c| c.project_id == project_id && !c.tags.is_disjoint(&tags))
            .await
    }

    async fn scan_filtered(&self, predicate: impl Fn(&Chunk) -> bool + Send + 'static) -> Result<Vec<Chunk>> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let read_txn = db
                .begin_read()
                .map_err(|e| Error::IoFailed(format!("begin read failed: {e}")))?;
            let table = read_txn
                .open_table(CHUNKS_TABLE)
                .map_err(|e| Error::IoFailed(format!("open chunks table failed: {e}")))?;
            let mut out = Vec::new();
            let iter = table
                .iter()
                .map_err(|e| Error::IoFailed(format!("iterate chunks failed: {e}")))?;
            for entry in iter {
                let (_, guard) = entry.map_err(|e| Error::IoFailed(format!("chunk entry failed: {e}")))?;
                let chunk: Chunk = decode(guard.value())?;
                if predicate(&chunk) {
                    out.push(chunk);
                }
            }
            Ok(out)
        })
        .await
    }
}
