//! `Store` trait implementation. Reads delegate to the per-entity inherent
//! methods; `apply_batch` is the one place every write op is folded into a
//! single redb transaction, giving the "one transaction per project per
//! tick" durability guarantee for free — a partial batch never commits
//! because an error returned before `write_txn.commit()` drops the
//! transaction unapplied.

use crate::codec::encode;
use crate::coretrieval::pair_key;
use crate::project_state::ProjectState;
use crate::{
    with_db_timeout, RedbStore, ARCHIVE_TABLE, CHUNKS_TABLE, CORETRIEVAL_TABLE,
    PROJECT_STATE_TABLE, RELATIONSHIPS_TABLE,
};
use async_trait::async_trait;
use engine_core::error::{Error, Result};
use engine_core::store::{ArchiveRecord, CoRetrievalCounter, Store, WriteOp};
use engine_core::types::{Chunk, ChunkStatus, Relationship};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
impl Store for RedbStore {
    async fn current_tick(&self, project_id: Uuid) -> Result<u64> {
        Ok(self.project_state(project_id).await?.current_tick)
    }

    async fn advance_tick(&self, project_id: Uuid) -> Result<u64> {
        self.advance_project_tick(project_id).await
    }

    async fn last_decay_tick(&self, project_id: Uuid) -> Result<u64> {
        Ok(self.project_state(project_id).await?.last_decay_tick)
    }

    async fn last_consolidation_tick(&self, project_id: Uuid) -> Result<u64> {
        Ok(self.project_state(project_id).await?.last_consolidation_tick)
    }

    async fn get_chunk(&self, id: Uuid) -> Result<Option<Chunk>> {
        self.get_chunk_impl(id).await
    }

    async fn get_chunks(&self, ids: &[Uuid]) -> Result<Vec<Chunk>> {
        self.get_chunks_impl(ids.to_vec()).await
    }

    async fn scan_project(&self, project_id: Uuid) -> Result<Vec<Chunk>> {
        self.scan_project_impl(project_id).await
    }

    async fn scan_by_status(&self, project_id: Uuid, status: ChunkStatus) -> Result<Vec<Chunk>> {
        self.scan_by_status_impl(project_id, status).await
    }

    async fn scan_by_tags(&self, project_id: Uuid, tags: &HashSet<String>) -> Result<Vec<Chunk>> {
        self.scan_by_tags_impl(project_id, tags.clone()).await
    }

    async fn relationships_touching(&self, chunk_id: Uuid) -> Result<Vec<Relationship>> {
        self.relationships_touching_impl(chunk_id).await
    }

    async fn all_relationships(&self, project_id: Uuid) -> Result<Vec<Relationship>> {
        self.all_relationships_impl(project_id).await
    }

    async fn get_coretrieval(&self, a: Uuid, b: Uuid) -> Result<Option<CoRetrievalCounter>> {
        self.get_coretrieval_impl(a, b).await
    }

    async fn coretrieval_for_chunk(&self, chunk_id: Uuid) -> Result<Vec<CoRetrievalCounter>> {
        self.coretrieval_for_chunk_impl(chunk_id).await
    }

    async fn list_archive(&self, project_id: Uuid) -> Result<Vec<ArchiveRecord>> {
        self.list_archive_impl(project_id).await
    }

    async fn apply_batch(&self, _project_id: Uuid, ops: Vec<WriteOp>) -> Result<()> {
        let db = Arc::clone(&self.db);
        with_db_timeout(move || {
            let write_txn = db
                .begin_write()
                .map_err(|e| Error::IoFailed(format!("begin write failed: {e}")))?;
            {
                let mut chunks = write_txn
                    .open_table(CHUNKS_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open chunks table failed: {e}")))?;
                let mut relationships = write_txn
                    .open_table(RELATIONSHIPS_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open relationships table failed: {e}")))?;
                let mut coretrieval = write_txn
                    .open_table(CORETRIEVAL_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open coretrieval table failed: {e}")))?;
                let mut archive = write_txn
                    .open_table(ARCHIVE_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open archive table failed: {e}")))?;
                let mut project_state = write_txn
                    .open_table(PROJECT_STATE_TABLE)
                    .map_err(|e| Error::IoFailed(format!("open project_state table failed: {e}")))?;

                for op in ops {
                    match op {
                        WriteOp::PutChunk(chunk) => {
                            let key = chunk.id.to_string();
                            chunks
                                .insert(key.as_str(), encode(&*chunk)?.as_slice())
                                .map_err(|e| Error::IoFailed(format!("insert chunk failed: {e}")))?;
                        }
                        WriteOp::DeleteChunk(id) => {
                            let key = id.to_string();
                            chunks
                                .remove(key.as_str())
                                .map_err(|e| Error::IoFailed(format!("delete chunk failed: {e}")))?;
                        }
                        WriteOp::PutRelationship(rel) => {
                            if rel.from == rel.to {
                                return Err(Error::constraint(
                                    "relationship endpoints must differ",
                                ));
                            }
                            let key = rel.id.to_string();
                            relationships
                                .insert(key.as_str(), encode(&*rel)?.as_slice())
                                .map_err(|e| {
                                    Error::IoFailed(format!("insert relationship failed: {e}"))
                                })?;
                        }
                        WriteOp::DeleteRelationship(id) => {
                            let key = id.to_string();
                            relationships.remove(key.as_str()).map_err(|e| {
                                Error::IoFailed(format!("delete relationship failed: {e}"))
                            })?;
                        }
                        WriteOp::PutCoRetrieval(counter) => {
                            let key = pair_key(counter.a, counter.b);
                            coretrieval
                                .insert(key.as_str(), encode(&counter)?.as_slice())
                                .map_err(|e| {
                                    Error::IoFailed(format!("insert coretrieval failed: {e}"))
                                })?;
                        }
                        WriteOp::DeleteCoRetrieval(a, b) => {
                            let key = pair_key(a, b);
                            coretrieval.remove(key.as_str()).map_err(|e| {
                                Error::IoFailed(format!("delete coretrieval failed: {e}"))
                            })?;
                        }
                        WriteOp::PutArchiveRecord(record) => {
                            let key = record.chunk_id.to_string();
                            archive
                                .insert(key.as_str(), encode(&*record)?.as_slice())
                                .map_err(|e| {
                                    Error::IoFailed(format!("insert archive record failed: {e}"))
                                })?;
                        }
                        WriteOp::SetLastDecayTick(project_id, tick) => {
                            set_state_field(&mut project_state, project_id, |s| {
                                s.last_decay_tick = tick;
                            })?;
                        }
                        WriteOp::SetLastConsolidationTick(project_id, tick) => {
                            set_state_field(&mut project_state, project_id, |s| {
                                s.last_consolidation_tick = tick;
                            })?;
                        }
                    }
                }
            }
            write_txn
                .commit()
                .map_err(|e| Error::IoFailed(format!("commit failed: {e}")))?;
            Ok(())
        })
        .await
    }
}

fn set_state_field(
    table: &mut redb::Table<'_, &str, &[u8]>,
    project_id: Uuid,
    mutate: impl FnOnce(&mut ProjectState),
) -> Result<()> {
    use crate::codec::decode;
    use redb::ReadableTable;

    let key = project_id.to_string();
    let mut state = match table
        .get(key.as_str())
        .map_err(|e| Error::IoFailed(format!("get project state failed: {e}")))?
    {
        Some(guard) => decode::<ProjectState>(guard.value())?,
        None => ProjectState::default(),
    };
    mutate(&mut state);
    table
        .insert(key.as_str(), encode(&state)?.as_slice())
        .map_err(|e| Error::IoFailed(format!("insert project state failed: {e}")))?;
    Ok(())
}
