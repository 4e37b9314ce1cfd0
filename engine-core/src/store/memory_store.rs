//! In-memory, non-persistent [`Store`] implementation.
//!
//! Used as the crate's zero-dependency default and by tests that do not
//! need to exercise durability. Mirrors the `episodes_fallback:
//! Arc<RwLock<HashMap<...>>>` pattern used as an in-memory fallback
//! alongside the durable backend.

use super::{ArchiveRecord, CoRetrievalCounter, Store, WriteOp};
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkStatus, Relationship};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct ProjectTickState {
    current_tick: u64,
    last_decay_tick: u64,
    last_consolidation_tick: u64,
}

#[derive(Default)]
struct Inner {
    chunks: HashMap<Uuid, Chunk>,
    relationships: HashMap<Uuid, Relationship>,
    coretrieval: HashMap<(Uuid, Uuid), CoRetrievalCounter>,
    archive: HashMap<Uuid, Vec<ArchiveRecord>>,
    ticks: HashMap<Uuid, ProjectTickState>,
}

/// Non-persistent [`Store`] backed by an in-process `RwLock<HashMap<..>>`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_op(inner: &mut Inner, op: WriteOp) -> Result<()> {
    match op {
        WriteOp::PutChunk(chunk) => {
            inner.chunks.insert(chunk.id, *chunk);
        }
        WriteOp::DeleteChunk(id) => {
            inner.chunks.remove(&id);
        }
        WriteOp::PutRelationship(rel) => {
            if rel.from == rel.to {
                return Err(Error::constraint("relationship endpoints must differ"));
            }
            inner.relationships.insert(rel.id, *rel);
        }
        WriteOp::DeleteRelationship(id) => {
            inner.relationships.remove(&id);
        }
        WriteOp::PutCoRetrieval(counter) => {
            inner
                .coretrieval
                .insert(CoRetrievalCounter::key(counter.a, counter.b), counter);
        }
        WriteOp::DeleteCoRetrieval(a, b) => {
            inner.coretrieval.remove(&CoRetrievalCounter::key(a, b));
        }
        WriteOp::PutArchiveRecord(record) => {
            inner
                .archive
                .entry(record.project_id)
                .or_default()
                .push(*record);
        }
        WriteOp::SetLastDecayTick(project_id, tick) => {
            inner.ticks.entry(project_id).or_default().last_decay_tick = tick;
        }
        WriteOp::SetLastConsolidationTick(project_id, tick) => {
            inner
                .ticks
                .entry(project_id)
                .or_default()
                .last_consolidation_tick = tick;
        }
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn current_tick(&self, project_id: Uuid) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner.ticks.get(&project_id).map_or(0, |t| t.current_tick))
    }

    async fn advance_tick(&self, project_id: Uuid) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let state = inner.ticks.entry(project_id).or_default();
        state.current_tick += 1;
        Ok(state.current_tick)
    }

    async fn last_decay_tick(&self, project_id: Uuid) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .ticks
            .get(&project_id)
            .map_or(0, |t| t.last_decay_tick))
    }

    async fn last_consolidation_tick(&self, project_id: Uuid) -> Result<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .ticks
            .get(&project_id)
            .map_or(0, |t| t.last_consolidation_tick))
    }

    async fn get_chunk(&self, id: Uuid) -> Result<Option<Chunk>> {
        let inner = self.inner.read().await;
        Ok(inner.chunks.get(&id).cloned())
    }

    async fn get_chunks(&self, ids: &[Uuid]) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.chunks.get(id).cloned()).collect())
    }

    async fn scan_project(&self, project_id: Uuid) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().await;
        Ok(inner
            .chunks
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn scan_by_status(&self, project_id: Uuid, status: ChunkStatus) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().await;
        Ok(inner
            .chunks
            .values()
            .filter(|c| c.project_id == project_id && c.status == status)
            .cloned()
            .collect())
    }

    async fn scan_by_tags(&self, project_id: Uuid, tags: &HashSet<String>) -> Result<Vec<Chunk>> {
        let inner = self.inner.read().await;
        Ok(inner
            .chunks
            .values()
            .filter(|c| c.project_id == project_id && !c.tags.is_disjoint(tags))
            .cloned()
            .collect())
    }

    async fn relationships_touching(&self, chunk_id: Uuid) -> Result<Vec<Relationship>> {
        let inner = self.inner.read().await;
        Ok(inner
            .relationships
            .values()
            .filter(|r| r.from == chunk_id || r.to == chunk_id)
            .cloned()
            .collect())
    }

    async fn all_relationships(&self, project_id: Uuid) -> Result<Vec<Relationship>> {
        let inner = self.inner.read().await;
        Ok(inner
            .relationships
            .values()
            .filter(|r| {
                inner
                    .chunks
                    .get(&r.from)
                    .is_some_and(|c| c.project_id == project_id)
            })
            .cloned()
            .collect())
    }

    async fn get_coretrieval(&self, a: Uuid, b: Uuid) -> Result<Option<CoRetrievalCounter>> {
        let inner = self.inner.read().await;
        Ok(inner.coretrieval.get(&CoRetrievalCounter::key(a, b)).cloned())
    }

    async fn coretrieval_for_chunk(&self, chunk_id: Uuid) -> Result<Vec<CoRetrievalCounter>> {
        let inner = self.inner.read().await;
        Ok(inner
            .coretrieval
            .values()
            .filter(|c| c.a == chunk_id || c.b == chunk_id)
            .cloned()
            .collect())
    }

    async fn list_archive(&self, project_id: Uuid) -> Result<Vec<ArchiveRecord>> {
        let inner = self.inner.read().await;
        let mut records = inner.archive.get(&project_id).cloned().unwrap_or_default();
        records.sort_by(|a, b| b.tick_archived.cmp(&a.tick_archived));
        Ok(records)
    }

    async fn apply_batch(&self, _project_id: Uuid, ops: Vec<WriteOp>) -> Result<()> {
        let mut inner = self.inner.write().await;
        // Validate the whole batch before mutating anything so a rejected
        // op never leaves a partial write observable.
        for op in &ops {
            if let WriteOp::PutRelationship(rel) = op {
                if rel.from == rel.to {
                    return Err(Error::constraint("relationship endpoints must differ"));
                }
            }
        }
        for op in ops {
            apply_op(&mut inner, op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkClass, ChunkKind, Confidence, DecayFunction, LearningContext, Source};

    fn sample_chunk(project_id: Uuid) -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            project_id,
            payload: "p".into(),
            embedding: vec![1.0, 0.0],
            class: ChunkClass {
                kind: ChunkKind::Insight,
                confidence: Confidence::Verified,
                source: Source::Research,
            },
            tags: HashSet::new(),
            tick_created: 0,
            tick_last_accessed: None,
            tick_last_useful: None,
            initial_strength: 1.0,
            current_strength: 1.0,
            decay_function: DecayFunction::Exponential,
            decay_rate: 0.05,
            persistence_score: 0.0,
            access_count: 0,
            successful_uses: 0,
            status: ChunkStatus::Active,
            pinned: false,
            superseded_by: None,
            valid_until_tick: None,
            tick_tombstoned: None,
            learning_context: LearningContext::default(),
        }
    }

    #[tokio::test]
    async fn put_and_get_chunk_round_trips() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let chunk = sample_chunk(project);
        let id = chunk.id;

        store
            .apply_batch(project, vec![WriteOp::PutChunk(Box::new(chunk))])
            .await
            .unwrap();

        let fetched = store.get_chunk(id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(store.scan_project(project).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn self_loop_relationship_is_rejected_without_partial_write() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let chunk = sample_chunk(project);
        let id = chunk.id;
        let bad_rel = Relationship::new(
            id,
            id,
            crate::types::RelationshipType::RelatedTo,
            crate::types::RelationshipOrigin::Explicit,
            1.0,
        );

        let result = store
            .apply_batch(
                project,
                vec![
                    WriteOp::PutChunk(Box::new(chunk)),
                    WriteOp::PutRelationship(Box::new(bad_rel)),
                ],
            )
            .await;

        assert!(result.is_err());
        assert!(store.get_chunk(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tick_bookkeeping_is_per_project() {
        let store = MemoryStore::new();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        store.advance_tick(p1).await.unwrap();
        store.advance_tick(p1).await.unwrap();
        store.advance_tick(p2).await.unwrap();
        assert_eq!(store.current_tick(p1).await.unwrap(), 2);
        assert_eq!(store.current_tick(p2).await.unwrap(), 1);
    }
}
