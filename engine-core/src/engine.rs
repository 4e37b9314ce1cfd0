//! The engine facade: wires the Store, Vector Index, Graph Engine, Decay
//! Engine, Retrieval Pipeline, and Lifecycle Maintenance together behind
//! the external API.
//!
//! Writes to one project serialize through a per-project lock; reads go
//! straight to the `Store`. The vector index is hot-loaded from the store
//! the first time a project is touched and kept in sync inside the same
//! critical section as every write.

use crate::config::EngineConfig;
use crate::decay;
use crate::error::{Error, Result};
use crate::events::{emit_best_effort, EngineEvent, EventSink};
use crate::graph::{self, Adjacency};
use crate::ingestion::{self, IngestOutcome};
use crate::lifecycle;
use crate::planner::{self, Route};
use crate::retrieval::{
    pipeline, QueryResult, RetrievalContext, RetrievalWarnings, ScoredChunk, ScoredChunkSummary,
};
use crate::store::{ArchiveRecord, Store, WriteOp};
use crate::types::{
    Chunk, ChunkClass, ChunkStatus, IngestOptions, Relationship, RelationshipOrigin,
    RelationshipType,
};
use crate::vector_index::{cosine_similarity, VectorIndex};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

/// Filter applied by [`Engine::scan`].
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Restrict to chunks in this status, if set.
    pub status: Option<ChunkStatus>,
    /// Restrict to chunks carrying at least one of these tags, if set.
    pub tags: Option<HashSet<String>>,
}

impl ScanFilter {
    fn matches(&self, chunk: &Chunk) -> bool {
        if let Some(status) = self.status {
            if chunk.status != status {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if tags.is_disjoint(&chunk.tags) {
                return false;
            }
        }
        true
    }
}

/// The engine facade implementing the external API.
pub struct Engine {
    store: Arc<dyn Store>,
    config: EngineConfig,
    event_sink: Option<Arc<dyn EventSink>>,
    vector_indexes: RwLock<HashMap<Uuid, Arc<VectorIndex>>>,
    write_locks: RwLock<HashMap<Uuid, Arc<Mutex<()>>>>,
    dims: RwLock<HashMap<Uuid, usize>>,
    /// Dedup of identical ingestions within the same tick: `(project, tick,
    /// content_hash) -> chunk_id`.
    dedupe: RwLock<HashMap<(Uuid, u64, u64), Uuid>>,
}

impl Engine {
    /// Construct a new engine over `store`, with `event_sink` receiving
    /// best-effort observability events (absent ⇒ events only log via
    /// `tracing`).
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: EngineConfig, event_sink: Option<Arc<dyn EventSink>>) -> Self {
        Self {
            store,
            config,
            event_sink,
            vector_indexes: RwLock::new(HashMap::new()),
            write_locks: RwLock::new(HashMap::new()),
            dims: RwLock::new(HashMap::new()),
            dedupe: RwLock::new(HashMap::new()),
        }
    }

    async fn lock_project(&self, project_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.write_locks.write().await;
            locks
                .entry(project_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    async fn vector_index_for(&self, project_id: Uuid) -> Result<Arc<VectorIndex>> {
        {
            let cache = self.vector_indexes.read().await;
            if let Some(index) = cache.get(&project_id) {
                return Ok(index.clone());
            }
        }
        let rebuilt = self.build_vector_index(project_id).await?;
        let mut cache = self.vector_indexes.write().await;
        Ok(cache.entry(project_id).or_insert(rebuilt).clone())
    }

    async fn build_vector_index(&self, project_id: Uuid) -> Result<Arc<VectorIndex>> {
        let chunks = self.store.scan_project(project_id).await?;
        let index = VectorIndex::new();
        for chunk in &chunks {
            if chunk.status.is_retrievable() {
                index.upsert(chunk.id, chunk.embedding.clone());
            }
        }
        Ok(Arc::new(index))
    }

    async fn refresh_vector_index(&self, project_id: Uuid) -> Result<()> {
        let rebuilt = self.build_vector_index(project_id).await?;
        self.vector_indexes.write().await.insert(project_id, rebuilt);
        Ok(())
    }

    /// Advance a project's logical tick by one.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] raised by the store.
    pub async fn advance_tick(&self, project_id: Uuid) -> Result<u64> {
        let _guard = self.lock_project(project_id).await;
        let tick = self.store.advance_tick(project_id).await?;
        {
            let mut dedupe = self.dedupe.write().await;
            dedupe.retain(|(p, t, _), _| *p != project_id || *t == tick);
        }
        emit_best_effort(self.event_sink.as_ref(), EngineEvent::TickAdvance { project_id, tick });
        Ok(tick)
    }

    /// Ingest a new chunk.
    ///
    /// Idempotent within one tick: a repeat of identical `payload` +
    /// `embedding` + `tags` returns the existing chunk's id with
    /// `duplicate = true` instead of inserting a second chunk.
    ///
    /// If `opts.supersedes` names an existing chunk, that chunk is demoted
    /// to at least `cool` and linked with a `replaces` edge, atomically with
    /// the new chunk's insertion.
    ///
    /// For every chunk named in `opts.opposite_of`, checks embedding
    /// similarity against `contradiction_similarity_threshold`; a hit
    /// materializes a `contradicts` edge, weakens the existing chunk, and
    /// emits `contradiction:detected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] for an empty or dimension-
    /// mismatched embedding, or [`Error::NotFound`] if `opts.supersedes` or
    /// any `opts.opposite_of` entry names a chunk that does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn ingest(
        &self,
        project_id: Uuid,
        payload: String,
        embedding: Vec<f32>,
        class: ChunkClass,
        tags: HashSet<String>,
        opts: IngestOptions,
        retrieval_ctx: &RetrievalContext,
    ) -> Result<IngestOutcome> {
        if embedding.is_empty() {
            return Err(Error::validation("embedding must not be empty"));
        }

        let _guard = self.lock_project(project_id).await;

        {
            let mut dims = self.dims.write().await;
            match dims.get(&project_id) {
                Some(&dim) if dim != embedding.len() => {
                    return Err(Error::validation(format!(
                        "embedding dimension mismatch: project expects {dim}, got {}",
                        embedding.len()
                    )));
                }
                Some(_) => {}
                None => {
                    dims.insert(project_id, embedding.len());
                }
            }
        }

        let tick = self.store.current_tick(project_id).await?;
        let hash = ingestion::content_hash(&payload, &embedding, &tags);
        {
            let dedupe = self.dedupe.read().await;
            if let Some(&existing) = dedupe.get(&(project_id, tick, hash)) {
                return Ok(IngestOutcome { chunk_id: existing, duplicate: true });
            }
        }

        let (kind_decay_fn, kind_decay_rate, initial_strength) =
            ingestion::defaults_for_kind(class.kind);
        let (decay_function, decay_rate) =
            opts.decay_override.unwrap_or((kind_decay_fn, kind_decay_rate));

        let new_id = Uuid::new_v4();
        let learning_context = crate::types::LearningContext {
            tick,
            task_id: retrieval_ctx.task_id,
            goal_id: retrieval_ctx.goal_id,
            phase: retrieval_ctx.phase.clone(),
            skill_area: retrieval_ctx.skill_area.clone(),
            query_context: retrieval_ctx.query.clone(),
            related_chunks: Vec::new(),
        };

        let chunk = Chunk {
            id: new_id,
            project_id,
            payload,
            embedding: embedding.clone(),
            class,
            tags,
            tick_created: tick,
            tick_last_accessed: None,
            tick_last_useful: None,
            initial_strength,
            current_strength: initial_strength,
            decay_function,
            decay_rate,
            persistence_score: 0.0,
            access_count: 0,
            successful_uses: 0,
            status: ChunkStatus::Active,
            pinned: opts.pinned,
            superseded_by: None,
            valid_until_tick: opts.valid_until_tick,
            tick_tombstoned: None,
            learning_context,
        };

        let mut ops = vec![WriteOp::PutChunk(Box::new(chunk))];
        let mut relationships_created = Vec::new();
        let mut contradictions_detected = Vec::new();

        if let Some(old_id) = opts.supersedes {
            let mut old = self
                .store
                .get_chunk(old_id)
                .await?
                .ok_or(Error::NotFound(old_id))?;
            old.superseded_by = Some(new_id);
            old.status = old.status.max(ChunkStatus::Cool);
            ops.push(WriteOp::PutChunk(Box::new(old)));

            let rel = Relationship::new(new_id, old_id, RelationshipType::Replaces, RelationshipOrigin::Auto, 1.0);
            relationships_created.push((rel.id, rel.from, rel.to));
            ops.push(WriteOp::PutRelationship(Box::new(rel)));
        }

        for other_id in opts.opposite_of {
            let mut other = self.store.get_chunk(other_id).await?.ok_or(Error::NotFound(other_id))?;
            let similarity = cosine_similarity(&embedding, &other.embedding).unwrap_or(0.0);
            if !graph::is_contradiction(similarity, true, self.config.graph.contradiction_similarity_threshold) {
                continue;
            }

            let rel = Relationship::new(
                new_id,
                other_id,
                RelationshipType::Contradicts,
                RelationshipOrigin::Auto,
                1.0,
            );
            relationships_created.push((rel.id, rel.from, rel.to));
            ops.push(WriteOp::PutRelationship(Box::new(rel)));

            decay::weaken(&mut other);
            ops.push(WriteOp::PutChunk(Box::new(other)));

            contradictions_detected.push((new_id, other_id, similarity));
        }

        self.store.apply_batch(project_id, ops).await?;

        let index = self.vector_index_for(project_id).await?;
        index.upsert(new_id, embedding);

        self.dedupe.write().await.insert((project_id, tick, hash), new_id);

        emit_best_effort(self.event_sink.as_ref(), EngineEvent::ChunkCreated { chunk_id: new_id, tick });
        for (relationship_id, from, to) in relationships_created {
            emit_best_effort(
                self.event_sink.as_ref(),
                EngineEvent::RelationshipCreated { relationship_id, from, to },
            );
        }
        for (chunk_a, chunk_b, confidence) in contradictions_detected {
            emit_best_effort(
                self.event_sink.as_ref(),
                EngineEvent::ContradictionDetected { chunk_a, chunk_b, confidence },
            );
        }

        Ok(IngestOutcome { chunk_id: new_id, duplicate: false })
    }

    /// Assert a typed relationship between two chunks, upserting on the
    /// `(from, to, type)` uniqueness constraint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if `from == to`, or
    /// [`Error::NotFound`] if either endpoint does not exist in `project_id`.
    #[allow(clippy::too_many_arguments)]
    pub async fn assert_relationship(
        &self,
        project_id: Uuid,
        from: Uuid,
        to: Uuid,
        rel_type: RelationshipType,
        weight: Option<f32>,
        origin: Option<RelationshipOrigin>,
        context_tags: Option<HashSet<String>>,
    ) -> Result<Uuid> {
        if from == to {
            return Err(Error::validation("relationship endpoints must differ"));
        }

        let _guard = self.lock_project(project_id).await;

        let from_chunk = self.store.get_chunk(from).await?.ok_or(Error::NotFound(from))?;
        let to_chunk = self.store.get_chunk(to).await?.ok_or(Error::NotFound(to))?;
        if from_chunk.project_id != project_id || to_chunk.project_id != project_id {
            return Err(Error::validation("both endpoints must belong to the given project"));
        }

        let existing = self
            .store
            .relationships_touching(from)
            .await?
            .into_iter()
            .find(|r| r.from == from && r.to == to && r.rel_type == rel_type);

        let (rel_id, is_new, rel_from, rel_to) = match existing {
            Some(mut rel) => {
                rel.weight = weight.unwrap_or(rel.weight).clamp(0.0, 1.0);
                if let Some(tags) = context_tags {
                    rel.context_tags = tags;
                }
                let id = rel.id;
                self.store
                    .apply_batch(project_id, vec![WriteOp::PutRelationship(Box::new(rel))])
                    .await?;
                (id, false, from, to)
            }
            None => {
                let mut rel = Relationship::new(from, to, rel_type, origin.unwrap_or(RelationshipOrigin::Explicit), weight.unwrap_or(0.8));
                if let Some(tags) = context_tags {
                    rel.context_tags = tags;
                }
                let id = rel.id;
                self.store
                    .apply_batch(project_id, vec![WriteOp::PutRelationship(Box::new(rel))])
                    .await?;
                (id, true, from, to)
            }
        };

        if is_new {
            emit_best_effort(
                self.event_sink.as_ref(),
                EngineEvent::RelationshipCreated { relationship_id: rel_id, from: rel_from, to: rel_to },
            );
        }

        Ok(rel_id)
    }

    /// Apply a successful retrieval-use event to a chunk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the chunk does not exist or is
    /// archived/tombstoned.
    pub async fn reinforce(&self, chunk_id: Uuid) -> Result<()> {
        let mut chunk = self.store.get_chunk(chunk_id).await?.ok_or(Error::NotFound(chunk_id))?;
        if !chunk.status.is_retrievable() {
            return Err(Error::NotFound(chunk_id));
        }
        let _guard = self.lock_project(chunk.project_id).await;
        let tick = self.store.current_tick(chunk.project_id).await?;
        let old_status = chunk.status;
        decay::reinforce(&mut chunk, tick, &self.config.tiers);
        let new_status = chunk.status;
        self.store
            .apply_batch(chunk.project_id, vec![WriteOp::PutChunk(Box::new(chunk))])
            .await?;
        if new_status != old_status {
            emit_best_effort(
                self.event_sink.as_ref(),
                EngineEvent::ChunkStatusChanged { chunk_id, old: old_status, new: new_status },
            );
        }
        Ok(())
    }

    /// Apply a confirmed-contradiction weakening event to a chunk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the chunk does not exist.
    pub async fn weaken(&self, chunk_id: Uuid) -> Result<()> {
        let mut chunk = self.store.get_chunk(chunk_id).await?.ok_or(Error::NotFound(chunk_id))?;
        let _guard = self.lock_project(chunk.project_id).await;
        decay::weaken(&mut chunk);
        self.store
            .apply_batch(chunk.project_id, vec![WriteOp::PutChunk(Box::new(chunk))])
            .await?;
        Ok(())
    }

    /// Pin a chunk: immune to demotion below `warm`, and raised to the
    /// pinned floor / `warm` if it is currently weaker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the chunk does not exist.
    pub async fn pin(&self, chunk_id: Uuid) -> Result<()> {
        let mut chunk = self.store.get_chunk(chunk_id).await?.ok_or(Error::NotFound(chunk_id))?;
        let _guard = self.lock_project(chunk.project_id).await;
        chunk.pinned = true;
        if chunk.status > ChunkStatus::Warm {
            chunk.status = ChunkStatus::Warm;
        }
        chunk.current_strength = chunk.current_strength.max(self.config.tiers.pinned_floor);
        self.store
            .apply_batch(chunk.project_id, vec![WriteOp::PutChunk(Box::new(chunk))])
            .await?;
        Ok(())
    }

    /// Unpin a chunk, leaving its current strength and status untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the chunk does not exist.
    pub async fn unpin(&self, chunk_id: Uuid) -> Result<()> {
        let mut chunk = self.store.get_chunk(chunk_id).await?.ok_or(Error::NotFound(chunk_id))?;
        let _guard = self.lock_project(chunk.project_id).await;
        chunk.pinned = false;
        self.store
            .apply_batch(chunk.project_id, vec![WriteOp::PutChunk(Box::new(chunk))])
            .await?;
        Ok(())
    }

    /// Supersede `old_id` with `new_id` outside of ingestion: demotes
    /// `old_id` to at least `cool` and links a `replaces` edge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either chunk does not exist, or
    /// [`Error::ValidationFailed`] if they belong to different projects.
    pub async fn supersede(&self, old_id: Uuid, new_id: Uuid) -> Result<()> {
        let mut old = self.store.get_chunk(old_id).await?.ok_or(Error::NotFound(old_id))?;
        let new_chunk = self.store.get_chunk(new_id).await?.ok_or(Error::NotFound(new_id))?;
        if old.project_id != new_chunk.project_id {
            return Err(Error::validation("supersession must stay within one project"));
        }
        let project_id = old.project_id;
        let _guard = self.lock_project(project_id).await;

        old.superseded_by = Some(new_id);
        old.status = old.status.max(ChunkStatus::Cool);

        let rel = Relationship::new(new_id, old_id, RelationshipType::Replaces, RelationshipOrigin::Auto, 1.0);
        let relationship_id = rel.id;

        self.store
            .apply_batch(
                project_id,
                vec![WriteOp::PutChunk(Box::new(old)), WriteOp::PutRelationship(Box::new(rel))],
            )
            .await?;

        emit_best_effort(
            self.event_sink.as_ref(),
            EngineEvent::RelationshipCreated { relationship_id, from: new_id, to: old_id },
        );
        Ok(())
    }

    /// Run a decay pass for `project_id` if `decay_interval_ticks` have
    /// elapsed since the last pass. A no-op otherwise.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] raised by the store. On error the tick is
    /// not advanced for decay purposes; the next call retries.
    pub async fn decay_tick(&self, project_id: Uuid) -> Result<()> {
        let _guard = self.lock_project(project_id).await;
        let current_tick = self.store.current_tick(project_id).await?;
        let last_decay = self.store.last_decay_tick(project_id).await?;
        if current_tick.saturating_sub(last_decay) < self.config.lifecycle.decay_interval_ticks {
            return Ok(());
        }

        let chunks = self.store.scan_project(project_id).await?;
        let mut ops = Vec::new();
        let mut decayed = Vec::new();
        for chunk in chunks {
            if matches!(chunk.status, ChunkStatus::Archived | ChunkStatus::Tombstone) {
                continue;
            }
            let (new_strength, new_status) = decay::apply_decay(&chunk, current_tick, &self.config.tiers);
            if (new_strength - chunk.current_strength).abs() > f32::EPSILON || new_status != chunk.status {
                let old_strength = chunk.current_strength;
                let old_status = chunk.status;
                let mut updated = chunk;
                updated.current_strength = new_strength;
                updated.status = new_status;
                decayed.push((updated.id, old_strength, new_strength, old_status, new_status));
                ops.push(WriteOp::PutChunk(Box::new(updated)));
            }
        }
        ops.push(WriteOp::SetLastDecayTick(project_id, current_tick));
        self.store.apply_batch(project_id, ops).await?;

        for (chunk_id, old_strength, new_strength, old_status, new_status) in decayed {
            emit_best_effort(
                self.event_sink.as_ref(),
                EngineEvent::ChunkDecayed { chunk_id, old: old_strength, new: new_strength },
            );
            if old_status != new_status {
                emit_best_effort(
                    self.event_sink.as_ref(),
                    EngineEvent::ChunkStatusChanged { chunk_id, old: old_status, new: new_status },
                );
            }
        }
        Ok(())
    }

    /// Run a lifecycle maintenance pass (consolidation, archival, tombstone
    /// compaction) for `project_id` if `maintenance_interval_ticks` have
    /// elapsed since the last pass. A no-op otherwise.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] raised by the store.
    pub async fn maintenance_tick(&self, project_id: Uuid) -> Result<()> {
        let _guard = self.lock_project(project_id).await;
        let current_tick = self.store.current_tick(project_id).await?;
        let last_maintenance = self.store.last_consolidation_tick(project_id).await?;
        if current_tick.saturating_sub(last_maintenance) < self.config.lifecycle.maintenance_interval_ticks {
            return Ok(());
        }

        let chunks = self.store.scan_project(project_id).await?;
        let mut ops = Vec::new();
        let mut superseded_ids: HashSet<Uuid> = HashSet::new();

        let candidates: Vec<&Chunk> = chunks
            .iter()
            .filter(|c| c.status.is_retrievable() && c.superseded_by.is_none())
            .collect();

        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let a = candidates[i];
                let b = candidates[j];
                if superseded_ids.contains(&a.id) || superseded_ids.contains(&b.id) {
                    continue;
                }
                let Some(sim) = cosine_similarity(&a.embedding, &b.embedding) else {
                    continue;
                };
                if !lifecycle::is_consolidation_candidate(a, b, sim, &self.config.lifecycle) {
                    continue;
                }
                let (keeper_id, loser_id) = lifecycle::pick_keeper(a, b);
                let loser = if loser_id == a.id { a } else { b };
                let keeper = if keeper_id == a.id { a } else { b };

                let mut loser = loser.clone();
                loser.superseded_by = Some(keeper.id);
                loser.status = loser.status.max(ChunkStatus::Cool);
                ops.push(WriteOp::PutChunk(Box::new(loser)));

                let rel = Relationship::new(keeper.id, loser_id, RelationshipType::Replaces, RelationshipOrigin::Auto, 1.0);
                ops.push(WriteOp::PutRelationship(Box::new(rel)));
                superseded_ids.insert(loser_id);
            }
        }

        for chunk in &chunks {
            if superseded_ids.contains(&chunk.id) {
                continue;
            }
            if !lifecycle::is_archivable(chunk, current_tick, &self.config.lifecycle) {
                continue;
            }

            let record = ArchiveRecord {
                chunk_id: chunk.id,
                project_id,
                summary: lifecycle::summarize(&chunk.payload),
                content_hash: ingestion::content_hash(&chunk.payload, &chunk.embedding, &chunk.tags)
                    .to_string(),
                kind: chunk.class.kind,
                tags: chunk.tags.clone(),
                learning_context: chunk.learning_context.clone(),
                tick_created: chunk.tick_created,
                tick_archived: current_tick,
                final_strength: chunk.current_strength,
                archived_at: chrono::Utc::now(),
            };
            ops.push(WriteOp::PutArchiveRecord(Box::new(record)));

            let mut tombstoned = chunk.clone();
            tombstoned.status = ChunkStatus::Tombstone;
            tombstoned.tick_tombstoned = Some(current_tick);
            ops.push(WriteOp::PutChunk(Box::new(tombstoned)));

            for rel in self.store.relationships_touching(chunk.id).await? {
                ops.push(WriteOp::DeleteRelationship(rel.id));
            }
            for counter in self.store.coretrieval_for_chunk(chunk.id).await? {
                ops.push(WriteOp::DeleteCoRetrieval(counter.a, counter.b));
            }
        }

        for chunk in &chunks {
            if chunk.status != ChunkStatus::Tombstone {
                continue;
            }
            if let Some(tombstoned_at) = chunk.tick_tombstoned {
                if lifecycle::is_compactable(tombstoned_at, current_tick, &self.config.lifecycle) {
                    ops.push(WriteOp::DeleteChunk(chunk.id));
                }
            }
        }

        ops.push(WriteOp::SetLastConsolidationTick(project_id, current_tick));
        self.store.apply_batch(project_id, ops).await?;
        self.refresh_vector_index(project_id).await?;
        Ok(())
    }

    /// Run a retrieval query, routing per `route` if given or else
    /// classifying `query_text` via [`planner::classify`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if the chosen route requires a
    /// query vector and none is supplied, or propagates any [`Error`]
    /// raised by the store.
    #[allow(clippy::too_many_arguments)]
    pub async fn query(
        &self,
        project_id: Uuid,
        query_text: &str,
        query_vec: Option<Vec<f32>>,
        retrieval_ctx: &RetrievalContext,
        k: usize,
        min_similarity: f32,
        route: Option<Route>,
    ) -> Result<QueryResult> {
        let route = route.unwrap_or_else(|| planner::classify(query_text));
        match route {
            Route::Operational => Ok(QueryResult {
                chunks: Vec::new(),
                warnings: RetrievalWarnings::default(),
                deferred: true,
            }),
            Route::Lookup => self.query_lookup(project_id, query_text, retrieval_ctx, k).await,
            Route::Exploration => {
                self.query_exploration(project_id, &query_vec, k, min_similarity, retrieval_ctx)
                    .await
            }
            Route::Connection => {
                self.query_connection(project_id, &query_vec, k, min_similarity, retrieval_ctx)
                    .await
            }
            Route::Hybrid => {
                self.query_hybrid(project_id, &query_vec, k, min_similarity, retrieval_ctx)
                    .await
            }
        }
    }

    async fn query_hybrid(
        &self,
        project_id: Uuid,
        query_vec: &Option<Vec<f32>>,
        k: usize,
        min_similarity: f32,
        retrieval_ctx: &RetrievalContext,
    ) -> Result<QueryResult> {
        let Some(query_vec) = query_vec else {
            return Err(Error::validation("a query vector is required for the hybrid route"));
        };

        let index = self.vector_index_for(project_id).await?;
        let semantic_hits = index.search(query_vec, self.config.retrieval.semantic_candidate_count, min_similarity);
        let semantic_by_id: HashMap<Uuid, f32> = semantic_hits.iter().copied().collect();
        let seed_ids: HashSet<Uuid> = semantic_by_id.keys().copied().collect();

        let all_chunks = self.store.scan_project(project_id).await?;
        let chunk_by_id: HashMap<Uuid, Chunk> = all_chunks.into_iter().map(|c| (c.id, c)).collect();

        let mut warnings = RetrievalWarnings::default();
        let graph_scores = match self.store.all_relationships(project_id).await {
            Ok(rels) => {
                let adjacency = Adjacency::build(&rels);
                graph::traverse(&adjacency, &seed_ids, self.config.graph.default_traversal_depth, 0.0, |id| {
                    chunk_by_id.get(&id).map(|c| c.status)
                })
            }
            Err(_) => {
                warnings.graph_expansion_failed = true;
                HashMap::new()
            }
        };

        let mut candidate_ids: HashSet<Uuid> = seed_ids;
        candidate_ids.extend(graph_scores.keys().copied());

        let current_tick = self.store.current_tick(project_id).await?;
        let mut scored: Vec<ScoredChunk> = Vec::new();
        for id in candidate_ids {
            let Some(chunk) = chunk_by_id.get(&id).cloned() else { continue };
            if !Self::candidate_is_eligible(&chunk, current_tick, retrieval_ctx, self.config.lifecycle.archive_weight_threshold) {
                continue;
            }

            let semantic = semantic_by_id.get(&id).copied().unwrap_or(0.0);
            let graph_score = graph_scores.get(&id).copied().unwrap_or(0.0);
            let (boost, _kind) = pipeline::context_boost(
                &chunk.learning_context,
                retrieval_ctx,
                chunk.tick_last_accessed,
                &self.config.retrieval,
            );
            let confidence = pipeline::confidence_weight(chunk.class.confidence, &self.config.retrieval);
            let recency = pipeline::recency_boost(
                current_tick,
                chunk.tick_last_accessed.unwrap_or(chunk.tick_created),
                self.config.retrieval.recency_halflife_ticks,
            );
            let fused = pipeline::fuse(semantic, graph_score, 0.0, &self.config.retrieval);
            let score = fused * confidence * chunk.current_strength * recency * boost;
            scored.push(ScoredChunk { chunk, score, semantic, graph_score });
        }

        Self::order_and_truncate(&mut scored, k);
        self.record_retrieval_bookkeeping(project_id, &scored, current_tick).await?;
        self.emit_search_executed(project_id, scored.len());
        let contradicted = self.contradicted_ids(project_id).await?;

        Ok(QueryResult {
            chunks: Self::summarize(&scored, &contradicted),
            warnings,
            deferred: false,
        })
    }

    async fn query_exploration(
        &self,
        project_id: Uuid,
        query_vec: &Option<Vec<f32>>,
        k: usize,
        min_similarity: f32,
        retrieval_ctx: &RetrievalContext,
    ) -> Result<QueryResult> {
        let Some(query_vec) = query_vec else {
            return Err(Error::validation("a query vector is required for the exploration route"));
        };

        let index = self.vector_index_for(project_id).await?;
        let hits = index.search(query_vec, k.max(self.config.retrieval.semantic_candidate_count), min_similarity);
        let ids: Vec<Uuid> = hits.iter().map(|(id, _)| *id).collect();
        let mut by_id: HashMap<Uuid, Chunk> = self
            .store
            .get_chunks(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let current_tick = self.store.current_tick(project_id).await?;

        let mut scored = Vec::new();
        for (id, similarity) in hits {
            let Some(chunk) = by_id.remove(&id) else { continue };
            if !Self::candidate_is_eligible(&chunk, current_tick, retrieval_ctx, self.config.lifecycle.archive_weight_threshold) {
                continue;
            }
            let score = similarity * chunk.current_strength;
            scored.push(ScoredChunk { chunk, score, semantic: similarity, graph_score: 0.0 });
        }
        Self::order_and_truncate(&mut scored, k);
        self.record_retrieval_bookkeeping(project_id, &scored, current_tick).await?;
        self.emit_search_executed(project_id, scored.len());
        let contradicted = self.contradicted_ids(project_id).await?;

        Ok(QueryResult {
            chunks: Self::summarize(&scored, &contradicted),
            warnings: RetrievalWarnings::default(),
            deferred: false,
        })
    }

    async fn query_connection(
        &self,
        project_id: Uuid,
        query_vec: &Option<Vec<f32>>,
        k: usize,
        min_similarity: f32,
        retrieval_ctx: &RetrievalContext,
    ) -> Result<QueryResult> {
        let Some(query_vec) = query_vec else {
            return Err(Error::validation("a query vector is required for the connection route"));
        };

        let index = self.vector_index_for(project_id).await?;
        let seed_hits = index.search(query_vec, 3, min_similarity);
        let seeds: HashSet<Uuid> = seed_hits.iter().map(|(id, _)| *id).collect();

        let all_chunks = self.store.scan_project(project_id).await?;
        let chunk_by_id: HashMap<Uuid, Chunk> = all_chunks.into_iter().map(|c| (c.id, c)).collect();

        let mut warnings = RetrievalWarnings::default();
        let rels = match self.store.all_relationships(project_id).await {
            Ok(r) => r,
            Err(_) => {
                warnings.graph_expansion_failed = true;
                Vec::new()
            }
        };
        let adjacency = Adjacency::build(&rels);
        let graph_scores = graph::traverse(&adjacency, &seeds, self.config.graph.default_traversal_depth, 0.0, |id| {
            chunk_by_id.get(&id).map(|c| c.status)
        });

        let current_tick = self.store.current_tick(project_id).await?;
        let mut scored: Vec<ScoredChunk> = graph_scores
            .into_iter()
            .filter_map(|(id, graph_score)| {
                let chunk = chunk_by_id.get(&id)?.clone();
                if !Self::candidate_is_eligible(&chunk, current_tick, retrieval_ctx, self.config.lifecycle.archive_weight_threshold) {
                    return None;
                }
                let score = graph_score * chunk.current_strength;
                Some(ScoredChunk { chunk, score, semantic: 0.0, graph_score })
            })
            .collect();
        Self::order_and_truncate(&mut scored, k);
        self.record_retrieval_bookkeeping(project_id, &scored, current_tick).await?;
        self.emit_search_executed(project_id, scored.len());
        let contradicted = self.contradicted_ids(project_id).await?;

        Ok(QueryResult {
            chunks: Self::summarize(&scored, &contradicted),
            warnings,
            deferred: false,
        })
    }

    async fn query_lookup(
        &self,
        project_id: Uuid,
        query_text: &str,
        retrieval_ctx: &RetrievalContext,
        k: usize,
    ) -> Result<QueryResult> {
        let all_chunks = self.store.scan_project(project_id).await?;
        let current_tick = self.store.current_tick(project_id).await?;
        let lowered = query_text.to_lowercase();

        let mut scored: Vec<ScoredChunk> = all_chunks
            .into_iter()
            .filter(|c| Self::candidate_is_eligible(c, current_tick, retrieval_ctx, self.config.lifecycle.archive_weight_threshold))
            .filter(|c| c.tags.iter().any(|tag| lowered.contains(&tag.to_lowercase())))
            .map(|chunk| {
                let reference = chunk.tick_last_accessed.unwrap_or(chunk.tick_created);
                ScoredChunk { score: reference as f32, semantic: 0.0, graph_score: 0.0, chunk }
            })
            .collect();
        Self::order_and_truncate(&mut scored, k);
        self.record_retrieval_bookkeeping(project_id, &scored, current_tick).await?;
        self.emit_search_executed(project_id, scored.len());
        let contradicted = self.contradicted_ids(project_id).await?;

        Ok(QueryResult {
            chunks: Self::summarize(&scored, &contradicted),
            warnings: RetrievalWarnings::default(),
            deferred: false,
        })
    }

    fn candidate_is_eligible(
        chunk: &Chunk,
        current_tick: u64,
        retrieval_ctx: &RetrievalContext,
        archive_weight_threshold: f32,
    ) -> bool {
        if !chunk.status.is_retrievable() {
            return false;
        }
        if chunk.is_expired(current_tick) && !retrieval_ctx.historical {
            return false;
        }
        if !chunk.pinned && chunk.current_strength < archive_weight_threshold {
            return false;
        }
        true
    }

    /// Stable sort by score descending, ties broken by more recent
    /// `tick_last_useful` then by identity, per §4.H's ordering guarantee.
    fn order_and_truncate(scored: &mut Vec<ScoredChunk>, k: usize) {
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.chunk.tick_last_useful.cmp(&a.chunk.tick_last_useful))
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(k);
    }

    /// Chunk ids that are an endpoint of at least one `contradicts` edge,
    /// surfaced on query results so callers can flag disputed chunks.
    async fn contradicted_ids(&self, project_id: Uuid) -> Result<HashSet<Uuid>> {
        let rels = self.store.all_relationships(project_id).await?;
        Ok(rels
            .into_iter()
            .filter(|r| r.rel_type == RelationshipType::Contradicts)
            .flat_map(|r| [r.from, r.to])
            .collect())
    }

    fn summarize(scored: &[ScoredChunk], contradicted: &HashSet<Uuid>) -> Vec<ScoredChunkSummary> {
        scored
            .iter()
            .map(|sc| ScoredChunkSummary {
                contradicted: contradicted.contains(&sc.chunk.id),
                ..ScoredChunkSummary::from(sc)
            })
            .collect()
    }

    fn emit_search_executed(&self, project_id: Uuid, result_count: usize) {
        emit_best_effort(
            self.event_sink.as_ref(),
            EngineEvent::SearchExecuted { project_id, result_count, time_ms: 0 },
        );
    }

    /// Stamp access bookkeeping on every returned chunk and feed the
    /// co-retrieval accumulator for every pair above the similarity
    /// threshold, all in one transaction.
    async fn record_retrieval_bookkeeping(
        &self,
        project_id: Uuid,
        scored: &[ScoredChunk],
        current_tick: u64,
    ) -> Result<()> {
        if scored.is_empty() {
            return Ok(());
        }

        let mut ops = Vec::with_capacity(scored.len());
        for sc in scored {
            let mut updated = sc.chunk.clone();
            updated.access_count += 1;
            updated.tick_last_accessed = Some(current_tick);
            ops.push(WriteOp::PutChunk(Box::new(updated)));
        }

        for i in 0..scored.len() {
            for j in (i + 1)..scored.len() {
                let a = &scored[i].chunk;
                let b = &scored[j].chunk;
                let Some(similarity) = cosine_similarity(&a.embedding, &b.embedding) else {
                    continue;
                };
                if similarity < self.config.graph.coretrieval_similarity_threshold {
                    continue;
                }

                let existing = self.store.get_coretrieval(a.id, b.id).await?;
                let outcome = graph::record_coretrieval_hit(
                    existing,
                    a.id,
                    b.id,
                    current_tick,
                    self.config.graph.promotion_threshold,
                );
                let already_promoted = outcome.counter.hits > self.config.graph.promotion_threshold;
                ops.push(WriteOp::PutCoRetrieval(outcome.counter));

                if outcome.newly_promoted {
                    let rel = Relationship::new(
                        a.id,
                        b.id,
                        RelationshipType::RelatedTo,
                        RelationshipOrigin::Implicit,
                        self.config.graph.implicit_edge_initial_weight,
                    );
                    ops.push(WriteOp::PutRelationship(Box::new(rel)));
                } else if already_promoted {
                    if let Some(mut rel) = self.find_related_to_edge(a.id, b.id).await? {
                        rel.strengthen(crate::constants::reinforcement::STRENGTHEN_AMOUNT);
                        ops.push(WriteOp::PutRelationship(Box::new(rel)));
                    }
                }
            }
        }

        self.store.apply_batch(project_id, ops).await?;

        for sc in scored {
            emit_best_effort(
                self.event_sink.as_ref(),
                EngineEvent::ChunkAccessed { chunk_id: sc.chunk.id, tick: current_tick },
            );
        }
        Ok(())
    }

    async fn find_related_to_edge(&self, a: Uuid, b: Uuid) -> Result<Option<Relationship>> {
        let key = crate::store::CoRetrievalCounter::key(a, b);
        Ok(self
            .store
            .relationships_touching(a)
            .await?
            .into_iter()
            .find(|r| r.rel_type == RelationshipType::RelatedTo && r.unordered_key() == key))
    }

    /// List a project's chunks matching `filter`.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] raised by the store.
    pub async fn scan(&self, project_id: Uuid, filter: &ScanFilter) -> Result<Vec<Chunk>> {
        let chunks = self.store.scan_project(project_id).await?;
        Ok(chunks.into_iter().filter(|c| filter.matches(c)).collect())
    }

    /// List a project's archive records, most recent first.
    ///
    /// # Errors
    ///
    /// Propagates any [`Error`] raised by the store.
    pub async fn export_archive(&self, project_id: Uuid) -> Result<Vec<ArchiveRecord>> {
        self.store.list_archive(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{ChunkKind, Confidence, Source};

    fn class(kind: ChunkKind) -> ChunkClass {
        ChunkClass { kind, confidence: Confidence::Verified, source: Source::Research }
    }

    fn engine() -> Engine {
        Engine::new(Arc::new(MemoryStore::new()), EngineConfig::default(), None)
    }

    #[tokio::test]
    async fn repeat_ingestion_within_a_tick_is_idempotent() {
        let engine = engine();
        let project = Uuid::new_v4();
        engine.advance_tick(project).await.unwrap();
        let ctx = RetrievalContext::new(1);

        let first = engine
            .ingest(project, "same text".into(), vec![1.0, 0.0], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx)
            .await
            .unwrap();
        let second = engine
            .ingest(project, "same text".into(), vec![1.0, 0.0], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx)
            .await
            .unwrap();

        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(first.chunk_id, second.chunk_id);
    }

    #[tokio::test]
    async fn empty_embedding_is_rejected() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);
        let result = engine
            .ingest(project, "x".into(), vec![], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx)
            .await;
        assert!(matches!(result, Err(Error::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn scenario_s1_supersession_demotes_and_links() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);

        let c1 = engine
            .ingest(
                project,
                "Use Library A".into(),
                vec![1.0, 0.0],
                class(ChunkKind::Decision),
                Default::default(),
                IngestOptions::default(),
                &ctx,
            )
            .await
            .unwrap()
            .chunk_id;

        let opts = IngestOptions { supersedes: Some(c1), ..Default::default() };
        let c2 = engine
            .ingest(project, "Switch to Library B".into(), vec![0.9, 0.1], class(ChunkKind::Decision), Default::default(), opts, &ctx)
            .await
            .unwrap()
            .chunk_id;

        let old = engine.store.get_chunk(c1).await.unwrap().unwrap();
        assert_eq!(old.superseded_by, Some(c2));
        assert_eq!(old.status, ChunkStatus::Cool);

        let rels = engine.store.relationships_touching(c1).await.unwrap();
        assert!(rels.iter().any(|r| r.from == c2 && r.to == c1 && r.rel_type == RelationshipType::Replaces));
    }

    #[tokio::test]
    async fn pin_raises_weak_chunk_to_the_floor_and_caps_status_at_warm() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);
        let id = engine
            .ingest(project, "weak".into(), vec![1.0], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx)
            .await
            .unwrap()
            .chunk_id;

        {
            let mut chunk = engine.store.get_chunk(id).await.unwrap().unwrap();
            chunk.current_strength = 0.01;
            chunk.status = ChunkStatus::Cold;
            engine
                .store
                .apply_batch(project, vec![WriteOp::PutChunk(Box::new(chunk))])
                .await
                .unwrap();
        }

        engine.pin(id).await.unwrap();
        let pinned = engine.store.get_chunk(id).await.unwrap().unwrap();
        assert!(pinned.pinned);
        assert!(pinned.current_strength >= engine.config.tiers.pinned_floor);
        assert_eq!(pinned.status, ChunkStatus::Warm);
    }

    #[tokio::test]
    async fn decay_tick_is_interval_gated() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);
        let id = engine
            .ingest(project, "x".into(), vec![1.0], class(ChunkKind::Research), Default::default(), IngestOptions::default(), &ctx)
            .await
            .unwrap()
            .chunk_id;

        engine.decay_tick(project).await.unwrap();
        let untouched = engine.store.get_chunk(id).await.unwrap().unwrap();
        assert_eq!(untouched.current_strength, 1.0);

        for _ in 0..25 {
            engine.advance_tick(project).await.unwrap();
        }
        engine.decay_tick(project).await.unwrap();
        let decayed = engine.store.get_chunk(id).await.unwrap().unwrap();
        assert!(decayed.current_strength < 1.0);
    }

    #[tokio::test]
    async fn scenario_s4_context_boost_flips_ranking_by_goal() {
        let engine = engine();
        let project = Uuid::new_v4();
        let goal_a = Uuid::new_v4();
        let goal_b = Uuid::new_v4();

        let ctx_a = RetrievalContext { goal_id: Some(goal_a), tick: 0, ..Default::default() };
        let ctx_b = RetrievalContext { goal_id: Some(goal_b), tick: 0, ..Default::default() };

        let c1 = engine
            .ingest(project, "insight one".into(), vec![1.0, 0.0], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx_a)
            .await
            .unwrap()
            .chunk_id;
        let c2 = engine
            .ingest(project, "insight two".into(), vec![1.0, 0.0], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx_b)
            .await
            .unwrap()
            .chunk_id;

        let query_ctx_a = RetrievalContext { goal_id: Some(goal_a), tick: 0, ..Default::default() };
        let result_a = engine
            .query(project, "insight", Some(vec![1.0, 0.0]), &query_ctx_a, 10, 0.0, None)
            .await
            .unwrap();
        assert_eq!(result_a.chunks[0].chunk_id, c1);

        let query_ctx_b = RetrievalContext { goal_id: Some(goal_b), tick: 0, ..Default::default() };
        let result_b = engine
            .query(project, "insight", Some(vec![1.0, 0.0]), &query_ctx_b, 10, 0.0, None)
            .await
            .unwrap();
        assert_eq!(result_b.chunks[0].chunk_id, c2);
    }

    #[tokio::test]
    async fn operational_route_defers_without_querying_the_store() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);
        let result = engine
            .query(project, "what's blocked right now", None, &ctx, 10, 0.0, None)
            .await
            .unwrap();
        assert!(result.deferred);
        assert!(result.chunks.is_empty());
    }

    #[tokio::test]
    async fn empty_project_query_returns_no_error() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);
        let result = engine
            .query(project, "tell me about anything", Some(vec![1.0, 0.0]), &ctx, 10, 0.0, None)
            .await
            .unwrap();
        assert!(result.chunks.is_empty());
    }

    #[tokio::test]
    async fn scenario_s3_pinned_chunk_decays_but_stays_floored_and_capped() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);
        let opts = IngestOptions {
            pinned: true,
            decay_override: Some((crate::types::DecayFunction::Exponential, 0.1)),
            ..Default::default()
        };
        let id = engine
            .ingest(project, "pinned insight".into(), vec![1.0, 0.0], class(ChunkKind::Insight), Default::default(), opts, &ctx)
            .await
            .unwrap()
            .chunk_id;

        for _ in 0..20 {
            engine.advance_tick(project).await.unwrap();
        }
        engine.decay_tick(project).await.unwrap();

        let decayed = engine.store.get_chunk(id).await.unwrap().unwrap();
        assert!(decayed.current_strength >= 0.5);
        assert!(matches!(decayed.status, ChunkStatus::Active | ChunkStatus::Warm));
    }

    #[tokio::test]
    async fn scenario_s5_co_retrieval_promotes_to_implicit_related_to_edge() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);

        let a = engine
            .ingest(project, "insight A".into(), vec![1.0, 0.0], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx)
            .await
            .unwrap()
            .chunk_id;
        let b = engine
            .ingest(project, "insight B".into(), vec![0.95, 0.05], class(ChunkKind::Insight), Default::default(), IngestOptions::default(), &ctx)
            .await
            .unwrap()
            .chunk_id;

        assert!(engine.find_related_to_edge(a, b).await.unwrap().is_none());

        for _ in 0..engine.config.graph.promotion_threshold {
            let result = engine
                .query(project, "insight", Some(vec![1.0, 0.0]), &ctx, 10, 0.0, Some(Route::Exploration))
                .await
                .unwrap();
            assert_eq!(result.chunks.len(), 2);
        }

        let edge = engine.find_related_to_edge(a, b).await.unwrap().unwrap();
        assert_eq!(edge.rel_type, RelationshipType::RelatedTo);
        assert_eq!(edge.origin, RelationshipOrigin::Implicit);
    }

    #[tokio::test]
    async fn scenario_s6_opposite_polarity_chunk_creates_contradicts_edge() {
        let engine = engine();
        let project = Uuid::new_v4();
        let ctx = RetrievalContext::new(0);

        let c1 = engine
            .ingest(
                project,
                "X is true".into(),
                vec![1.0, 0.0],
                ChunkClass { kind: ChunkKind::Insight, confidence: Confidence::Verified, source: Source::Research },
                Default::default(),
                IngestOptions::default(),
                &ctx,
            )
            .await
            .unwrap()
            .chunk_id;

        let opts = IngestOptions { opposite_of: vec![c1], ..Default::default() };
        let c2 = engine
            .ingest(
                project,
                "X is false".into(),
                vec![0.99, 0.01],
                ChunkClass { kind: ChunkKind::Insight, confidence: Confidence::Verified, source: Source::Research },
                Default::default(),
                opts,
                &ctx,
            )
            .await
            .unwrap()
            .chunk_id;

        let rels = engine.store.relationships_touching(c2).await.unwrap();
        assert!(rels.iter().any(|r| r.rel_type == RelationshipType::Contradicts
            && r.from == c2
            && r.to == c1));

        let result = engine
            .query(project, "X", Some(vec![1.0, 0.0]), &ctx, 10, 0.0, Some(Route::Exploration))
            .await
            .unwrap();
        assert!(result.chunks.iter().any(|c| c.chunk_id == c1 && c.contradicted));
        assert!(result.chunks.iter().any(|c| c.chunk_id == c2 && c.contradicted));
    }
}
