//! The durable record-keeping surface (component A) and its in-memory
//! fallback implementation.

mod memory_store;

pub use memory_store::MemoryStore;

use crate::error::Result;
use crate::types::{Chunk, ChunkStatus, Relationship};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Per-pair counter promoted to an implicit `related_to` edge once `hits`
/// crosses the configured promotion threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoRetrievalCounter {
    /// One member of the unordered pair (`a <= b`).
    pub a: Uuid,
    /// The other member of the unordered pair (`a <= b`).
    pub b: Uuid,
    /// Number of retrievals that returned both members together.
    pub hits: u32,
    /// The tick of the most recent contributing retrieval.
    pub last_tick: u64,
}

impl CoRetrievalCounter {
    /// Build the canonical (sorted) pair key for two chunk identities.
    #[must_use]
    pub fn key(x: Uuid, y: Uuid) -> (Uuid, Uuid) {
        if x <= y { (x, y) } else { (y, x) }
    }
}

/// Post-archival snapshot written by Lifecycle Maintenance before a cold
/// chunk is tombstoned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRecord {
    /// The archived chunk's original identity.
    pub chunk_id: Uuid,
    /// The project the chunk belonged to.
    pub project_id: Uuid,
    /// A short human-readable summary of the chunk's payload.
    pub summary: String,
    /// A stable hash of the chunk's payload, for dedup/auditing.
    pub content_hash: String,
    /// The chunk's kind at archival time.
    pub kind: crate::types::ChunkKind,
    /// The chunk's tags at archival time.
    pub tags: HashSet<String>,
    /// The chunk's learning context at archival time.
    pub learning_context: crate::types::LearningContext,
    /// The tick the chunk was originally created at.
    pub tick_created: u64,
    /// The tick at which archival happened.
    pub tick_archived: u64,
    /// The chunk's `current_strength` at archival time.
    pub final_strength: f32,
    /// Wall-clock time of archival, for operator-facing tooling.
    pub archived_at: DateTime<Utc>,
}

/// A single mutation applied as part of an atomic [`Store::apply_batch`] call.
///
/// Grouping mutations this way is what lets Decay and Maintenance satisfy
/// "one transaction per project per tick" without every `Store`
/// implementation needing bespoke multi-step methods.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert or fully overwrite a chunk record.
    PutChunk(Box<Chunk>),
    /// Remove a chunk record (used only during tombstone compaction).
    DeleteChunk(Uuid),
    /// Insert or overwrite a relationship record.
    PutRelationship(Box<Relationship>),
    /// Remove a relationship record by id.
    DeleteRelationship(Uuid),
    /// Upsert a co-retrieval counter to an explicit value.
    PutCoRetrieval(CoRetrievalCounter),
    /// Remove a co-retrieval counter for an unordered pair.
    DeleteCoRetrieval(Uuid, Uuid),
    /// Append an archive record.
    PutArchiveRecord(Box<ArchiveRecord>),
    /// Set the project's `last_decay_tick`.
    SetLastDecayTick(Uuid, u64),
    /// Set the project's `last_consolidation_tick`.
    SetLastConsolidationTick(Uuid, u64),
}

/// Durable, transactional record keeping for chunks, relationships,
/// co-retrieval counters, agent-state, and archive records.
///
/// Every mutation observed by a reader after the call returns must be
/// durable. The store never retries transparently; it surfaces
/// `not_found`, `constraint_violated`, and `io_failed` to the caller.
#[async_trait]
pub trait Store: Send + Sync {
    /// The project's current tick.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn current_tick(&self, project_id: Uuid) -> Result<u64>;

    /// Atomically increment and persist the project's tick, returning the
    /// new value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn advance_tick(&self, project_id: Uuid) -> Result<u64>;

    /// The tick at which decay last ran for this project, or `0`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn last_decay_tick(&self, project_id: Uuid) -> Result<u64>;

    /// The tick at which maintenance last ran for this project, or `0`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn last_consolidation_tick(&self, project_id: Uuid) -> Result<u64>;

    /// Fetch a single chunk by identity.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn get_chunk(&self, id: Uuid) -> Result<Option<Chunk>>;

    /// Fetch multiple chunks by identity in one call.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn get_chunks(&self, ids: &[Uuid]) -> Result<Vec<Chunk>>;

    /// All chunks belonging to a project.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn scan_project(&self, project_id: Uuid) -> Result<Vec<Chunk>>;

    /// All chunks belonging to a project with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn scan_by_status(&self, project_id: Uuid, status: ChunkStatus) -> Result<Vec<Chunk>>;

    /// All chunks belonging to a project carrying any of `tags`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn scan_by_tags(&self, project_id: Uuid, tags: &HashSet<String>) -> Result<Vec<Chunk>>;

    /// Outgoing and incoming relationships touching `chunk_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn relationships_touching(&self, chunk_id: Uuid) -> Result<Vec<Relationship>>;

    /// All relationships in a project, for building an in-memory adjacency
    /// map ahead of traversal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn all_relationships(&self, project_id: Uuid) -> Result<Vec<Relationship>>;

    /// The co-retrieval counter for an unordered pair, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn get_coretrieval(&self, a: Uuid, b: Uuid) -> Result<Option<CoRetrievalCounter>>;

    /// Every co-retrieval counter with one leg touching `chunk_id`.
    ///
    /// Archival uses this to satisfy the invariant that a tombstoned chunk
    /// carries no co-retrieval counters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn coretrieval_for_chunk(&self, chunk_id: Uuid) -> Result<Vec<CoRetrievalCounter>>;

    /// Archive records for a project, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IoFailed`] if the store is unavailable.
    async fn list_archive(&self, project_id: Uuid) -> Result<Vec<ArchiveRecord>>;

    /// Apply a batch of mutations as a single transaction. Partial writes
    /// must never be observable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConstraintViolated`] if a write in the batch
    /// violates a uniqueness or foreign-key constraint, or
    /// [`crate::Error::IoFailed`] if the store is unavailable. No ops from
    /// the batch are applied when an error is returned.
    async fn apply_batch(&self, project_id: Uuid, ops: Vec<WriteOp>) -> Result<()>;
}
