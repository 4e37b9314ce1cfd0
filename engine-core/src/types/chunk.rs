//! The chunk: an atomic, embedded knowledge fragment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::enums::{ChunkKind, ChunkStatus, Confidence, Source};

/// Classification assigned to a chunk at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkClass {
    /// What kind of fragment this is.
    pub kind: ChunkKind,
    /// How certain the agent is of its content.
    pub confidence: Confidence,
    /// Where the content came from.
    pub source: Source,
}

/// The decay function governing how a chunk's `current_strength` falls off
/// with elapsed ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayFunction {
    /// `s = initial * exp(-rate * delta)`.
    Exponential,
    /// `s = max(0, initial - rate * delta)`.
    Linear,
    /// `s = initial * (1 + delta)^(-rate)`.
    PowerLaw,
    /// `s = initial`, unconditionally.
    None,
}

/// Snapshot of the agent's situation at the moment a chunk was created,
/// used by the retrieval pipeline's context-boost step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningContext {
    /// Tick at which the snapshot was taken.
    pub tick: u64,
    /// The working-layer task identifier active at creation time, if any.
    pub task_id: Option<Uuid>,
    /// The working-layer goal identifier active at creation time, if any.
    pub goal_id: Option<Uuid>,
    /// Free-form phase label (e.g. "planning", "execution").
    pub phase: String,
    /// The skill area active at creation time, if any.
    pub skill_area: Option<String>,
    /// The query text or description active at creation time.
    pub query_context: String,
    /// Chunks already known to be related at creation time.
    pub related_chunks: Vec<Uuid>,
}

/// Caller-supplied options for [`crate::engine::Engine::ingest`].
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// An existing chunk this new chunk supersedes, if any.
    pub supersedes: Option<Uuid>,
    /// The tick after which this chunk should be excluded from retrieval
    /// unless explicitly requested with the historical flag.
    pub valid_until_tick: Option<u64>,
    /// Whether the chunk should be pinned (immune to demotion below `warm`).
    pub pinned: bool,
    /// Caller-supplied decay function override; defaults are derived from
    /// `kind` when omitted.
    pub decay_override: Option<(DecayFunction, f32)>,
    /// Existing chunks whose payload this one is asserted to contradict
    /// (opposite polarity, caller-supplied). Checked against embedding
    /// similarity to decide whether to materialize a `contradicts` edge.
    pub opposite_of: Vec<Uuid>,
}

/// An atomic, embedded knowledge fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identity.
    pub id: Uuid,
    /// The project this chunk belongs to.
    pub project_id: Uuid,
    /// Opaque textual payload.
    pub payload: String,
    /// Fixed-dimension embedding vector.
    pub embedding: Vec<f32>,
    /// Classification.
    pub class: ChunkClass,
    /// Unordered set of short tag strings.
    pub tags: HashSet<String>,
    /// Tick at which the chunk was created.
    pub tick_created: u64,
    /// Tick at which the chunk was last accessed by a retrieval.
    pub tick_last_accessed: Option<u64>,
    /// Tick at which the chunk was last marked useful by reinforcement.
    pub tick_last_useful: Option<u64>,
    /// Strength at creation time, before any decay.
    pub initial_strength: f32,
    /// Current strength after decay and reinforcement.
    pub current_strength: f32,
    /// The decay function applied by the decay engine.
    pub decay_function: DecayFunction,
    /// The decay rate applied by the decay function.
    pub decay_rate: f32,
    /// A caller-maintained persistence hint, not otherwise interpreted by
    /// the engine.
    pub persistence_score: f32,
    /// Number of times this chunk has been returned by a retrieval.
    pub access_count: u32,
    /// Number of times this chunk was reinforced after a successful use.
    pub successful_uses: u32,
    /// Coarse tier.
    pub status: ChunkStatus,
    /// Whether the chunk is immune to demotion below `warm`.
    pub pinned: bool,
    /// The chunk that superseded this one, if any.
    pub superseded_by: Option<Uuid>,
    /// The tick after which this chunk is excluded from retrieval unless
    /// explicitly requested as historical.
    pub valid_until_tick: Option<u64>,
    /// The tick at which this chunk was tombstoned, if it has been.
    /// Drives the compaction grace window.
    pub tick_tombstoned: Option<u64>,
    /// Snapshot of the agent's situation at creation time.
    pub learning_context: LearningContext,
}

impl Chunk {
    /// Whether `current_tick` has passed this chunk's `valid_until_tick`.
    #[must_use]
    pub fn is_expired(&self, current_tick: u64) -> bool {
        self.valid_until_tick.is_some_and(|v| current_tick > v)
    }

    /// The most recent of `tick_last_useful`, `tick_last_accessed`, and
    /// `tick_created` — the decay engine's reference point for `Δ`.
    #[must_use]
    pub fn last_relevant_tick(&self) -> u64 {
        self.tick_last_useful
            .into_iter()
            .chain(self.tick_last_accessed)
            .chain(std::iter::once(self.tick_created))
            .max()
            .unwrap_or(self.tick_created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk() -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            payload: "payload".into(),
            embedding: vec![1.0, 0.0],
            class: ChunkClass {
                kind: ChunkKind::Insight,
                confidence: Confidence::Verified,
                source: Source::Research,
            },
            tags: HashSet::new(),
            tick_created: 5,
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

    #[test]
    fn last_relevant_tick_defaults_to_creation() {
        let c = sample_chunk();
        assert_eq!(c.last_relevant_tick(), 5);
    }

    #[test]
    fn last_relevant_tick_prefers_most_recent() {
        let mut c = sample_chunk();
        c.tick_last_accessed = Some(10);
        c.tick_last_useful = Some(7);
        assert_eq!(c.last_relevant_tick(), 10);
    }

    #[test]
    fn expiry_is_strict() {
        let mut c = sample_chunk();
        c.valid_until_tick = Some(10);
        assert!(!c.is_expired(10));
        assert!(c.is_expired(11));
    }
}
