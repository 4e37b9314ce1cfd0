//! The retrieval pipeline's inputs, outputs, and pure scoring functions.

pub mod pipeline;

pub use pipeline::{confidence_weight, context_boost, fuse, recency_boost, BoostKind};

use crate::types::Chunk;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The agent's situation at query time, compared against each candidate's
/// learning context during the context-boost step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalContext {
    /// The tick the query is being executed at.
    pub tick: u64,
    /// The working-layer task identifier active now, if any.
    pub task_id: Option<Uuid>,
    /// The working-layer goal identifier active now, if any.
    pub goal_id: Option<Uuid>,
    /// Free-form phase label, compared against each candidate's phase.
    pub phase: String,
    /// The skill area active now, if any.
    pub skill_area: Option<String>,
    /// The raw query text.
    pub query: String,
    /// When `true`, chunks past their `valid_until_tick` are not excluded.
    pub historical: bool,
}

impl RetrievalContext {
    /// A context carrying only the current tick; all other fields default.
    #[must_use]
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }
}

/// A chunk returned by a query, carrying its component and final scores.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The chunk itself.
    pub chunk: Chunk,
    /// The final fused, boosted score used for ranking.
    pub score: f32,
    /// The raw cosine similarity from the vector index, if this candidate
    /// was reached via semantic search.
    pub semantic: f32,
    /// The accumulated graph traversal score, if this candidate was
    /// reached via graph expansion (`0.0` for semantic-only candidates).
    pub graph_score: f32,
}

/// Non-fatal conditions the pipeline degraded gracefully around.
#[derive(Debug, Clone, Default)]
pub struct RetrievalWarnings {
    /// `true` if graph expansion failed and results are semantic-only.
    pub graph_expansion_failed: bool,
    /// `true` if context-boost computation failed and raw scores were used.
    pub context_boost_failed: bool,
}

/// The full result of a [`crate::engine::Engine::query`] call.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Ranked results, best first.
    pub chunks: Vec<ScoredChunkSummary>,
    /// Graceful-degradation flags.
    pub warnings: RetrievalWarnings,
    /// `true` when the operational route deferred to a narrower, high-
    /// confidence candidate set instead of running the full hybrid pipeline.
    pub deferred: bool,
}

/// A lighter public view of [`ScoredChunk`] (avoids exposing the internal
/// struct's field set as part of the stable return type).
#[derive(Debug, Clone)]
pub struct ScoredChunkSummary {
    /// The chunk's identity.
    pub chunk_id: Uuid,
    /// The final fused, boosted score.
    pub score: f32,
    /// `true` if this chunk is the endpoint of a `contradicts` edge.
    pub contradicted: bool,
}

impl From<&ScoredChunk> for ScoredChunkSummary {
    fn from(sc: &ScoredChunk) -> Self {
        Self {
            chunk_id: sc.chunk.id,
            score: sc.score,
            contradicted: false,
        }
    }
}
