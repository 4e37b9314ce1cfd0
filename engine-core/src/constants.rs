//! Default numeric tunables for decay, retrieval, and lifecycle maintenance.
//!
//! Grouped by subsystem, mirroring the defaults given inline by the
//! component design. [`crate::config::EngineConfig`] starts from these and
//! lets callers override any of them.

/// Tier-demotion thresholds on `current_strength`.
pub mod tiers {
    /// Below this, status demotes from `active` to `warm`.
    pub const WARM_THRESHOLD: f32 = 0.75;
    /// Below this, status demotes from `warm` to `cool`.
    pub const COOL_THRESHOLD: f32 = 0.45;
    /// Below this, status demotes from `cool` to `cold`.
    pub const COLD_THRESHOLD: f32 = 0.20;
    /// Below this, a chunk becomes an archival candidate.
    pub const ARCHIVE_CANDIDATE_THRESHOLD: f32 = 0.08;
    /// Floor enforced on `current_strength` for pinned chunks.
    pub const PINNED_FLOOR: f32 = 0.5;
}

/// Reinforcement and weakening amounts.
pub mod reinforcement {
    /// Amount added to `current_strength` on a successful retrieval-use event.
    pub const STRENGTHEN_AMOUNT: f32 = 0.15;
    /// Amount subtracted from `current_strength` on a confirmed contradiction.
    pub const WEAKEN_AMOUNT: f32 = 0.20;
}

/// Defaults applied by [`crate::types::ChunkKind`] at ingestion time.
pub mod ingestion_defaults {
    /// `decision` chunks decay linearly at this rate.
    pub const DECISION_DECAY_RATE: f32 = 0.02;
    /// `attempt` chunks decay exponentially at this rate.
    pub const ATTEMPT_DECAY_RATE: f32 = 0.10;
    /// `attempt` chunks start at this strength.
    pub const ATTEMPT_INITIAL_STRENGTH: f32 = 0.8;
    /// All other kinds decay exponentially at this rate.
    pub const DEFAULT_DECAY_RATE: f32 = 0.05;
}

/// Graph engine thresholds.
pub mod graph {
    /// Minimum cosine similarity for a pair to count toward co-retrieval.
    pub const CORETRIEVAL_SIMILARITY_THRESHOLD: f32 = 0.80;
    /// Number of co-retrieval hits required to promote an implicit edge.
    pub const PROMOTION_THRESHOLD: u32 = 4;
    /// Initial weight assigned to a freshly promoted implicit edge.
    pub const IMPLICIT_EDGE_INITIAL_WEIGHT: f32 = 0.30;
    /// Similarity threshold above which opposite-polarity chunks are
    /// flagged as contradictions.
    pub const CONTRADICTION_SIMILARITY_THRESHOLD: f32 = 0.85;
    /// Default maximum traversal depth for graph expansion.
    pub const DEFAULT_TRAVERSAL_DEPTH: u32 = 2;
}

/// Retrieval pipeline weights and boosts.
pub mod retrieval {
    /// Candidates pulled from the vector index before filtering (`K₁`).
    pub const SEMANTIC_CANDIDATE_COUNT: usize = 50;
    /// Fusion weight for the semantic similarity term.
    pub const WEIGHT_SEMANTIC: f32 = 0.6;
    /// Fusion weight for the graph-expansion term.
    pub const WEIGHT_GRAPH: f32 = 0.3;
    /// Fusion weight for the keyword term (currently always multiplied by
    /// a zero keyword score; no keyword index is implemented).
    pub const WEIGHT_KEYWORD: f32 = 0.1;

    /// Multiplicative boost for an exact `goal_id` match.
    pub const BOOST_GOAL_MATCH: f32 = 1.30;
    /// Multiplicative boost for matching `phase` and `skill_area`.
    pub const BOOST_PHASE_SKILL_MATCH: f32 = 1.15;
    /// Multiplicative boost for goal-matched reactivation after a long gap.
    pub const BOOST_REACTIVATION: f32 = 1.10;
    /// Ticks of inactivity after which a goal-matched candidate counts as
    /// a reactivation rather than a routine hit.
    pub const REACTIVATION_WINDOW_TICKS: u64 = 50;

    /// Recency boost half-life, in ticks.
    pub const RECENCY_HALFLIFE_TICKS: f32 = 100.0;

    /// Confidence weight applied during the confidence-weighting step.
    pub const CONFIDENCE_WEIGHT_VERIFIED: f32 = 1.0;
    /// Confidence weight applied during the confidence-weighting step.
    pub const CONFIDENCE_WEIGHT_INFERRED: f32 = 0.8;
    /// Confidence weight applied during the confidence-weighting step.
    pub const CONFIDENCE_WEIGHT_SPECULATIVE: f32 = 0.5;
}

/// Lifecycle maintenance intervals and thresholds.
pub mod lifecycle {
    /// Ticks between decay passes.
    pub const DECAY_INTERVAL_TICKS: u64 = 10;
    /// Ticks between maintenance passes.
    pub const MAINTENANCE_INTERVAL_TICKS: u64 = 50;
    /// Minimum cosine similarity for consolidation candidates.
    pub const CONSOLIDATE_SIMILARITY_THRESHOLD: f32 = 0.92;
    /// Ticks of inactivity, for a `cold` chunk, before it becomes archivable.
    pub const ARCHIVE_AGE_TICKS: u64 = 200;
    /// Strength floor below which a non-pinned chunk is archivable
    /// regardless of age.
    pub const ARCHIVE_WEIGHT_THRESHOLD: f32 = 0.08;
    /// Ticks a tombstone survives before compaction.
    pub const TOMBSTONE_GRACE_TICKS: u64 = 20;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds_are_ordered() {
        assert!(tiers::ARCHIVE_CANDIDATE_THRESHOLD < tiers::COLD_THRESHOLD);
        assert!(tiers::COLD_THRESHOLD < tiers::COOL_THRESHOLD);
        assert!(tiers::COOL_THRESHOLD < tiers::WARM_THRESHOLD);
    }

    #[test]
    fn confidence_weights_are_in_unit_range() {
        assert!((0.0..=1.0).contains(&retrieval::CONFIDENCE_WEIGHT_VERIFIED));
        assert!((0.0..=1.0).contains(&retrieval::CONFIDENCE_WEIGHT_INFERRED));
        assert!((0.0..=1.0).contains(&retrieval::CONFIDENCE_WEIGHT_SPECULATIVE));
    }
}
