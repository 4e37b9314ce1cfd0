//! Engine-wide configuration, loadable from TOML.

use crate::constants::{graph, lifecycle, retrieval, tiers};
use serde::{Deserialize, Serialize};

/// Tunable knobs for decay, retrieval, and lifecycle maintenance.
///
/// Defaults match the numeric defaults named inline by the component
/// design; callers may override any subset via [`EngineConfig::from_toml`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tier-demotion thresholds and the pinned floor.
    pub tiers: TierConfig,
    /// Co-retrieval and traversal thresholds.
    pub graph: GraphConfig,
    /// Retrieval pipeline weights and boosts.
    pub retrieval: RetrievalConfig,
    /// Decay/maintenance scheduling and archival thresholds.
    pub lifecycle: LifecycleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tiers: TierConfig::default(),
            graph: GraphConfig::default(),
            retrieval: RetrievalConfig::default(),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML text, falling back to defaults for any
    /// field the document omits.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid TOML or does not match the
    /// shape of [`EngineConfig`].
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// See [`tiers`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Below this, status demotes from `active` to `warm`.
    pub warm_threshold: f32,
    /// Below this, status demotes from `warm` to `cool`.
    pub cool_threshold: f32,
    /// Below this, status demotes from `cool` to `cold`.
    pub cold_threshold: f32,
    /// Below this, a chunk becomes an archival candidate.
    pub archive_candidate_threshold: f32,
    /// Floor enforced on `current_strength` for pinned chunks.
    pub pinned_floor: f32,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            warm_threshold: tiers::WARM_THRESHOLD,
            cool_threshold: tiers::COOL_THRESHOLD,
            cold_threshold: tiers::COLD_THRESHOLD,
            archive_candidate_threshold: tiers::ARCHIVE_CANDIDATE_THRESHOLD,
            pinned_floor: tiers::PINNED_FLOOR,
        }
    }
}

/// See [`graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Minimum cosine similarity for a pair to count toward co-retrieval.
    pub coretrieval_similarity_threshold: f32,
    /// Number of co-retrieval hits required to promote an implicit edge.
    pub promotion_threshold: u32,
    /// Initial weight assigned to a freshly promoted implicit edge.
    pub implicit_edge_initial_weight: f32,
    /// Similarity threshold above which opposite-polarity chunks are
    /// flagged as contradictions.
    pub contradiction_similarity_threshold: f32,
    /// Default maximum traversal depth for graph expansion.
    pub default_traversal_depth: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            coretrieval_similarity_threshold: graph::CORETRIEVAL_SIMILARITY_THRESHOLD,
            promotion_threshold: graph::PROMOTION_THRESHOLD,
            implicit_edge_initial_weight: graph::IMPLICIT_EDGE_INITIAL_WEIGHT,
            contradiction_similarity_threshold: graph::CONTRADICTION_SIMILARITY_THRESHOLD,
            default_traversal_depth: graph::DEFAULT_TRAVERSAL_DEPTH,
        }
    }
}

/// See [`retrieval`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates pulled from the vector index before filtering.
    pub semantic_candidate_count: usize,
    /// Fusion weight for the semantic similarity term.
    pub weight_semantic: f32,
    /// Fusion weight for the graph-expansion term.
    pub weight_graph: f32,
    /// Fusion weight for the keyword term.
    pub weight_keyword: f32,
    /// Multiplicative boost for an exact `goal_id` match.
    pub boost_goal_match: f32,
    /// Multiplicative boost for matching `phase` and `skill_area`.
    pub boost_phase_skill_match: f32,
    /// Multiplicative boost for goal-matched reactivation.
    pub boost_reactivation: f32,
    /// Ticks of inactivity before a goal-matched hit counts as reactivation.
    pub reactivation_window_ticks: u64,
    /// Recency boost half-life, in ticks.
    pub recency_halflife_ticks: f32,
    /// Confidence weight: verified.
    pub confidence_weight_verified: f32,
    /// Confidence weight: inferred.
    pub confidence_weight_inferred: f32,
    /// Confidence weight: speculative.
    pub confidence_weight_speculative: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_candidate_count: retrieval::SEMANTIC_CANDIDATE_COUNT,
            weight_semantic: retrieval::WEIGHT_SEMANTIC,
            weight_graph: retrieval::WEIGHT_GRAPH,
            weight_keyword: retrieval::WEIGHT_KEYWORD,
            boost_goal_match: retrieval::BOOST_GOAL_MATCH,
            boost_phase_skill_match: retrieval::BOOST_PHASE_SKILL_MATCH,
            boost_reactivation: retrieval::BOOST_REACTIVATION,
            reactivation_window_ticks: retrieval::REACTIVATION_WINDOW_TICKS,
            recency_halflife_ticks: retrieval::RECENCY_HALFLIFE_TICKS,
            confidence_weight_verified: retrieval::CONFIDENCE_WEIGHT_VERIFIED,
            confidence_weight_inferred: retrieval::CONFIDENCE_WEIGHT_INFERRED,
            confidence_weight_speculative: retrieval::CONFIDENCE_WEIGHT_SPECULATIVE,
        }
    }
}

/// See [`lifecycle`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Ticks between decay passes.
    pub decay_interval_ticks: u64,
    /// Ticks between maintenance passes.
    pub maintenance_interval_ticks: u64,
    /// Minimum cosine similarity for consolidation candidates.
    pub consolidate_similarity_threshold: f32,
    /// Ticks of inactivity before a `cold` chunk is archivable.
    pub archive_age_ticks: u64,
    /// Strength floor below which a non-pinned chunk is archivable.
    pub archive_weight_threshold: f32,
    /// Ticks a tombstone survives before compaction.
    pub tombstone_grace_ticks: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            decay_interval_ticks: lifecycle::DECAY_INTERVAL_TICKS,
            maintenance_interval_ticks: lifecycle::MAINTENANCE_INTERVAL_TICKS,
            consolidate_similarity_threshold: lifecycle::CONSOLIDATE_SIMILARITY_THRESHOLD,
            archive_age_ticks: lifecycle::ARCHIVE_AGE_TICKS,
            archive_weight_threshold: lifecycle::ARCHIVE_WEIGHT_THRESHOLD,
            tombstone_grace_ticks: lifecycle::TOMBSTONE_GRACE_TICKS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = EngineConfig::default();
        let text = toml::to_string(&cfg).expect("serialize");
        let parsed = EngineConfig::from_toml(&text).expect("parse");
        assert_eq!(parsed.tiers.warm_threshold, cfg.tiers.warm_threshold);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = EngineConfig::from_toml("[graph]\npromotion_threshold = 2\n").expect("parse");
        assert_eq!(cfg.graph.promotion_threshold, 2);
        assert_eq!(cfg.tiers.warm_threshold, tiers::WARM_THRESHOLD);
    }
}
