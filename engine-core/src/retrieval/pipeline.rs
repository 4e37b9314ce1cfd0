//! Pure scoring functions used by the hybrid retrieval pipeline.
//!
//! Kept free of any `Store`/`VectorIndex` access so they can be unit
//! tested directly; [`crate::engine::Engine::query`] wires them together
//! with the async I/O steps (candidate generation, graph expansion,
//! bookkeeping).

use crate::config::RetrievalConfig;
use crate::types::{Confidence, LearningContext};
use super::RetrievalContext;

/// Which context-match boost applied, for logging/debugging — the pipeline
/// always takes the single largest boost, never the product of several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostKind {
    /// No boost matched.
    None,
    /// `goal_id` matched exactly.
    GoalMatch,
    /// Same `phase` and `skill_area` matched.
    PhaseSkillMatch,
    /// Goal matched after a long gap since last access.
    Reactivation,
}

/// The largest single context-match boost between a candidate's learning
/// context and the current retrieval context, plus which rule fired.
#[must_use]
pub fn context_boost(
    learning_context: &LearningContext,
    retrieval_ctx: &RetrievalContext,
    tick_last_accessed: Option<u64>,
    cfg: &RetrievalConfig,
) -> (f32, BoostKind) {
    let goal_match = learning_context.goal_id.is_some()
        && learning_context.goal_id == retrieval_ctx.goal_id;

    let phase_skill_match = learning_context.phase == retrieval_ctx.phase
        && learning_context.skill_area.is_some()
        && learning_context.skill_area == retrieval_ctx.skill_area;

    let reactivation = goal_match
        && tick_last_accessed.is_some_and(|last| {
            retrieval_ctx.tick.saturating_sub(last) > cfg.reactivation_window_ticks
        });

    // `reactivation` is a strictly narrower condition than `goal_match` (it
    // requires goal_match plus a long access gap), so it is checked first —
    // picking the largest raw magnitude would let `goal_match`'s bigger
    // configured boost silently swallow the reactivation case.
    if reactivation {
        (cfg.boost_reactivation, BoostKind::Reactivation)
    } else if goal_match {
        (cfg.boost_goal_match, BoostKind::GoalMatch)
    } else if phase_skill_match {
        (cfg.boost_phase_skill_match, BoostKind::PhaseSkillMatch)
    } else {
        (1.0, BoostKind::None)
    }
}

/// The configured weight for a chunk's confidence classification.
#[must_use]
pub fn confidence_weight(confidence: Confidence, cfg: &RetrievalConfig) -> f32 {
    match confidence {
        Confidence::Verified => cfg.confidence_weight_verified,
        Confidence::Inferred => cfg.confidence_weight_inferred,
        Confidence::Speculative => cfg.confidence_weight_speculative,
    }
}

/// `2^(-delta_ticks / halflife)`.
#[must_use]
pub fn recency_boost(current_tick: u64, reference_tick: u64, halflife_ticks: f32) -> f32 {
    let delta = current_tick.saturating_sub(reference_tick) as f32;
    2.0_f32.powf(-delta / halflife_ticks)
}

/// Weighted fusion of the semantic, graph, and keyword terms. No keyword
/// index is implemented in this engine, so `keyword` is always `0.0`;
/// the term is still carried so the formula and its weight stay faithful.
#[must_use]
pub fn fuse(semantic: f32, graph_score: f32, keyword: f32, cfg: &RetrievalConfig) -> f32 {
    cfg.weight_semantic * semantic + cfg.weight_graph * graph_score + cfg.weight_keyword * keyword
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn goal_match_outranks_phase_skill_match() {
        let cfg = RetrievalConfig::default();
        let goal = Some(Uuid::new_v4());
        let lc = LearningContext {
            goal_id: goal,
            phase: "planning".into(),
            skill_area: Some("rust".into()),
            ..Default::default()
        };
        let rc = RetrievalContext {
            goal_id: goal,
            phase: "planning".into(),
            skill_area: Some("rust".into()),
            tick: 0,
            ..Default::default()
        };
        let (boost, kind) = context_boost(&lc, &rc, None, &cfg);
        assert_eq!(kind, BoostKind::GoalMatch);
        assert_eq!(boost, cfg.boost_goal_match);
    }

    #[test]
    fn no_match_yields_unity_boost() {
        let cfg = RetrievalConfig::default();
        let lc = LearningContext::default();
        let rc = RetrievalContext::new(0);
        let (boost, kind) = context_boost(&lc, &rc, None, &cfg);
        assert_eq!(boost, 1.0);
        assert_eq!(kind, BoostKind::None);
    }

    #[test]
    fn reactivation_requires_both_goal_match_and_a_long_gap() {
        let cfg = RetrievalConfig::default();
        let goal = Some(Uuid::new_v4());
        let lc = LearningContext {
            goal_id: goal,
            ..Default::default()
        };
        let rc = RetrievalContext {
            goal_id: goal,
            tick: 1000,
            ..Default::default()
        };
        let (_, kind_recent) = context_boost(&lc, &rc, Some(990), &cfg);
        assert_eq!(kind_recent, BoostKind::GoalMatch);

        let (_, kind_stale) = context_boost(&lc, &rc, Some(10), &cfg);
        assert_eq!(kind_stale, BoostKind::Reactivation);
    }

    #[test]
    fn recency_boost_halves_at_one_halflife() {
        let boost = recency_boost(100, 0, 100.0);
        assert!((boost - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fuse_respects_configured_weights() {
        let cfg = RetrievalConfig::default();
        let score = fuse(1.0, 0.0, 0.0, &cfg);
        assert!((score - cfg.weight_semantic).abs() < 1e-6);
    }
}
