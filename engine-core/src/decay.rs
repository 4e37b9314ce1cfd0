//! Periodic recomputation of `current_strength` and tier demotion.

use crate::config::TierConfig;
use crate::constants::reinforcement;
use crate::types::{Chunk, ChunkStatus, DecayFunction};

/// The strength tier for a bare strength value, ignoring any chunk's
/// current status — callers compose this with [`clamp_tier_change`] to
/// enforce the "status never upgrades via decay" rule.
#[must_use]
pub fn tier_for_strength(strength: f32, cfg: &TierConfig) -> ChunkStatus {
    if strength < cfg.cold_threshold {
        ChunkStatus::Cold
    } else if strength < cfg.cool_threshold {
        ChunkStatus::Cool
    } else if strength < cfg.warm_threshold {
        ChunkStatus::Warm
    } else {
        ChunkStatus::Active
    }
}

/// Never let a tier move toward `Active` relative to `previous` — decay may
/// only demote, reinforcement is the only path back up.
#[must_use]
fn clamp_tier_change(computed: ChunkStatus, previous: ChunkStatus) -> ChunkStatus {
    computed.max(previous)
}

fn raw_strength(chunk: &Chunk, current_tick: u64) -> f32 {
    let delta = current_tick.saturating_sub(chunk.last_relevant_tick()) as f32;
    match chunk.decay_function {
        DecayFunction::Exponential => chunk.initial_strength * (-chunk.decay_rate * delta).exp(),
        DecayFunction::Linear => (chunk.initial_strength - chunk.decay_rate * delta).max(0.0),
        DecayFunction::PowerLaw => {
            chunk.initial_strength * (1.0 + delta).powf(-chunk.decay_rate)
        }
        DecayFunction::None => chunk.initial_strength,
    }
}

/// The `(current_strength, status)` a decay pass would write for `chunk` at
/// `current_tick`. Archived and tombstoned chunks are returned unchanged;
/// decay does not touch them.
#[must_use]
pub fn apply_decay(chunk: &Chunk, current_tick: u64, cfg: &TierConfig) -> (f32, ChunkStatus) {
    if matches!(chunk.status, ChunkStatus::Archived | ChunkStatus::Tombstone) {
        return (chunk.current_strength, chunk.status);
    }

    let mut strength = raw_strength(chunk, current_tick).clamp(0.0, 1.0);
    if chunk.pinned {
        strength = strength.max(cfg.pinned_floor);
    }

    let mut status = clamp_tier_change(tier_for_strength(strength, cfg), chunk.status);
    if chunk.pinned {
        // Invariant: pinned chunks stay in {active, warm}.
        status = status.min(ChunkStatus::Warm);
    }

    (strength, status)
}

/// Apply a successful retrieval-use event: raise strength, bump
/// `successful_uses`, stamp `tick_last_useful`, and promote one tier if the
/// new strength crosses the threshold for the tier above.
pub fn reinforce(chunk: &mut Chunk, current_tick: u64, cfg: &TierConfig) {
    chunk.current_strength =
        (chunk.current_strength + reinforcement::STRENGTHEN_AMOUNT).min(1.0);
    chunk.successful_uses += 1;
    chunk.tick_last_useful = Some(current_tick);

    if tier_for_strength(chunk.current_strength, cfg) < chunk.status {
        chunk.status = chunk.status.promote();
    }
}

/// Apply a confirmed-contradiction weakening event.
pub fn weaken(chunk: &mut Chunk) {
    chunk.current_strength = (chunk.current_strength - reinforcement::WEAKEN_AMOUNT).max(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkClass, ChunkKind, Confidence, LearningContext, Source};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn sample_chunk(decay_function: DecayFunction, rate: f32) -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            payload: "p".into(),
            embedding: vec![1.0],
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
            decay_function,
            decay_rate: rate,
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
    fn exponential_decay_matches_scenario_s2() {
        let chunk = sample_chunk(DecayFunction::Exponential, 0.1);
        let cfg = TierConfig::default();
        let (strength, status) = apply_decay(&chunk, 20, &cfg);
        assert!((strength - 0.135_f32).abs() < 0.01);
        assert_eq!(status, ChunkStatus::Cool);
    }

    #[test]
    fn pinned_chunk_floors_at_half_strength() {
        let mut chunk = sample_chunk(DecayFunction::Exponential, 0.1);
        chunk.pinned = true;
        let cfg = TierConfig::default();
        let (strength, status) = apply_decay(&chunk, 20, &cfg);
        assert!(strength >= 0.5);
        assert!(matches!(status, ChunkStatus::Active | ChunkStatus::Warm));
    }

    #[test]
    fn decay_never_upgrades_status() {
        let mut chunk = sample_chunk(DecayFunction::None, 0.0);
        chunk.status = ChunkStatus::Cold;
        chunk.current_strength = 0.1;
        let cfg = TierConfig::default();
        let (_, status) = apply_decay(&chunk, 100, &cfg);
        assert_eq!(status, ChunkStatus::Cold);
    }

    #[test]
    fn reinforce_promotes_at_most_one_tier() {
        let mut chunk = sample_chunk(DecayFunction::None, 0.0);
        chunk.status = ChunkStatus::Cold;
        chunk.current_strength = 0.05;
        let cfg = TierConfig::default();
        for _ in 0..10 {
            reinforce(&mut chunk, 1, &cfg);
        }
        // Strength is now high but status must climb one tier per call.
        assert_ne!(chunk.status, ChunkStatus::Cold);
    }

    #[test]
    fn archived_chunks_are_untouched_by_decay() {
        let mut chunk = sample_chunk(DecayFunction::Exponential, 10.0);
        chunk.status = ChunkStatus::Archived;
        chunk.current_strength = 0.9;
        let cfg = TierConfig::default();
        let (strength, status) = apply_decay(&chunk, 1000, &cfg);
        assert_eq!(strength, 0.9);
        assert_eq!(status, ChunkStatus::Archived);
    }
}
