//! Lifecycle maintenance: consolidation of near-duplicates and archival of
//! cold chunks.

use crate::config::LifecycleConfig;
use crate::types::{Chunk, ChunkStatus};
use uuid::Uuid;

/// Whether two chunks are consolidation candidates: similar enough and
/// sharing at least one tag.
#[must_use]
pub fn is_consolidation_candidate(a: &Chunk, b: &Chunk, cosine_similarity: f32, cfg: &LifecycleConfig) -> bool {
    cosine_similarity >= cfg.consolidate_similarity_threshold && !a.tags.is_disjoint(&b.tags)
}

/// Pick which of two consolidation candidates survives.
///
/// Tie-break order, per the resolved open question: `current_strength`
/// desc, then `successful_uses` desc, then `tick_created` desc, then
/// identity asc.
#[must_use]
pub fn pick_keeper(a: &Chunk, b: &Chunk) -> (Uuid, Uuid) {
    let a_key = (a.current_strength, a.successful_uses, a.tick_created);
    let b_key = (b.current_strength, b.successful_uses, b.tick_created);

    let a_wins = match a_key.partial_cmp(&b_key) {
        Some(std::cmp::Ordering::Greater) => true,
        Some(std::cmp::Ordering::Less) => false,
        _ => a.id < b.id,
    };

    if a_wins {
        (a.id, b.id)
    } else {
        (b.id, a.id)
    }
}

/// Whether a cold, non-pinned chunk is due for archival.
#[must_use]
pub fn is_archivable(chunk: &Chunk, current_tick: u64, cfg: &LifecycleConfig) -> bool {
    if chunk.pinned || chunk.status != ChunkStatus::Cold {
        return false;
    }
    let stale = chunk
        .tick_last_accessed
        .is_none_or(|last| current_tick.saturating_sub(last) >= cfg.archive_age_ticks);
    stale || chunk.current_strength < cfg.archive_weight_threshold
}

/// A short human-readable summary of a chunk's payload for the archive
/// record, truncated to a stable character budget.
#[must_use]
pub fn summarize(payload: &str) -> String {
    const MAX_CHARS: usize = 200;
    if payload.chars().count() <= MAX_CHARS {
        payload.to_string()
    } else {
        let truncated: String = payload.chars().take(MAX_CHARS).collect();
        format!("{truncated}…")
    }
}

/// Whether a tombstone has aged past its grace window and may be compacted.
#[must_use]
pub fn is_compactable(tombstoned_at_tick: u64, current_tick: u64, cfg: &LifecycleConfig) -> bool {
    current_tick.saturating_sub(tombstoned_at_tick) >= cfg.tombstone_grace_ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkClass, ChunkKind, Confidence, DecayFunction, LearningContext, Source};
    use std::collections::HashSet;

    fn chunk(strength: f32, uses: u32, created: u64) -> Chunk {
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
            tick_created: created,
            tick_last_accessed: None,
            tick_last_useful: None,
            initial_strength: 1.0,
            current_strength: strength,
            decay_function: DecayFunction::Exponential,
            decay_rate: 0.05,
            persistence_score: 0.0,
            access_count: 0,
            successful_uses: uses,
            status: ChunkStatus::Cold,
            pinned: false,
            superseded_by: None,
            valid_until_tick: None,
            tick_tombstoned: None,
            learning_context: LearningContext::default(),
        }
    }

    #[test]
    fn keeper_picked_by_strength_first() {
        let a = chunk(0.9, 0, 0);
        let b = chunk(0.5, 10, 10);
        let (keeper, superseded) = pick_keeper(&a, &b);
        assert_eq!(keeper, a.id);
        assert_eq!(superseded, b.id);
    }

    #[test]
    fn tie_break_falls_through_to_identity() {
        let mut a = chunk(0.5, 1, 5);
        let mut b = chunk(0.5, 1, 5);
        a.id = Uuid::nil();
        b.id = Uuid::max();
        let (keeper, _) = pick_keeper(&a, &b);
        assert_eq!(keeper, a.id);
    }

    #[test]
    fn pinned_chunks_are_never_archivable() {
        let mut c = chunk(0.01, 0, 0);
        c.pinned = true;
        let cfg = LifecycleConfig::default();
        assert!(!is_archivable(&c, 10_000, &cfg));
    }

    #[test]
    fn long_untouched_cold_chunk_is_archivable() {
        let c = chunk(0.5, 0, 0);
        let cfg = LifecycleConfig::default();
        assert!(is_archivable(&c, cfg.archive_age_ticks + 1, &cfg));
    }

    #[test]
    fn summarize_truncates_long_payloads() {
        let long = "a".repeat(500);
        let summary = summarize(&long);
        assert!(summary.chars().count() <= 201);
    }
}
