//! Ingestion defaults, idempotency hashing, and the supersession protocol.

use crate::types::{ChunkKind, DecayFunction};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::constants::ingestion_defaults as defaults;

/// The result of an [`crate::engine::Engine::ingest`] call.
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// The identity of the chunk that now exists for this content.
    pub chunk_id: Uuid,
    /// `true` if this call returned a pre-existing chunk rather than
    /// creating a new one (identical content ingested again within the
    /// same tick).
    pub duplicate: bool,
}

/// The `(decay_function, decay_rate, initial_strength)` defaults a kind
/// gets when the caller does not override them.
#[must_use]
pub fn defaults_for_kind(kind: ChunkKind) -> (DecayFunction, f32, f32) {
    match kind {
        ChunkKind::UserInput => (DecayFunction::None, 0.0, 1.0),
        ChunkKind::Decision => (DecayFunction::Linear, defaults::DECISION_DECAY_RATE, 1.0),
        ChunkKind::Attempt => (
            DecayFunction::Exponential,
            defaults::ATTEMPT_DECAY_RATE,
            defaults::ATTEMPT_INITIAL_STRENGTH,
        ),
        ChunkKind::Research | ChunkKind::Insight | ChunkKind::Resource => (
            DecayFunction::Exponential,
            defaults::DEFAULT_DECAY_RATE,
            1.0,
        ),
    }
}

/// A stable content hash over payload, embedding, and tags, used to detect
/// identical ingestion within the same tick.
#[must_use]
pub fn content_hash(payload: &str, embedding: &[f32], tags: &HashSet<String>) -> u64 {
    let mut hasher = DefaultHasher::new();
    payload.hash(&mut hasher);
    for component in embedding {
        component.to_bits().hash(&mut hasher);
    }
    let mut sorted_tags: Vec<&String> = tags.iter().collect();
    sorted_tags.sort();
    for tag in sorted_tags {
        tag.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_input_never_decays() {
        let (f, rate, strength) = defaults_for_kind(ChunkKind::UserInput);
        assert_eq!(f, DecayFunction::None);
        assert_eq!(rate, 0.0);
        assert_eq!(strength, 1.0);
    }

    #[test]
    fn attempt_starts_below_full_strength() {
        let (f, _, strength) = defaults_for_kind(ChunkKind::Attempt);
        assert_eq!(f, DecayFunction::Exponential);
        assert!(strength < 1.0);
    }

    #[test]
    fn content_hash_is_order_independent_over_tags() {
        let embedding = vec![1.0, 2.0];
        let a: HashSet<String> = ["x".into(), "y".into()].into_iter().collect();
        let b: HashSet<String> = ["y".into(), "x".into()].into_iter().collect();
        assert_eq!(
            content_hash("payload", &embedding, &a),
            content_hash("payload", &embedding, &b)
        );
    }

    #[test]
    fn content_hash_differs_for_different_payloads() {
        let embedding = vec![1.0];
        let tags = HashSet::new();
        assert_ne!(
            content_hash("a", &embedding, &tags),
            content_hash("b", &embedding, &tags)
        );
    }
}
