//! Typed relationship traversal and the co-retrieval promotion mechanism.
//!
//! Traversal is expressed as free functions over adjacency maps rather than
//! a stateful graph object, generalizing the unweighted DFS helpers used
//! elsewhere in this codebase's lineage (`has_path`, `find_path`,
//! `has_cycle`) to the weighted, max-of-paths accumulation the retrieval
//! pipeline needs.

use crate::store::CoRetrievalCounter;
use crate::types::{ChunkStatus, Relationship, RelationshipType};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Outgoing- and incoming-indexed adjacency over a project's relationships,
/// built once per traversal call from a flat list fetched from the store.
pub struct Adjacency {
    by_from: HashMap<Uuid, Vec<Relationship>>,
    by_to: HashMap<Uuid, Vec<Relationship>>,
}

impl Adjacency {
    /// Index `relationships` by both endpoints.
    #[must_use]
    pub fn build(relationships: &[Relationship]) -> Self {
        let mut by_from: HashMap<Uuid, Vec<Relationship>> = HashMap::new();
        let mut by_to: HashMap<Uuid, Vec<Relationship>> = HashMap::new();
        for rel in relationships {
            by_from.entry(rel.from).or_default().push(rel.clone());
            by_to.entry(rel.to).or_default().push(rel.clone());
        }
        Self { by_from, by_to }
    }

    fn one_hop(&self, node: Uuid) -> Vec<(Uuid, RelationshipType, f32)> {
        let mut out = Vec::new();
        if let Some(edges) = self.by_from.get(&node) {
            for rel in edges {
                out.push((rel.to, rel.rel_type, rel.weight));
            }
        }
        if let Some(edges) = self.by_to.get(&node) {
            for rel in edges {
                if rel.rel_type.is_symmetric() {
                    out.push((rel.from, rel.rel_type, rel.weight));
                } else if let Some(inverse) = rel.rel_type.inverse() {
                    out.push((rel.from, inverse, rel.weight));
                }
            }
        }
        out
    }
}

/// Walk the graph from `seeds` out to `max_depth` hops, accumulating a
/// traversal score per reached chunk as the maximum, over all paths, of
/// the product of `edge.weight * type.traversal_weight` along the path.
///
/// Edges used beyond the first hop must have `transitive = true`. A reached
/// chunk is discarded when its accumulated score falls below `min_weight`,
/// when it is itself a seed, or when `status_of` reports it as
/// `archived`/`tombstone` (or unknown, e.g. already deleted).
#[must_use]
pub fn traverse(
    adjacency: &Adjacency,
    seeds: &HashSet<Uuid>,
    max_depth: u32,
    min_weight: f32,
    status_of: impl Fn(Uuid) -> Option<ChunkStatus>,
) -> HashMap<Uuid, f32> {
    let mut best: HashMap<Uuid, f32> = HashMap::new();
    let mut frontier: Vec<(Uuid, f32, u32)> = seeds.iter().map(|&s| (s, 1.0, 0)).collect();

    while let Some((node, score, depth)) = frontier.pop() {
        if depth >= max_depth {
            continue;
        }
        for (neighbor, rel_type, edge_weight) in adjacency.one_hop(node) {
            if depth >= 1 && !rel_type.is_transitive() {
                continue;
            }
            if seeds.contains(&neighbor) {
                continue;
            }
            match status_of(neighbor) {
                Some(ChunkStatus::Archived | ChunkStatus::Tombstone) | None => continue,
                Some(_) => {}
            }

            let new_score = score * edge_weight * rel_type.meta().traversal_weight;
            if new_score < min_weight {
                continue;
            }
            let best_so_far = best.entry(neighbor).or_insert(0.0);
            if new_score > *best_so_far {
                *best_so_far = new_score;
            }
            frontier.push((neighbor, new_score, depth + 1));
        }
    }

    best
}

/// Whether a new chunk's embedding is similar enough to an existing one to
/// flag a contradiction, given caller-supplied opposite polarity.
#[must_use]
pub fn is_contradiction(cosine_similarity: f32, opposite_polarity: bool, threshold: f32) -> bool {
    opposite_polarity && cosine_similarity >= threshold
}

/// Outcome of recording one co-retrieval hit for a pair.
pub struct CoRetrievalOutcome {
    /// The updated counter to persist.
    pub counter: CoRetrievalCounter,
    /// Whether this hit is the one that crosses the promotion threshold —
    /// true only on the single hit where `hits` first reaches the
    /// threshold, so callers materialize the implicit edge exactly once.
    pub newly_promoted: bool,
}

/// Increment a co-retrieval counter for the pair `(a, b)` at `tick`,
/// reporting whether this hit crosses the promotion threshold.
#[must_use]
pub fn record_coretrieval_hit(
    existing: Option<CoRetrievalCounter>,
    a: Uuid,
    b: Uuid,
    tick: u64,
    promotion_threshold: u32,
) -> CoRetrievalOutcome {
    let (key_a, key_b) = CoRetrievalCounter::key(a, b);
    let previous_hits = existing.as_ref().map_or(0, |c| c.hits);
    let hits = previous_hits + 1;
    let newly_promoted = previous_hits < promotion_threshold && hits >= promotion_threshold;
    CoRetrievalOutcome {
        counter: CoRetrievalCounter {
            a: key_a,
            b: key_b,
            hits,
            last_tick: tick,
        },
        newly_promoted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationshipOrigin;

    fn rel(from: Uuid, to: Uuid, rel_type: RelationshipType, weight: f32) -> Relationship {
        Relationship::new(from, to, rel_type, RelationshipOrigin::Explicit, weight)
    }

    #[test]
    fn single_hop_transitive_edge_is_reached() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let adjacency = Adjacency::build(&[rel(a, b, RelationshipType::BuildsOn, 1.0)]);
        let seeds = HashSet::from([a]);
        let scores = traverse(&adjacency, &seeds, 2, 0.0, |_| Some(ChunkStatus::Active));
        assert!(scores.contains_key(&b));
    }

    #[test]
    fn second_hop_requires_transitive_type() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let adjacency = Adjacency::build(&[
            rel(a, b, RelationshipType::BuildsOn, 1.0),
            rel(b, c, RelationshipType::Supports, 1.0), // not transitive
        ]);
        let seeds = HashSet::from([a]);
        let scores = traverse(&adjacency, &seeds, 2, 0.0, |_| Some(ChunkStatus::Active));
        assert!(scores.contains_key(&b));
        assert!(!scores.contains_key(&c));
    }

    #[test]
    fn archived_chunks_are_discarded() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let adjacency = Adjacency::build(&[rel(a, b, RelationshipType::RelatedTo, 1.0)]);
        let seeds = HashSet::from([a]);
        let scores = traverse(&adjacency, &seeds, 2, 0.0, |_| Some(ChunkStatus::Archived));
        assert!(!scores.contains_key(&b));
    }

    #[test]
    fn symmetric_edges_are_traversed_from_either_endpoint() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let adjacency = Adjacency::build(&[rel(b, a, RelationshipType::RelatedTo, 0.9)]);
        let seeds = HashSet::from([a]);
        let scores = traverse(&adjacency, &seeds, 2, 0.0, |_| Some(ChunkStatus::Active));
        assert!(scores.contains_key(&b));
    }

    #[test]
    fn min_weight_cutoff_discards_weak_paths() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let adjacency = Adjacency::build(&[rel(a, b, RelationshipType::Contradicts, 0.1)]);
        let seeds = HashSet::from([a]);
        let scores = traverse(&adjacency, &seeds, 2, 0.5, |_| Some(ChunkStatus::Active));
        assert!(!scores.contains_key(&b));
    }

    #[test]
    fn coretrieval_promotes_exactly_once() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut counter = None;
        let mut promotions = 0;
        for tick in 0..6 {
            let outcome = record_coretrieval_hit(counter.clone(), a, b, tick, 4);
            if outcome.newly_promoted {
                promotions += 1;
            }
            counter = Some(outcome.counter);
        }
        assert_eq!(promotions, 1);
        assert_eq!(counter.unwrap().hits, 6);
    }
}
