//! In-memory fixed-dimension vector index with cosine similarity search.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Linear-scan cosine-similarity index, scoped to one project.
///
/// Acceptable up to roughly `10^4` chunks per project, per the component
/// design. Hot-loaded from the store on [`crate::engine::Engine`]
/// construction and kept in sync with every store write inside the same
/// critical section.
#[derive(Default)]
pub struct VectorIndex {
    vectors: RwLock<HashMap<Uuid, Vec<f32>>>,
}

impl VectorIndex {
    /// Construct an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a chunk's embedding.
    ///
    /// Returns `false` without inserting if `vector` has zero norm — the
    /// component design requires rejecting such vectors at insert time.
    pub fn upsert(&self, chunk_id: Uuid, vector: Vec<f32>) -> bool {
        if norm(&vector) == 0.0 {
            return false;
        }
        self.vectors.write().insert(chunk_id, vector);
        true
    }

    /// Remove a chunk's embedding (tombstone or delete).
    pub fn remove(&self, chunk_id: Uuid) {
        self.vectors.write().remove(&chunk_id);
    }

    /// Number of indexed vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    /// Whether the index holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-`k` chunks by cosine similarity to `query`, filtered to
    /// `cosine >= min_similarity`, sorted descending by similarity then by
    /// identity for determinism among ties.
    #[must_use]
    pub fn search(&self, query: &[f32], k: usize, min_similarity: f32) -> Vec<(Uuid, f32)> {
        let query_norm = norm(query);
        if query_norm == 0.0 {
            return Vec::new();
        }
        let vectors = self.vectors.read();
        let mut scored: Vec<(Uuid, f32)> = vectors
            .iter()
            .filter_map(|(id, vec)| {
                let sim = cosine(query, vec, query_norm)?;
                (sim >= min_similarity).then_some((*id, sim))
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity between two vectors of equal length, or `None` if the
/// lengths differ or either vector has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    let a_norm = norm(a);
    if a_norm == 0.0 {
        return None;
    }
    cosine(a, b, a_norm)
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(query: &[f32], other: &[f32], query_norm: f32) -> Option<f32> {
    if query.len() != other.len() {
        return None;
    }
    let other_norm = norm(other);
    if other_norm == 0.0 {
        return None;
    }
    let dot: f32 = query.iter().zip(other.iter()).map(|(a, b)| a * b).sum();
    Some(dot / (query_norm * other_norm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_norm_vector_is_rejected() {
        let idx = VectorIndex::new();
        assert!(!idx.upsert(Uuid::new_v4(), vec![0.0, 0.0]));
        assert!(idx.is_empty());
    }

    #[test]
    fn search_orders_by_similarity_descending() {
        let idx = VectorIndex::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        idx.upsert(a, vec![1.0, 0.0]);
        idx.upsert(b, vec![0.9, 0.1]);

        let results = idx.search(&[1.0, 0.0], 10, 0.0);
        assert_eq!(results[0].0, a);
        assert!((results[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn search_respects_min_similarity_cutoff() {
        let idx = VectorIndex::new();
        idx.upsert(Uuid::new_v4(), vec![0.0, 1.0]);
        let results = idx.search(&[1.0, 0.0], 10, 0.5);
        assert!(results.is_empty());
    }

    #[test]
    fn search_caps_at_k() {
        let idx = VectorIndex::new();
        for _ in 0..5 {
            idx.upsert(Uuid::new_v4(), vec![1.0, 0.0]);
        }
        assert_eq!(idx.search(&[1.0, 0.0], 2, 0.0).len(), 2);
    }
}
