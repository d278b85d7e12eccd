//! Exact similarity index.
//!
//! Every catalog vector is normalized once at build time; a query is
//! normalized and scored against all of them with an inner product, which
//! for unit vectors is cosine similarity. The catalog is small, so the scan
//! is exhaustive and the result is exact.

use crate::{Error, Result, Vector};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One scored catalog position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: usize,
    pub score: f32,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    position: usize,
    vector: Vector,
}

/// Heap element ordered so that the *worst* hit compares greatest.
///
/// Worse means a lower score, or an equal score at a higher catalog
/// position. Keeping a max-heap of these bounded at k leaves the k best
/// at the end of the scan, with the current cut-off always at the top.
#[derive(Clone, Copy, PartialEq, Eq)]
struct Candidate {
    score: OrderedFloat<f32>,
    position: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Read-only index over one normalized vector per catalog item.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    dim: usize,
    entries: Vec<IndexEntry>,
}

impl SimilarityIndex {
    /// Build from raw (not necessarily normalized) vectors in catalog order.
    pub fn build(vectors: Vec<Vector>) -> Result<Self> {
        let dim = match vectors.first() {
            Some(v) => v.dim(),
            None => return Err(Error::EmptyCatalog),
        };

        let mut entries = Vec::with_capacity(vectors.len());
        for (position, mut vector) in vectors.into_iter().enumerate() {
            if vector.dim() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: vector.dim(),
                });
            }
            vector.normalize();
            entries.push(IndexEntry { position, vector });
        }

        Ok(Self { dim, entries })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built index; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The stored (normalized) vector for a catalog position.
    pub fn vector(&self, position: usize) -> Option<&Vector> {
        self.entries.get(position).map(|e| &e.vector)
    }

    /// Return up to `k` hits ordered by score descending, ties broken by
    /// ascending catalog position.
    ///
    /// The query does not need to be normalized. A `k` larger than the
    /// catalog returns every item.
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<Hit>> {
        if k == 0 {
            return Err(Error::InvalidK(k));
        }
        if query.dim() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let query = query.normalized();
        let capacity = k.min(self.entries.len());
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(capacity + 1);

        for entry in &self.entries {
            let candidate = Candidate {
                score: OrderedFloat(entry.vector.dot(&query)?),
                position: entry.position,
            };

            if heap.len() < capacity {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        // Ascending in `Candidate` order is best-first.
        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| Hit {
                position: c.position,
                score: c.score.into_inner(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vector> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vector::new((0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect()))
            .collect()
    }

    fn brute_force(vectors: &[Vector], query: &Vector) -> Vec<Hit> {
        let q = query.normalized();
        let mut hits: Vec<Hit> = vectors
            .iter()
            .enumerate()
            .map(|(position, v)| Hit {
                position,
                score: v.normalized().dot(&q).unwrap(),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits
    }

    #[test]
    fn test_build_empty_rejected() {
        assert!(matches!(SimilarityIndex::build(Vec::new()), Err(Error::EmptyCatalog)));
    }

    #[test]
    fn test_build_mixed_dimensions_rejected() {
        let vectors = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![1.0, 0.0, 0.0])];
        assert!(matches!(
            SimilarityIndex::build(vectors),
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_build_normalizes_entries() {
        let index = SimilarityIndex::build(vec![
            Vector::new(vec![3.0, 4.0]),
            Vector::new(vec![0.0, 0.0]),
        ])
        .unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dim(), 2);
        assert!((index.vector(0).unwrap().norm() - 1.0).abs() < 1e-6);
        assert_eq!(index.vector(1).unwrap().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_search_invalid_k() {
        let index = SimilarityIndex::build(vec![Vector::new(vec![1.0, 0.0])]).unwrap();
        let result = index.search(&Vector::new(vec![1.0, 0.0]), 0);
        assert!(matches!(result, Err(Error::InvalidK(0))));
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let index = SimilarityIndex::build(vec![Vector::new(vec![1.0, 0.0])]).unwrap();
        let result = index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 1);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_search_k_larger_than_catalog() {
        let index = SimilarityIndex::build(random_vectors(5, 8, 1)).unwrap();
        let hits = index.search(&Vector::new(vec![0.5; 8]), 20).unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_self_similarity_is_top_hit() {
        let vectors = random_vectors(50, 16, 7);
        let index = SimilarityIndex::build(vectors.clone()).unwrap();
        for (position, raw) in vectors.iter().enumerate() {
            let hits = index.search(raw, 1).unwrap();
            assert_eq!(hits[0].position, position);
            assert!((hits[0].score - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_matches_brute_force() {
        let vectors = random_vectors(200, 32, 3);
        let index = SimilarityIndex::build(vectors.clone()).unwrap();
        let query = random_vectors(1, 32, 99).remove(0);

        let expected = brute_force(&vectors, &query);
        let hits = index.search(&query, 10).unwrap();
        let expected_positions: Vec<usize> = expected.iter().take(10).map(|h| h.position).collect();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, expected_positions);
    }

    #[test]
    fn test_top_k_prefix_property() {
        let vectors = random_vectors(100, 24, 11);
        let index = SimilarityIndex::build(vectors).unwrap();
        let query = random_vectors(1, 24, 12).remove(0);

        let full = index.search(&query, 30).unwrap();
        for k in [1, 5, 10, 29] {
            let partial = index.search(&query, k).unwrap();
            assert_eq!(partial.as_slice(), &full[..k]);
        }
    }

    #[test]
    fn test_ties_broken_by_position() {
        let index = SimilarityIndex::build(vec![
            Vector::new(vec![0.0, 1.0]),
            Vector::new(vec![1.0, 0.0]),
            Vector::new(vec![2.0, 0.0]),
            Vector::new(vec![1.0, 0.0]),
        ])
        .unwrap();

        let hits = index.search(&Vector::new(vec![1.0, 0.0]), 2).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 2]);

        let all = index.search(&Vector::new(vec![1.0, 0.0]), 4).unwrap();
        let positions: Vec<usize> = all.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let index = SimilarityIndex::build(random_vectors(4, 6, 5)).unwrap();
        let hits = index.search(&Vector::zeros(6), 4).unwrap();
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|h| h.score == 0.0));
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }
}
