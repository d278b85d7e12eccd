//! Feature-hashing encoder
//!
//! Hashes lower-cased words and their character trigrams into a fixed number
//! of buckets. Texts sharing vocabulary end up with a high cosine
//! similarity, which is enough to exercise the ranking pipeline without
//! downloading a model.

use super::TextEncoder;
use shopkeeper_core::{Error, Result, Vector};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub const DEFAULT_HASH_DIM: usize = 384;

const WORD_WEIGHT: f32 = 2.0;
const TRIGRAM_WEIGHT: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
    name: String,
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Encoder("hashing encoder needs at least one dimension".to_string()));
        }
        Ok(Self {
            dim,
            name: format!("hashing-{}", dim),
        })
    }

    fn bucket<T: Hash + ?Sized>(&self, feature: &T) -> usize {
        // DefaultHasher::new() uses fixed keys, so buckets are stable across runs.
        let mut hasher = DefaultHasher::new();
        feature.hash(&mut hasher);
        (hasher.finish() % self.dim as u64) as usize
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self {
            dim: DEFAULT_HASH_DIM,
            name: format!("hashing-{}", DEFAULT_HASH_DIM),
        }
    }
}

impl TextEncoder for HashingEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn encode(&self, text: &str) -> Result<Vector> {
        let mut data = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();

        for word in lowered.split_whitespace() {
            data[self.bucket(word)] += WORD_WEIGHT;

            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                data[self.bucket(trigram.as_str())] += TRIGRAM_WEIGHT;
            }
        }

        Ok(Vector::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let encoder = HashingEncoder::new(64).unwrap();
        let a = encoder.encode("Red Summer Dress").unwrap();
        let b = encoder.encode("red   summer dress").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dim(), 64);
    }

    #[test]
    fn test_shared_words_are_closer() {
        let encoder = HashingEncoder::default();
        let query = encoder.encode("leather boots").unwrap();
        let boots = encoder.encode("black leather boots for hiking").unwrap();
        let dress = encoder.encode("light floral summer dress").unwrap();

        let near = query.cosine_similarity(&boots).unwrap();
        let far = query.cosine_similarity(&dress).unwrap();
        assert!(near > far, "expected {} > {}", near, far);
    }

    #[test]
    fn test_blank_text_is_zero_vector() {
        let encoder = HashingEncoder::new(16).unwrap();
        let v = encoder.encode("   ").unwrap();
        assert_eq!(v, Vector::zeros(16));
    }

    #[test]
    fn test_encode_many_preserves_order() {
        let encoder = HashingEncoder::new(32).unwrap();
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let vectors = encoder.encode_many(&texts).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], encoder.encode("alpha").unwrap());
        assert_eq!(vectors[1], encoder.encode("beta").unwrap());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(HashingEncoder::new(0), Err(Error::Encoder(_))));
    }
}
