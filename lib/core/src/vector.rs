use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A dense embedding: one catalog item or one query in embedding space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Euclidean length
    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm(&self.data)
    }

    /// Inner product. For unit-length operands this is the cosine similarity.
    #[inline]
    pub fn dot(&self, other: &Vector) -> Result<f32> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(crate::simd::dot_product(&self.data, &other.data))
    }

    /// Cosine similarity that does not assume unit length.
    /// Returns 0.0 if either side is the zero vector.
    pub fn cosine_similarity(&self, other: &Vector) -> Result<f32> {
        let dot = self.dot(other)?;
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok(dot / denom)
    }

    /// Scale to unit length in place.
    ///
    /// The all-zero vector has no direction and is left untouched, so the
    /// result never contains NaN.
    #[inline]
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for x in &mut self.data {
                *x /= norm;
            }
        }
    }

    /// Get normalized copy
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
