//! Text encoders
//!
//! The ranking pipeline treats text-to-vector encoding as a black box behind
//! [`TextEncoder`]. Two implementations ship with the crate:
//!
//! - [`HashingEncoder`]: deterministic feature hashing, no model required
//! - `FastEmbedEncoder` (feature `fastembed`): sentence-transformer models
//!   run locally through fastembed/ONNX

mod hashing;
#[cfg(feature = "fastembed")]
mod fastembed_model;

pub use hashing::{HashingEncoder, DEFAULT_HASH_DIM};
#[cfg(feature = "fastembed")]
pub use fastembed_model::FastEmbedEncoder;

use shopkeeper_core::{Result, Vector};

/// Model name used when none is configured
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Turns text into embedding vectors of a fixed dimension.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector. Output does not need to be normalized.
pub trait TextEncoder: Send + Sync {
    /// Human-readable model identifier
    fn name(&self) -> &str;

    /// Dimension of every vector this encoder produces
    fn dimensions(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vector>;

    /// Encode many texts, preserving order.
    fn encode_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}
