//! # Shopkeeper Core
//!
//! Core data structures for the Shopkeeper semantic product search:
//!
//! - [`Vector`] - Dense embedding with normalization and inner product
//! - [`Item`] - A catalog product
//! - [`Catalog`] - Immutable ordered catalog with precomputed searchable text
//! - [`SimilarityIndex`] - Exact cosine top-k search over the catalog
//!
//! ## Example
//!
//! ```rust
//! use shopkeeper_core::{SimilarityIndex, Vector};
//!
//! let index = SimilarityIndex::build(vec![
//!     Vector::new(vec![1.0, 0.0, 0.0]),
//!     Vector::new(vec![0.0, 1.0, 0.0]),
//! ])
//! .unwrap();
//!
//! let hits = index.search(&Vector::new(vec![2.0, 0.1, 0.0]), 1).unwrap();
//! assert_eq!(hits[0].position, 0);
//! ```

pub mod catalog;
pub mod error;
pub mod index;
pub mod item;
pub mod vector;

/// Inner product and norm kernels
///
/// - AVX2/FMA on x86_64
/// - NEON on ARM64/Apple Silicon
/// - Unrolled scalar fallback elsewhere
pub mod simd;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use index::{Hit, SimilarityIndex};
pub use item::{Item, ItemId};
pub use vector::Vector;
