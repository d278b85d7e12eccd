//! # Shopkeeper
//!
//! Semantic product search for The Shopkeeper catalog.
//!
//! Products are embedded once at startup into an exact cosine similarity
//! index. Each query is embedded the same way, the nearest products are
//! retrieved, nudged by the shopper's color and budget preferences, and
//! returned with short reasons drawn from the product's own tags.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! shopkeeper --catalog ./data/products.json --http-port 8000
//! curl -X POST localhost:8000/search \
//!      -H 'content-type: application/json' \
//!      -d '{"query": "red summer dress", "top_k": 3}'
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use shopkeeper::prelude::*;
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new(vec![
//!     Item::new(1, "Red Summer Dress", "dresses", 59.0).with_colors(&["red"]),
//!     Item::new(2, "Wool Winter Coat", "outerwear", 240.0).with_seasons(&["winter"]),
//! ])
//! .unwrap();
//!
//! let ready = ReadyIndex::build(catalog, Arc::new(HashingEncoder::default())).unwrap();
//! let pipeline = RankingPipeline::with_index(ready, PipelineConfig::default());
//!
//! let request = SearchRequest::new("winter coat", 1)
//!     .with_preferences(UserPreferences::new().with_budget(Budget::High));
//! let response = pipeline.search(&request).unwrap();
//! assert_eq!(response.results[0].item.id, 2);
//! ```
//!
//! ## Crate Structure
//!
//! - `shopkeeper-core` - Items, catalog, vectors and the exact similarity index
//! - `shopkeeper-ranking` - Encoders, personalization boost, explanations, pipeline
//! - `shopkeeper-api` - REST API (health and search)

// Re-export core types
pub use shopkeeper_core::{
    Catalog, Error, Hit, Item, ItemId, Result, SimilarityIndex, Vector,
};

// Re-export ranking
pub use shopkeeper_ranking::{
    boost, explain, Budget, HashingEncoder, PipelineConfig, RankingPipeline, ReadyIndex,
    ScoredResult, SearchRequest, SearchResponse, TextEncoder, UserPreferences,
    DEFAULT_HASH_DIM, DEFAULT_MAX_TOP_K, DEFAULT_MODEL, DEFAULT_TOP_K, MAX_MATCH_REASONS,
};
#[cfg(feature = "fastembed")]
pub use shopkeeper_ranking::FastEmbedEncoder;

// Re-export API
pub use shopkeeper_api::{RateLimitConfig, RateLimiter, RestApi, ServerConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Budget, Catalog, Error, HashingEncoder, Item, ItemId, PipelineConfig, RankingPipeline,
        ReadyIndex, Result, SearchRequest, SearchResponse, TextEncoder, UserPreferences, Vector,
    };
}

/// SIMD-optimized vector operations
pub mod simd {
    pub use shopkeeper_core::simd::{dot_product, norm};
}
