//! # Shopkeeper Ranking
//!
//! Semantic ranking on top of the exact similarity index in
//! `shopkeeper-core`.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Query     │────>│   Encoder   │────>│  Similarity │
//! │   (text)    │     │ (text→v)    │     │  Index top-k│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐     ┌──────┴──────┐
//!                     │   Explain   │<────│    Boost    │
//!                     │  (reasons)  │     │  + re-sort  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use shopkeeper_core::{Catalog, Item};
//! use shopkeeper_ranking::{
//!     HashingEncoder, PipelineConfig, RankingPipeline, ReadyIndex, SearchRequest,
//! };
//! use std::sync::Arc;
//!
//! let catalog = Catalog::new(vec![
//!     Item::new(1, "Red Summer Dress", "dresses", 59.0).with_tags(&["dress", "summer"]),
//!     Item::new(2, "Black Leather Boots", "footwear", 180.0).with_tags(&["boots", "leather"]),
//! ])
//! .unwrap();
//!
//! let ready = ReadyIndex::build(catalog, Arc::new(HashingEncoder::default())).unwrap();
//! let pipeline = RankingPipeline::with_index(ready, PipelineConfig::default());
//!
//! let response = pipeline.search(&SearchRequest::new("leather boots", 1)).unwrap();
//! assert_eq!(response.results[0].item.id, 2);
//! ```

pub mod boost;
pub mod encoder;
pub mod explain;
pub mod pipeline;
pub mod preferences;

pub use boost::boost;
pub use encoder::{HashingEncoder, TextEncoder, DEFAULT_HASH_DIM, DEFAULT_MODEL};
#[cfg(feature = "fastembed")]
pub use encoder::FastEmbedEncoder;
pub use explain::{explain, QueryTerms, MAX_MATCH_REASONS};
pub use pipeline::{
    PipelineConfig, RankingPipeline, ReadyIndex, ScoredResult, SearchRequest, SearchResponse,
    DEFAULT_MAX_TOP_K, DEFAULT_TOP_K,
};
pub use preferences::{Budget, UserPreferences};
