//! HTTP API for Shopkeeper semantic product search.
//!
//! Exposes `GET /health` and `POST /search` over a shared
//! [`RankingPipeline`](shopkeeper_ranking::RankingPipeline).

pub mod config;
pub mod rate_limit;
pub mod rest;

pub use config::ServerConfig;
pub use rate_limit::{RateLimitConfig, RateLimitDecision, RateLimiter};
pub use rest::{
    configure, ApiState, HealthResponse, ProductResult, RestApi, SearchResponseBody,
    MAX_QUERY_CHARS,
};
