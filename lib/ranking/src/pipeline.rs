//! Retrieve-then-rerank ranking pipeline
//!
//! One request runs: encode query → normalize → exact top-k search →
//! personalization boost → re-sort by boosted score → explain.
//!
//! Only the top-k retrieved by base similarity are boosted. An item outside
//! that set is never promoted into the results, however large its boost
//! would have been.

use crate::boost::boost;
use crate::encoder::TextEncoder;
use crate::explain::{explain_terms, QueryTerms};
use crate::preferences::UserPreferences;
use shopkeeper_core::{Catalog, Error, Item, Result, SimilarityIndex};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Largest `top_k` accepted by default
pub const DEFAULT_MAX_TOP_K: usize = 20;
/// `top_k` used when a request does not specify one
pub const DEFAULT_TOP_K: usize = 5;

/// Pipeline limits
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_top_k: DEFAULT_MAX_TOP_K,
        }
    }
}

/// A validated search request
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub preferences: UserPreferences,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            preferences: UserPreferences::default(),
        }
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// One ranked item
#[derive(Debug, Clone)]
pub struct ScoredResult<'a> {
    pub item: &'a Item,
    /// Catalog position the item was retrieved from
    pub position: usize,
    /// Cosine similarity before personalization
    pub base_score: f32,
    /// Base score plus boosts, rounded to 4 decimal digits
    pub score: f64,
    pub match_reasons: Vec<String>,
}

/// Ranked results for one request
#[derive(Debug, Clone)]
pub struct SearchResponse<'a> {
    pub results: Vec<ScoredResult<'a>>,
    pub query: String,
    pub total_results: usize,
}

/// Catalog, index and encoder, built once and immutable afterwards.
///
/// There is no way to mutate a `ReadyIndex` after [`ReadyIndex::build`],
/// so it can be shared across request handlers without locking.
pub struct ReadyIndex {
    catalog: Catalog,
    index: SimilarityIndex,
    encoder: Arc<dyn TextEncoder>,
}

impl std::fmt::Debug for ReadyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyIndex")
            .field("items", &self.catalog.len())
            .field("dim", &self.index.dim())
            .field("encoder", &self.encoder.name())
            .finish()
    }
}

impl ReadyIndex {
    /// Embed every item's searchable text and build the similarity index.
    pub fn build(catalog: Catalog, encoder: Arc<dyn TextEncoder>) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let started = Instant::now();
        let vectors = encoder.encode_many(catalog.texts())?;
        if vectors.len() != catalog.len() {
            return Err(Error::Encoder(format!(
                "encoder returned {} vectors for {} items",
                vectors.len(),
                catalog.len()
            )));
        }

        let index = SimilarityIndex::build(vectors)?;
        if index.dim() != encoder.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: encoder.dimensions(),
                actual: index.dim(),
            });
        }

        tracing::info!(
            items = catalog.len(),
            dim = index.dim(),
            encoder = encoder.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Indexed catalog"
        );

        Ok(Self {
            catalog,
            index,
            encoder,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    pub fn encoder(&self) -> &dyn TextEncoder {
        self.encoder.as_ref()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    /// Never true: building rejects an empty catalog.
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Run one request. `top_k` must already be within the configured range.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse<'_>> {
        let query_vector = self.encoder.encode(&request.query)?.normalized();
        let hits = self.index.search(&query_vector, request.top_k)?;
        let terms = QueryTerms::new(&request.query);

        let mut results: Vec<ScoredResult<'_>> = hits
            .into_iter()
            .filter_map(|hit| {
                let item = self.catalog.get(hit.position)?;
                let boosted = f64::from(hit.score) + boost(item, &request.preferences);
                Some(ScoredResult {
                    item,
                    position: hit.position,
                    base_score: hit.score,
                    score: round4(boosted),
                    match_reasons: explain_terms(item, &terms),
                })
            })
            .collect();

        // Stable, so equal boosted scores keep retrieval order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            query = %request.query,
            top_k = request.top_k,
            results = results.len(),
            "Search complete"
        );

        Ok(SearchResponse {
            total_results: results.len(),
            query: request.query.clone(),
            results,
        })
    }
}

/// Entry point shared by every request handler.
///
/// Starts empty; the [`ReadyIndex`] is installed exactly once when startup
/// finishes building it. Until then searches fail with [`Error::NotReady`].
#[derive(Debug, Default)]
pub struct RankingPipeline {
    ready: OnceLock<ReadyIndex>,
    config: PipelineConfig,
}

impl RankingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            ready: OnceLock::new(),
            config,
        }
    }

    /// Pipeline that is ready from the start
    pub fn with_index(ready: ReadyIndex, config: PipelineConfig) -> Self {
        let pipeline = Self::new(config);
        // A fresh cell cannot already be set.
        let _ = pipeline.ready.set(ready);
        pipeline
    }

    /// Install the built index. Returns it back if one was already installed.
    pub fn install(&self, ready: ReadyIndex) -> std::result::Result<(), ReadyIndex> {
        self.ready.set(ready)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get().is_some()
    }

    pub fn ready_index(&self) -> Option<&ReadyIndex> {
        self.ready.get()
    }

    /// Number of indexed items, 0 while initializing
    pub fn indexed_count(&self) -> usize {
        self.ready.get().map_or(0, ReadyIndex::len)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse<'_>> {
        let ready = self.ready.get().ok_or(Error::NotReady)?;
        if request.top_k == 0 || request.top_k > self.config.max_top_k {
            return Err(Error::InvalidK(request.top_k));
        }
        ready.search(request)
    }
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
