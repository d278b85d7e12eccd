use crate::config::ServerConfig;
use crate::rate_limit::{RateLimitDecision, RateLimiter};
use actix_cors::Cors;
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use shopkeeper_core::{Error, ItemId};
use shopkeeper_ranking::{
    RankingPipeline, ScoredResult, SearchRequest, UserPreferences, DEFAULT_TOP_K,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

/// Longest accepted query, in characters
pub const MAX_QUERY_CHARS: usize = 500;
pub const INDEX_TYPE: &str = "exact inner product (cosine)";

/// Rate limit bucket for requests without a peer address
const UNKNOWN_CLIENT: &str = "unknown";

/// Shared by every worker
pub struct ApiState {
    pipeline: Arc<RankingPipeline>,
    model: String,
    limiter: RateLimiter,
    trusted_proxies: AHashSet<IpAddr>,
}

impl ApiState {
    pub fn new(pipeline: Arc<RankingPipeline>, model: impl Into<String>, limiter: RateLimiter) -> Self {
        Self {
            pipeline,
            model: model.into(),
            limiter,
            trusted_proxies: AHashSet::new(),
        }
    }

    /// Peers whose `X-Forwarded-For` header is believed.
    #[must_use]
    pub fn with_trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies = proxies.into_iter().collect();
        self
    }

    /// Rate limit key: the socket peer's IP. Only a trusted proxy may name
    /// the client, through the last `X-Forwarded-For` entry it appended.
    fn client_key(&self, req: &HttpRequest) -> String {
        let peer = match req.peer_addr() {
            Some(addr) => addr.ip(),
            None => return UNKNOWN_CLIENT.to_string(),
        };
        if !self.trusted_proxies.contains(&peer) {
            return peer.to_string();
        }

        req.headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
            .and_then(|header| {
                header
                    .rsplit(',')
                    .map(str::trim)
                    .find(|part| !part.is_empty())
            })
            .and_then(|part| part.parse::<IpAddr>().ok())
            .unwrap_or(peer)
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct SearchRequestBody {
    query: String,
    #[serde(default = "default_top_k")]
    top_k: i64,
    #[serde(default)]
    user_preferences: UserPreferences,
}

fn default_top_k() -> i64 {
    DEFAULT_TOP_K as i64
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum ValidationError {
    #[error("query must not be blank")]
    BlankQuery,
    #[error("query must be at most {max} characters")]
    QueryTooLong { max: usize },
    #[error("top_k must be between 1 and {max}, got {got}")]
    TopKOutOfRange { got: i64, max: usize },
}

impl SearchRequestBody {
    fn validate(self, max_top_k: usize) -> Result<SearchRequest, ValidationError> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::BlankQuery);
        }
        if self.query.chars().count() > MAX_QUERY_CHARS {
            return Err(ValidationError::QueryTooLong {
                max: MAX_QUERY_CHARS,
            });
        }
        let top_k = usize::try_from(self.top_k)
            .ok()
            .filter(|k| (1..=max_top_k).contains(k))
            .ok_or(ValidationError::TopKOutOfRange {
                got: self.top_k,
                max: max_top_k,
            })?;
        Ok(SearchRequest::new(self.query, top_k).with_preferences(self.user_preferences))
    }
}

/// One ranked product as returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResult {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub subcategory: Option<String>,
    pub gender: Option<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub tags: Vec<String>,
    pub occasions: Vec<String>,
    pub seasons: Vec<String>,
    pub rating: f64,
    pub reviews: u32,
    pub stock: u32,
    pub similarity_score: f64,
    pub match_reasons: Vec<String>,
}

impl From<ScoredResult<'_>> for ProductResult {
    fn from(result: ScoredResult<'_>) -> Self {
        let item = result.item;
        Self {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            category: item.category.clone(),
            subcategory: item.subcategory.clone(),
            gender: item.gender.clone(),
            colors: item.colors.clone(),
            sizes: item.sizes.clone(),
            tags: item.tags.clone(),
            occasions: item.occasions.clone(),
            seasons: item.seasons.clone(),
            rating: item.rating,
            reviews: item.reviews,
            stock: item.stock,
            similarity_score: result.score,
            match_reasons: result.match_reasons,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponseBody {
    pub products: Vec<ProductResult>,
    pub query: String,
    pub search_time_ms: u64,
    pub total_results: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub products_indexed: usize,
    pub model: String,
    pub index_type: String,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(
        pipeline: Arc<RankingPipeline>,
        model: String,
        config: ServerConfig,
    ) -> std::io::Result<()> {
        let limiter = RateLimiter::new(config.rate_limit.clone());
        let state = web::Data::new(
            ApiState::new(pipeline, model, limiter)
                .with_trusted_proxies(config.trusted_proxies.iter().copied()),
        );
        let origins = config.allowed_origins.clone();

        tracing::info!(
            addr = %config.bind_addr(),
            origins = ?origins,
            rate_limit = %config.rate_limit.describe(),
            "Starting HTTP server"
        );

        HttpServer::new(move || {
            let cors = origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    }
}

/// Routes and extractor settings. Expects `web::Data<ApiState>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let body = serde_json::json!({ "error": err.to_string() });
        error::InternalError::from_response(err, HttpResponse::UnprocessableEntity().json(body))
            .into()
    }))
    .route("/health", web::get().to(health))
    .route("/search", web::post().to(search));
}

async fn health(state: web::Data<ApiState>) -> HttpResponse {
    let status = if state.pipeline.is_ready() {
        "healthy"
    } else {
        "initializing"
    };
    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        products_indexed: state.pipeline.indexed_count(),
        model: state.model.clone(),
        index_type: INDEX_TYPE.to_string(),
    })
}

async fn search(
    state: web::Data<ApiState>,
    req: HttpRequest,
    body: web::Json<SearchRequestBody>,
) -> HttpResponse {
    let client = state.client_key(&req);
    if let RateLimitDecision::Limited { retry_after } = state.limiter.check(&client) {
        tracing::warn!(client = %client, "Rate limit exceeded");
        return HttpResponse::TooManyRequests()
            .insert_header(("Retry-After", retry_after.as_secs().max(1).to_string()))
            .json(serde_json::json!({
                "error": format!("Rate limit exceeded: {}", state.limiter.config().describe())
            }));
    }

    let request = match body.into_inner().validate(state.pipeline.config().max_top_k) {
        Ok(request) => request,
        Err(e) => {
            return HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    };

    let started = Instant::now();
    let pipeline = state.pipeline.clone();
    let outcome = web::block(move || {
        pipeline.search(&request).map(|response| {
            let products = response
                .results
                .into_iter()
                .map(ProductResult::from)
                .collect::<Vec<_>>();
            (products, response.query, response.total_results)
        })
    })
    .await;

    match outcome {
        Ok(Ok((products, query, total_results))) => HttpResponse::Ok().json(SearchResponseBody {
            products,
            query,
            search_time_ms: started.elapsed().as_millis() as u64,
            total_results,
        }),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            tracing::error!(error = %e, "Search task failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Search failed"
            }))
        }
    }
}

fn error_response(err: &Error) -> HttpResponse {
    match err {
        Error::NotReady => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "Index not ready"
        })),
        Error::InvalidK(_) => HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": err.to_string()
        })),
        other => {
            tracing::error!(error = %other, "Search failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Search failed"
            }))
        }
    }
}
