//! bartr matches people who want to trade items.
//!
//! Users swipe right on items they want and left on items they don't. When
//! two users swiped right on an item of the other, a match is created once
//! and only once, whatever the order or timing of the swipes.

#![forbid(unsafe_code)]

pub mod comment;
pub mod config;
mod database;
pub mod engine;
pub mod error;
pub mod item;
pub mod matching;
mod middleware;
pub mod ports;
pub mod repository;
mod router;
pub mod swipe;
pub mod telemetry;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

pub use error::ServerError;

pub type UserId = i64;
pub type ItemId = i64;
pub type MatchId = i64;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    user: Option<UserId>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        request = request.header(middleware::USER_ID_HEADER, user.to_string());
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub repository: repository::Repository,
    pub engine: engine::Engine,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the state around an already connected database.
    pub fn new(
        config: Arc<config::Configuration>,
        db: database::Database,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let repository = repository::Repository::new(db.postgres.clone());
        let engine = engine::Engine::new(Arc::new(repository.clone()), &config.matching);

        Self {
            config,
            db,
            repository,
            engine,
            metrics,
        }
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(
                    |chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                        tracing::trace!(
                            size_bytes = chunk.len(),
                            latency = ?latency,
                            "sending body chunk"
                        )
                    },
                )
                .make_span_with(
                    DefaultMakeSpan::new()
                        .include_headers(true)
                        .level(tracing::Level::INFO),
                )
                .on_request(DefaultOnRequest::new())
                .on_response(
                    DefaultOnResponse::new()
                        .include_headers(true)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        // `GET /metrics` renders Prometheus metrics.
        .route("/metrics", get(router::status::metrics))
        .merge(router::router())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let db = match config.postgres {
        Some(ref postgres) => {
            database::Database::new(
                &postgres.address,
                postgres
                    .username
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                postgres
                    .password
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                postgres
                    .database
                    .as_deref()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME),
                postgres.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            return Err("missing `postgres` configuration".into());
        },
    };

    // execute migrations scripts on start.
    db.migrate().await?;

    Ok(AppState::new(config, db, metrics))
}
