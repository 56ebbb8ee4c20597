//! Chatbrewery serves a signup and login page and stores registered users
//! in PostgreSQL.

#![forbid(unsafe_code)]
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
mod router;
pub mod telemetry;
pub mod template;
pub mod user;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::header;
#[cfg(test)]
use axum::http::Method;
use axum::middleware as AxumMiddleware;
use axum::routing::{any, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

pub use error::ServerError;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub pwd: Arc<crypto::PasswordManager>,
    pub templates: template::Templates,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        );

    let assets = &state.config.assets;

    let mut routes = Router::new()
        // `GET /` goes to `index`.
        .route("/", get(router::index::handler))
        // `POST /signup` goes to `signup`, other methods are refused.
        .route(
            "/signup",
            post(router::signup::handler)
                .fallback(router::signup::method_not_allowed),
        )
        // Every `/login` request goes to `login`.
        .route("/login", any(router::login::handler))
        .nest_service("/images", ServeDir::new(&assets.images))
        .nest_service("/static", ServeDir::new(&assets.static_files))
        .fallback(router::fallback);

    // `GET /metrics` exposes Prometheus metrics when enabled.
    if let Some(handle) = state.metrics.clone() {
        routes = routes
            .route("/metrics", get(move || std::future::ready(handle.render())));
    }

    routes
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
///
/// Reads the configuration file named by `CONFIG_PATH` (or `config.yaml`),
/// connects to PostgreSQL and creates or updates tables.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file. let it in memory.
    let path = env::var("CONFIG_PATH").unwrap_or_default();
    let config = config::Configuration::default().path(path).read()?;

    let db = database::Database::new(&config.postgres).await?;

    // execute migrations scripts on start.
    db.migrate().await?;

    let pwd = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);
    let templates = template::Templates::new(&config.assets.templates);

    let metrics = if config.metrics {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    Ok(AppState {
        config,
        db,
        pwd,
        templates,
        metrics,
    })
}
