//! api-server — HTTP API for the URL Shortener workspace.
//!
//! Serves the two public operations:
//! - `POST /api/shorten` — create-or-lookup the short code for a long URL.
//! - `GET /{code}` — resolve a short code back to its original URL.
//!
//! Storage: In-memory (default for dev) or SQLite (file) when the `sqlite`
//! feature is enabled. CORS is configurable via CORS_ALLOW_ORIGIN for
//! cross-origin frontends.
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional
//! cargo run -p api-server
//!
//! # with the SQLite store at a chosen path
//! STORAGE_PROVIDER=sqlite DB_PATH=./data/mappings.db cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use domain::adapters::memory_store::InMemoryStore;
use domain::service::ShortenerService;
use domain::{CoreError, Mapping, MappingStore, ShortCode};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Local store abstraction supporting memory or sqlite (feature-gated).
enum AnyStore {
    Memory(InMemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite_adapter::SqliteStore),
}

impl AnyStore {
    fn memory() -> Self {
        Self::Memory(InMemoryStore::new())
    }

    #[cfg(feature = "sqlite")]
    fn sqlite_from_env() -> Result<Self, CoreError> {
        Ok(Self::Sqlite(sqlite_adapter::SqliteStore::from_env()?))
    }
}

impl MappingStore for AnyStore {
    fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>, CoreError> {
        match self {
            AnyStore::Memory(s) => s.find_by_code(code),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(s) => s.find_by_code(code),
        }
    }

    fn insert_unique(&self, mapping: Mapping) -> Result<(), CoreError> {
        match self {
            AnyStore::Memory(s) => s.insert_unique(mapping),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(s) => s.insert_unique(mapping),
        }
    }
}

#[derive(Clone)]
struct AppState {
    svc: Arc<ShortenerService<AnyStore>>,
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);

    let store = build_store_from_env(&cfg);
    let state = AppState {
        svc: Arc::new(ShortenerService::new(store)),
    };

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = Router::new()
        .route("/:code", get(resolve_code))
        .route("/api/shorten", post(shorten_url))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .with_state(state);

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == axum::http::HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin]))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };
    app = app.layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "api-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind port");
    axum::serve(listener, app).await.expect("server error");
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct a store instance based on config and feature flags.
fn build_store_from_env(cfg: &config::Config) -> AnyStore {
    match cfg.storage_provider {
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => match AnyStore::sqlite_from_env() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to init SqliteStore from env: {e}");
                AnyStore::memory()
            }
        },
        _ => AnyStore::memory(),
    }
}

#[derive(Deserialize)]
struct ShortenReq {
    // A missing `url` falls through to the validator as an empty string and
    // comes back as the same client error a malformed URL gets.
    #[serde(default)]
    url: String,
}

async fn resolve_code(State(state): State<AppState>, Path(code): Path<String>) -> impl IntoResponse {
    match state.svc.resolve(&code) {
        Ok(url) => {
            info!(code = %code, resolved_to = %url, "resolve ok");
            (StatusCode::OK, Json(http_common::json_ok(&url))).into_response()
        }
        Err(CoreError::InvalidCode(_)) => {
            warn!(code = %code, "bad code in path");
            (
                StatusCode::BAD_REQUEST,
                Json(http_common::json_err(http_common::ERR_INVALID_SHORT_URL)),
            )
                .into_response()
        }
        Err(CoreError::NotFound) => {
            warn!(code = %code, "resolve 404");
            (
                StatusCode::NOT_FOUND,
                Json(http_common::json_err(http_common::ERR_NO_URL_FOUND)),
            )
                .into_response()
        }
        Err(e) => {
            error!(code = %code, err = ?e, "resolve error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_err(http_common::ERR_RESOLVE_FAILED)),
            )
                .into_response()
        }
    }
}

async fn shorten_url(
    State(state): State<AppState>,
    Json(body): Json<ShortenReq>,
) -> impl IntoResponse {
    match state.svc.shorten(&body.url) {
        Ok(code) => {
            info!(code = %code.as_str(), "shorten ok");
            (StatusCode::OK, Json(http_common::json_ok(code.as_str()))).into_response()
        }
        Err(CoreError::InvalidUrl(_)) => {
            warn!("malformed url in shorten request");
            (
                StatusCode::BAD_REQUEST,
                Json(http_common::json_err(http_common::ERR_INVALID_URL)),
            )
                .into_response()
        }
        // Store failures and digest collisions both surface as a generic
        // server error; details stay in the log.
        Err(e) => {
            error!(err = ?e, "shorten error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_err(http_common::ERR_CREATE_FAILED)),
            )
                .into_response()
        }
    }
}
