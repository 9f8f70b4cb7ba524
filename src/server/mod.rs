mod handlers;
mod types;

pub use handlers::AppState;
pub use types::{ChatRequest, ErrorResponse, HealthResponse};

use crate::{
    Result,
    auth::{self, JwtVerifier},
    catalog::CatalogStorage,
    chat::ChatService,
    config::Config,
    llm::OllamaClient,
};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Builds the HTTP surface. The chat route sits behind bearer auth; the
/// health check does not. CORS wraps everything so preflights never reach
/// the auth layer.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    let chat_routes = Router::new()
        .route("/api/chat/stream", post(handlers::stream_chat))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            auth::authenticate,
        ));

    Router::new()
        .route("/api/health-check", get(handlers::health_check))
        .merge(chat_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// A non-empty `JWT_SECRET` wins over the configured secret.
fn resolve_jwt_secret(configured: &str, from_env: Option<String>) -> String {
    from_env
        .filter(|secret| !secret.trim().is_empty())
        .unwrap_or_else(|| configured.to_string())
}

pub async fn run(config: Config) -> Result<()> {
    let db_path = std::env::var("CATALOG_DB_PATH")
        .unwrap_or_else(|_| config.catalog.database_path.clone());
    let catalog = CatalogStorage::new(&db_path).await?;

    if let Some(seed_path) = &config.catalog.seed_path {
        let inserted = catalog.seed_from_file(seed_path).await?;
        info!("Seeded {} products from {}", inserted, seed_path);
    }

    let backend = OllamaClient::new(&config.llm)?;
    info!("Generation backend at {}", backend.endpoint());

    let secret = resolve_jwt_secret(&config.auth.jwt_secret, std::env::var("JWT_SECRET").ok());
    let verifier = JwtVerifier::new(&secret)?;

    let chat = ChatService::new(
        Arc::new(catalog),
        Arc::new(backend),
        &config.llm,
        config.chat.clone(),
    );

    let state = AppState {
        chat: Arc::new(chat),
        verifier: Arc::new(verifier),
    };
    let app = router(state, cors_layer(&config.server.cors_origins));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
