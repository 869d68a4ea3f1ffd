use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, put},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::assets::serve_embedded;
use crate::config::Cors;
use crate::handler::{self, AppState};

pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(handler::list_books).post(handler::create_book))
        .route("/books/:id", put(handler::update_book).delete(handler::delete_book))
}

pub fn cors_layer(cfg: &Cors) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if cfg.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid cors origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins)).allow_credentials(true)
}

/// The full service: catalog API, health probe, embedded UI.
pub fn app(state: AppState, cors: &Cors) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(true))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(handler::healthcheck))
        .nest("/api", book_routes())
        .fallback(serve_embedded)
        .layer(ServiceBuilder::new().layer(trace).layer(cors_layer(cors)))
        .with_state(state)
}
