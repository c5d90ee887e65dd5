pub mod health;
pub mod pages;
pub mod posts;
pub mod preview;

use crate::config::Config;
use crate::db::Repository;
use crate::error::AppError;
use axum::response::{IntoResponse, Response};
use axum::{
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self { repo, config }
    }
}

pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(posts::index))
        .route("/posts", get(posts::list_posts))
        .route("/create", post(posts::create_post))
        .route("/delete", post(posts::delete_post))
        .route("/preview", post(preview::preview))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .nest_service("/static", ServeDir::new(&state.config.static_dir));

    with_middleware(routes).with_state(state)
}

/// Panic recovery, request tracing and CORS, applied to every route.
pub fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// A panicking handler gets the same generic 500 page as any other internal fault.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}
