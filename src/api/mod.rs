pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
};
use tracing::warn;

use crate::{app_state::AppState, infrastructure::middleware::viewer_context_middleware};
use handlers::*;

fn v1_router(upload_limit: usize) -> Router<AppState> {
    Router::new()
        // Sessions
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))

        // Pages
        .route("/pages", get(list_pages_handler))
        .route("/pages/save", post(save_page_handler))
        .route("/pages/by-slug/{slug}", get(pages_by_slug_handler))
        .route("/pages/{id}", get(get_page_handler).delete(delete_page_handler))
        .route("/pages/{id}/preview", get(preview_page_handler))

        // Media
        .route(
            "/media",
            get(list_media_handler)
                .post(upload_media_handler)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/media/{id}", axum::routing::delete(delete_media_handler))

        .route("/dashboard", get(dashboard_handler))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The full application router: service endpoints, the v1 API and the
/// uploaded-blob file server.
pub fn create_router(state: AppState) -> Router {
    let blobs = ServeDir::new(&state.config.storage.blob_root);
    let cors = cors_layer(&state.config.server.cors_origins);
    let upload_limit = state.config.upload_body_limit();

    Router::new()
        .route("/api", get(root_handler))
        .route("/api/health", get(health_handler))
        .nest("/api/v1", v1_router(upload_limit))
        .nest_service("/blobs", blobs)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .layer(cors)
        .with_state(state)
}
