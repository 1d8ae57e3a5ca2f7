//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/v1/health", get(handlers::health_check))
        // Package records
        .route(
            "/v1/apks",
            get(handlers::list_apks).post(handlers::create_apk),
        )
        // Static segments must be registered alongside /{id}; axum gives them priority.
        .route("/v1/apks/simple", get(handlers::simple_apks))
        .route("/v1/apks/by-name/{name}", get(handlers::get_apk_by_name))
        .route("/v1/apks/{id}", get(handlers::get_apk))
        .route("/v1/apks/{id}", put(handlers::update_apk))
        .route("/v1/apks/{id}", delete(handlers::delete_apk))
        // Bundle correlations
        .route(
            "/v1/correlations",
            get(handlers::list_corrs).post(handlers::create_corr),
        )
        .route(
            "/v1/correlations/by-bundle/{bundle}",
            get(handlers::get_corr_by_bundle),
        )
        .route("/v1/correlations/{id}", get(handlers::get_corr))
        .route("/v1/correlations/{id}", put(handlers::update_corr))
        .route("/v1/correlations/{id}", delete(handlers::delete_corr));

    // Key-gated static index page
    let index_routes = Router::new().route("/", get(handlers::serve_index));

    Router::new()
        .merge(api_routes)
        .merge(index_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
