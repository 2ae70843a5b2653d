pub mod auth;
pub mod middleware;
pub mod payloads;
pub mod rest;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use middleware::require_auth;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the API router: public auth routes plus the token-protected routes.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(rest::health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/social", post(auth::social_login_handler))
        .route("/auth/signin/{provider}", get(auth::social_signin_redirect_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/api/activity/log", post(rest::log_activity_handler))
        .route("/api/profile/me", get(rest::get_my_profile_handler))
        .route("/users/profile", put(rest::update_profile_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
