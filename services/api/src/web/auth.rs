//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, password login and the
//! simulated federated-identity callback.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use skillpath_core::services::ExternalIdentity;
use std::sync::Arc;
use tracing::info;

use crate::error::port_error_response;
use crate::web::payloads::{AuthResponse, LoginRequest, RegisterRequest, SocialLoginRequest};
use crate::web::state::AppState;

//=========================================================================================
// Simulated Identity Providers
//=========================================================================================

/// The profile a provider would hand back after a successful OAuth exchange.
/// No real provider is contacted; each known provider maps to a fixed identity.
pub fn simulated_identity(provider: &str) -> ExternalIdentity {
    let (provider, email, name, avatar) = match provider.to_lowercase().as_str() {
        "github" => (
            "github",
            "dev_student@github.com",
            "GitHub Developer",
            "https://ui-avatars.com/api/?name=GitHub+Dev&background=0D1117&color=fff",
        ),
        "linkedin" => (
            "linkedin",
            "pro_networker@linkedin.com",
            "LinkedIn Pro",
            "https://ui-avatars.com/api/?name=LinkedIn+Pro&background=0077b5&color=fff",
        ),
        _ => (
            "google",
            "google_user@gmail.com",
            "Google User",
            "https://ui-avatars.com/api/?name=Google+User&background=DB4437&color=fff",
        ),
    };
    ExternalIdentity {
        provider: provider.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        avatar_url: Some(avatar.to_string()),
    }
}

/// Appends the token to the frontend callback URL.
pub fn callback_url(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", base, separator, token)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = state
        .auth
        .register(&req.email, &req.full_name, &req.password)
        .await
        .map_err(port_error_response)?;

    Ok((StatusCode::OK, Json(AuthResponse::bearer(token))))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = state
        .auth
        .login(&req.email, &req.password)
        .await
        .map_err(port_error_response)?;

    Ok((StatusCode::OK, Json(AuthResponse::bearer(token))))
}

/// GET /auth/signin/{provider} - Simulated OAuth callback, redirects to the frontend with a token
#[utoipa::path(
    get,
    path = "/auth/signin/{provider}",
    params(
        ("provider" = String, Path, description = "github, linkedin or google")
    ),
    responses(
        (status = 303, description = "Redirect to the frontend callback carrying the token"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn social_signin_redirect_handler(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Redirect, (StatusCode, String)> {
    let identity = simulated_identity(&provider);
    info!("Simulated {} sign-in callback", identity.provider);

    let token = state
        .auth
        .external_identity_login(identity)
        .await
        .map_err(port_error_response)?;

    Ok(Redirect::to(&callback_url(
        &state.config.frontend_callback_url,
        &token,
    )))
}

/// POST /auth/social - Federated sign-in with a provider-supplied identity, answered as JSON
#[utoipa::path(
    post,
    path = "/auth/social",
    request_body = SocialLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn social_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SocialLoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let identity = ExternalIdentity {
        provider: req.provider_id,
        email: req.email,
        name: req.name,
        avatar_url: req.photo_url,
    };
    let token = state
        .auth
        .external_identity_login(identity)
        .await
        .map_err(port_error_response)?;

    Ok(Json(AuthResponse::bearer(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_map_to_fixed_identities() {
        assert_eq!(simulated_identity("GitHub").email, "dev_student@github.com");
        assert_eq!(simulated_identity("linkedin").name, "LinkedIn Pro");
        let fallback = simulated_identity("myspace");
        assert_eq!(fallback.provider, "google");
        assert_eq!(fallback.email, "google_user@gmail.com");
        assert!(fallback.avatar_url.is_some());
    }

    #[test]
    fn callback_url_appends_token_query() {
        assert_eq!(
            callback_url("http://localhost:5173/#/auth/callback", "abc"),
            "http://localhost:5173/#/auth/callback?token=abc"
        );
        assert_eq!(
            callback_url("https://app.example/cb?from=oauth", "abc"),
            "https://app.example/cb?from=oauth&token=abc"
        );
    }
}
