//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the activity and profile endpoints and the
//! master definition for the OpenAPI specification.

use crate::error::port_error_response;
use crate::web::middleware::AuthenticatedUser;
use crate::web::payloads::{
    ActivityDto, ActivityLoggedResponse, ActivityRequest, AuthResponse, BadgeDto,
    CareerReadinessDto, FullProfileResponse, LoginRequest, ProfileSummaryDto,
    ProfileUpdateRequest, RegisterRequest, SkillDto, SocialLoginRequest, StatsDto,
    StatusResponse, UserDto,
};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::social_signin_redirect_handler,
        crate::web::auth::social_login_handler,
        log_activity_handler,
        get_my_profile_handler,
        update_profile_handler,
        health_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, SocialLoginRequest, AuthResponse,
            ActivityRequest, ActivityLoggedResponse,
            ProfileUpdateRequest, StatusResponse,
            FullProfileResponse, UserDto, ProfileSummaryDto, SkillDto, ActivityDto,
            BadgeDto, CareerReadinessDto, StatsDto
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "SkillPath API", description = "Learning progress, gamification and career readiness.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Record a learning activity and credit its XP to the caller.
#[utoipa::path(
    post,
    path = "/api/activity/log",
    request_body = ActivityRequest,
    responses(
        (status = 200, description = "Activity logged", body = ActivityLoggedResponse),
        (status = 400, description = "Invalid activity"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn log_activity_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(req): Json<ActivityRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let new_xp = app_state
        .activity
        .log_activity(&caller.email, req.into())
        .await
        .map_err(port_error_response)?;

    Ok(Json(ActivityLoggedResponse {
        status: "logged".to_string(),
        new_xp,
    }))
}

/// Fetch the caller's aggregated profile: summary, skills, activity, badges, stats and readiness.
#[utoipa::path(
    get,
    path = "/api/profile/me",
    responses(
        (status = 200, description = "Full profile", body = FullProfileResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<Json<FullProfileResponse>, (StatusCode, String)> {
    let full = app_state
        .profiles
        .get_full_profile(&caller.email)
        .await
        .map_err(port_error_response)?;

    Ok(Json(full.into()))
}

/// Partially update the caller's account and profile.
///
/// Absent fields are left untouched; new preferred technologies gain skill entries.
#[utoipa::path(
    put,
    path = "/users/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = StatusResponse),
        (status = 400, description = "Invalid profile field"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(req): Json<ProfileUpdateRequest>,
) -> Result<Json<StatusResponse>, (StatusCode, String)> {
    app_state
        .profiles
        .update_profile(&caller.email, req.into())
        .await
        .map_err(port_error_response)?;

    Ok(Json(StatusResponse {
        status: "success".to_string(),
    }))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = StatusResponse))
)]
pub async fn health_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}
