//! services/api/src/web/payloads.rs
//!
//! JSON request and response bodies for the REST API, and their conversions
//! from the core domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillpath_core::domain::{
    ActivityLog, Badge, CareerReadiness, FullProfile, LearningStats, NewActivity, ProfileSummary,
    ProfileUpdate, Skill, UserSummary,
};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Auth
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    pub email: String,
    pub name: String,
    /// Provider identifier, e.g. `google` or `github`.
    pub provider_id: String,
    pub photo_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

impl AuthResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

//=========================================================================================
// Activity
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    /// COURSE, LAB, QUIZ, PROJECT, ...
    #[serde(rename = "type")]
    pub activity_type: String,
    pub title: String,
    pub xp: i64,
    pub skill_tag: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl From<ActivityRequest> for NewActivity {
    fn from(req: ActivityRequest) -> Self {
        NewActivity {
            activity_type: req.activity_type,
            title: req.title,
            xp: req.xp,
            skill_tag: req.skill_tag,
            duration_minutes: req.duration_minutes,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLoggedResponse {
    pub status: String,
    pub new_xp: i64,
}

//=========================================================================================
// Profile
//=========================================================================================

#[derive(Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub role: Option<String>,
    pub experience_level: Option<String>,
    pub career_goal: Option<String>,
    pub bio: Option<String>,
    pub learning_style: Option<String>,
    pub current_project: Option<String>,
    pub aspiration: Option<String>,
    pub preferred_tech: Option<Vec<String>>,
}

impl From<ProfileUpdateRequest> for ProfileUpdate {
    fn from(req: ProfileUpdateRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            profile_picture_url: req.profile_picture_url,
            role: req.role,
            experience_level: req.experience_level,
            career_goal: req.career_goal,
            bio: req.bio,
            learning_style: req.learning_style,
            current_project: req.current_project,
            aspiration: req.aspiration,
            preferred_tech: req.preferred_tech,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummaryDto {
    pub career_goal: Option<String>,
    pub bio: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub name: Option<String>,
    pub email: String,
    pub profile_picture_url: Option<String>,
    pub role: Option<String>,
    pub xp: i64,
    pub level: i32,
    pub streak: i32,
    pub join_date: DateTime<Utc>,
    pub profile: Option<ProfileSummaryDto>,
}

impl From<UserSummary> for UserDto {
    fn from(user: UserSummary) -> Self {
        let role = user.profile.as_ref().and_then(|p| p.role.clone());
        UserDto {
            name: user.name,
            email: user.email,
            profile_picture_url: user.profile_picture_url,
            role,
            xp: user.xp,
            level: user.level,
            streak: user.streak,
            join_date: user.join_date,
            profile: user.profile.map(ProfileSummaryDto::from),
        }
    }
}

impl From<ProfileSummary> for ProfileSummaryDto {
    fn from(p: ProfileSummary) -> Self {
        ProfileSummaryDto {
            career_goal: p.career_goal,
            bio: p.bio,
            experience_level: p.experience_level,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillDto {
    pub id: Uuid,
    pub skill_name: String,
    pub category: String,
    pub score: i32,
    pub level: String,
}

impl From<Skill> for SkillDto {
    fn from(skill: Skill) -> Self {
        let level = skill.tier().as_str().to_string();
        SkillDto {
            id: skill.id,
            skill_name: skill.skill_name,
            category: skill.category,
            score: skill.score,
            level,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: Uuid,
    pub activity_type: String,
    pub title: String,
    pub xp_earned: i64,
    pub skill_tag: Option<String>,
    pub duration_minutes: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityLog> for ActivityDto {
    fn from(log: ActivityLog) -> Self {
        ActivityDto {
            id: log.id,
            activity_type: log.activity_type,
            title: log.title,
            xp_earned: log.xp_earned,
            skill_tag: log.skill_tag,
            duration_minutes: log.duration_minutes,
            timestamp: log.timestamp,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub awarded_at: DateTime<Utc>,
}

impl From<Badge> for BadgeDto {
    fn from(badge: Badge) -> Self {
        BadgeDto {
            id: badge.id,
            name: badge.name,
            description: badge.description,
            icon: badge.icon,
            awarded_at: badge.awarded_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerReadinessDto {
    pub score: i32,
    pub missing_skills: Vec<String>,
    pub target_role: String,
    pub readiness_level: String,
}

impl From<CareerReadiness> for CareerReadinessDto {
    fn from(r: CareerReadiness) -> Self {
        CareerReadinessDto {
            score: r.score,
            missing_skills: r.missing_skills,
            target_role: r.target_role,
            readiness_level: r.readiness_level.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_learning_hours: i64,
    pub courses_completed: i64,
    pub labs_completed: i64,
}

impl From<LearningStats> for StatsDto {
    fn from(s: LearningStats) -> Self {
        StatsDto {
            total_learning_hours: s.total_learning_hours,
            courses_completed: s.courses_completed,
            labs_completed: s.labs_completed,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FullProfileResponse {
    pub user: UserDto,
    pub skills: Vec<SkillDto>,
    pub recent_activity: Vec<ActivityDto>,
    pub badges: Vec<BadgeDto>,
    pub career_readiness: CareerReadinessDto,
    pub stats: StatsDto,
}

impl From<FullProfile> for FullProfileResponse {
    fn from(full: FullProfile) -> Self {
        FullProfileResponse {
            user: full.user.into(),
            skills: full.skills.into_iter().map(SkillDto::from).collect(),
            recent_activity: full.recent_activity.into_iter().map(ActivityDto::from).collect(),
            badges: full.badges.into_iter().map(BadgeDto::from).collect(),
            career_readiness: full.career_readiness.into(),
            stats: full.stats.into(),
        }
    }
}
