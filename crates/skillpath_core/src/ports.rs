//! crates/skillpath_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or
//! signing libraries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    ActivityLog, Badge, NewActivity, NewSkill, NewUser, Profile, Skill, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, crypto).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Accounts ---

    /// Inserts the user and its profile atomically.
    /// Fails with `PortError::Conflict` when the email is already taken.
    async fn create_user_with_profile(&self, user: NewUser, profile: Profile) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<User>;

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    /// Persists the streak counter and last-active timestamp.
    async fn save_sign_in(
        &self,
        user_id: Uuid,
        streak: i32,
        last_active: DateTime<Utc>,
    ) -> PortResult<()>;

    // --- Activity Ledger ---

    /// Appends the activity and applies its XP to the user in one atomic unit,
    /// serialised against other writers of the same user row.
    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
        now: DateTime<Utc>,
    ) -> PortResult<User>;

    /// Most recent first.
    async fn get_recent_activity(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<ActivityLog>>;

    async fn count_activity(&self, user_id: Uuid) -> PortResult<i64>;

    // --- Profiles & Skills ---

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>>;

    async fn get_skills(&self, user_id: Uuid) -> PortResult<Vec<Skill>>;

    /// Idempotent: rows whose name already exists for the user (case-insensitively) are skipped.
    async fn insert_skills(&self, user_id: Uuid, skills: &[NewSkill]) -> PortResult<()>;

    /// Writes the user's editable fields, upserts the profile and seeds skills
    /// in one atomic unit.
    async fn save_profile_changes(
        &self,
        user: &User,
        profile: &Profile,
        new_skills: &[NewSkill],
    ) -> PortResult<()>;

    // --- Badges ---

    async fn get_badges(&self, user_id: Uuid) -> PortResult<Vec<Badge>>;
}

/// One-way password hashing.
pub trait PasswordHashingService: Send + Sync {
    fn hash_password(&self, password: &str) -> PortResult<String>;
    /// Returns `Ok(false)` on mismatch; errors are reserved for unusable hashes.
    fn verify_password(&self, password: &str, hashed_password: &str) -> PortResult<bool>;
}

/// Issues and verifies time-bounded bearer credentials bound to a subject email.
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &str) -> PortResult<String>;
    /// Recovers the subject, or fails with `PortError::Unauthorized`.
    fn verify(&self, token: &str) -> PortResult<String>;
}
