//! crates/skillpath_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ports::{PortError, PortResult};
use crate::scoring;

// Represents a registered learner - the aggregate root everything else hangs off.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub xp: i64,
    pub level: i32,
    pub streak: Option<i32>,
    pub join_date: DateTime<Utc>,
    pub last_active: Option<DateTime<Utc>>,
}

impl User {
    /// Adds earned XP, stamps the user as active and raises the level when the
    /// new total crosses a level boundary. The level is never lowered here.
    ///
    /// A total that would not fit in an `i64` is rejected and leaves the user unchanged.
    pub fn apply_xp(&mut self, xp_earned: i64, now: DateTime<Utc>) -> PortResult<()> {
        self.xp = self
            .xp
            .checked_add(xp_earned)
            .ok_or_else(|| PortError::Validation("xp total out of range".to_string()))?;
        self.last_active = Some(now);
        let new_level = scoring::level_for_xp(self.xp);
        if new_level > self.level {
            self.level = new_level;
        }
        Ok(())
    }

    /// Runs the consecutive-day bookkeeping performed on every successful sign-in.
    pub fn record_sign_in(&mut self, now: DateTime<Utc>) {
        self.streak = Some(scoring::next_streak(self.streak, self.last_active, now));
        self.last_active = Some(now);
    }
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// Everything needed to insert a brand new account row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The optional one-to-one extension of a `User`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub role: Option<String>,
    pub experience_level: Option<String>,
    pub career_goal: Option<String>,
    pub bio: Option<String>,
    pub learning_style: Option<String>,
    pub current_project: Option<String>,
    pub aspiration: Option<String>,
    pub preferred_tech: Option<Vec<String>>,
}

impl Profile {
    pub const DEFAULT_BIO: &'static str = "Ready to accelerate my career!";
    pub const DEFAULT_CAREER_GOAL: &'static str = "Software Engineer";
    /// Longest bio the store accepts, in characters.
    pub const MAX_BIO_CHARS: usize = 1000;

    /// The profile every freshly created account starts with.
    pub fn seeded() -> Self {
        Self {
            bio: Some(Self::DEFAULT_BIO.to_string()),
            career_goal: Some(Self::DEFAULT_CAREER_GOAL.to_string()),
            ..Self::default()
        }
    }
}

/// A single, immutable learning event.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub title: String,
    pub xp_earned: i64,
    pub skill_tag: Option<String>,
    /// `None` only for rows written before durations were tracked.
    pub duration_minutes: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

/// A learning event as submitted by the caller, before it is stored.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub activity_type: String,
    pub title: String,
    pub xp: i64,
    pub skill_tag: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl NewActivity {
    /// Turns the request into a ledger row. A missing duration is stored as 0.
    pub fn into_log(self, user_id: Uuid, timestamp: DateTime<Utc>) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            user_id,
            activity_type: self.activity_type,
            title: self.title,
            xp_earned: self.xp,
            skill_tag: self.skill_tag,
            duration_minutes: Some(self.duration_minutes.unwrap_or(0)),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillTier {
    pub fn from_score(score: i32) -> Self {
        if score < 30 {
            SkillTier::Beginner
        } else if score < 70 {
            SkillTier::Intermediate
        } else {
            SkillTier::Advanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillTier::Beginner => "Beginner",
            SkillTier::Intermediate => "Intermediate",
            SkillTier::Advanced => "Advanced",
        }
    }
}

/// A per-user named capability scored 0-100.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_name: String,
    pub category: String,
    pub score: i32,
}

impl Skill {
    pub fn tier(&self) -> SkillTier {
        SkillTier::from_score(self.score)
    }
}

/// A skill row that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSkill {
    pub skill_name: String,
    pub category: String,
    pub score: i32,
}

/// An awarded achievement.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub awarded_at: DateTime<Utc>,
}

//=========================================================================================
// Aggregated Profile View
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub role: Option<String>,
    pub career_goal: Option<String>,
    pub bio: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub name: Option<String>,
    pub email: String,
    pub profile_picture_url: Option<String>,
    pub xp: i64,
    pub level: i32,
    pub streak: i32,
    pub join_date: DateTime<Utc>,
    pub profile: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningStats {
    pub total_learning_hours: i64,
    pub courses_completed: i64,
    pub labs_completed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessLevel {
    Low,
    Moderate,
    High,
    JobReady,
}

impl ReadinessLevel {
    pub fn from_score(score: i32) -> Self {
        if score < 40 {
            ReadinessLevel::Low
        } else if score < 70 {
            ReadinessLevel::Moderate
        } else if score < 90 {
            ReadinessLevel::High
        } else {
            ReadinessLevel::JobReady
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessLevel::Low => "Low",
            ReadinessLevel::Moderate => "Moderate",
            ReadinessLevel::High => "High",
            ReadinessLevel::JobReady => "Job Ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerReadiness {
    pub score: i32,
    pub readiness_level: ReadinessLevel,
    pub target_role: String,
    pub missing_skills: Vec<String>,
}

/// The composite view returned by the profile aggregation service.
#[derive(Debug, Clone, PartialEq)]
pub struct FullProfile {
    pub user: UserSummary,
    pub skills: Vec<Skill>,
    pub recent_activity: Vec<ActivityLog>,
    pub badges: Vec<Badge>,
    pub stats: LearningStats,
    pub career_readiness: CareerReadiness,
}

/// Partial update submitted by the owner of a profile. `None` means "leave untouched".
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
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

impl ProfileUpdate {
    /// Merges the present fields into `user` and `profile`.
    ///
    /// A blank name is ignored; every other present field overwrites, including
    /// an explicit empty string or list.
    pub fn apply(self, user: &mut User, profile: &mut Profile) {
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            user.full_name = Some(name);
        }
        if let Some(url) = self.profile_picture_url {
            user.profile_picture_url = Some(url);
        }

        overwrite(&mut profile.role, self.role);
        overwrite(&mut profile.experience_level, self.experience_level);
        overwrite(&mut profile.career_goal, self.career_goal);
        overwrite(&mut profile.preferred_tech, self.preferred_tech);
        overwrite(&mut profile.learning_style, self.learning_style);
        overwrite(&mut profile.current_project, self.current_project);
        overwrite(&mut profile.aspiration, self.aspiration);
        overwrite(&mut profile.bio, self.bio);
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            full_name: Some("Ada".to_string()),
            profile_picture_url: None,
            xp: 0,
            level: 1,
            streak: Some(1),
            join_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            last_active: None,
        }
    }

    #[test]
    fn apply_xp_levels_up_on_boundary() {
        let mut u = user();
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        u.apply_xp(1200, now).unwrap();
        assert_eq!(u.xp, 1200);
        assert_eq!(u.level, 2);
        assert_eq!(u.last_active, Some(now));
    }

    #[test]
    fn apply_xp_never_lowers_level() {
        let mut u = user();
        u.level = 7;
        u.apply_xp(10, Utc::now()).unwrap();
        assert_eq!(u.level, 7);
    }

    #[test]
    fn apply_xp_rejects_overflowing_total() {
        let mut u = user();
        u.xp = i64::MAX;
        u.level = 9;
        let result = u.apply_xp(1, Utc::now());

        assert!(matches!(result, Err(PortError::Validation(_))));
        assert_eq!(u.xp, i64::MAX);
        assert_eq!(u.last_active, None);
    }

    #[test]
    fn skill_tiers_follow_score_thresholds() {
        assert_eq!(SkillTier::from_score(0), SkillTier::Beginner);
        assert_eq!(SkillTier::from_score(29), SkillTier::Beginner);
        assert_eq!(SkillTier::from_score(30), SkillTier::Intermediate);
        assert_eq!(SkillTier::from_score(69), SkillTier::Intermediate);
        assert_eq!(SkillTier::from_score(70), SkillTier::Advanced);
        assert_eq!(SkillTier::from_score(100).as_str(), "Advanced");
    }

    #[test]
    fn readiness_levels_follow_score_thresholds() {
        assert_eq!(ReadinessLevel::from_score(39), ReadinessLevel::Low);
        assert_eq!(ReadinessLevel::from_score(40), ReadinessLevel::Moderate);
        assert_eq!(ReadinessLevel::from_score(70), ReadinessLevel::High);
        assert_eq!(ReadinessLevel::from_score(90).as_str(), "Job Ready");
    }

    #[test]
    fn new_activity_defaults_duration_to_zero() {
        let activity = NewActivity {
            activity_type: "COURSE".to_string(),
            title: "Ownership".to_string(),
            xp: 50,
            skill_tag: None,
            duration_minutes: None,
        };
        let log = activity.into_log(Uuid::new_v4(), Utc::now());
        assert_eq!(log.duration_minutes, Some(0));
    }

    #[test]
    fn profile_update_is_partial() {
        let mut u = user();
        let mut profile = Profile::seeded();
        let update = ProfileUpdate {
            name: Some("   ".to_string()),
            role: Some("Student".to_string()),
            bio: Some(String::new()),
            preferred_tech: Some(vec![]),
            ..ProfileUpdate::default()
        };
        update.apply(&mut u, &mut profile);

        assert_eq!(u.full_name.as_deref(), Some("Ada"));
        assert_eq!(profile.role.as_deref(), Some("Student"));
        assert_eq!(profile.bio.as_deref(), Some(""));
        assert_eq!(profile.preferred_tech, Some(vec![]));
        assert_eq!(profile.career_goal.as_deref(), Some(Profile::DEFAULT_CAREER_GOAL));
    }
}
