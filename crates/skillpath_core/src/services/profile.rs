//! crates/skillpath_core/src/services/profile.rs
//!
//! Profile aggregation, partial profile updates and skill seeding from a
//! profile's preferred technologies.

use std::sync::Arc;
use tracing::info;

use crate::domain::{FullProfile, Profile, ProfileSummary, ProfileUpdate, User, UserSummary};
use crate::ports::{DatabaseService, PortError, PortResult};
use crate::scoring;

#[derive(Clone)]
pub struct ProfileService {
    db: Arc<dyn DatabaseService>,
}

impl ProfileService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Assembles the composite profile view for `acting_email`, seeding skills
    /// first if the user has none.
    pub async fn get_full_profile(&self, acting_email: &str) -> PortResult<FullProfile> {
        let user = self.db.get_user_by_email(acting_email).await?;

        if self.db.get_skills(user.id).await?.is_empty() {
            self.sync_skills_from_profile(&user).await?;
        }

        let profile = self.db.get_profile(user.id).await?;
        let recent_activity = self
            .db
            .get_recent_activity(user.id, scoring::RECENT_ACTIVITY_LIMIT)
            .await?;
        let skills = self.db.get_skills(user.id).await?;
        let badges = self.db.get_badges(user.id).await?;
        let activity_count = self.db.count_activity(user.id).await?;

        let stats = scoring::learning_stats(&recent_activity, activity_count);
        let career_readiness =
            scoring::career_readiness(&skills, user.level, user.xp, profile.as_ref());

        let summary = UserSummary {
            name: user.full_name,
            email: user.email,
            profile_picture_url: user.profile_picture_url,
            xp: user.xp,
            level: user.level,
            streak: user.streak.unwrap_or(0),
            join_date: user.join_date,
            profile: profile.map(|p| ProfileSummary {
                role: p.role,
                career_goal: p.career_goal,
                bio: p.bio,
                experience_level: p.experience_level,
            }),
        };

        Ok(FullProfile {
            user: summary,
            skills,
            recent_activity,
            badges,
            stats,
            career_readiness,
        })
    }

    /// Applies a partial update and seeds skills for any newly preferred
    /// technologies, all in one write.
    pub async fn update_profile(&self, acting_email: &str, update: ProfileUpdate) -> PortResult<()> {
        if update
            .bio
            .as_ref()
            .is_some_and(|bio| bio.chars().count() > Profile::MAX_BIO_CHARS)
        {
            return Err(PortError::Validation(format!(
                "bio must be at most {} characters",
                Profile::MAX_BIO_CHARS
            )));
        }

        let mut user = self.db.get_user_by_email(acting_email).await?;
        let mut profile = self.db.get_profile(user.id).await?.unwrap_or_default();

        update.apply(&mut user, &mut profile);

        let existing = self.db.get_skills(user.id).await?;
        let new_skills = scoring::skills_to_seed(&profile, &existing);
        self.db
            .save_profile_changes(&user, &profile, &new_skills)
            .await?;

        info!(
            "Updated profile for user {} ({} new skills)",
            user.id,
            new_skills.len()
        );
        Ok(())
    }

    /// Adds a skill row for every preferred technology the user lacks.
    /// Does nothing for users without a profile.
    pub async fn sync_skills_from_profile(&self, user: &User) -> PortResult<()> {
        let Some(profile) = self.db.get_profile(user.id).await? else {
            return Ok(());
        };
        let existing = self.db.get_skills(user.id).await?;
        let new_skills = scoring::skills_to_seed(&profile, &existing);
        if new_skills.is_empty() {
            return Ok(());
        }
        self.db.insert_skills(user.id, &new_skills).await?;
        info!("Seeded {} skills for user {}", new_skills.len(), user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityLog, ReadinessLevel};
    use crate::services::auth::AuthService;
    use crate::services::test_support::{MockDatabase, PlainHasher, SubjectTokens};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    async fn setup() -> (Arc<MockDatabase>, ProfileService) {
        let db = MockDatabase::new();
        AuthService::new(db.clone(), Arc::new(PlainHasher), Arc::new(SubjectTokens))
            .register("ada@example.com", "Ada", "pw")
            .await
            .unwrap();
        (db.clone(), ProfileService::new(db))
    }

    fn tech(names: &[&str]) -> ProfileUpdate {
        ProfileUpdate {
            preferred_tech: Some(names.iter().map(|n| n.to_string()).collect()),
            ..ProfileUpdate::default()
        }
    }

    #[tokio::test]
    async fn fetch_seeds_skills_from_preferred_tech() {
        let (db, service) = setup().await;
        let user = db.user("ada@example.com");
        let mut profile = db.profile(user.id).unwrap();
        profile.preferred_tech = Some(vec!["python".to_string(), "SQL".to_string()]);
        db.save_profile_changes(&user, &profile, &[]).await.unwrap();

        let full = service.get_full_profile("ada@example.com").await.unwrap();

        let names: Vec<_> = full.skills.iter().map(|s| s.skill_name.as_str()).collect();
        assert_eq!(names, vec!["Python", "SQL"]);
        assert!(full
            .skills
            .iter()
            .all(|s| s.score == 10 && s.category == "Programming"));
    }

    #[tokio::test]
    async fn fetch_without_profile_leaves_skills_empty() {
        let (db, service) = setup().await;
        let user = db.user("ada@example.com");
        db.remove_profile(user.id);

        let full = service.get_full_profile("ada@example.com").await.unwrap();
        assert!(full.skills.is_empty());
        assert!(full.user.profile.is_none());
        assert_eq!(full.career_readiness.target_role, scoring::DEFAULT_TARGET_ROLE);
    }

    #[tokio::test]
    async fn sync_is_idempotent() {
        let (db, service) = setup().await;
        service
            .update_profile("ada@example.com", tech(&["rust", "Go"]))
            .await
            .unwrap();
        let user = db.user("ada@example.com");

        service.sync_skills_from_profile(&user).await.unwrap();
        service.sync_skills_from_profile(&user).await.unwrap();

        assert_eq!(db.skill_names(user.id), vec!["Rust", "Go"]);
    }

    #[tokio::test]
    async fn overlong_bio_is_rejected() {
        let (db, service) = setup().await;
        let update = ProfileUpdate {
            bio: Some("é".repeat(Profile::MAX_BIO_CHARS + 1)),
            ..ProfileUpdate::default()
        };

        let result = service.update_profile("ada@example.com", update).await;

        assert!(matches!(result, Err(PortError::Validation(_))));
        let user = db.user("ada@example.com");
        assert_eq!(db.profile(user.id).unwrap().bio.as_deref(), Some(Profile::DEFAULT_BIO));

        let at_limit = ProfileUpdate {
            bio: Some("é".repeat(Profile::MAX_BIO_CHARS)),
            ..ProfileUpdate::default()
        };
        service.update_profile("ada@example.com", at_limit).await.unwrap();
    }

    #[tokio::test]
    async fn update_merges_fields_and_adds_new_skills_only() {
        let (db, service) = setup().await;
        service
            .update_profile("ada@example.com", tech(&["rust"]))
            .await
            .unwrap();

        let update = ProfileUpdate {
            name: Some("Ada L.".to_string()),
            profile_picture_url: Some("data:image/png;base64,AAAA".to_string()),
            role: Some("Student".to_string()),
            preferred_tech: Some(vec!["RUST".to_string(), "kotlin".to_string()]),
            ..ProfileUpdate::default()
        };
        service.update_profile("ada@example.com", update).await.unwrap();

        let user = db.user("ada@example.com");
        assert_eq!(user.full_name.as_deref(), Some("Ada L."));
        assert_eq!(
            user.profile_picture_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        let profile = db.profile(user.id).unwrap();
        assert_eq!(profile.role.as_deref(), Some("Student"));
        assert_eq!(profile.bio.as_deref(), Some("Ready to accelerate my career!"));
        assert_eq!(db.skill_names(user.id), vec!["Rust", "Kotlin"]);
    }

    #[tokio::test]
    async fn update_creates_missing_profile() {
        let (db, service) = setup().await;
        let user = db.user("ada@example.com");
        db.remove_profile(user.id);

        let update = ProfileUpdate {
            career_goal: Some("Backend Engineer".to_string()),
            ..ProfileUpdate::default()
        };
        service.update_profile("ada@example.com", update).await.unwrap();

        let profile = db.profile(user.id).unwrap();
        assert_eq!(profile.career_goal.as_deref(), Some("Backend Engineer"));
        assert_eq!(profile.bio, None);
        assert_eq!(db.skill_names(user.id), vec!["Communication", "Problem Solving"]);
    }

    #[tokio::test]
    async fn update_for_unknown_user_is_not_found() {
        let (_db, service) = setup().await;
        let result = service
            .update_profile("ghost@example.com", ProfileUpdate::default())
            .await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn full_profile_computes_stats_and_readiness() {
        let (db, service) = setup().await;
        db.edit_user("ada@example.com", |u| {
            u.xp = 4200;
            u.level = 5;
            u.streak = Some(6);
        });
        let user = db.user("ada@example.com");
        db.push_skill(user.id, "Rust", 70);
        db.push_skill(user.id, "SQL", 90);
        db.push_badge(user.id, "First Steps");

        let start = Utc::now() - Duration::hours(20);
        for i in 0..12 {
            db.push_activity(ActivityLog {
                id: Uuid::new_v4(),
                user_id: user.id,
                activity_type: "COURSE".to_string(),
                title: format!("Lesson {}", i),
                xp_earned: 100,
                skill_tag: None,
                // The oldest two have no duration and fall outside the window.
                duration_minutes: if i < 2 { None } else { Some(30) },
                timestamp: start + Duration::hours(i),
            });
        }

        let full = service.get_full_profile("ada@example.com").await.unwrap();

        assert_eq!(full.recent_activity.len(), 10);
        assert_eq!(full.recent_activity[0].title, "Lesson 11");
        assert_eq!(full.stats.total_learning_hours, 5);
        assert_eq!(full.stats.courses_completed, 12);
        assert_eq!(full.stats.labs_completed, 0);
        assert_eq!(full.badges.len(), 1);

        assert_eq!(full.user.streak, 6);
        assert_eq!(
            full.user.profile.as_ref().and_then(|p| p.career_goal.as_deref()),
            Some("Software Engineer")
        );

        // round(80 * 0.6 + 5 * 2) = 58
        assert_eq!(full.career_readiness.score, 58);
        assert_eq!(full.career_readiness.readiness_level, ReadinessLevel::Moderate);
        assert_eq!(full.career_readiness.target_role, "Software Engineer");
        assert_eq!(full.career_readiness.missing_skills, vec!["System Design".to_string()]);
    }
}
