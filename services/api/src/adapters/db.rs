//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skillpath_core::domain::{
    ActivityLog, Badge, NewActivity, NewSkill, NewUser, Profile, Skill, User, UserCredentials,
};
use skillpath_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

const USER_COLUMNS: &str = "id, email, password_hash, full_name, profile_picture_url, \
     xp, level, streak, join_date, last_active";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    profile_picture_url: Option<String>,
    xp: i64,
    level: i32,
    streak: Option<i32>,
    join_date: DateTime<Utc>,
    last_active: Option<DateTime<Utc>>,
}
impl UserRecord {
    fn to_credentials(self) -> UserCredentials {
        let hashed_password = self.password_hash.clone();
        UserCredentials {
            user: self.to_domain(),
            hashed_password,
        }
    }

    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            profile_picture_url: self.profile_picture_url,
            xp: self.xp,
            level: self.level,
            streak: self.streak,
            join_date: self.join_date,
            last_active: self.last_active,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    role: Option<String>,
    experience_level: Option<String>,
    career_goal: Option<String>,
    bio: Option<String>,
    learning_style: Option<String>,
    current_project: Option<String>,
    aspiration: Option<String>,
    preferred_tech: Option<Vec<String>>,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        Profile {
            role: self.role,
            experience_level: self.experience_level,
            career_goal: self.career_goal,
            bio: self.bio,
            learning_style: self.learning_style,
            current_project: self.current_project,
            aspiration: self.aspiration,
            preferred_tech: self.preferred_tech,
        }
    }
}

#[derive(FromRow)]
struct ActivityLogRecord {
    id: Uuid,
    user_id: Uuid,
    activity_type: String,
    title: String,
    xp_earned: i64,
    skill_tag: Option<String>,
    duration_minutes: Option<i32>,
    timestamp: DateTime<Utc>,
}
impl ActivityLogRecord {
    fn to_domain(self) -> ActivityLog {
        ActivityLog {
            id: self.id,
            user_id: self.user_id,
            activity_type: self.activity_type,
            title: self.title,
            xp_earned: self.xp_earned,
            skill_tag: self.skill_tag,
            duration_minutes: self.duration_minutes,
            timestamp: self.timestamp,
        }
    }
}

#[derive(FromRow)]
struct SkillRecord {
    id: Uuid,
    user_id: Uuid,
    skill_name: String,
    category: String,
    score: i32,
}
impl SkillRecord {
    fn to_domain(self) -> Skill {
        Skill {
            id: self.id,
            user_id: self.user_id,
            skill_name: self.skill_name,
            category: self.category,
            score: self.score,
        }
    }
}

#[derive(FromRow)]
struct BadgeRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    awarded_at: DateTime<Utc>,
}
impl BadgeRecord {
    fn to_domain(self) -> Badge {
        Badge {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            awarded_at: self.awarded_at,
        }
    }
}

//=========================================================================================
// Transaction Helpers
//=========================================================================================

/// Inserts skills, skipping names the user already has (case-insensitively).
async fn insert_skills_in(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    skills: &[NewSkill],
) -> Result<(), sqlx::Error> {
    for skill in skills {
        sqlx::query(
            "INSERT INTO user_skills (id, user_id, skill_name, category, score) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id, lower(skill_name)) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&skill.skill_name)
        .bind(&skill.category)
        .bind(skill.score)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn upsert_profile_in(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    profile: &Profile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (user_id, role, experience_level, career_goal, bio, \
             learning_style, current_project, aspiration, preferred_tech) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (user_id) DO UPDATE SET \
             role = EXCLUDED.role, \
             experience_level = EXCLUDED.experience_level, \
             career_goal = EXCLUDED.career_goal, \
             bio = EXCLUDED.bio, \
             learning_style = EXCLUDED.learning_style, \
             current_project = EXCLUDED.current_project, \
             aspiration = EXCLUDED.aspiration, \
             preferred_tech = EXCLUDED.preferred_tech",
    )
    .bind(user_id)
    .bind(&profile.role)
    .bind(&profile.experience_level)
    .bind(&profile.career_goal)
    .bind(&profile.bio)
    .bind(&profile.learning_style)
    .bind(&profile.current_project)
    .bind(&profile.aspiration)
    .bind(&profile.preferred_tech)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_profile(&self, user: NewUser, profile: Profile) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, email, password_hash, full_name, profile_picture_url, \
                 xp, level, streak, join_date, last_active) \
             VALUES ($1, $2, $3, $4, $5, 0, 1, 1, $6, $6) \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.full_name)
        .bind(&user.profile_picture_url)
        .bind(user.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                PortError::Conflict(format!("Email {} already registered", user.email))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;

        upsert_profile_in(&mut tx, record.id, &profile)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        self.get_credentials_by_email(email).await.map(|c| c.user)
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_credentials())
    }

    async fn save_sign_in(
        &self,
        user_id: Uuid,
        streak: i32,
        last_active: DateTime<Utc>,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET streak = $1, last_active = $2 WHERE id = $3")
            .bind(streak)
            .bind(last_active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
        now: DateTime<Utc>,
    ) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Row lock so concurrent loggers for the same user apply their XP in turn.
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;

        let mut user = record.to_domain();
        user.apply_xp(activity.xp, now)?;
        let log = activity.into_log(user_id, now);

        sqlx::query("UPDATE users SET xp = $1, level = $2, last_active = $3 WHERE id = $4")
            .bind(user.xp)
            .bind(user.level)
            .bind(user.last_active)
            .bind(user.id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, activity_type, title, xp_earned, \
                 skill_tag, duration_minutes, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(&log.activity_type)
        .bind(&log.title)
        .bind(log.xp_earned)
        .bind(&log.skill_tag)
        .bind(log.duration_minutes)
        .bind(log.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(user)
    }

    async fn get_recent_activity(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<ActivityLog>> {
        let records = sqlx::query_as::<_, ActivityLogRecord>(
            "SELECT id, user_id, activity_type, title, xp_earned, skill_tag, duration_minutes, timestamp \
             FROM activity_logs WHERE user_id = $1 ORDER BY timestamp DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn count_activity(&self, user_id: Uuid) -> PortResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count)
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT role, experience_level, career_goal, bio, learning_style, current_project, \
                 aspiration, preferred_tech \
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(|r| r.to_domain()))
    }

    async fn get_skills(&self, user_id: Uuid) -> PortResult<Vec<Skill>> {
        let records = sqlx::query_as::<_, SkillRecord>(
            "SELECT id, user_id, skill_name, category, score FROM user_skills \
             WHERE user_id = $1 ORDER BY skill_name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert_skills(&self, user_id: Uuid, skills: &[NewSkill]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        insert_skills_in(&mut tx, user_id, skills)
            .await
            .map_err(unexpected)?;
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn save_profile_changes(
        &self,
        user: &User,
        profile: &Profile,
        new_skills: &[NewSkill],
    ) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result =
            sqlx::query("UPDATE users SET full_name = $1, profile_picture_url = $2 WHERE id = $3")
                .bind(&user.full_name)
                .bind(&user.profile_picture_url)
                .bind(user.id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user.id)));
        }

        upsert_profile_in(&mut tx, user.id, profile)
            .await
            .map_err(unexpected)?;
        insert_skills_in(&mut tx, user.id, new_skills)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn get_badges(&self, user_id: Uuid) -> PortResult<Vec<Badge>> {
        let records = sqlx::query_as::<_, BadgeRecord>(
            "SELECT id, user_id, name, description, icon, awarded_at FROM badges \
             WHERE user_id = $1 ORDER BY awarded_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

// These run against a throwaway database created by `sqlx::test`, so they need
// `DATABASE_URL` to point at a Postgres server.
#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: Some("Ada".to_string()),
            hashed_password: "hash".to_string(),
            profile_picture_url: None,
            created_at: Utc::now(),
        }
    }

    fn skill(name: &str) -> NewSkill {
        NewSkill {
            skill_name: name.to_string(),
            category: "Programming".to_string(),
            score: 10,
        }
    }

    fn activity(xp: i64) -> NewActivity {
        NewActivity {
            activity_type: "COURSE".to_string(),
            title: "Async Rust".to_string(),
            xp,
            skill_tag: None,
            duration_minutes: None,
        }
    }

    #[sqlx::test]
    async fn account_creation_stores_user_and_profile(pool: PgPool) {
        let db = DbAdapter::new(pool);
        let user = db
            .create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await
            .unwrap();

        assert_eq!(user.xp, 0);
        assert_eq!(user.level, 1);
        assert_eq!(user.streak, Some(1));
        assert_eq!(db.get_profile(user.id).await.unwrap(), Some(Profile::seeded()));
        let creds = db.get_credentials_by_email("ada@example.com").await.unwrap();
        assert_eq!(creds.hashed_password, "hash");
    }

    #[sqlx::test]
    async fn duplicate_email_is_a_conflict(pool: PgPool) {
        let db = DbAdapter::new(pool.clone());
        db.create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await
            .unwrap();

        let result = db
            .create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await;

        assert!(matches!(result, Err(PortError::Conflict(_))));
        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(profiles, 1);
    }

    #[sqlx::test]
    async fn unknown_email_is_not_found(pool: PgPool) {
        let db = DbAdapter::new(pool);
        let result = db.get_user_by_email("ghost@example.com").await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[sqlx::test]
    async fn skill_seeding_ignores_case_duplicates(pool: PgPool) {
        let db = DbAdapter::new(pool);
        let user = db
            .create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await
            .unwrap();

        db.insert_skills(user.id, &[skill("Rust"), skill("Go")])
            .await
            .unwrap();
        db.insert_skills(user.id, &[skill("RUST"), skill("go"), skill("Python")])
            .await
            .unwrap();

        let names: Vec<_> = db
            .get_skills(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.skill_name)
            .collect();
        assert_eq!(names, vec!["Go", "Python", "Rust"]);
    }

    #[sqlx::test]
    async fn profile_changes_are_saved_together(pool: PgPool) {
        let db = DbAdapter::new(pool);
        let mut user = db
            .create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await
            .unwrap();
        user.full_name = Some("Ada L.".to_string());
        let profile = Profile {
            role: Some("Student".to_string()),
            preferred_tech: Some(vec!["Rust".to_string()]),
            ..Profile::seeded()
        };

        db.save_profile_changes(&user, &profile, &[skill("Rust")])
            .await
            .unwrap();

        let stored = db.get_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(stored.full_name.as_deref(), Some("Ada L."));
        assert_eq!(db.get_profile(user.id).await.unwrap(), Some(profile));
        assert_eq!(db.get_skills(user.id).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    async fn concurrent_activity_logging_sums_xp(pool: PgPool) {
        let db = DbAdapter::new(pool);
        let user = db
            .create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await
            .unwrap();

        let user_id = user.id;
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.record_activity(user_id, activity(250), Utc::now()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = db.get_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(stored.xp, 2000);
        assert_eq!(stored.level, 3);
        assert_eq!(db.count_activity(user.id).await.unwrap(), 8);
        let recent = db.get_recent_activity(user.id, 10).await.unwrap();
        assert!(recent.iter().all(|log| log.duration_minutes == Some(0)));
    }

    #[sqlx::test]
    async fn overflowing_xp_rolls_back(pool: PgPool) {
        let db = DbAdapter::new(pool);
        let user = db
            .create_user_with_profile(new_user("ada@example.com"), Profile::seeded())
            .await
            .unwrap();
        db.record_activity(user.id, activity(i64::MAX), Utc::now())
            .await
            .unwrap();

        let result = db.record_activity(user.id, activity(1), Utc::now()).await;

        assert!(matches!(result, Err(PortError::Validation(_))));
        assert_eq!(db.count_activity(user.id).await.unwrap(), 1);
        let stored = db.get_user_by_email("ada@example.com").await.unwrap();
        assert_eq!(stored.xp, i64::MAX);
    }
}
