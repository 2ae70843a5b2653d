//! In-memory port implementations for tests, here and in downstream crates
//! (enable the `test-util` feature).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::{
    ActivityLog, Badge, NewActivity, NewSkill, NewUser, Profile, Skill, User, UserCredentials,
};
use crate::ports::{
    DatabaseService, PasswordHashingService, PortError, PortResult, TokenService,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    profiles: HashMap<Uuid, Profile>,
    activity: Vec<ActivityLog>,
    skills: Vec<Skill>,
    badges: Vec<Badge>,
}

// Mock DatabaseService for testing
#[derive(Default)]
pub struct MockDatabase {
    tables: Mutex<Tables>,
}

impl MockDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn user(&self, email: &str) -> User {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|c| c.user.email == email)
            .map(|c| c.user.clone())
            .expect("user exists")
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    pub fn profile(&self, user_id: Uuid) -> Option<Profile> {
        self.tables.lock().unwrap().profiles.get(&user_id).cloned()
    }

    pub fn skill_names(&self, user_id: Uuid) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        tables
            .skills
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.skill_name.clone())
            .collect()
    }

    /// Overwrites stored user fields directly, bypassing the services.
    pub fn edit_user(&self, email: &str, edit: impl FnOnce(&mut User)) {
        let mut tables = self.tables.lock().unwrap();
        let creds = tables
            .users
            .iter_mut()
            .find(|c| c.user.email == email)
            .expect("user exists");
        edit(&mut creds.user);
    }

    pub fn remove_profile(&self, user_id: Uuid) {
        self.tables.lock().unwrap().profiles.remove(&user_id);
    }

    pub fn push_skill(&self, user_id: Uuid, name: &str, score: i32) {
        self.tables.lock().unwrap().skills.push(Skill {
            id: Uuid::new_v4(),
            user_id,
            skill_name: name.to_string(),
            category: "Programming".to_string(),
            score,
        });
    }

    pub fn push_activity(&self, log: ActivityLog) {
        self.tables.lock().unwrap().activity.push(log);
    }

    pub fn push_badge(&self, user_id: Uuid, name: &str) {
        self.tables.lock().unwrap().badges.push(Badge {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            description: None,
            icon: Some("award".to_string()),
            awarded_at: Utc::now(),
        });
    }

    fn insert_skills_locked(tables: &mut Tables, user_id: Uuid, skills: &[NewSkill]) {
        for new in skills {
            let exists = tables.skills.iter().any(|s| {
                s.user_id == user_id && s.skill_name.to_lowercase() == new.skill_name.to_lowercase()
            });
            if !exists {
                tables.skills.push(Skill {
                    id: Uuid::new_v4(),
                    user_id,
                    skill_name: new.skill_name.clone(),
                    category: new.category.clone(),
                    score: new.score,
                });
            }
        }
    }
}

#[async_trait]
impl DatabaseService for MockDatabase {
    async fn create_user_with_profile(&self, user: NewUser, profile: Profile) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|c| c.user.email == user.email) {
            return Err(PortError::Conflict(format!("{} already registered", user.email)));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            full_name: user.full_name,
            profile_picture_url: user.profile_picture_url,
            xp: 0,
            level: 1,
            streak: Some(1),
            join_date: user.created_at,
            last_active: Some(user.created_at),
        };
        tables.profiles.insert(created.id, profile);
        tables.users.push(UserCredentials {
            user: created.clone(),
            hashed_password: user.hashed_password,
        });
        Ok(created)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        self.get_credentials_by_email(email).await.map(|c| c.user)
    }

    async fn get_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn save_sign_in(
        &self,
        user_id: Uuid,
        streak: i32,
        last_active: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let creds = tables
            .users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        creds.user.streak = Some(streak);
        creds.user.last_active = Some(last_active);
        Ok(())
    }

    async fn record_activity(
        &self,
        user_id: Uuid,
        activity: NewActivity,
        now: DateTime<Utc>,
    ) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        let creds = tables
            .users
            .iter_mut()
            .find(|c| c.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        creds.user.apply_xp(activity.xp, now)?;
        let updated = creds.user.clone();
        tables.activity.push(activity.into_log(user_id, now));
        Ok(updated)
    }

    async fn get_recent_activity(&self, user_id: Uuid, limit: i64) -> PortResult<Vec<ActivityLog>> {
        let tables = self.tables.lock().unwrap();
        let mut logs: Vec<ActivityLog> = tables
            .activity
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs.truncate(limit as usize);
        Ok(logs)
    }

    async fn count_activity(&self, user_id: Uuid) -> PortResult<i64> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.activity.iter().filter(|l| l.user_id == user_id).count() as i64)
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<Option<Profile>> {
        Ok(self.profile(user_id))
    }

    async fn get_skills(&self, user_id: Uuid) -> PortResult<Vec<Skill>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.skills.iter().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn insert_skills(&self, user_id: Uuid, skills: &[NewSkill]) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        Self::insert_skills_locked(&mut tables, user_id, skills);
        Ok(())
    }

    async fn save_profile_changes(
        &self,
        user: &User,
        profile: &Profile,
        new_skills: &[NewSkill],
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let creds = tables
            .users
            .iter_mut()
            .find(|c| c.user.id == user.id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user.id)))?;
        creds.user.full_name = user.full_name.clone();
        creds.user.profile_picture_url = user.profile_picture_url.clone();
        tables.profiles.insert(user.id, profile.clone());
        Self::insert_skills_locked(&mut tables, user.id, new_skills);
        Ok(())
    }

    async fn get_badges(&self, user_id: Uuid) -> PortResult<Vec<Badge>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.badges.iter().filter(|b| b.user_id == user_id).cloned().collect())
    }
}

/// Reversible stand-in for a real password hash.
pub struct PlainHasher;

impl PasswordHashingService for PlainHasher {
    fn hash_password(&self, password: &str) -> PortResult<String> {
        Ok(format!("hashed:{}", password))
    }

    fn verify_password(&self, password: &str, hashed_password: &str) -> PortResult<bool> {
        Ok(hashed_password == format!("hashed:{}", password))
    }
}

pub struct SubjectTokens;

impl TokenService for SubjectTokens {
    fn issue(&self, subject: &str) -> PortResult<String> {
        Ok(format!("token-for:{}", subject))
    }

    fn verify(&self, token: &str) -> PortResult<String> {
        token
            .strip_prefix("token-for:")
            .map(str::to_string)
            .ok_or(PortError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str) -> NewSkill {
        NewSkill {
            skill_name: name.to_string(),
            category: "Programming".to_string(),
            score: 10,
        }
    }

    #[tokio::test]
    async fn skill_dedupe_folds_non_ascii_case() {
        let db = MockDatabase::new();
        let user_id = Uuid::new_v4();
        db.insert_skills(user_id, &[skill("Ökonomie")]).await.unwrap();
        db.insert_skills(user_id, &[skill("ÖKONOMIE"), skill("ökonomie")])
            .await
            .unwrap();

        assert_eq!(db.skill_names(user_id), vec!["Ökonomie"]);
    }
}
