//! crates/skillpath_core/src/services/activity.rs
//!
//! Appends learning events to the ledger and credits their XP to the user.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::domain::NewActivity;
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Clone)]
pub struct ActivityService {
    db: Arc<dyn DatabaseService>,
}

impl ActivityService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Logs one activity for `acting_email` and returns the user's new XP total.
    pub async fn log_activity(&self, acting_email: &str, activity: NewActivity) -> PortResult<i64> {
        validate(&activity)?;

        let user = self.db.get_user_by_email(acting_email).await?;
        let previous_level = user.level;
        let updated = self
            .db
            .record_activity(user.id, activity, Utc::now())
            .await?;

        if updated.level > previous_level {
            info!("User {} reached level {}", updated.id, updated.level);
        }
        Ok(updated.xp)
    }
}

fn validate(activity: &NewActivity) -> PortResult<()> {
    if activity.activity_type.trim().is_empty() {
        return Err(PortError::Validation("type must not be empty".to_string()));
    }
    if activity.title.trim().is_empty() {
        return Err(PortError::Validation("title must not be empty".to_string()));
    }
    if activity.xp < 0 {
        return Err(PortError::Validation("xp must not be negative".to_string()));
    }
    if activity.duration_minutes.is_some_and(|m| m < 0) {
        return Err(PortError::Validation(
            "duration_minutes must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthService;
    use crate::services::test_support::{MockDatabase, PlainHasher, SubjectTokens};

    fn activity(xp: i64) -> NewActivity {
        NewActivity {
            activity_type: "COURSE".to_string(),
            title: "Intro to Rust".to_string(),
            xp,
            skill_tag: Some("Rust".to_string()),
            duration_minutes: None,
        }
    }

    async fn setup() -> (Arc<MockDatabase>, ActivityService) {
        let db = MockDatabase::new();
        AuthService::new(db.clone(), Arc::new(PlainHasher), Arc::new(SubjectTokens))
            .register("ada@example.com", "Ada", "pw")
            .await
            .unwrap();
        (db.clone(), ActivityService::new(db))
    }

    #[tokio::test]
    async fn logging_xp_levels_up_user() {
        let (db, service) = setup().await;

        let new_xp = service
            .log_activity("ada@example.com", activity(1200))
            .await
            .unwrap();

        assert_eq!(new_xp, 1200);
        let user = db.user("ada@example.com");
        assert_eq!(user.level, 2);
        assert!(user.last_active.is_some());
    }

    #[tokio::test]
    async fn xp_accumulates_across_events() {
        let (db, service) = setup().await;
        service.log_activity("ada@example.com", activity(600)).await.unwrap();
        let total = service.log_activity("ada@example.com", activity(600)).await.unwrap();

        assert_eq!(total, 1200);
        assert_eq!(db.user("ada@example.com").level, 2);
        assert_eq!(db.count_activity(db.user("ada@example.com").id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_duration_is_stored_as_zero() {
        let (db, service) = setup().await;
        service.log_activity("ada@example.com", activity(10)).await.unwrap();

        let user_id = db.user("ada@example.com").id;
        let logs = db.get_recent_activity(user_id, 10).await.unwrap();
        assert_eq!(logs[0].duration_minutes, Some(0));
        assert_eq!(logs[0].skill_tag.as_deref(), Some("Rust"));
    }

    #[tokio::test]
    async fn negative_xp_is_rejected() {
        let (db, service) = setup().await;
        let result = service.log_activity("ada@example.com", activity(-50)).await;

        assert!(matches!(result, Err(PortError::Validation(_))));
        assert_eq!(db.user("ada@example.com").xp, 0);
    }

    #[tokio::test]
    async fn xp_overflow_is_rejected_without_recording() {
        let (db, service) = setup().await;
        service
            .log_activity("ada@example.com", activity(i64::MAX))
            .await
            .unwrap();

        let result = service.log_activity("ada@example.com", activity(1)).await;

        assert!(matches!(result, Err(PortError::Validation(_))));
        let user = db.user("ada@example.com");
        assert_eq!(user.xp, i64::MAX);
        assert_eq!(db.count_activity(user.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (_db, service) = setup().await;
        let result = service.log_activity("ghost@example.com", activity(10)).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }
}
