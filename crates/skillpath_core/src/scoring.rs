//! crates/skillpath_core/src/scoring.rs
//!
//! The gamification formulas: XP to level, streak day-deltas, learning stats,
//! career readiness and skill seeding. Everything here is pure.

use chrono::{DateTime, Utc};

use crate::domain::{
    ActivityLog, CareerReadiness, LearningStats, NewSkill, Profile, ReadinessLevel, Skill,
};

pub const XP_PER_LEVEL: i64 = 1000;
pub const RECENT_ACTIVITY_LIMIT: i64 = 10;
pub const SEEDED_SKILL_CATEGORY: &str = "Programming";
pub const SEEDED_SKILL_SCORE: i32 = 10;
pub const FALLBACK_TECHNOLOGIES: [&str; 2] = ["Communication", "Problem Solving"];
pub const DEFAULT_TARGET_ROLE: &str = "General Tech";

const READINESS_CAP: i32 = 100;

/// `floor(xp / 1000) + 1`.
pub fn level_for_xp(xp: i64) -> i32 {
    let level = xp.div_euclid(XP_PER_LEVEL) + 1;
    level.clamp(1, i32::MAX as i64) as i32
}

/// Computes the streak after a sign-in at `now`, comparing UTC calendar days.
///
/// One day since the last activity extends the streak, a longer gap restarts
/// it at 1, and a same-day sign-in leaves it unchanged.
pub fn next_streak(
    current: Option<i32>,
    last_active: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i32 {
    let Some(last_active) = last_active else {
        return 1;
    };
    let delta_days = (now.date_naive() - last_active.date_naive()).num_days();
    match delta_days {
        1 => current.unwrap_or(0) + 1,
        d if d > 1 => 1,
        _ => current.unwrap_or(1),
    }
}

/// Minutes spent on one event; rows without a duration fall back to half their XP.
fn minutes_for(log: &ActivityLog) -> i64 {
    match log.duration_minutes {
        Some(minutes) => minutes as i64,
        None => log.xp_earned / 2,
    }
}

/// Builds the dashboard stats from the recent-activity window and the total
/// number of logged events.
pub fn learning_stats(recent: &[ActivityLog], total_activity_count: i64) -> LearningStats {
    let total_minutes: i64 = recent.iter().map(minutes_for).sum();
    LearningStats {
        total_learning_hours: total_minutes / 60,
        courses_completed: total_activity_count,
        // Lab completion is not tracked per activity type yet.
        labs_completed: 0,
    }
}

pub fn average_skill_score(skills: &[Skill]) -> f64 {
    if skills.is_empty() {
        return 0.0;
    }
    let total: i64 = skills.iter().map(|s| s.score as i64).sum();
    total as f64 / skills.len() as f64
}

/// Blends average skill score and level into a 0-100 readiness score.
pub fn career_readiness(
    skills: &[Skill],
    level: i32,
    xp: i64,
    profile: Option<&Profile>,
) -> CareerReadiness {
    let avg_skill = average_skill_score(skills);
    let raw = (avg_skill * 0.6 + level as f64 * 2.0).round();
    let score = raw.clamp(0.0, READINESS_CAP as f64) as i32;

    let target_role = profile
        .and_then(|p| p.career_goal.clone())
        .unwrap_or_else(|| DEFAULT_TARGET_ROLE.to_string());

    let mut missing_skills = Vec::new();
    if avg_skill < 50.0 {
        missing_skills.push("Advanced Concepts".to_string());
    }
    if xp < 5000 {
        missing_skills.push("System Design".to_string());
    }

    CareerReadiness {
        score,
        readiness_level: ReadinessLevel::from_score(score),
        target_role,
        missing_skills,
    }
}

/// Uppercases the first character and leaves the rest as typed.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Works out which skill rows a profile's preferred technologies still need.
///
/// Names are matched case-insensitively against `existing` and against each
/// other, so the result never duplicates a skill. Existing rows are never
/// touched.
pub fn skills_to_seed(profile: &Profile, existing: &[Skill]) -> Vec<NewSkill> {
    let technologies: Vec<&str> = match profile.preferred_tech.as_deref() {
        Some(list) if !list.is_empty() => list.iter().map(String::as_str).collect(),
        _ => FALLBACK_TECHNOLOGIES.to_vec(),
    };

    let mut known: Vec<String> = existing.iter().map(|s| s.skill_name.to_lowercase()).collect();
    let mut seeded = Vec::new();
    for tech in technologies {
        let tech = tech.trim();
        if tech.is_empty() {
            continue;
        }
        let key = tech.to_lowercase();
        if known.contains(&key) {
            continue;
        }
        known.push(key);
        seeded.push(NewSkill {
            skill_name: capitalize_first(tech),
            category: SEEDED_SKILL_CATEGORY.to_string(),
            score: SEEDED_SKILL_SCORE,
        });
    }
    seeded
}
