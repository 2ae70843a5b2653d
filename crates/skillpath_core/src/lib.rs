pub mod domain;
pub mod ports;
pub mod scoring;
pub mod services;

pub use domain::{
    ActivityLog, Badge, CareerReadiness, FullProfile, LearningStats, NewActivity, NewSkill,
    NewUser, Profile, ProfileSummary, ProfileUpdate, ReadinessLevel, Skill, SkillTier, User,
    UserCredentials, UserSummary,
};
pub use ports::{DatabaseService, PasswordHashingService, PortError, PortResult, TokenService};
pub use services::{ActivityService, AuthService, ExternalIdentity, ProfileService};
