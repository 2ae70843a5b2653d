pub mod activity;
pub mod auth;
pub mod profile;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use activity::ActivityService;
pub use auth::{AuthService, ExternalIdentity};
pub use profile::ProfileService;
