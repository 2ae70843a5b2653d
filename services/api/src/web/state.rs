//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use skillpath_core::ports::{DatabaseService, PasswordHashingService, TokenService};
use skillpath_core::services::{ActivityService, AuthService, ProfileService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub activity: ActivityService,
    pub profiles: ProfileService,
}

impl AppState {
    /// Wires the core services onto the given port implementations.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        hasher: Arc<dyn PasswordHashingService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            config,
            auth: AuthService::new(db.clone(), hasher, tokens),
            activity: ActivityService::new(db.clone()),
            profiles: ProfileService::new(db),
        }
    }
}
