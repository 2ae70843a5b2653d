//! crates/skillpath_core/src/services/auth.rs
//!
//! Registration, password login and federated-identity login. Every successful
//! sign-in of an existing account runs the streak bookkeeping before a token
//! is issued.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{NewUser, Profile, User};
use crate::ports::{DatabaseService, PasswordHashingService, PortError, PortResult, TokenService};

/// The identity a federated provider vouches for.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub provider: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    db: Arc<dyn DatabaseService>,
    hasher: Arc<dyn PasswordHashingService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        hasher: Arc<dyn PasswordHashingService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self { db, hasher, tokens }
    }

    /// Verifies a bearer token and returns the email it was issued for.
    pub fn authenticate(&self, token: &str) -> PortResult<String> {
        self.tokens.verify(token)
    }

    /// Creates an account with a seeded profile and returns a bearer token.
    pub async fn register(&self, email: &str, full_name: &str, password: &str) -> PortResult<String> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(PortError::Validation("password must not be empty".to_string()));
        }

        match self.db.get_user_by_email(email).await {
            Ok(_) => return Err(PortError::Conflict("Email already registered".to_string())),
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        let user = self.create_account(email, full_name, password, None).await?;
        info!("Registered user {}", user.id);
        self.tokens.issue(&user.email)
    }

    pub async fn login(&self, email: &str, password: &str) -> PortResult<String> {
        let credentials = match self.db.get_credentials_by_email(email).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => {
                warn!("Login attempt for unknown account");
                return Err(PortError::Unauthorized);
            }
            Err(e) => return Err(e),
        };

        if !self
            .hasher
            .verify_password(password, &credentials.hashed_password)?
        {
            warn!("Invalid password for user {}", credentials.user.id);
            return Err(PortError::Unauthorized);
        }

        let user = self.record_sign_in(credentials.user).await?;
        self.tokens.issue(&user.email)
    }

    /// Signs in (or signs up) a user vouched for by an identity provider.
    ///
    /// New accounts get an unguessable placeholder password, the provider's
    /// avatar and the seeded profile.
    pub async fn external_identity_login(&self, identity: ExternalIdentity) -> PortResult<String> {
        validate_email(&identity.email)?;

        let user = match self.db.get_user_by_email(&identity.email).await {
            Ok(existing) => self.record_sign_in(existing).await?,
            Err(PortError::NotFound(_)) => {
                let placeholder = Uuid::new_v4().to_string();
                let user = self
                    .create_account(
                        &identity.email,
                        &identity.name,
                        &placeholder,
                        identity.avatar_url.clone(),
                    )
                    .await?;
                info!("Created user {} via {} sign-in", user.id, identity.provider);
                user
            }
            Err(e) => return Err(e),
        };

        self.tokens.issue(&user.email)
    }

    async fn create_account(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
        profile_picture_url: Option<String>,
    ) -> PortResult<User> {
        let hashed_password = self.hasher.hash_password(password)?;
        let full_name = Some(full_name.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let new_user = NewUser {
            email: email.to_string(),
            full_name,
            hashed_password,
            profile_picture_url,
            created_at: Utc::now(),
        };
        self.db
            .create_user_with_profile(new_user, Profile::seeded())
            .await
    }

    async fn record_sign_in(&self, mut user: User) -> PortResult<User> {
        user.record_sign_in(Utc::now());
        let streak = user.streak.unwrap_or(1);
        let last_active = user.last_active.unwrap_or_else(Utc::now);
        self.db.save_sign_in(user.id, streak, last_active).await?;
        info!("User {} signed in, streak {}", user.id, streak);
        Ok(user)
    }
}

fn validate_email(email: &str) -> PortResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(PortError::Validation(format!("'{}' is not a valid email", email)))
    }
}
