//! User service: application-layer orchestration for accounts
//!
//! HTTP handlers are thin wrappers that delegate here.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{CreateUserDto, DomainError, DomainResult, RepositoryProvider, User};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Registration input with the plain-text password
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new user. The username must be free.
    pub async fn register(&self, input: RegisterUser) -> DomainResult<User> {
        if self
            .repos
            .users()
            .get_user_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .repos
            .users()
            .create_user(CreateUserDto {
                username: input.username,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "New user registered");
        Ok(user)
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check credentials. Unknown user and wrong password fail identically.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.repos.users().get_user_by_username(username).await? else {
            metrics::counter!("auth_logins_total", "result" => "unknown_user").increment(1);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or_else(|e| {
            warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
            false
        });
        if !valid {
            metrics::counter!("auth_logins_total", "result" => "bad_password").increment(1);
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        metrics::counter!("auth_logins_total", "result" => "ok").increment(1);
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        self.repos.users().get_user_by_id(id).await
    }
}
