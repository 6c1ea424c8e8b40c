use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::security::{TokenService, hash_password, verify_password};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    tokens: TokenService,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, tokens: TokenService) -> Self {
        Self {
            user_repository,
            tokens,
        }
    }

    /// Creates the account and logs it in, returning a signed token
    /// alongside the stored user.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<(String, User)> {
        if self
            .user_repository
            .find_by_email(&req.email)
            .await?
            .is_some()
        {
            warn!(email = %req.email, "Registration rejected, email already taken");
            return Err(DomainError::DuplicateEmail.into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };

        debug!(user_id = %user.id, "Saving user to repository");
        self.user_repository.save(user.clone()).await?;

        let token = self.issue_token(&user.id)?;

        info!(user_id = %user.id, email = %user.email, "User registered");
        Ok((token, user))
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<(String, User)> {
        let user = self
            .user_repository
            .find_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "Login for unknown email");
                DomainError::InvalidCredentials
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::InvalidCredentials.into());
        }

        let token = self.issue_token(&user.id)?;

        info!(user_id = %user.id, email = %user.email, "Login successful");
        Ok((token, user))
    }

    fn issue_token(&self, user_id: &str) -> Result<String> {
        self.tokens.issue(user_id).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e)).into()
        })
    }
}
