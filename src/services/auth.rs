//! Authentication service
//!
//! Implements the account logic for the demo:
//! - Registration (duplicate emails are a conflict)
//! - Login/logout (invalid credentials are a value, not an error)
//! - Session lookup for the current user
//! - Patient listing for the admin dashboard
//!
//! All state sits behind injected repositories and resets on restart.

use crate::models::{Session, User, UserRole};
use crate::services::password::{hash_password, verify_password};
use crate::store::{SessionRepository, UserRepository};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for auth service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An account with this email already exists
    #[error("An account with the email '{0}' already exists")]
    EmailTaken(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Authentication service for the demo account table
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl AuthService {
    /// Create a new auth service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// Register a new patient account.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if name, email or password is empty, or the email
    ///   has no `@`
    /// - `EmailTaken` if the email is already registered
    /// - `InternalError` for repository failures
    pub async fn register(&self, input: RegisterInput) -> Result<User, AuthServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(AuthServiceError::EmailTaken(input.email));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(input.name, input.email, password_hash, UserRole::Patient)
            .with_profile(input.dob, input.phone, input.medical_history);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        Ok(created)
    }

    /// Login with email and password.
    ///
    /// Returns `None` for an unknown email or a wrong password; invalid
    /// credentials are reported inline by the caller, never as an error.
    /// On success a new session is created.
    pub async fn login(
        &self,
        input: LoginInput,
    ) -> Result<Option<(User, Session)>, AuthServiceError> {
        let user = match self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to get user by email")?
        {
            Some(u) => u,
            None => return Ok(None),
        };

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Ok(None);
        }

        let session = self.create_session(user.id).await?;

        Ok(Some((user, session)))
    }

    /// Logout (invalidate session).
    ///
    /// Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), AuthServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve the user behind a session token.
    ///
    /// A missing or unknown token is treated as "no session" and yields
    /// `None`; it is never an error.
    pub async fn current_user(&self, token: &str) -> Result<Option<User>, AuthServiceError> {
        let session = match self
            .session_repo
            .get(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// List all non-admin users for the admin dashboard
    pub async fn list_patients(&self) -> Result<Vec<User>, AuthServiceError> {
        let patients = self
            .user_repo
            .list_patients()
            .await
            .context("Failed to list patients")?;
        Ok(patients)
    }

    // ========================================================================
    // Private helper methods
    // ========================================================================

    /// Validate registration input
    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), AuthServiceError> {
        if input.name.trim().is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }

        if input.email.trim().is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }

        if input.password.is_empty() {
            return Err(AuthServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        // Basic email format validation
        if !input.email.contains('@') {
            return Err(AuthServiceError::ValidationError(
                "Invalid email format".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a new session for a user
    async fn create_session(&self, user_id: i64) -> Result<Session, AuthServiceError> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: Utc::now(),
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }
}

/// Input for account registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub dob: Option<String>,
    pub phone: Option<String>,
    pub medical_history: Option<String>,
}

impl RegisterInput {
    /// Create a registration input with only the required fields
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            dob: None,
            phone: None,
            medical_history: None,
        }
    }
}

/// Input for login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemorySessionRepository, MemoryUserRepository};

    fn setup_test_service() -> AuthService {
        AuthService::new(MemoryUserRepository::boxed(), MemorySessionRepository::boxed())
    }

    // ========================================================================
    // Registration tests
    // ========================================================================

    #[tokio::test]
    async fn test_register_creates_patient() {
        let service = setup_test_service();

        let input = RegisterInput::new("John Doe", "patient@example.com", "patient123");
        let user = service.register(input).await.expect("Failed to register");

        assert_eq!(user.role, UserRole::Patient);
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "patient@example.com");
        assert!(user.id > 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let service = setup_test_service();

        let input1 = RegisterInput::new("User One", "same@example.com", "password123");
        service.register(input1).await.expect("Failed to register first user");

        let input2 = RegisterInput::new("User Two", "same@example.com", "password456");
        let result = service.register(input2).await;

        assert!(matches!(result, Err(AuthServiceError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_register_empty_name_fails() {
        let service = setup_test_service();

        let input = RegisterInput::new("", "test@example.com", "password123");
        let result = service.register(input).await;

        assert!(matches!(result, Err(AuthServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_empty_password_fails() {
        let service = setup_test_service();

        let input = RegisterInput::new("Test User", "test@example.com", "");
        let result = service.register(input).await;

        assert!(matches!(result, Err(AuthServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email_fails() {
        let service = setup_test_service();

        let input = RegisterInput::new("Test User", "invalid-email", "password123");
        let result = service.register(input).await;

        assert!(matches!(result, Err(AuthServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_registered_patient_appears_in_patient_list() {
        let service = setup_test_service();

        let input = RegisterInput::new("Jane Roe", "jane@example.com", "password123");
        service.register(input).await.expect("Failed to register");

        let patients = service.list_patients().await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].email, "jane@example.com");
    }

    // ========================================================================
    // Login tests
    // ========================================================================

    #[tokio::test]
    async fn test_login_with_correct_credentials() {
        let service = setup_test_service();

        let input = RegisterInput::new("John Doe", "a@b.com", "x");
        service.register(input).await.expect("Failed to register");

        let result = service
            .login(LoginInput::new("a@b.com", "x"))
            .await
            .expect("Login should not error");

        let (user, session) = result.expect("Correct credentials should log in");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(session.user_id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_returns_none() {
        let service = setup_test_service();

        let input = RegisterInput::new("John Doe", "patient@example.com", "patient123");
        service.register(input).await.expect("Failed to register");

        let result = service
            .login(LoginInput::new("patient@example.com", "wrong"))
            .await
            .expect("Login should not error");

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_email_returns_none() {
        let service = setup_test_service();

        let result = service
            .login(LoginInput::new("nobody@example.com", "whatever"))
            .await
            .expect("Login should not error");

        assert!(result.is_none());
    }

    // ========================================================================
    // Session tests
    // ========================================================================

    #[tokio::test]
    async fn test_current_user_roundtrip() {
        let service = setup_test_service();

        service
            .register(RegisterInput::new("John Doe", "patient@example.com", "patient123"))
            .await
            .unwrap();
        let (user, session) = service
            .login(LoginInput::new("patient@example.com", "patient123"))
            .await
            .unwrap()
            .unwrap();

        let current = service.current_user(&session.id).await.unwrap().unwrap();
        assert_eq!(current.id, user.id);
    }

    #[tokio::test]
    async fn test_current_user_unknown_token_is_none() {
        let service = setup_test_service();

        // Both a missing and a garbage token behave as "no session"
        assert!(service.current_user("").await.unwrap().is_none());
        assert!(service
            .current_user("not-a-real-token")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup_test_service();

        service
            .register(RegisterInput::new("John Doe", "patient@example.com", "patient123"))
            .await
            .unwrap();
        let (_, session) = service
            .login(LoginInput::new("patient@example.com", "patient123"))
            .await
            .unwrap()
            .unwrap();

        service.logout(&session.id).await.unwrap();
        assert!(service.current_user(&session.id).await.unwrap().is_none());
    }
}
