//! User service: registration, login and account administration.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use powerlink_common::{AppError, AppResult, IdGenerator, config::AdminConfig};
use powerlink_db::{
    entities::user::{self, Role},
    repositories::{UserRepository, UserUpdate},
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::token::TokenService;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    tokens: TokenService,
    id_gen: IdGenerator,
}

/// Input for registering an account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    /// Only honoured when an admin performs the registration.
    pub role: Option<Role>,
}

/// Input for an admin profile edit.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,

    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: user::Model,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, tokens: TokenService) -> Self {
        Self {
            user_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// `actor` is the authenticated caller, if any. A requested role is only
    /// applied when the caller is an admin.
    pub async fn register(
        &self,
        input: RegisterInput,
        actor: Option<&user::Model>,
    ) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_email_or_username(&input.email, &input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let role = match (input.role, actor) {
            (Some(role), Some(actor)) if actor.role == Role::Admin => role,
            _ => Role::Customer,
        };

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            username: Set(input.username),
            password_hash: Set(password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(role),
            is_active: Set(true),
            is_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Check credentials and issue a session token.
    ///
    /// A missing account and a wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { token, user })
    }

    /// Resolve a bearer token to an active user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// All users, newest first.
    pub async fn list(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }

    /// Partial profile update.
    pub async fn update(&self, id: &str, input: UpdateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .update(
                id,
                UserUpdate {
                    email: input.email,
                    username: input.username,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    is_active: input.is_active,
                    is_verified: input.is_verified,
                },
            )
            .await?;

        info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    /// Delete an account.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.user_repo.delete(id).await?;
        info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Change a user's role. `role` must name one of the five roles.
    pub async fn update_role(&self, id: &str, role: &str) -> AppResult<user::Model> {
        let role = Role::parse(role)
            .ok_or_else(|| AppError::Validation("Invalid role specified".to_string()))?;

        let user = self.user_repo.set_role(id, role).await?;
        info!(user_id = %user.id, role = %role, "Changed user role");
        Ok(user)
    }

    /// Flip the account's active flag.
    pub async fn toggle_active(&self, id: &str) -> AppResult<user::Model> {
        let user = self.user_repo.toggle_active(id).await?;
        info!(user_id = %user.id, is_active = user.is_active, "Toggled user status");
        Ok(user)
    }

    /// Create the configured admin, or reset its password and role if the
    /// email is already registered.
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<user::Model> {
        let password_hash = hash_password(&admin.password)?;

        if let Some(existing) = self.user_repo.find_by_email(&admin.email).await? {
            let mut active: user::ActiveModel = existing.into();
            active.password_hash = Set(password_hash);
            active.role = Set(Role::Admin);
            active.is_active = Set(true);
            active.updated_at = Set(Utc::now());

            let user = self.user_repo.save(active).await?;
            info!(user_id = %user.id, "Reset bootstrap admin credentials");
            return Ok(user);
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(admin.email.clone()),
            username: Set(admin.username.clone()),
            password_hash: Set(password_hash),
            first_name: Set(admin.first_name.clone()),
            last_name: Set(admin.last_name.clone()),
            role: Set(Role::Admin),
            is_active: Set(true),
            is_verified: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, "Created bootstrap admin");
        Ok(user)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, email: &str, password: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            username: id.to_string(),
            password_hash: hash_password(password).unwrap(),
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            role,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(db: MockDatabase) -> UserService {
        let repo = UserRepository::new(Arc::new(db.into_connection()));
        UserService::new(repo, TokenService::new("test-secret", 24))
    }

    fn register_input(email: &str, username: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            username: username.to_string(),
            password: "correct horse".to_string(),
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            role: None,
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("test_password").unwrap();
        assert!(verify_password("test_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_register_input_validation() {
        let mut input = register_input("not-an-email", "abebe");
        assert!(input.validate().is_err());

        input = register_input("abebe@example.com", "abebe");
        input.password = "short".to_string();
        assert!(input.validate().is_err());

        assert!(register_input("abebe@example.com", "abebe").validate().is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let existing = create_test_user("u1", "abebe@example.com", "pw123456", Role::Customer);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service
            .register(register_input("abebe@example.com", "someone_else"), None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_username_is_conflict() {
        let existing = create_test_user("abebe", "first@example.com", "pw123456", Role::Customer);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service
            .register(register_input("second@example.com", "abebe"), None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_ignores_role_from_non_admin() {
        let created = create_test_user("u1", "abebe@example.com", "pw123456", Role::Customer);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let mut input = register_input("abebe@example.com", "abebe");
        input.role = Some(Role::Admin);
        let user = service.register(input, None).await.unwrap();

        assert_eq!(user.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_match() {
        let existing = create_test_user("u1", "abebe@example.com", "right-password", Role::Customer);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let wrong_password = service
            .login("abebe@example.com", "wrong-password")
            .await
            .unwrap_err();
        let unknown_email = service
            .login("nobody@example.com", "right-password")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status_code(), unknown_email.status_code());
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let existing = create_test_user("u1", "abebe@example.com", "right-password", Role::Supervisor);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .append_query_results([[existing]]),
        );

        let outcome = service
            .login("abebe@example.com", "right-password")
            .await
            .unwrap();
        assert_eq!(outcome.user.id, "u1");

        let user = service.authenticate_by_token(&outcome.token).await.unwrap();
        assert_eq!(user.role, Role::Supervisor);
    }

    #[tokio::test]
    async fn test_login_deactivated_account() {
        let mut existing = create_test_user("u1", "abebe@example.com", "right-password", Role::Customer);
        existing.is_active = false;
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service.login("abebe@example.com", "right-password").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_role_rejects_unknown_role() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.update_role("u1", "superuser").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_role_unknown_user() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.update_role("missing", "technician").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_active_twice_restores_flag() {
        let user = create_test_user("u1", "abebe@example.com", "pw123456", Role::Customer);
        let deactivated = user::Model {
            is_active: false,
            ..user.clone()
        };
        let exec = MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        };
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec.clone()])
                .append_query_results([[deactivated]])
                .append_exec_results([exec])
                .append_query_results([[user.clone()]]),
        );

        let first = service.toggle_active("u1").await.unwrap();
        let second = service.toggle_active("u1").await.unwrap();

        assert!(!first.is_active);
        assert_eq!(second.is_active, user.is_active);
    }
}
