//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        page::{Page, Pagination},
        user::{AccountType, CreateUser, User, UserClaims},
    },
    repository::Repository,
};

/// Page size of the user listing
const USERS_PER_PAGE: i64 = 10;

/// Username of the account created at startup
const BOOTSTRAP_ADMIN: &str = "admin";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by username and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::warn!("Failed login attempt for {:?}", username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!("User {} logged in", user.username);
        Ok((token, user))
    }

    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Token lifetime in seconds
    pub fn token_lifetime(&self) -> u64 {
        self.config.jwt_expiration_hours * 3600
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self, page: Option<i64>) -> AppResult<Page<User>> {
        let pagination = Pagination::new(page, USERS_PER_PAGE)?;
        let (users, total) = self.repository.users.list(&pagination).await?;
        pagination.into_page(users, total)
    }

    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;
        if self.repository.users.get_by_username(&user.username).await?.is_some() {
            return Err(AppError::Conflict(format!("Username {:?} is taken", user.username)));
        }
        let hash = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &hash).await?;
        tracing::info!("Created {} account {}", created.account_type, created.username);
        Ok(created)
    }

    /// Create the `admin` account when a password is configured and no admin exists yet
    pub async fn ensure_admin(&self) -> AppResult<()> {
        let Some(password) = self.config.admin_password.clone() else {
            return Ok(());
        };
        if self.repository.users.exists_with_account_type(AccountType::Admin).await? {
            return Ok(());
        }

        self.create_user(CreateUser {
            username: BOOTSTRAP_ADMIN.to_string(),
            password,
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            account_type: AccountType::Admin,
        })
        .await?;
        tracing::info!("Bootstrap admin account created");
        Ok(())
    }
}

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(verify_password("plain", "plain"), Err(AppError::Internal(_))));
    }
}
