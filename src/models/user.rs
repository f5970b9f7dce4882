//! User model, permissions and token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Named capabilities granted through the account type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Renew loans and mark copies returned
    CanMarkReturned,
    /// See every copy currently on loan
    ViewAllBorrowed,
    /// Create, update and delete catalog records
    ManageCatalog,
    ManageUsers,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::ViewAllBorrowed => "view_all_borrowed",
            Permission::ManageCatalog => "manage_catalog",
            Permission::ManageUsers => "manage_users",
        }
    }
}

/// Account type (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Reader,
    Librarian,
    Admin,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Reader => "reader",
            AccountType::Librarian => "librarian",
            AccountType::Admin => "admin",
        }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            AccountType::Reader => Vec::new(),
            AccountType::Librarian => vec![
                Permission::CanMarkReturned,
                Permission::ViewAllBorrowed,
                Permission::ManageCatalog,
            ],
            AccountType::Admin => vec![
                Permission::CanMarkReturned,
                Permission::ViewAllBorrowed,
                Permission::ManageCatalog,
                Permission::ManageUsers,
            ],
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reader" => Ok(AccountType::Reader),
            "librarian" => Ok(AccountType::Librarian),
            "admin" => Ok(AccountType::Admin),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

// SQLx conversion for AccountType
impl sqlx::Type<Postgres> for AccountType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for AccountType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: &str = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AccountType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
}

/// Short user representation (borrowers)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default)]
    pub account_type: AccountType,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountType,
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Claims for `user`, valid for `expiration_hours`
    pub fn for_user(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            account_type: user.account_type,
            permissions: user.account_type.permissions(),
            exp: now + expiration_hours as i64 * 3600,
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(account_type: AccountType) -> User {
        User {
            id: 5,
            username: "marian".into(),
            password: String::new(),
            first_name: "Marian".into(),
            last_name: "Paroo".into(),
            email: None,
            account_type,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reader_has_no_permissions() {
        let claims = UserClaims::for_user(&user(AccountType::Reader), 1);
        assert!(claims.require(Permission::CanMarkReturned).is_err());
        assert!(claims.require(Permission::ViewAllBorrowed).is_err());
    }

    #[test]
    fn test_librarian_permissions() {
        let claims = UserClaims::for_user(&user(AccountType::Librarian), 1);
        assert!(claims.require(Permission::CanMarkReturned).is_ok());
        assert!(claims.require(Permission::ManageCatalog).is_ok());
        assert!(matches!(
            claims.require(Permission::ManageUsers),
            Err(AppError::Authorization(_))
        ));
    }

    #[test]
    fn test_token_round_trip() {
        let claims = UserClaims::for_user(&user(AccountType::Admin), 2);
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 5);
        assert_eq!(parsed.account_type, AccountType::Admin);
        assert!(parsed.has_permission(Permission::ManageUsers));
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!("Librarian".parse::<AccountType>(), Ok(AccountType::Librarian));
        assert!("guest".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_password_not_serialized() {
        let mut u = user(AccountType::Reader);
        u.password = "$argon2id$hash".into();
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["account_type"], "reader");
    }
}
