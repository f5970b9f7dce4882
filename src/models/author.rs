//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;
use crate::error::{AppError, AppResult};

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Create/update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorForm {
    /// Field validation plus the cross-field date check
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if let (Some(born), Some(died)) = (self.date_of_birth, self.date_of_death) {
            if died < born {
                return Err(AppError::Validation(
                    "Date of death cannot precede date of birth".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, last: &str) -> AuthorForm {
        AuthorForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1920, 1, 2),
            date_of_death: NaiveDate::from_ymd_opt(1992, 4, 6),
        }
    }

    #[test]
    fn test_display_name() {
        let author = Author {
            id: 1,
            first_name: "Isaac".into(),
            last_name: "Asimov".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_eq!(author.display_name(), "Asimov, Isaac");
    }

    #[test]
    fn test_valid_form() {
        assert!(form("Isaac", "Asimov").check().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(form("", "Asimov").check(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_death_before_birth_rejected() {
        let mut f = form("Isaac", "Asimov");
        f.date_of_death = NaiveDate::from_ymd_opt(1900, 1, 1);
        assert!(matches!(f.check(), Err(AppError::Validation(_))));
    }
}
