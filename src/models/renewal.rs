//! Loan renewal form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::book_instance::BookInstanceDetails;

/// Latest allowed renewal, in weeks from today
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Renewal proposed when the form is first shown
pub const PROPOSED_RENEWAL_WEEKS: i64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenewalError {
    #[error("Invalid date - renewal in past")]
    InPast,

    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,

    /// The submission carried no readable date
    #[error("Enter a valid date.")]
    Unreadable,
}

/// Submitted renewal form
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RenewBookForm {
    /// Enter a date between now and 4 weeks (default 3)
    pub renewal_date: NaiveDate,
}

impl RenewBookForm {
    /// Form pre-filled with the default renewal date
    pub fn proposed(today: NaiveDate) -> Self {
        Self {
            renewal_date: today + Duration::weeks(PROPOSED_RENEWAL_WEEKS),
        }
    }

    /// Returns the cleaned date when it lies in `[today, today + 4 weeks]`
    pub fn clean_renewal_date(&self, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
        if self.renewal_date < today {
            return Err(RenewalError::InPast);
        }
        if self.renewal_date > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
            return Err(RenewalError::TooFarAhead);
        }
        Ok(self.renewal_date)
    }
}

/// Renewal form as displayed to the librarian
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewalFormView {
    pub book_instance: BookInstanceDetails,
    /// Proposed or submitted date; null when the submission was unreadable
    pub renewal_date: Option<NaiveDate>,
    pub errors: Vec<String>,
}

impl RenewalFormView {
    /// The form as first shown, pre-filled with the proposed date
    pub fn proposed(book_instance: BookInstanceDetails, today: NaiveDate) -> Self {
        Self {
            book_instance,
            renewal_date: Some(RenewBookForm::proposed(today).renewal_date),
            errors: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()
    }

    fn form(offset_days: i64) -> RenewBookForm {
        RenewBookForm {
            renewal_date: today() + Duration::days(offset_days),
        }
    }

    #[test]
    fn test_date_in_past_rejected() {
        assert_eq!(form(-1).clean_renewal_date(today()), Err(RenewalError::InPast));
    }

    #[test]
    fn test_date_beyond_four_weeks_rejected() {
        assert_eq!(form(29).clean_renewal_date(today()), Err(RenewalError::TooFarAhead));
    }

    #[test]
    fn test_bounds_accepted() {
        assert_eq!(form(0).clean_renewal_date(today()), Ok(today()));
        let last = today() + Duration::weeks(4);
        assert_eq!(form(28).clean_renewal_date(today()), Ok(last));
        assert!(form(10).clean_renewal_date(today()).is_ok());
    }

    #[test]
    fn test_proposed_date_is_three_weeks_out() {
        let proposed = RenewBookForm::proposed(today());
        assert_eq!(proposed.renewal_date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
        assert!(proposed.clean_renewal_date(today()).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RenewalError::InPast.to_string(), "Invalid date - renewal in past");
        assert_eq!(
            RenewalError::TooFarAhead.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
        assert_eq!(RenewalError::Unreadable.to_string(), "Enter a valid date.");
    }
}
