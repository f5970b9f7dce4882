//! Loan management service: copies, on-loan listings and renewals

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{
        book_instance::{BookInstance, BookInstanceDetails, BookInstanceForm, BookInstanceQuery, LoanStatus},
        page::{Page, Pagination},
        renewal::{RenewBookForm, RenewalError, RenewalFormView},
    },
    repository::Repository,
};

/// Result of a renewal submission
#[derive(Debug)]
pub enum RenewalOutcome {
    Renewed(BookInstanceDetails),
    /// The form is shown again with its errors
    Invalid(RenewalFormView),
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: CatalogConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Copies on loan to one user, soonest due first
    pub async fn borrowed_by_user(&self, user_id: i32, page: Option<i64>) -> AppResult<Page<BookInstanceDetails>> {
        self.search(Some(LoanStatus::OnLoan), None, Some(user_id), page).await
    }

    /// Every copy on loan, soonest due first
    pub async fn all_borrowed(&self, page: Option<i64>) -> AppResult<Page<BookInstanceDetails>> {
        self.search(Some(LoanStatus::OnLoan), None, None, page).await
    }

    /// Back-office listing with status and due date filters
    pub async fn list_instances(&self, query: &BookInstanceQuery) -> AppResult<Page<BookInstanceDetails>> {
        self.search(query.status, query.due_back, None, query.page).await
    }

    async fn search(
        &self,
        status: Option<LoanStatus>,
        due_back: Option<NaiveDate>,
        borrower_id: Option<i32>,
        page: Option<i64>,
    ) -> AppResult<Page<BookInstanceDetails>> {
        let pagination = Pagination::new(page, self.config.loans_per_page)?;
        let (rows, total) = self
            .repository
            .book_instances
            .search(status, due_back, borrower_id, &pagination)
            .await?;
        let today = super::today();
        let items = rows.into_iter().map(|row| row.into_details(today)).collect();
        pagination.into_page(items, total)
    }

    pub async fn get_instance(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let row = self.repository.book_instances.get_by_id(id).await?;
        Ok(row.into_details(super::today()))
    }

    /// Copies of a book
    pub async fn get_book_instances(&self, book_id: i32) -> AppResult<Vec<BookInstanceDetails>> {
        self.repository.books.get_by_id(book_id).await?;
        let today = super::today();
        Ok(self
            .repository
            .book_instances
            .get_for_book(book_id)
            .await?
            .into_iter()
            .map(|row| row.into_details(today))
            .collect())
    }

    pub async fn create_instance(&self, instance: BookInstanceForm) -> AppResult<BookInstance> {
        instance.validate()?;
        let instance = instance.normalized();
        let created = self.repository.book_instances.create(&instance).await?;
        tracing::info!("Created book instance {} (status {})", created.id, created.status);
        Ok(created)
    }

    pub async fn update_instance(&self, id: Uuid, instance: BookInstanceForm) -> AppResult<BookInstance> {
        instance.validate()?;
        let instance = instance.normalized();
        self.repository.book_instances.update(id, &instance).await
    }

    pub async fn delete_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.delete(id).await
    }

    /// The renewal form as first shown, with the proposed date
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalFormView> {
        let book_instance = self.get_instance(id).await?;
        Ok(RenewalFormView::proposed(book_instance, super::today()))
    }

    /// Validate a submitted renewal and write the new due date.
    ///
    /// `form` is `None` when the submission could not be read as a date.
    pub async fn renew(&self, id: Uuid, form: Option<RenewBookForm>) -> AppResult<RenewalOutcome> {
        let book_instance = self.get_instance(id).await?;

        let outcome = decide_renewal(book_instance, form, super::today());
        match &outcome {
            RenewalOutcome::Renewed(renewed) => {
                if let Some(renewal_date) = renewed.due_back {
                    self.repository.book_instances.set_due_back(id, renewal_date).await?;
                    tracing::info!("Renewed book instance {} until {}", id, renewal_date);
                }
            }
            RenewalOutcome::Invalid(view) => {
                tracing::debug!("Rejected renewal of {}: {:?}", id, view.errors);
            }
        }
        Ok(outcome)
    }
}

/// Accept or reject a renewal of `book_instance` submitted on `today`
pub fn decide_renewal(
    book_instance: BookInstanceDetails,
    form: Option<RenewBookForm>,
    today: NaiveDate,
) -> RenewalOutcome {
    let cleaned = match &form {
        Some(form) => form.clean_renewal_date(today),
        None => Err(RenewalError::Unreadable),
    };

    match cleaned {
        Ok(renewal_date) => RenewalOutcome::Renewed(BookInstanceDetails {
            due_back: Some(renewal_date),
            is_overdue: false,
            ..book_instance
        }),
        Err(e) => RenewalOutcome::Invalid(RenewalFormView {
            book_instance,
            renewal_date: form.map(|form| form.renewal_date),
            errors: vec![e.to_string()],
        }),
    }
}
