//! Page-number pagination shared by the listing endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{
    author::Author,
    book::BookSummary,
    book_instance::BookInstanceDetails,
    user::User,
};
use crate::error::{AppError, AppResult};

/// `?page=` query parameter (1-based)
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// One page of a listing
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    BookPage = Page<BookSummary>,
    AuthorPage = Page<Author>,
    BookInstancePage = Page<BookInstanceDetails>,
    UserPage = Page<User>
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: i64) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::NotFound(format!("Invalid page ({})", page)));
        }
        let per_page = per_page.max(1);
        // Pages whose offset does not fit an i64 are necessarily past the end
        if (page - 1).checked_mul(per_page).is_none() {
            return Err(AppError::NotFound(format!(
                "Invalid page ({}): that page contains no results",
                page
            )));
        }
        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Number of pages for `total` records; an empty listing still has one page.
    pub fn num_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            1
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }

    /// Wrap a fetched slice, rejecting page numbers past the last page
    pub fn into_page<T>(self, items: Vec<T>, total: i64) -> AppResult<Page<T>> {
        let num_pages = self.num_pages(total);
        if self.page > num_pages {
            return Err(AppError::NotFound(format!(
                "Invalid page ({}): that page contains no results",
                self.page
            )));
        }

        Ok(Page {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
            num_pages,
            has_next: self.page < num_pages,
            has_previous: self.page > 1,
        })
    }
}
