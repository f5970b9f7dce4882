//! Catalog management service: books, authors and genres

use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        book::{author_ref, Book, BookDetails, BookSummary, CreateBook, UpdateBook},
        book_instance::LoanStatus,
        genre::{Genre, GenreForm},
        page::{Page, Pagination},
    },
    repository::Repository,
};

/// Genre counted on the home page
const FEATURED_GENRE: &str = "fiction";

/// Home page counters
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_fiction: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count(None).await?,
            num_instances_available: self
                .repository
                .book_instances
                .count(Some(LoanStatus::Available))
                .await?,
            num_authors: self.repository.authors.count().await?,
            num_fiction: self.repository.genres.count_named(FEATURED_GENRE).await?,
        })
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, page: Option<i64>) -> AppResult<Page<BookSummary>> {
        let pagination = Pagination::new(page, self.config.books_per_page)?;
        let (books, total) = self.repository.books.list(&pagination).await?;
        pagination.into_page(books, total)
    }

    /// Book with author, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let author = match book.author_id {
            Some(author_id) => Some(self.repository.authors.get_by_id(author_id).await?),
            None => None,
        };
        let genres = self.repository.genres.get_for_book(id).await?;
        let today = super::today();
        let instances = self
            .repository
            .book_instances
            .get_for_book(id)
            .await?
            .into_iter()
            .map(|row| row.into_details(today))
            .collect();

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author: author.and_then(|a| author_ref(Some(a.id), Some(a.first_name), Some(a.last_name))),
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.books.create(&book).await?;
        tracing::info!("Created book id={} title={:?}", created.id, created.title);
        Ok(created)
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()?;
        self.repository.books.update(id, &book).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, page: Option<i64>) -> AppResult<Page<Author>> {
        let pagination = Pagination::new(page, self.config.authors_per_page)?;
        let (authors, total) = self.repository.authors.list(&pagination).await?;
        pagination.into_page(authors, total)
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.get_books(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, author: AuthorForm) -> AppResult<Author> {
        author.check()?;
        let created = self.repository.authors.create(&author).await?;
        tracing::info!("Created author id={} ({})", created.id, created.display_name());
        Ok(created)
    }

    pub async fn update_author(&self, id: i32, author: AuthorForm) -> AppResult<Author> {
        author.check()?;
        self.repository.authors.update(id, &author).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    /// Create a genre; names are unique regardless of case
    pub async fn create_genre(&self, genre: GenreForm) -> AppResult<Genre> {
        let genre = genre.trimmed();
        genre.validate()?;
        let name = genre.name.as_str();
        if self.repository.genres.name_exists(name, None).await? {
            return Err(AppError::Conflict(format!("Genre {:?} already exists", name)));
        }
        self.repository.genres.create(name).await
    }

    pub async fn update_genre(&self, id: i32, genre: GenreForm) -> AppResult<Genre> {
        let genre = genre.trimmed();
        genre.validate()?;
        let name = genre.name.as_str();
        if self.repository.genres.name_exists(name, Some(id)).await? {
            return Err(AppError::Conflict(format!("Genre {:?} already exists", name)));
        }
        self.repository.genres.update(id, name).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }
}
