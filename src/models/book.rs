//! Book model and related types

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{book_instance::BookInstanceDetails, genre::Genre};

/// 13 character ISBN
static ISBN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").unwrap());

/// Number of genres shown in listings
const DISPLAY_GENRE_COUNT: usize = 3;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author_id: Option<i32>,
}

/// Reference to a book, used inside other records
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
}

/// Author reference embedded in book payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorRef {
    pub id: i32,
    /// "Last, First"
    pub name: String,
}

/// Book as shown in the paginated listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: Option<AuthorRef>,
    pub display_genre: String,
}

/// Internal row for the listing query (genre names pre-aggregated)
#[derive(Debug, FromRow)]
pub struct BookSummaryRow {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub genre_names: Vec<String>,
}

impl From<BookSummaryRow> for BookSummary {
    fn from(row: BookSummaryRow) -> Self {
        BookSummary {
            id: row.id,
            title: row.title,
            author: author_ref(row.author_id, row.author_first_name, row.author_last_name),
            display_genre: display_genre(&row.genre_names),
        }
    }
}

pub(crate) fn author_ref(
    id: Option<i32>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Option<AuthorRef> {
    id.map(|id| AuthorRef {
        id,
        name: format!(
            "{}, {}",
            last_name.unwrap_or_default(),
            first_name.unwrap_or_default()
        ),
    })
}

/// Comma-separated names of the first few genres
pub fn display_genre(names: &[String]) -> String {
    names
        .iter()
        .take(DISPLAY_GENRE_COUNT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Book with author, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorRef>,
    pub genres: Vec<Genre>,
    pub instances: Vec<BookInstanceDetails>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Summary is limited to 1000 characters"))]
    pub summary: String,
    #[validate(regex(path = *ISBN_RE, message = "ISBN must have 13 digits"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

/// Update book request (the title is fixed once created)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary is limited to 1000 characters"))]
    pub summary: String,
    #[validate(regex(path = *ISBN_RE, message = "ISBN must have 13 digits"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_display_genre_takes_first_three() {
        let genres = names(&["Fantasy", "Fiction", "Horror", "Poetry"]);
        assert_eq!(display_genre(&genres), "Fantasy, Fiction, Horror");
    }

    #[test]
    fn test_display_genre_empty() {
        assert_eq!(display_genre(&[]), "");
    }

    #[test]
    fn test_isbn_must_be_13_digits() {
        let mut book = CreateBook {
            title: "Foundation".into(),
            summary: String::new(),
            isbn: "9780553293357".into(),
            author_id: None,
            genre_ids: vec![],
        };
        assert!(book.validate().is_ok());

        book.isbn = "978-0553293357".into();
        assert!(book.validate().is_err());

        book.isbn = "978055329335".into();
        assert!(book.validate().is_err());

        // Arabic-Indic digits
        book.isbn = "\u{0669}\u{0667}\u{0668}\u{0660}\u{0665}\u{0665}\u{0663}\u{0662}\u{0669}\u{0663}\u{0663}\u{0665}\u{0667}".into();
        assert_eq!(book.isbn.chars().count(), 13);
        assert!(book.validate().is_err());
    }

    #[test]
    fn test_summary_row_conversion() {
        let row = BookSummaryRow {
            id: 7,
            title: "Dune".into(),
            author_id: Some(2),
            author_first_name: Some("Frank".into()),
            author_last_name: Some("Herbert".into()),
            genre_names: names(&["Science Fiction"]),
        };
        let summary = BookSummary::from(row);
        assert_eq!(summary.author.unwrap().name, "Herbert, Frank");
        assert_eq!(summary.display_genre, "Science Fiction");
    }
}
