//! Book model and its copy-count invariants

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// A catalogue title together with the number of copies on the shelf.
///
/// The stock is only ever changed through [`Book::add_copy`] and
/// [`Book::decrement_copy`], so it can never go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Book {
    id: i32,
    isbn: String,
    title: String,
    author: String,
    available_copies: i32,
}

impl Book {
    /// Create a book with no copies available
    pub fn new(
        id: i32,
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id,
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            available_copies: 0,
        }
    }

    /// Create a book with an initial stock
    pub fn with_copies(
        id: i32,
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        available_copies: u32,
    ) -> AppResult<Self> {
        let available_copies = i32::try_from(available_copies)
            .map_err(|_| AppError::Validation("Stock too large".to_string()))?;
        Ok(Self {
            available_copies,
            ..Self::new(id, isbn, title, author)
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn available_copies(&self) -> i32 {
        self.available_copies
    }

    /// Put one more copy on the shelf; the stock saturates at `i32::MAX`
    pub fn add_copy(&mut self) {
        self.available_copies = self.available_copies.saturating_add(1);
    }

    /// Whether at least one copy can be lent
    pub fn can_borrow(&self) -> bool {
        self.available_copies > 0
    }

    /// Take one copy off the shelf.
    ///
    /// Callers must check [`Book::can_borrow`] first; calling this on an empty
    /// stock is a programming error.
    pub fn decrement_copy(&mut self) -> AppResult<()> {
        if !self.can_borrow() {
            return Err(AppError::InvalidState(format!(
                "Book {} has no copy left to decrement",
                self.id
            )));
        }
        self.available_copies -= 1;
        Ok(())
    }
}

/// Book row as stored in the `books` table
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub stock: i32,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        if row.stock < 0 {
            return Err(AppError::InvalidState(format!(
                "Book {} has a negative stock ({})",
                row.id, row.stock
            )));
        }
        Ok(Self {
            id: row.id,
            isbn: row.isbn,
            title: row.title,
            author: row.author,
            available_copies: row.stock,
        })
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

/// Title/author filter for catalogue searches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookFilter {
    /// Case-insensitive substring match on both fields
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_deref()
                .map(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
                .unwrap_or(true)
        }
        contains(&book.title, &self.title) && contains(&book.author, &self.author)
    }
}
