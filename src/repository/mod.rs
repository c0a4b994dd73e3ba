//! Repository layer for database operations

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Book, BookFilter, BookSummary, Loan, Page, PageRequest},
};

pub use books::PgBookRepository;
pub use memory::MemoryBookRepository;

/// Persistence boundary for books and their loans.
///
/// Implementations never retry; every failure goes straight back to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Current persisted state of a book
    async fn get(&self, book_id: i32) -> AppResult<Book>;

    /// Catalogue listing ordered by id
    async fn get_all(&self, page: &PageRequest) -> AppResult<Page<BookSummary>>;

    /// Catalogue search, case-insensitive on title and author
    async fn search(&self, filter: &BookFilter, page: &PageRequest) -> AppResult<Page<BookSummary>>;

    /// Books currently on loan to a customer, oldest loan first
    async fn get_by_user(&self, customer_id: i32, page: &PageRequest) -> AppResult<Page<BookSummary>>;

    /// Take one copy of `book` and record the loan, as a single atomic unit.
    ///
    /// The decrement is conditional on the stored stock being positive, so
    /// of several concurrent borrowers of the last copy only one succeeds;
    /// the others get [`crate::AppError::Conflict`].
    async fn borrow(&self, book: &Book, customer_id: i32) -> AppResult<Loan>;

    /// Put one more copy of a book on the shelf
    async fn add_copy(&self, book_id: i32) -> AppResult<Book>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}
