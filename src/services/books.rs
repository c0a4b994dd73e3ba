//! Catalogue and borrowing service

use std::sync::Arc;

use thiserror::Error;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, BookListing, PageRequest},
    repository::BookRepository,
};

/// Why a borrow request ended without a loan.
///
/// The display text is the message shown to the customer; internal error
/// details are logged where the rejection is produced and never carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BorrowRejection {
    #[error("Book not found.")]
    BookNotFound,
    #[error("There are no copies left.")]
    NoCopiesLeft,
    #[error("Error borrowing book.")]
    CommitFailed,
    /// The loan was recorded but the follow-up listing could not be read
    #[error("Error fetching books.")]
    ListingFailed,
}

#[derive(Clone)]
pub struct BooksService {
    repository: Arc<dyn BookRepository>,
    page_size: i64,
}

impl BooksService {
    pub fn new(repository: Arc<dyn BookRepository>, page_size: i64) -> Self {
        Self {
            repository,
            page_size,
        }
    }

    fn first_page(&self) -> PageRequest {
        PageRequest::new(1, self.page_size)
    }

    /// Lend one copy of a book to a customer.
    ///
    /// On success returns the first page of the customer's loans, read fresh
    /// after the commit.
    pub async fn borrow(&self, book_id: i32, customer_id: i32) -> Result<BookListing, BorrowRejection> {
        let mut book = match self.repository.get(book_id).await {
            Ok(book) => book,
            Err(AppError::NotFound(_)) => {
                tracing::info!(book_id, customer_id, "Borrow rejected: unknown book");
                return Err(BorrowRejection::BookNotFound);
            }
            Err(e) => {
                tracing::error!(book_id, customer_id, "Borrow failed reading book: {}", e);
                return Err(BorrowRejection::CommitFailed);
            }
        };

        if !book.can_borrow() {
            tracing::info!(book_id, customer_id, "Borrow rejected: no copies left");
            return Err(BorrowRejection::NoCopiesLeft);
        }

        // The store repeats this decrement conditionally; that one is authoritative.
        if let Err(e) = book.decrement_copy() {
            tracing::error!(book_id, customer_id, "Borrow failed updating book: {}", e);
            return Err(BorrowRejection::CommitFailed);
        }

        if let Err(e) = self.repository.borrow(&book, customer_id).await {
            if e.is_storage_fault() {
                tracing::warn!(book_id, customer_id, "Borrow failed to commit: {}", e);
            } else {
                tracing::error!(book_id, customer_id, "Borrow failed to commit: {}", e);
            }
            return Err(BorrowRejection::CommitFailed);
        }

        tracing::info!(book_id, customer_id, "Book borrowed");

        let request = self.first_page();
        match self.repository.get_by_user(customer_id, &request).await {
            Ok(page) => Ok(BookListing::new(page, &request)),
            Err(e) => {
                tracing::error!(customer_id, "Could not list loans after borrow: {}", e);
                Err(BorrowRejection::ListingFailed)
            }
        }
    }

    /// Books currently held by a customer
    pub async fn loans_of(&self, customer_id: i32, page: i64) -> AppResult<BookListing> {
        let request = PageRequest::new(page, self.page_size);
        let books = self.repository.get_by_user(customer_id, &request).await?;
        Ok(BookListing::new(books, &request))
    }

    /// Whole catalogue, by id
    pub async fn list(&self, page: i64) -> AppResult<BookListing> {
        let request = PageRequest::new(page, self.page_size);
        let books = self.repository.get_all(&request).await?;
        Ok(BookListing::new(books, &request))
    }

    /// Catalogue search on title and author
    pub async fn search(&self, filter: &BookFilter, page: i64) -> AppResult<BookListing> {
        let request = PageRequest::new(page, self.page_size);
        let books = self.repository.search(filter, &request).await?;
        Ok(BookListing::new(books, &request))
    }

    pub async fn get(&self, book_id: i32) -> AppResult<Book> {
        self.repository.get(book_id).await
    }

    /// Put one more copy of a book on the shelf
    pub async fn add_copy(&self, book_id: i32) -> AppResult<Book> {
        let book = self.repository.add_copy(book_id).await?;
        tracing::info!(book_id, stock = book.available_copies(), "Copy added");
        Ok(book)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
