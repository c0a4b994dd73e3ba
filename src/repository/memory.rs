//! In-process book store
//!
//! Keeps the same contract as the PostgreSQL repository: every operation
//! takes the lock once, so the availability check and the decrement of a
//! borrow can never interleave with another borrower.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, BookSummary, Loan, Page, PageRequest},
};

use super::BookRepository;

#[derive(Default)]
struct Store {
    books: BTreeMap<i32, Book>,
    loans: Vec<Loan>,
    next_loan_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryBookRepository {
    store: Arc<Mutex<Store>>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a catalogue entry
    pub async fn insert(&self, book: Book) {
        self.store.lock().await.books.insert(book.id(), book);
    }

    /// All loans recorded so far, in creation order
    pub async fn loans(&self) -> Vec<Loan> {
        self.store.lock().await.loans.clone()
    }
}

fn not_found(book_id: i32) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", book_id))
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn get(&self, book_id: i32) -> AppResult<Book> {
        let store = self.store.lock().await;
        store.books.get(&book_id).cloned().ok_or_else(|| not_found(book_id))
    }

    async fn get_all(&self, page: &PageRequest) -> AppResult<Page<BookSummary>> {
        let store = self.store.lock().await;
        let rows: Vec<BookSummary> = store.books.values().map(BookSummary::from).collect();
        Ok(Page::slice(&rows, page))
    }

    async fn search(&self, filter: &BookFilter, page: &PageRequest) -> AppResult<Page<BookSummary>> {
        let store = self.store.lock().await;
        let rows: Vec<BookSummary> = store
            .books
            .values()
            .filter(|book| filter.matches(book))
            .map(BookSummary::from)
            .collect();
        Ok(Page::slice(&rows, page))
    }

    async fn get_by_user(&self, customer_id: i32, page: &PageRequest) -> AppResult<Page<BookSummary>> {
        let store = self.store.lock().await;

        let mut held: Vec<&Loan> = store
            .loans
            .iter()
            .filter(|loan| loan.customer_id == customer_id)
            .collect();
        held.sort_by_key(|loan| (loan.borrowed_at, loan.id, loan.book_id));

        let rows: Vec<BookSummary> = held
            .into_iter()
            .filter_map(|loan| store.books.get(&loan.book_id))
            .map(BookSummary::from)
            .collect();
        Ok(Page::slice(&rows, page))
    }

    async fn borrow(&self, book: &Book, customer_id: i32) -> AppResult<Loan> {
        let mut store = self.store.lock().await;

        let stored = store
            .books
            .get_mut(&book.id())
            .filter(|stored| stored.can_borrow())
            .ok_or_else(|| AppError::Conflict(format!("No copy of book {} left to lend", book.id())))?;
        stored.decrement_copy()?;

        store.next_loan_id += 1;
        let loan = Loan {
            id: store.next_loan_id,
            book_id: book.id(),
            customer_id,
            borrowed_at: Utc::now(),
        };
        store.loans.push(loan.clone());

        tracing::debug!(book_id = book.id(), customer_id, loan_id = loan.id, "Loan recorded");
        Ok(loan)
    }

    async fn add_copy(&self, book_id: i32) -> AppResult<Book> {
        let mut store = self.store.lock().await;
        let stored = store.books.get_mut(&book_id).ok_or_else(|| not_found(book_id))?;
        stored.add_copy();
        Ok(stored.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
