//! Business logic services

pub mod books;

use std::sync::Arc;

use crate::{config::LoansConfig, repository::BookRepository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
}

impl Services {
    /// Create all services on top of the given repository
    pub fn new(repository: Arc<dyn BookRepository>, loans: &LoansConfig) -> Self {
        Self {
            books: books::BooksService::new(repository, loans.page_size),
        }
    }
}
