//! Data models for the bookstore

pub mod book;
pub mod loan;
pub mod pagination;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookSummary};
pub use loan::Loan;
pub use pagination::{BookListing, Page, PageQuery, PageRequest};
