//! API handlers for the bookstore REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{error::AppError, AppState};

/// Name of the cookie carrying the customer id
pub const CUSTOMER_COOKIE: &str = "id";

/// Customer identified by the `id` cookie.
///
/// The value is trusted as-is; no authentication happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCustomer(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let cookie = jar
            .get(CUSTOMER_COOKIE)
            .ok_or_else(|| AppError::Authentication("Missing customer cookie".to_string()))?;

        let customer_id = cookie
            .value()
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::Authentication("Invalid customer cookie".to_string()))?;

        Ok(CurrentCustomer(customer_id))
    }
}

/// API v1 routes
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalogue
        .route("/books", get(books::list_books))
        .route("/books/search", get(books::search_books))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/copies", post(books::add_copy))
        // Borrowing
        .route("/books/:id/borrow", post(books::borrow_book))
        .route("/my-books", get(books::my_books))
        .with_state(state)
}
