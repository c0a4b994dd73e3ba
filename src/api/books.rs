//! Catalogue and borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, BookListing, PageQuery},
    services::books::BorrowRejection,
};

use super::CurrentCustomer;

/// Body returned when a borrow is rejected
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessageResponse {
    /// Message to show to the customer
    pub error_message: String,
}

impl IntoResponse for BorrowRejection {
    fn into_response(self) -> Response {
        let status = match self {
            BorrowRejection::BookNotFound => StatusCode::NOT_FOUND,
            BorrowRejection::NoCopiesLeft => StatusCode::CONFLICT,
            BorrowRejection::CommitFailed | BorrowRejection::ListingFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorMessageResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Catalogue search parameters
#[derive(Debug, Deserialize, Validate, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Substring of the title
    pub title: Option<String>,
    /// Substring of the author
    pub author: Option<String>,
    /// Page number (default: 1)
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
}

fn validated<T: Validate>(query: &T) -> AppResult<()> {
    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// List the catalogue
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = BookListing),
        (status = 400, description = "Invalid page")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookListing>> {
    validated(&query)?;

    let listing = state.services.books.list(query.page()).await?;
    Ok(Json(listing))
}

/// Search the catalogue by title and author
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = BookListing),
        (status = 400, description = "Invalid page")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<BookListing>> {
    validated(&query)?;

    let filter = BookFilter {
        title: query.title.filter(|t| !t.trim().is_empty()),
        author: query.author.filter(|a| !a.trim().is_empty()),
    };
    let listing = state
        .services
        .books
        .search(&filter, query.page.unwrap_or(1))
        .await?;
    Ok(Json(listing))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Add one copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Updated book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_copy(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.add_copy(id).await?;
    Ok(Json(book))
}

/// Borrow a book for the current customer
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Customer's books after the loan", body = BookListing),
        (status = 401, description = "Missing customer cookie"),
        (status = 404, description = "Book not found", body = ErrorMessageResponse),
        (status = 409, description = "No copies left", body = ErrorMessageResponse),
        (status = 500, description = "Loan could not be recorded", body = ErrorMessageResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Path(id): Path<i32>,
) -> Result<Json<BookListing>, BorrowRejection> {
    let listing = state.services.books.borrow(id, customer_id).await?;
    Ok(Json(listing))
}

/// Books held by the current customer
#[utoipa::path(
    get,
    path = "/my-books",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "Customer's books", body = BookListing),
        (status = 401, description = "Missing customer cookie")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    CurrentCustomer(customer_id): CurrentCustomer,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookListing>> {
    validated(&query)?;

    let listing = state.services.books.loans_of(customer_id, query.page()).await?;
    Ok(Json(listing))
}
