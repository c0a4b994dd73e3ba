//! Loan (borrow) record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One copy of a book currently held by a customer.
///
/// Only ever created by a successful borrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub book_id: i32,
    pub customer_id: i32,
    pub borrowed_at: DateTime<Utc>,
}
