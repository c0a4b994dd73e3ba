//! Books repository backed by PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookRow, Book, BookFilter, BookSummary, Loan, Page, PageRequest,
    },
};

use super::BookRepository;

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// `%term%` pattern matching `term` literally under `ESCAPE '\'`
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn get(&self, book_id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            "SELECT id, isbn, title, author, stock FROM books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        Book::try_from(row)
    }

    async fn get_all(&self, page: &PageRequest) -> AppResult<Page<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, isbn, title, author
            FROM books
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.fetch_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::from_overfetch(rows, page))
    }

    async fn search(&self, filter: &BookFilter, page: &PageRequest) -> AppResult<Page<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, isbn, title, author
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR author ILIKE $2 ESCAPE '\')
            ORDER BY id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.title.as_deref().map(contains_pattern))
        .bind(filter.author.as_deref().map(contains_pattern))
        .bind(page.fetch_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::from_overfetch(rows, page))
    }

    async fn get_by_user(&self, customer_id: i32, page: &PageRequest) -> AppResult<Page<BookSummary>> {
        let rows = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.isbn, b.title, b.author
            FROM borrowed_books bb
            JOIN books b ON b.id = bb.book_id
            WHERE bb.customer_id = $1
            ORDER BY bb.borrowed_at, bb.id, b.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(customer_id)
        .bind(page.fetch_limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::from_overfetch(rows, page))
    }

    async fn borrow(&self, book: &Book, customer_id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE books SET stock = stock - 1 WHERE id = $1 AND stock > 0")
            .bind(book.id())
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "No copy of book {} left to lend",
                book.id()
            )));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO borrowed_books (book_id, customer_id, borrowed_at)
            VALUES ($1, $2, $3)
            RETURNING id, book_id, customer_id, borrowed_at
            "#,
        )
        .bind(book.id())
        .bind(customer_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(book_id = book.id(), customer_id, loan_id = loan.id, "Loan recorded");
        Ok(loan)
    }

    async fn add_copy(&self, book_id: i32) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books SET stock = stock + 1
            WHERE id = $1
            RETURNING id, isbn, title, author, stock
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        Book::try_from(row)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! These run against a scratch database: `DATABASE_URL=... cargo test -- --ignored`

    use super::*;
    use sqlx::PgPool;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("dune"), "%dune%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    async fn seed(pool: &PgPool, stock: i32) -> i32 {
        sqlx::query("INSERT INTO customers (id, firstname, surname, email) VALUES (9, 'Ada', 'Byron', 'ada@example.org'), (10, 'Mary', 'Shelley', 'mary@example.org')")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO books (isbn, title, author, stock) VALUES ('9780141439471', 'Frankenstein', 'Mary Shelley', $1) RETURNING id",
        )
        .bind(stock)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_get_is_repeatable(pool: PgPool) {
        let id = seed(&pool, 2).await;
        let repo = PgBookRepository::new(pool);

        let first = repo.get(id).await.unwrap();
        let second = repo.get(id).await.unwrap();
        assert_eq!(first, second);
        assert!(matches!(repo.get(id + 1000).await, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_concurrent_borrow_of_last_copy(pool: PgPool) {
        let id = seed(&pool, 1).await;
        let repo = PgBookRepository::new(pool);
        let book = repo.get(id).await.unwrap();

        let (a, b) = tokio::join!(repo.borrow(&book, 9), repo.borrow(&book, 10));
        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert!(a.err().or(b.err()).unwrap().is_storage_fault());
        assert_eq!(repo.get(id).await.unwrap().available_copies(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_failed_loan_insert_rolls_back_decrement(pool: PgPool) {
        let id = seed(&pool, 1).await;
        let repo = PgBookRepository::new(pool);
        let book = repo.get(id).await.unwrap();

        // Unknown customer violates the foreign key after the decrement ran.
        assert!(repo.borrow(&book, 4242).await.is_err());
        assert_eq!(repo.get(id).await.unwrap().available_copies(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_search_treats_wildcards_literally(pool: PgPool) {
        seed(&pool, 1).await;
        let repo = PgBookRepository::new(pool);

        let filter = BookFilter {
            title: Some("%".to_string()),
            author: None,
        };
        let page = repo.search(&filter, &PageRequest::new(1, 10)).await.unwrap();
        assert!(page.items.is_empty());

        let filter = BookFilter {
            title: Some("kenstein".to_string()),
            author: Some("shelley".to_string()),
        };
        let page = repo.search(&filter, &PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_get_by_user_pages(pool: PgPool) {
        let id = seed(&pool, 3).await;
        let repo = PgBookRepository::new(pool);
        let book = repo.get(id).await.unwrap();
        repo.borrow(&book, 9).await.unwrap();
        repo.borrow(&book, 9).await.unwrap();

        let first = repo.get_by_user(9, &PageRequest::new(1, 1)).await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(!first.last_page);

        let beyond = repo.get_by_user(9, &PageRequest::new(5, 1)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert!(beyond.last_page);
    }
}
