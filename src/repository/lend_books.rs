//! Lend-book repository for database operations

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::lend_book::{CreateLendBook, LendBook, UpdateLendBook},
};

#[derive(Clone)]
pub struct LendBooksRepository {
    pool: Pool<Postgres>,
}

impl LendBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all loans, most recent first
    pub async fn list(&self) -> AppResult<Vec<LendBook>> {
        let loans = sqlx::query_as::<_, LendBook>("SELECT * FROM lend_book ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<LendBook> {
        sqlx::query_as::<_, LendBook>("SELECT * FROM lend_book WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lend book with id {} not found", id)))
    }

    /// Loans of a user, active ones first
    pub async fn get_user_loans(&self, user_id: i64) -> AppResult<Vec<LendBook>> {
        let loans = sqlx::query_as::<_, LendBook>(
            "SELECT * FROM lend_book WHERE user_id = $1 ORDER BY returned, deadline",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Count a user's unreturned loans
    pub async fn count_active_for_user(&self, user_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lend_book WHERE user_id = $1 AND returned = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Insert an active loan with its computed deadline
    pub async fn create(&self, loan: &CreateLendBook, deadline: NaiveDate) -> AppResult<LendBook> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, LendBook>(
            r#"
            INSERT INTO lend_book (identification, isbn, observations, deadline, returned, user_id, book_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(&loan.identification)
        .bind(&loan.isbn)
        .bind(&loan.observations)
        .bind(deadline)
        .bind(loan.user_id)
        .bind(loan.book_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Apply the provided fields of an update
    pub async fn update(&self, id: i64, data: &UpdateLendBook) -> AppResult<LendBook> {
        sqlx::query_as::<_, LendBook>(
            r#"
            UPDATE lend_book
            SET identification = COALESCE($1, identification),
                isbn = COALESCE($2, isbn),
                observations = COALESCE($3, observations),
                deadline = COALESCE($4, deadline),
                returned = COALESCE($5, returned),
                updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&data.identification)
        .bind(&data.isbn)
        .bind(&data.observations)
        .bind(data.deadline)
        .bind(data.returned)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lend book with id {} not found", id)))
    }

    /// Mark a loan returned. Only active loans match.
    pub async fn mark_returned(&self, id: i64) -> AppResult<Option<LendBook>> {
        let loan = sqlx::query_as::<_, LendBook>(
            r#"
            UPDATE lend_book SET returned = TRUE, updated_at = $1
            WHERE id = $2 AND returned = FALSE
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Delete a loan
    pub async fn delete(&self, id: i64) -> AppResult<LendBook> {
        sqlx::query_as::<_, LendBook>("DELETE FROM lend_book WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lend book with id {} not found", id)))
    }

    /// Count all unreturned loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lend_book WHERE returned = FALSE")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count overdue loans as of `today`
    pub async fn count_overdue(&self, today: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lend_book WHERE returned = FALSE AND deadline < $1",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
