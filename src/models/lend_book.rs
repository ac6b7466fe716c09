//! Lend-book (loan) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Loan record from the `lend_book` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LendBook {
    pub id: i64,
    pub identification: String,
    pub isbn: String,
    pub observations: Option<String>,
    pub deadline: NaiveDate,
    pub returned: bool,
    pub user_id: i64,
    pub book_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Loan lifecycle: `Active` until the book comes back, then `Returned` for good
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
}

impl LendBook {
    pub fn status(&self) -> LoanStatus {
        if self.returned {
            LoanStatus::Returned
        } else {
            LoanStatus::Active
        }
    }

    /// Derived at read time, never stored
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.returned && self.deadline < today
    }
}

/// Loan as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LendBookView {
    pub id: i64,
    /// Borrower identification
    pub identification: String,
    pub isbn: String,
    pub observations: Option<String>,
    pub deadline: NaiveDate,
    pub returned: bool,
    pub status: LoanStatus,
    pub is_overdue: bool,
    pub user_id: i64,
    pub book_id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LendBookView {
    pub fn new(loan: LendBook, today: NaiveDate) -> Self {
        Self {
            status: loan.status(),
            is_overdue: loan.is_overdue(today),
            id: loan.id,
            identification: loan.identification,
            isbn: loan.isbn,
            observations: loan.observations,
            deadline: loan.deadline,
            returned: loan.returned,
            user_id: loan.user_id,
            book_id: loan.book_id,
            created_at: loan.created_at,
            updated_at: loan.updated_at,
        }
    }
}

/// Create loan request; the deadline is always computed server-side
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLendBook {
    /// Borrower identification
    #[validate(length(min = 1, max = 20))]
    pub identification: String,
    #[validate(length(min = 5, max = 10, message = "ISBN must be 5-10 characters"))]
    pub isbn: String,
    #[validate(length(max = 100))]
    pub observations: Option<String>,
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(range(min = 1))]
    pub book_id: i64,
}

/// Update loan request (admin)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLendBook {
    #[validate(length(min = 1, max = 20))]
    pub identification: Option<String>,
    #[validate(length(min = 5, max = 10, message = "ISBN must be 5-10 characters"))]
    pub isbn: Option<String>,
    #[validate(length(max = 100))]
    pub observations: Option<String>,
    pub deadline: Option<NaiveDate>,
    /// Only `true` is accepted once a loan is returned
    pub returned: Option<bool>,
}
