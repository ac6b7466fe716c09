//! Lend-book service: borrowing eligibility, deadlines and the loan lifecycle

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    calendar::{DueDateCalculator, LoanDeadline},
    error::{AppError, AppResult, LendingError},
    models::{
        lend_book::{CreateLendBook, LendBook, LendBookView, UpdateLendBook},
        user::BorrowerRole,
    },
    repository::Repository,
};

/// Loan counters for the lending desk
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanSummary {
    pub active: i64,
    pub overdue: i64,
}

/// Decide whether a borrower may take another book.
///
/// Admins may hold several loans at once; everyone else at most one.
pub fn check_borrow_eligibility(
    borrower_id: i64,
    role: BorrowerRole,
    active_loans: i64,
) -> Result<(), LendingError> {
    if active_loans > 0 && role != BorrowerRole::Admin {
        return Err(LendingError::ActiveLoanExists { borrower_id });
    }
    Ok(())
}

/// Validate a deadline set by hand: it must be a working day, not before today
pub fn check_deadline_override(calculator: &DueDateCalculator, deadline: NaiveDate) -> AppResult<()> {
    if deadline < calculator.today() {
        return Err(AppError::Validation(format!(
            "Deadline {} is in the past",
            deadline
        )));
    }
    if !calculator.is_working_day(deadline) {
        return Err(AppError::Validation(format!(
            "Deadline {} falls on a weekend or holiday",
            deadline
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LendBooksService {
    repository: Repository,
    calculator: DueDateCalculator,
}

impl LendBooksService {
    pub fn new(repository: Repository, calculator: DueDateCalculator) -> Self {
        Self { repository, calculator }
    }

    fn view(&self, loan: LendBook) -> LendBookView {
        LendBookView::new(loan, self.calculator.today())
    }

    /// List all loans
    pub async fn list(&self) -> AppResult<Vec<LendBookView>> {
        let loans = self.repository.lend_books.list().await?;
        Ok(loans.into_iter().map(|l| self.view(l)).collect())
    }

    /// Get a loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<LendBookView> {
        let loan = self.repository.lend_books.get_by_id(id).await?;
        Ok(self.view(loan))
    }

    /// Loans of a user
    pub async fn get_user_loans(&self, user_id: i64) -> AppResult<Vec<LendBookView>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        let loans = self.repository.lend_books.get_user_loans(user_id).await?;
        Ok(loans.into_iter().map(|l| self.view(l)).collect())
    }

    /// Lend a book: resolve the borrower's role, enforce the one-active-loan
    /// rule and store the loan with its computed deadline
    pub async fn create(&self, request: CreateLendBook) -> AppResult<(LendBookView, LoanDeadline)> {
        request.validate()?;

        let user = self.repository.users.get_by_id(request.user_id).await?;
        self.repository.books.get_by_id(request.book_id).await?;

        if !self
            .repository
            .users
            .identification_exists(&request.identification)
            .await?
        {
            return Err(AppError::Validation(format!(
                "No user with identification {}",
                request.identification
            )));
        }

        let role = user.effective_role()?;
        let active_loans = self.repository.lend_books.count_active_for_user(user.id).await?;
        check_borrow_eligibility(user.id, role, active_loans)?;

        let deadline = self.calculator.deadline_for(role)?;
        let loan = self
            .repository
            .lend_books
            .create(&request, deadline.deadline_date)
            .await?;

        tracing::info!(
            loan_id = loan.id,
            user_id = user.id,
            book_id = loan.book_id,
            role = %role,
            deadline = %loan.deadline,
            "Book lent"
        );
        Ok((self.view(loan), deadline))
    }

    /// Edit a loan. A returned loan cannot become active again, and a new
    /// deadline must be a working day from today on.
    pub async fn update(&self, id: i64, data: UpdateLendBook) -> AppResult<LendBookView> {
        data.validate()?;

        let existing = self.repository.lend_books.get_by_id(id).await?;
        if existing.returned && data.returned == Some(false) {
            return Err(AppError::BusinessRule(
                "A returned loan cannot be reactivated".to_string(),
            ));
        }
        if let Some(deadline) = data.deadline {
            check_deadline_override(&self.calculator, deadline)?;
        }

        let loan = self.repository.lend_books.update(id, &data).await?;
        Ok(self.view(loan))
    }

    /// Mark a loan returned
    pub async fn return_loan(&self, id: i64) -> AppResult<LendBookView> {
        match self.repository.lend_books.mark_returned(id).await? {
            Some(loan) => {
                tracing::info!(loan_id = id, user_id = loan.user_id, "Book returned");
                Ok(self.view(loan))
            }
            None => {
                // Distinguish a missing loan from one already returned
                self.repository.lend_books.get_by_id(id).await?;
                Err(AppError::BusinessRule("Loan already returned".to_string()))
            }
        }
    }

    /// Delete a loan
    pub async fn delete(&self, id: i64) -> AppResult<LendBookView> {
        let loan = self.repository.lend_books.delete(id).await?;
        Ok(self.view(loan))
    }

    /// Active and overdue loan counts
    pub async fn summary(&self) -> AppResult<LoanSummary> {
        let active = self.repository.lend_books.count_active().await?;
        let overdue = self
            .repository
            .lend_books
            .count_overdue(self.calculator.today())
            .await?;
        Ok(LoanSummary { active, overdue })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::calendar::{clock::MockClock, ColombiaCalendar};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Monday Oct 19, 2026
    fn calculator() -> DueDateCalculator {
        let mut clock = MockClock::new();
        clock.expect_today().return_const(date(2026, 10, 19));
        DueDateCalculator::new(Arc::new(ColombiaCalendar), Arc::new(clock))
    }

    #[test]
    fn test_deadline_override_must_be_a_working_day() {
        let calc = calculator();
        assert!(check_deadline_override(&calc, date(2026, 10, 19)).is_ok());
        assert!(check_deadline_override(&calc, date(2026, 11, 17)).is_ok());

        for rejected in [
            date(2026, 10, 24), // Saturday
            date(2026, 10, 25), // Sunday
            date(2026, 11, 16), // Independence of Cartagena
        ] {
            assert!(
                matches!(check_deadline_override(&calc, rejected), Err(AppError::Validation(_))),
                "{}",
                rejected
            );
        }
    }

    #[test]
    fn test_deadline_override_not_in_past() {
        let err = check_deadline_override(&calculator(), date(2026, 10, 16)).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("past")));
    }

    #[test]
    fn test_first_loan_allowed_for_every_role() {
        for role in BorrowerRole::PRECEDENCE {
            assert!(check_borrow_eligibility(5, role, 0).is_ok());
        }
    }

    #[test]
    fn test_non_admin_with_active_loan_denied() {
        for role in [BorrowerRole::Employee, BorrowerRole::Affiliate, BorrowerRole::Guest] {
            assert_eq!(
                check_borrow_eligibility(5, role, 1),
                Err(LendingError::ActiveLoanExists { borrower_id: 5 })
            );
        }
    }

    #[test]
    fn test_admin_may_hold_several_loans() {
        assert!(check_borrow_eligibility(1, BorrowerRole::Admin, 1).is_ok());
        assert!(check_borrow_eligibility(1, BorrowerRole::Admin, 4).is_ok());
    }

    #[test]
    fn test_unknown_role_rejected_before_eligibility() {
        let err = BorrowerRole::resolve(&["visitor"]).unwrap_err();
        assert!(matches!(err, LendingError::RoleNotPermitted { .. }));
    }
}
