//! Lend-book (loan) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    calendar::LoanDeadline,
    error::AppResult,
    models::lend_book::{CreateLendBook, LendBookView, UpdateLendBook},
    services::lend_books::LoanSummary,
};

use super::AuthenticatedUser;

/// Created loan with the breakdown of its deadline
#[derive(Serialize, ToSchema)]
pub struct LendBookCreated {
    pub message: String,
    pub lend_book: LendBookView,
    pub deadline: LoanDeadline,
}

/// List all loans
#[utoipa::path(
    get,
    path = "/lend-books",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loans", body = Vec<LendBookView>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_lend_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LendBookView>>> {
    claims.require_admin()?;

    let loans = state.services.lend_books.list().await?;
    Ok(Json(loans))
}

/// Lend a book. The deadline follows from the borrower's role.
#[utoipa::path(
    post,
    path = "/lend-books",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    request_body = CreateLendBook,
    responses(
        (status = 201, description = "Book lent", body = LendBookCreated),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "User or book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Borrower has an active loan or no lending role", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_lend_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLendBook>,
) -> AppResult<(StatusCode, Json<LendBookCreated>)> {
    claims.require_staff_or_self(request.user_id)?;

    let (lend_book, deadline) = state.services.lend_books.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(LendBookCreated {
            message: format!("Book lent until {}", deadline.deadline_date),
            lend_book,
            deadline,
        }),
    ))
}

/// Get loan details by ID
#[utoipa::path(
    get,
    path = "/lend-books/{id}",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LendBookView),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_lend_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LendBookView>> {
    let loan = state.services.lend_books.get_by_id(id).await?;
    claims.require_self_or_admin(loan.user_id)?;

    Ok(Json(loan))
}

/// Edit a loan
#[utoipa::path(
    put,
    path = "/lend-books/{id}",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = UpdateLendBook,
    responses(
        (status = 200, description = "Loan updated", body = LendBookView),
        (status = 400, description = "Deadline in the past or not a working day", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Returned loans cannot be reactivated", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_lend_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<UpdateLendBook>,
) -> AppResult<Json<LendBookView>> {
    claims.require_admin()?;

    let loan = state.services.lend_books.update(id, data).await?;
    Ok(Json(loan))
}

/// Mark a lent book as returned
#[utoipa::path(
    post,
    path = "/lend-books/{id}/return",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LendBookView),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_lend_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LendBookView>> {
    claims.require_staff()?;

    let loan = state.services.lend_books.return_loan(id).await?;
    Ok(Json(loan))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/lend-books/{id}",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan deleted", body = LendBookView),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_lend_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LendBookView>> {
    claims.require_admin()?;

    let loan = state.services.lend_books.delete(id).await?;
    Ok(Json(loan))
}

/// Loans of one user
#[utoipa::path(
    get,
    path = "/users/{id}/lend-books",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loans, active ones first", body = Vec<LendBookView>),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_user_lend_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<LendBookView>>> {
    claims.require_self_or_admin(user_id)?;

    let loans = state.services.lend_books.get_user_loans(user_id).await?;
    Ok(Json(loans))
}

/// Active and overdue loan counts
#[utoipa::path(
    get,
    path = "/lend-books/summary",
    tag = "lend-books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loan counters", body = LoanSummary)
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LoanSummary>> {
    claims.require_admin()?;

    let summary = state.services.lend_books.summary().await?;
    Ok(Json(summary))
}
