//! Holiday calendar and due-date preview endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    calendar::{Holiday, LoanDeadline, LoanWindow},
    error::{AppError, AppResult},
    models::user::BorrowerRole,
};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolidaysQuery {
    /// Calendar year, defaults to the current one
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct HolidaysResponse {
    pub region: String,
    pub year: i32,
    pub holidays: Vec<Holiday>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    /// First day of the range (YYYY-MM-DD), not before today
    pub start: NaiveDate,
    /// Last day of the range, inclusive
    pub end: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeadlineQuery {
    /// Borrower role: admin, employee, affiliate or guest
    pub role: String,
    /// Loan start, defaults to today
    pub start: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct DeadlinePreview {
    pub role: BorrowerRole,
    pub start_date: NaiveDate,
    pub deadline: LoanDeadline,
}

/// Public holidays of a year
#[utoipa::path(
    get,
    path = "/calendar/holidays",
    tag = "calendar",
    params(HolidaysQuery),
    responses(
        (status = 200, description = "Holidays ordered by date", body = HolidaysResponse),
        (status = 400, description = "Year out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_holidays(
    State(state): State<crate::AppState>,
    Query(query): Query<HolidaysQuery>,
) -> AppResult<Json<HolidaysResponse>> {
    let calculator = &state.services.calendar;
    let year = query.year.unwrap_or_else(|| calculator.today().year());

    let (first, last) = NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported year {}", year)))?;

    let calendar = calculator.calendar();
    Ok(Json(HolidaysResponse {
        region: calendar.region().to_string(),
        year,
        holidays: calendar.holidays_between(first, last),
    }))
}

/// Weekend, holiday and working-day counts of a date range
#[utoipa::path(
    get,
    path = "/calendar/window",
    tag = "calendar",
    params(WindowQuery),
    responses(
        (status = 200, description = "Day counts", body = LoanWindow),
        (status = 400, description = "Start after end, or start in the past", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_window(
    State(state): State<crate::AppState>,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<LoanWindow>> {
    let window = state.services.calendar.compute_window(query.start, query.end)?;
    Ok(Json(window))
}

/// Deadline a loan would get for a role
#[utoipa::path(
    get,
    path = "/calendar/deadline",
    tag = "calendar",
    params(DeadlineQuery),
    responses(
        (status = 200, description = "Computed deadline", body = DeadlinePreview),
        (status = 400, description = "Unknown role or start in the past", body = crate::error::ErrorResponse)
    )
)]
pub async fn preview_deadline(
    State(state): State<crate::AppState>,
    Query(query): Query<DeadlineQuery>,
) -> AppResult<Json<DeadlinePreview>> {
    let role: BorrowerRole = query.role.parse().map_err(AppError::BadRequest)?;

    let calculator = &state.services.calendar;
    let start_date = query.start.unwrap_or_else(|| calculator.today());
    let deadline = calculator.compute_deadline(start_date, role)?;

    Ok(Json(DeadlinePreview {
        role,
        start_date,
        deadline,
    }))
}
