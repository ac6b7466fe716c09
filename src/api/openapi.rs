//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, calendar, health, lend_books, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblionacho API",
        version = "1.0.0",
        description = "Library lending REST API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Lend books
        lend_books::list_lend_books,
        lend_books::create_lend_book,
        lend_books::get_lend_book,
        lend_books::update_lend_book,
        lend_books::return_lend_book,
        lend_books::delete_lend_book,
        lend_books::get_user_lend_books,
        lend_books::get_summary,
        // Calendar
        calendar::list_holidays,
        calendar::get_window,
        calendar::preview_deadline,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::BookInput,
            // Users
            crate::models::user::User,
            crate::models::user::BorrowerRole,
            crate::models::user::CreateUser,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateUser,
            // Lend books
            crate::models::lend_book::LendBookView,
            crate::models::lend_book::LoanStatus,
            crate::models::lend_book::CreateLendBook,
            crate::models::lend_book::UpdateLendBook,
            crate::services::lend_books::LoanSummary,
            lend_books::LendBookCreated,
            // Calendar
            crate::calendar::Holiday,
            crate::calendar::LoanWindow,
            crate::calendar::LoanDeadline,
            calendar::HolidaysResponse,
            calendar::DeadlinePreview,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "users", description = "User management"),
        (name = "lend-books", description = "Book lending"),
        (name = "calendar", description = "Holidays and due-date computation")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
