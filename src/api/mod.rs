//! API handlers for Biblionacho REST endpoints

pub mod auth;
pub mod books;
pub mod calendar;
pub mod health;
pub mod lend_books;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration (the SPA is served from another origin)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route("/users/:id/lend-books", get(lend_books::get_user_lend_books))
        // Lend books
        .route(
            "/lend-books",
            get(lend_books::list_lend_books).post(lend_books::create_lend_book),
        )
        .route("/lend-books/summary", get(lend_books::get_summary))
        .route(
            "/lend-books/:id",
            get(lend_books::get_lend_book)
                .put(lend_books::update_lend_book)
                .delete(lend_books::delete_lend_book),
        )
        .route("/lend-books/:id/return", post(lend_books::return_lend_book))
        // Calendar
        .route("/calendar/holidays", get(calendar::list_holidays))
        .route("/calendar/window", get(calendar::get_window))
        .route("/calendar/deadline", get(calendar::preview_deadline))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{NaiveDate, Utc};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{
        calendar::{clock::MockClock, ColombiaCalendar, DueDateCalculator},
        config::AppConfig,
        repository::Repository,
        services::Services,
    };

    // Monday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    /// State over a pool that never connects; only routes that stay off the
    /// database are exercised here
    fn test_state() -> AppState {
        let config = AppConfig::default();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        let mut clock = MockClock::new();
        clock.expect_today().return_const(today());
        let calculator = DueDateCalculator::new(Arc::new(ColombiaCalendar), Arc::new(clock));

        let services = Services::new(Repository::new(pool), config.auth.clone(), calculator);
        AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }

    fn token_for(state: &AppState, roles: &[&str]) -> String {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "guest@biblionacho.com".to_string(),
            user_id: 4,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: now + 3600,
            iat: now,
        }
        .create_token(&state.config.auth.jwt_secret)
        .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = send(router(test_state()), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_responses_gzip_when_accepted() {
        let request = Request::builder()
            .uri("/api/v1/calendar/holidays?year=2026")
            .header(axum::http::header::ACCEPT_ENCODING, "gzip")
            .body(Body::empty())
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[tokio::test]
    async fn test_deadline_near_calendar_end_is_bad_request() {
        let (status, body) = send(
            router(test_state()),
            get("/api/v1/calendar/deadline?role=guest&start=%2B262142-12-28"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidDateRange");
    }

    #[tokio::test]
    async fn test_oversized_window_is_bad_request() {
        let (status, body) = send(
            router(test_state()),
            get("/api/v1/calendar/window?start=2026-10-19&end=%2B262142-12-31"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidDateRange");
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let (status, body) = send(router(test_state()), get("/api/v1/lend-books")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "NotAuthorized");
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let request = Request::builder()
            .uri("/api/v1/auth/me")
            .header(AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(test_state()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_guest_cannot_list_users() {
        let state = test_state();
        let request = Request::builder()
            .uri("/api/v1/users")
            .header(AUTHORIZATION, format!("Bearer {}", token_for(&state, &["guest"])))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(state), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_holidays_for_year() {
        let (status, body) = send(router(test_state()), get("/api/v1/calendar/holidays?year=2026")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"], "CO");
        assert_eq!(body["holidays"].as_array().unwrap().len(), 18);
        assert_eq!(body["holidays"][0]["date"], "2026-01-01");
    }

    #[tokio::test]
    async fn test_window_endpoint() {
        let (status, body) = send(
            router(test_state()),
            get("/api/v1/calendar/window?start=2026-10-19&end=2026-11-02"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_days"], 15);
        assert_eq!(body["weekend_days"], 4);
        assert_eq!(body["holiday_count"], 1);
        assert_eq!(body["working_days"], 10);
    }

    #[tokio::test]
    async fn test_window_in_past_is_bad_request() {
        let (status, body) = send(
            router(test_state()),
            get("/api/v1/calendar/window?start=2026-10-01&end=2026-10-20"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidDateRange");
    }

    #[tokio::test]
    async fn test_deadline_preview() {
        let (status, body) = send(router(test_state()), get("/api/v1/calendar/deadline?role=admin")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");
        assert_eq!(body["start_date"], "2026-10-19");
        assert_eq!(body["deadline"]["deadline_date"], "2026-11-17");
    }

    #[tokio::test]
    async fn test_deadline_preview_unknown_role() {
        let (status, _) = send(router(test_state()), get("/api/v1/calendar/deadline?role=visitor")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
