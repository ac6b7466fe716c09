//! Book model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub editorial: String,
    pub edition: String,
    pub year: String,
    pub language: String,
    pub pages: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create or replace book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 5, max = 10, message = "ISBN must be 5-10 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 8, max = 100, message = "Editorial must be 8-100 characters"))]
    pub editorial: String,
    #[validate(length(min = 1, max = 100))]
    pub edition: String,
    /// Publication year, four digits
    #[validate(regex(path = *YEAR_RE, message = "Year must be exactly 4 digits"))]
    pub year: String,
    /// Language code, e.g. "es"
    #[validate(length(min = 1, max = 4))]
    pub language: String,
    #[validate(length(min = 2, max = 5, message = "Pages must be 2-5 characters"))]
    pub pages: String,
}
