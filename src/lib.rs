//! Biblionacho Library Lending Server
//!
//! REST JSON API for a small library: books, users and lend-book records
//! whose deadlines skip weekends and Colombian public holidays.

use std::sync::Arc;

pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, LendingError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
