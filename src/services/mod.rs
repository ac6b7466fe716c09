//! Business logic services

pub mod books;
pub mod lend_books;
pub mod users;

use crate::{calendar::DueDateCalculator, config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub lend_books: lend_books::LendBooksService,
    pub calendar: DueDateCalculator,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and due-date calculator
    pub fn new(repository: Repository, auth_config: AuthConfig, calendar: DueDateCalculator) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            lend_books: lend_books::LendBooksService::new(repository.clone(), calendar.clone()),
            calendar,
            repository,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
