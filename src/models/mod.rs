//! Data models for Biblionacho

pub mod book;
pub mod lend_book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookInput};
pub use lend_book::{CreateLendBook, LendBook, LendBookView, LoanStatus, UpdateLendBook};
pub use user::{BorrowerRole, User, UserClaims};
