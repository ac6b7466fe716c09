//! User model, lending roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, LendingError};

/// Lending role of a borrower.
///
/// A user may hold several role names; the effective role is the first
/// match in `BorrowerRole::PRECEDENCE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowerRole {
    Admin,
    Employee,
    Affiliate,
    Guest,
}

impl BorrowerRole {
    pub const PRECEDENCE: [BorrowerRole; 4] = [
        BorrowerRole::Admin,
        BorrowerRole::Employee,
        BorrowerRole::Affiliate,
        BorrowerRole::Guest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowerRole::Admin => "admin",
            BorrowerRole::Employee => "employee",
            BorrowerRole::Affiliate => "affiliate",
            BorrowerRole::Guest => "guest",
        }
    }

    /// Calendar days added to the loan start before weekend/holiday adjustment
    pub fn base_period_days(&self) -> i64 {
        match self {
            BorrowerRole::Admin => 20,
            BorrowerRole::Employee => 8,
            BorrowerRole::Affiliate => 10,
            BorrowerRole::Guest => 7,
        }
    }

    /// Resolve the effective role of a subject holding `roles`
    pub fn resolve<S: AsRef<str>>(roles: &[S]) -> Result<BorrowerRole, LendingError> {
        Self::PRECEDENCE
            .into_iter()
            .find(|candidate| roles.iter().any(|r| r.as_ref().eq_ignore_ascii_case(candidate.as_str())))
            .ok_or_else(|| LendingError::RoleNotPermitted {
                roles: roles.iter().map(|r| r.as_ref().to_string()).collect(),
            })
    }
}

impl std::fmt::Display for BorrowerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(BorrowerRole::Admin),
            "employee" => Ok(BorrowerRole::Employee),
            "affiliate" => Ok(BorrowerRole::Affiliate),
            "guest" => Ok(BorrowerRole::Guest),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub identification: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    /// Role names assigned to the user
    pub roles: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn effective_role(&self) -> Result<BorrowerRole, LendingError> {
        BorrowerRole::resolve(&self.roles)
    }
}

/// Create user request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 5, max = 20, message = "Identification must be 5-20 characters"))]
    pub identification: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub roles: Vec<BorrowerRole>,
}

/// Self-registration request; registered users get the guest role
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 5, max = 20, message = "Identification must be 5-20 characters"))]
    pub identification: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl From<RegisterUser> for CreateUser {
    fn from(r: RegisterUser) -> Self {
        CreateUser {
            identification: r.identification,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password: r.password,
            roles: vec![BorrowerRole::Guest],
        }
    }
}

/// Update user request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 5, max = 20, message = "Identification must be 5-20 characters"))]
    pub identification: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub roles: Option<Vec<BorrowerRole>>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i64,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn role(&self) -> Option<BorrowerRole> {
        BorrowerRole::resolve(&self.roles).ok()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(BorrowerRole::Admin)
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Admins and employees run the lending desk
    pub fn require_staff(&self) -> Result<(), AppError> {
        match self.role() {
            Some(BorrowerRole::Admin) | Some(BorrowerRole::Employee) => Ok(()),
            _ => Err(AppError::Authorization("Staff privileges required".to_string())),
        }
    }

    /// Staff may act for any borrower, everyone else only for themselves
    pub fn require_staff_or_self(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_id == user_id || self.require_staff().is_ok() {
            Ok(())
        } else {
            Err(AppError::Authorization("Only staff may lend books to other users".to_string()))
        }
    }

    /// Allow access to a user's own records, or to any record for admins
    pub fn require_self_or_admin(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Access to another user's records denied".to_string()))
        }
    }
}
