//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{BorrowerRole, CreateUser, RegisterUser, UpdateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate user by email and password, returning a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.create_token(&user)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok((token, user))
    }

    /// Register a new guest user and log them in
    pub async fn register(&self, data: RegisterUser) -> AppResult<(String, User)> {
        let user = self.create_user(data.into()).await?;
        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Create JWT token for a user
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            roles: user.roles.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a new user
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;
        if user.roles.is_empty() {
            return Err(AppError::Validation("At least one role is required".to_string()));
        }

        let hash = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &hash).await?;
        tracing::info!(user_id = created.id, roles = ?created.roles, "User created");
        Ok(created)
    }

    /// Update an existing user
    pub async fn update_user(&self, id: i64, data: UpdateUser) -> AppResult<User> {
        data.validate()?;
        if matches!(&data.roles, Some(roles) if roles.is_empty()) {
            return Err(AppError::Validation("At least one role is required".to_string()));
        }

        let hash = data.password.as_deref().map(hash_password).transpose()?;
        self.repository.users.update(id, &data, hash.as_deref()).await
    }

    /// Delete a user
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Create the configured administrator when no admin exists yet
    pub async fn ensure_admin(&self) -> AppResult<()> {
        let Some(admin) = bootstrap_admin(&self.config) else {
            return Ok(());
        };

        if self.repository.users.admin_exists().await? {
            return Ok(());
        }
        if self
            .repository
            .users
            .identification_exists(&admin.identification)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "Identification {} is taken; set auth.admin_identification",
                admin.identification
            )));
        }

        let email = admin.email.clone();
        self.create_user(admin).await?;
        tracing::info!("Bootstrap administrator {} created", email);
        Ok(())
    }
}

/// Administrator described by the auth configuration, if any
fn bootstrap_admin(config: &AuthConfig) -> Option<CreateUser> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return None;
    };

    Some(CreateUser {
        identification: config.admin_identification.clone(),
        first_name: "admin".to_string(),
        last_name: "biblionacho".to_string(),
        email: email.clone(),
        password: password.clone(),
        roles: vec![BorrowerRole::Admin],
    })
}

/// Check a password against the user's argon2 hash
fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
