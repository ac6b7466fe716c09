//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY last_name, first_name")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (authentication)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check whether a user with this identification exists
    pub async fn identification_exists(&self, identification: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE identification = $1)")
            .bind(identification)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Whether any user holds the admin role
    pub async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE 'admin' = ANY(roles))")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a user with an already hashed password
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let now = Utc::now();
        let roles: Vec<String> = user.roles.iter().map(|r| r.as_str().to_string()).collect();
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identification, first_name, last_name, email, password, roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(&user.identification)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&roles)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Apply the provided fields of an update
    pub async fn update(&self, id: i64, data: &UpdateUser, password_hash: Option<&str>) -> AppResult<User> {
        let roles: Option<Vec<String>> = data
            .roles
            .as_ref()
            .map(|roles| roles.iter().map(|r| r.as_str().to_string()).collect());

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET identification = COALESCE($1, identification),
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                password = COALESCE($5, password),
                roles = COALESCE($6, roles),
                updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&data.identification)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(password_hash)
        .bind(&roles)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user (their loans cascade)
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
