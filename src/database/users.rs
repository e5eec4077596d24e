use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::models::User;

const USER_COLUMNS: &str = "id, email, password_hash, created_at";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Database(DatabaseError::Sqlx(err))
    }
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user with a bcrypt hash of `password`. Duplicate emails are a `Conflict`.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, UserError> {
        let password_hash = hash(password, DEFAULT_COST)?;
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(email))
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::conflict_on_unique(e, "Email is already registered"))?;

        info!("Signed up user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Look a user up by email and check the password. `None` covers both an
    /// unknown email and a wrong password.
    pub async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        let Some(user) = self.find_by_email(email).await? else {
            debug!("Login attempt for unknown email");
            return Ok(None);
        };

        if verify(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            debug!("Login attempt with wrong password for user {}", user.id);
            Ok(None)
        }
    }

    /// Change email and/or password. Fields left as `None` keep their value.
    pub async fn update_email_and_password(
        &self,
        id: i64,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, UserError> {
        let password_hash = match password {
            Some(p) => Some(hash(p, DEFAULT_COST)?),
            None => None,
        };

        let sql = format!(
            "UPDATE users SET \
             email = COALESCE($2, email), \
             password_hash = COALESCE($3, password_hash) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(email.map(normalize_email))
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::conflict_on_unique(e, "Email is already registered"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} not found", id)))?;

        info!("Updated user {}", user.id);
        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {} not found", id)));
        }
        info!("Deleted user {}", id);
        Ok(())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Someone@Example.COM "), "someone@example.com");
    }
}
