//! Account storage.
//!
//! A single persistent realization backs the `AccountStore` capability:
//! the Postgres `accounts` table. The unique constraint on `email` is what
//! serializes concurrent signups for the same address: the second insert
//! gets a unique violation and surfaces as `AlreadyExists`.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::auth::password::{hash_password, verify_password};
use crate::models::account::Account;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered")]
    AlreadyExists,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Hashes the password and creates the account.
    /// Fails with `AlreadyExists` if the email is taken.
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Looks up by email and compares the hash. Returns `None` for an unknown
    /// email and a wrong password alike; the caller must not distinguish them.
    async fn verify_credential(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Rehashes and overwrites the credential.
    /// Returns false if the account does not exist.
    async fn update_credential(&self, email: &str, new_password: &str)
        -> Result<bool, StoreError>;
}

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, StoreError> {
        let hashed = hash_password(password)?;
        let account = sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (email, hashed_password, is_active)
             VALUES ($1, $2, TRUE)
             RETURNING id, email, hashed_password, is_active",
        )
        .bind(email)
        .bind(&hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return StoreError::AlreadyExists;
                }
            }
            StoreError::Database(e)
        })?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, hashed_password, is_active FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn verify_credential(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, StoreError> {
        let account = match self.find_by_email(email).await? {
            Some(account) => account,
            None => return Ok(None),
        };
        if verify_password(password, &account.hashed_password)? {
            Ok(Some(account))
        } else {
            Ok(None)
        }
    }

    async fn update_credential(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<bool, StoreError> {
        let hashed = hash_password(new_password)?;
        let result = sqlx::query("UPDATE accounts SET hashed_password = $1 WHERE email = $2")
            .bind(&hashed)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
