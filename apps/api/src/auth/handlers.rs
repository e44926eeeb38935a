//! Axum route handlers for signup, login, and password reset.
//!
//! Auth outcomes ride success-shaped envelopes over HTTP 200: `success` plus
//! either `data` or an `error` string. Login and forgot-password never reveal
//! whether an email exists beyond what the operation itself requires.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::auth::store::{AccountStore, StoreError};
use crate::auth::token::issue_token;
use crate::models::account::Account;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Incorrect email or password";
// Unexpected store failures are logged server-side and reported with this
// generic message; raw database errors never reach a client.
const INTERNAL_ERROR: &str = "An internal error occurred";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// POST /api/v1/user/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Json<Value> {
    Json(
        signup(
            state.store.as_ref(),
            state.config.secret_key.as_bytes(),
            state.config.token_ttl_minutes,
            &req.email,
            &req.password,
        )
        .await,
    )
}

/// POST /api/v1/user/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Json<Value> {
    Json(
        login(
            state.store.as_ref(),
            state.config.secret_key.as_bytes(),
            state.config.token_ttl_minutes,
            &req.email,
            &req.password,
        )
        .await,
    )
}

/// POST /api/v1/user/forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Json<Value> {
    Json(reset_password(state.store.as_ref(), &req.email, &req.new_password).await)
}

async fn signup(
    store: &dyn AccountStore,
    secret: &[u8],
    ttl_minutes: i64,
    email: &str,
    password: &str,
) -> Value {
    match store.create_account(email, password).await {
        Ok(account) => token_envelope(&account, secret, ttl_minutes),
        Err(StoreError::AlreadyExists) => failure("Email already registered"),
        Err(e) => {
            error!("Signup failed for {email}: {e}");
            failure(INTERNAL_ERROR)
        }
    }
}

async fn login(
    store: &dyn AccountStore,
    secret: &[u8],
    ttl_minutes: i64,
    email: &str,
    password: &str,
) -> Value {
    match store.verify_credential(email, password).await {
        // Unknown email and wrong password share one message so the
        // response does not leak account existence.
        Ok(None) => failure(INVALID_CREDENTIALS),
        Ok(Some(account)) => token_envelope(&account, secret, ttl_minutes),
        Err(e) => {
            error!("Login failed for {email}: {e}");
            failure(INTERNAL_ERROR)
        }
    }
}

async fn reset_password(store: &dyn AccountStore, email: &str, new_password: &str) -> Value {
    match store.update_credential(email, new_password).await {
        Ok(true) => json!({
            "success": true,
            "data": { "message": "Password updated successfully." }
        }),
        Ok(false) => failure("User not found"),
        Err(e) => {
            error!("Password reset failed for {email}: {e}");
            failure(INTERNAL_ERROR)
        }
    }
}

fn token_envelope(account: &Account, secret: &[u8], ttl_minutes: i64) -> Value {
    match issue_token(&account.email, secret, ttl_minutes) {
        Ok(token) => json!({
            "success": true,
            "data": {
                "token": token,
                "user": {
                    "id": account.id,
                    "email": account.email,
                    "is_active": account.is_active,
                }
            }
        }),
        Err(e) => {
            error!("Token issuance failed: {e}");
            failure("Failed to issue access token")
        }
    }
}

fn failure(message: &str) -> Value {
    json!({ "success": false, "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::testing::InMemoryStore;
    use crate::auth::token::verify_token;

    const SECRET: &[u8] = b"test-secret";
    const TTL: i64 = 30;

    #[tokio::test]
    async fn test_signup_issues_verifiable_token() {
        let store = InMemoryStore::default();
        let envelope = signup(&store, SECRET, TTL, "a@x.com", "pw1").await;

        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["data"]["user"]["email"], "a@x.com");
        assert_eq!(envelope["data"]["user"]["is_active"], true);

        let token = envelope["data"]["token"].as_str().unwrap();
        let claims = verify_token(token, SECRET).expect("token should verify");
        assert_eq!(claims.sub, "a@x.com");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_envelope() {
        let store = InMemoryStore::default();
        signup(&store, SECRET, TTL, "a@x.com", "pw1").await;
        let envelope = signup(&store, SECRET, TTL, "a@x.com", "pw2").await;

        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "Email already registered");
    }

    #[tokio::test]
    async fn test_login_succeeds_with_correct_credentials() {
        let store = InMemoryStore::default();
        signup(&store, SECRET, TTL, "a@x.com", "pw1").await;

        let envelope = login(&store, SECRET, TTL, "a@x.com", "pw1").await;
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["data"]["user"]["id"], 1);
    }

    #[tokio::test]
    async fn test_login_same_message_for_unknown_email_and_wrong_password() {
        let store = InMemoryStore::default();
        signup(&store, SECRET, TTL, "a@x.com", "pw1").await;

        let wrong_password = login(&store, SECRET, TTL, "a@x.com", "nope").await;
        let unknown_email = login(&store, SECRET, TTL, "ghost@x.com", "pw1").await;

        assert_eq!(wrong_password["error"], INVALID_CREDENTIALS);
        assert_eq!(unknown_email["error"], INVALID_CREDENTIALS);
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn test_reset_password_updates_credential() {
        let store = InMemoryStore::default();
        signup(&store, SECRET, TTL, "a@x.com", "old").await;

        let envelope = reset_password(&store, "a@x.com", "new").await;
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["data"]["message"], "Password updated successfully.");

        assert_eq!(login(&store, SECRET, TTL, "a@x.com", "new").await["success"], true);
        assert_eq!(login(&store, SECRET, TTL, "a@x.com", "old").await["success"], false);
    }

    #[tokio::test]
    async fn test_reset_password_unknown_user() {
        let store = InMemoryStore::default();
        let envelope = reset_password(&store, "ghost@x.com", "new").await;
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error"], "User not found");
    }

    /// Store whose every operation fails with a database error.
    struct FailingStore;

    #[async_trait::async_trait]
    impl AccountStore for FailingStore {
        async fn create_account(&self, _: &str, _: &str) -> Result<Account, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_email(&self, _: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn verify_credential(&self, _: &str, _: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn update_credential(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_store_failures_do_not_leak_error_details() {
        let store = FailingStore;

        for envelope in [
            signup(&store, SECRET, TTL, "a@x.com", "pw1").await,
            login(&store, SECRET, TTL, "a@x.com", "pw1").await,
            reset_password(&store, "a@x.com", "new").await,
        ] {
            assert_eq!(envelope["success"], false);
            assert_eq!(envelope["error"], INTERNAL_ERROR);
        }
    }
}
