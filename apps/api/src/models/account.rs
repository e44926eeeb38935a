use sqlx::FromRow;

/// One row of the `accounts` table. Email is unique within the store.
/// The bcrypt hash never leaves the auth module; responses carry only the
/// id / email / is_active summary.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
}
