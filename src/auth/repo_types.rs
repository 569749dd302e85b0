use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                    // assigned by the store, never reused
    pub name: String,
    pub email: String,              // unique, matched exactly
    pub password_hash: String,      // argon2 PHC string, never exposed
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
