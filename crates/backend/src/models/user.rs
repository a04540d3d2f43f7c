//! User model and session representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use okome_core::{Email, UserId};

/// A registered user.
///
/// Users are created at registration. `password_hash` lives in its own
/// repository query, never on this struct.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The logged-in user as stored in the session cookie store.
///
/// Carries the email alongside the id so the order query service can match
/// guest orders without a user lookup on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
        }
    }
}
