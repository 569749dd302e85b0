use serde::{Deserialize, Serialize};

use super::{claims::Claims, repo_types::User};

/// Request body for user registration.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        }
    }
}

/// Identity carried by a verified token.
#[derive(Debug, Serialize)]
pub struct PublicClaims {
    pub id: i64,
    pub email: String,
    pub expires_at: usize,
}

impl From<Claims> for PublicClaims {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            expires_at: c.exp,
        }
    }
}
