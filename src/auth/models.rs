//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// User database model. The password hash never leaves this module.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub credits: i64,
    pub has_linked_provider: i64,
    pub provider_name: Option<String>,
    pub created_at: Option<String>,
}

/// User shape returned to clients
#[derive(Serialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub credits: i64,
    pub has_linked_provider: bool,
    pub provider_name: Option<String>,
    pub created_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            credits: user.credits,
            has_linked_provider: user.has_linked_provider != 0,
            provider_name: user.provider_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}
