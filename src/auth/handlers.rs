//! Authentication handlers

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::extract::{Extension, Json};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{AuthResponse, Claims, LoginRequest, SignupRequest, User, UserResponse};
use super::validators::SignupValidator;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState, Validator};

const TOKEN_TTL_DAYS: i64 = 7;

/// POST /api/auth/signup
/// Creates a user with the free-tier credit grant and returns a JWT
pub async fn signup(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = SignupValidator.validate(&body);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let username = body.username.trim().to_string();
    let email = body.email.trim().to_lowercase();

    // Uniqueness check on both identity columns
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ? OR email = ?")
            .bind(&username)
            .bind(&email)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    if existing.is_some() {
        warn!(
            email = %safe_email_log(&email),
            "Signup rejected: username or email already registered"
        );
        return Err(ApiError::Conflict(
            "username or email already registered".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(body.password.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "Password hashing failed");
            ApiError::InternalServer("failed to hash password".to_string())
        })?
        .to_string();

    let user_id = generate_user_id();
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO users (id, username, email, password_hash, credits, has_linked_provider, created_at)
           VALUES (?, ?, ?, ?, 0, 0, ?)"#,
    )
    .bind(&user_id)
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    // Free-tier grant goes through the ledger so the transaction log
    // reconciles with the balance from day one
    state.ledger.grant_signup_credits(&user_id).await?;

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let token = issue_token(&user.id, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User signed up"
    );

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// POST /api/auth/login
/// Verifies credentials against the stored Argon2 hash and returns a JWT
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let identifier = body.identifier.trim();
    if identifier.is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "identifier and password are required".to_string(),
        ));
    }

    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE username = ? OR email = ?")
            .bind(identifier)
            .bind(identifier.to_lowercase())
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    // Same rejection for unknown user and wrong password
    let user = user.ok_or_else(|| {
        warn!("Login failed: unknown identifier");
        ApiError::Unauthorized("invalid credentials".to_string())
    })?;

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!(user_id = %user.id, error = %e, "Stored password hash is malformed");
        ApiError::InternalServer("credential verification failed".to_string())
    })?;

    if Argon2::default()
        .verify_password(body.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!(user_id = %user.id, "Login failed: password mismatch");
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = issue_token(&user.id, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User logged in"
    );

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// GET /api/auth/me
/// Returns the authenticated user's profile
pub async fn me(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&authed.id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    match user {
        Some(u) => Ok(Json(u.into())),
        None => Err(ApiError::NotFound("user not found".to_string())),
    }
}

/// Sign an HS256 JWT for a user id
pub fn issue_token(user_id: &str, jwt_secret: &str) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, "JWT encoding failed");
        ApiError::InternalServer("failed to issue token".to_string())
    })
}
