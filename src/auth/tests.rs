//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - JWT token creation and validation
//! - Password hashing and verification
//! - Signup validation rules

#[cfg(test)]
mod tests {
    use super::super::*;
    use argon2::{
        password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
        Argon2,
    };
    use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

    use crate::common::Validator;

    #[test]
    fn test_claims_structure() {
        let claims = models::Claims {
            sub: "U_K7NP3X".to_string(),
            exp: 1234567890,
        };

        assert_eq!(claims.sub, "U_K7NP3X");
        assert_eq!(claims.exp, 1234567890);
    }

    #[test]
    fn test_jwt_encoding_and_decoding() {
        let secret = "test_secret_key";
        let claims = models::Claims {
            sub: "U_TEST01".to_string(),
            exp: 9999999999, // Far future
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode token");

        let decoded = decode::<models::Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .expect("Failed to decode token");

        assert_eq!(decoded.claims.sub, "U_TEST01");
        assert_eq!(decoded.claims.exp, 9999999999);
    }

    #[test]
    fn test_jwt_validation_fails_with_wrong_secret() {
        let secret = "test_secret_key";
        let wrong_secret = "wrong_secret_key";

        let claims = models::Claims {
            sub: "U_TEST01".to_string(),
            exp: 9999999999,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode token");

        let result = decode::<models::Claims>(
            &token,
            &DecodingKey::from_secret(wrong_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        );

        assert!(result.is_err(), "Token must not validate with wrong secret");
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let password = "correct horse battery staple";
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("hash password")
            .to_string();

        let parsed = PasswordHash::new(&hash).expect("parse hash");
        assert!(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong password", &parsed)
            .is_err());
    }

    #[test]
    fn test_signup_validation_success() {
        let request = models::SignupRequest {
            username: "demo_user".to_string(),
            email: "demo@contentscale.pro".to_string(),
            password: "demo-password-123".to_string(),
        };

        let result = validators::SignupValidator.validate(&request);
        assert!(result.is_valid, "Valid signup should pass validation");
    }

    #[test]
    fn test_signup_validation_rejects_bad_fields() {
        let request = models::SignupRequest {
            username: "x".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };

        let result = validators::SignupValidator.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "username"));
        assert!(result.errors.iter().any(|e| e.field == "email"));
        assert!(result.errors.iter().any(|e| e.field == "password"));
    }

    #[test]
    fn test_signup_validation_rejects_odd_username_chars() {
        let request = models::SignupRequest {
            username: "bad name!".to_string(),
            email: "demo@contentscale.pro".to_string(),
            password: "demo-password-123".to_string(),
        };

        let result = validators::SignupValidator.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "username"));
    }

    #[test]
    fn test_email_validation() {
        assert!(validators::is_valid_email("user@example.com"));
        assert!(validators::is_valid_email("first.last+tag@sub.example.co"));
        assert!(!validators::is_valid_email("user@localhost"));
        assert!(!validators::is_valid_email("@example.com"));
        assert!(!validators::is_valid_email("user@"));
        assert!(!validators::is_valid_email(""));
    }
}
