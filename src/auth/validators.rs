// src/auth/validators.rs

use regex::Regex;

use super::models::SignupRequest;
use crate::common::{ValidationResult, Validator};

const MAX_USERNAME_LENGTH: usize = 32;
const MIN_PASSWORD_LENGTH: usize = 8;

pub struct SignupValidator;

impl Validator<SignupRequest> for SignupValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Validate username
        let username = data.username.trim();
        if username.is_empty() {
            result.add_error("username", "Username is required");
        } else if username.len() < 3 {
            result.add_error("username", "Username must be at least 3 characters");
        } else if username.len() > MAX_USERNAME_LENGTH {
            result.add_error("username", "Username must be at most 32 characters");
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            result.add_error(
                "username",
                "Username may only contain letters, digits, '_' and '-'",
            );
        }

        // Validate email
        if !is_valid_email(&data.email) {
            result.add_error("email", "A valid email address is required");
        }

        // Validate password
        if data.password.len() < MIN_PASSWORD_LENGTH {
            result.add_error("password", "Password must be at least 8 characters");
        }

        result
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let pattern = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email regex is valid");
    pattern.is_match(email)
}
