use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{LoginRequest, RegisterRequest};

pub const PASSWORD_MIN_LEN: usize = 3;
pub const PASSWORD_MAX_LEN: usize = 130;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes the payload in place and returns every rule it breaks.
pub fn validate_register(payload: &mut RegisterRequest) -> Vec<String> {
    payload.first_name = payload.first_name.trim().to_string();
    payload.last_name = payload.last_name.trim().to_string();
    payload.email = normalize_email(&payload.email);

    let mut violations = Vec::new();
    if payload.first_name.is_empty() {
        violations.push("firstName is required".to_string());
    }
    if payload.last_name.is_empty() {
        violations.push("lastName is required".to_string());
    }
    check_email(&payload.email, &mut violations);

    let len = payload.password.chars().count();
    if len == 0 {
        violations.push("password is required".to_string());
    } else if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        violations.push(format!(
            "password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
        ));
    }
    violations
}

pub fn validate_login(payload: &mut LoginRequest) -> Vec<String> {
    payload.email = normalize_email(&payload.email);

    let mut violations = Vec::new();
    check_email(&payload.email, &mut violations);
    if payload.password.is_empty() {
        violations.push("password is required".to_string());
    }
    violations
}

fn check_email(email: &str, violations: &mut Vec<String>) {
    if email.is_empty() {
        violations.push("email is required".to_string());
    } else if !is_valid_email(email) {
        violations.push("email is invalid".to_string());
    }
}
