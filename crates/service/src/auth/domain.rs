use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Domain user (business view, never carries the hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}

/// Punctuation set accepted by the special-character password rule.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Check a plaintext password against the account policy.
/// Returns one message per failed rule so the boundary can report
/// every violation, not just the first.
pub fn password_rule_failures(password: &str) -> Vec<&'static str> {
    let mut failures = Vec::new();
    if password.len() < 6 {
        failures.push("Password should be at least 6 characters");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        failures.push("Password should contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        failures.push("Password should contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failures.push("Password should contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        failures.push("Password should contain at least one special character");
    }
    failures
}
