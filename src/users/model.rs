use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field} is required")]
pub struct ValidationError {
    pub field: &'static str,
}

/// A user that has passed pre-storage validation.
///
/// Stores only accept this type, so an empty username, email or hash never
/// reaches the database.
#[derive(Debug, Clone)]
pub struct NewUser {
    username: String,
    email: String,
    password_hash: String,
}

impl NewUser {
    pub fn new(
        username: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Self, ValidationError> {
        let username = username.trim();
        let email = normalize_email(email);
        if username.is_empty() {
            return Err(ValidationError { field: "username" });
        }
        if email.is_empty() {
            return Err(ValidationError { field: "email" });
        }
        if password_hash.is_empty() {
            return Err(ValidationError { field: "passwordHash" });
        }
        Ok(Self {
            username: username.to_string(),
            email,
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// Emails are trimmed and lower-cased; lookups are exact after that.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}
