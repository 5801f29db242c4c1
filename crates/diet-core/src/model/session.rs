use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DietError, Result};

pub const MAX_TOKEN_LENGTH: usize = 128;
pub const MAX_PROFILE_NAME_LENGTH: usize = 200;

/// Opaque bearer token identifying one anonymous caller across requests.
///
/// Not stored on its own; it lives as the `owner` tag of every record the
/// caller creates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh, unique token.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept a client-presented token if it is syntactically plausible.
    pub fn parse(token: &str) -> Option<Self> {
        is_plausible_token(token).then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token is plausible when it is 1..=128 printable ASCII characters and
/// carries nothing that would break a `Cookie` header.
pub fn is_plausible_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b';' | b',' | b'"' | b'\\'))
}

/// Optional profile a session can register (`POST /users`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(name: String, email: String) -> Self {
        Self {
            name,
            email,
            created_at: Utc::now(),
        }
    }
}

/// Validate a profile registration.
pub fn validate_profile_input(name: &str, email: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DietError::InvalidInput("name cannot be empty".into()));
    }
    if name.chars().count() > MAX_PROFILE_NAME_LENGTH {
        return Err(DietError::InvalidInput(format!(
            "name exceeds maximum length of {MAX_PROFILE_NAME_LENGTH} characters"
        )));
    }
    if !is_email_shaped(email.trim()) {
        return Err(DietError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email.trim()
        )));
    }
    Ok(())
}

fn is_email_shaped(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
