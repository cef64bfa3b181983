//! Error taxonomy shared across the storefront core.
//!
//! Every fallible collaborator (catalog lookups, order creation, analytics
//! appends) surfaces a [`StoreError`]. Raw error text never reaches the user
//! surface directly: [`StoreError::user_message`] is the single mapping
//! point from internal errors to user-facing copy.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Classified storefront error.
///
/// The carried string is the internal message (for logs and operators); the
/// user-facing string comes from [`StoreError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum StoreError {
    /// Bad input from the caller (4xx-shaped).
    Validation(String),
    /// Caller is not logged in.
    Authentication(String),
    /// Caller is logged in but not allowed.
    Authorization(String),
    /// The referenced resource does not exist.
    NotFound(String),
    /// Simulated transport failure between core and collaborator.
    Network(String),
    /// Collaborator-side failure.
    Server(String),
    /// Anything that could not be classified.
    Unknown(String),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        StoreError::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        StoreError::Authorization(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        StoreError::NotFound(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        StoreError::Network(msg.into())
    }

    pub fn server(msg: impl Into<String>) -> Self {
        StoreError::Server(msg.into())
    }

    /// HTTP-shaped status code for the class (used in logs and fixtures).
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::Authentication(_) => 401,
            StoreError::Authorization(_) => 403,
            StoreError::NotFound(_) => 404,
            StoreError::Network(_) | StoreError::Server(_) | StoreError::Unknown(_) => 500,
        }
    }

    /// The internal message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            StoreError::Validation(m)
            | StoreError::Authentication(m)
            | StoreError::Authorization(m)
            | StoreError::NotFound(m)
            | StoreError::Network(m)
            | StoreError::Server(m)
            | StoreError::Unknown(m) => m,
        }
    }

    /// Map to user-facing copy. Validation messages are written for users
    /// and pass through verbatim; everything else maps to fixed copy so no
    /// internal detail leaks to the UI boundary.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Validation(m) => m.clone(),
            StoreError::Authentication(_) => "Please log in to continue.".to_string(),
            StoreError::Authorization(_) => {
                "You don't have permission to perform this action.".to_string()
            }
            StoreError::NotFound(_) => "The requested resource was not found.".to_string(),
            StoreError::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            StoreError::Server(_) | StoreError::Unknown(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(m) => write!(f, "validation error: {m}"),
            StoreError::Authentication(m) => write!(f, "authentication required: {m}"),
            StoreError::Authorization(m) => write!(f, "access denied: {m}"),
            StoreError::NotFound(m) => write!(f, "not found: {m}"),
            StoreError::Network(m) => write!(f, "network error: {m}"),
            StoreError::Server(m) => write!(f, "server error: {m}"),
            StoreError::Unknown(m) => write!(f, "unknown error: {m}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
