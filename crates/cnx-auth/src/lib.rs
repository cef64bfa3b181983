//! cnx-auth
//!
//! In-memory session management for the mock storefront. There is no real
//! identity backend: login installs a deterministic mock user derived from
//! the email address, signup additionally enforces the password policy.
//! Nothing is persisted — a session lives exactly as long as the store.

use chrono::Utc;
use cnx_types::User;
use uuid::Uuid;

mod validate;

pub use validate::{is_valid_email, validate_password};

/// Namespace for deriving stable user ids from email addresses (v5 UUID),
/// so the same email always maps to the same mock identity.
const USER_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6b, 0x1e, 0x02, 0x6a, 0x5d, 0x4f, 0x4c, 0x21, 0x9e, 0x70, 0x3c, 0x55, 0x8a, 0x91, 0x27,
    0x44,
]);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Credential rejections surfaced to the auth forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login/signup requires every field to be present.
    MissingCredentials,
    /// The email does not look like an address.
    InvalidEmail,
    /// The password violates the signup policy; carries the first violation.
    WeakPassword { reason: String },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "all fields are required"),
            AuthError::InvalidEmail => write!(f, "please enter a valid email address"),
            AuthError::WeakPassword { reason } => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for AuthError {}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Holds the (at most one) authenticated user for this session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Option<User>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log in with email + password. Any password is accepted once the
    /// fields validate — this is the mock backend's behavior.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let email = email.trim().to_lowercase();
        let name = email.split('@').next().unwrap_or_default().to_string();
        Ok(self.install(email, name))
    }

    /// Sign up a new account. Enforces the password policy on top of the
    /// login checks.
    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<&User, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if let Some(first) = validate_password(password).first() {
            return Err(AuthError::WeakPassword {
                reason: (*first).to_string(),
            });
        }

        let email = email.trim().to_lowercase();
        Ok(self.install(email, name.trim().to_string()))
    }

    /// Drop the current session.
    pub fn logout(&mut self) {
        self.current = None;
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    fn install(&mut self, email: String, name: String) -> &User {
        let now = Utc::now();
        let id = format!(
            "usr-{}",
            Uuid::new_v5(&USER_ID_NAMESPACE, email.as_bytes()).simple()
        );
        self.current.insert(User {
            id,
            email,
            name,
            // Every mock account may publish products.
            is_creator: true,
            created_at: now,
            updated_at: now,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
