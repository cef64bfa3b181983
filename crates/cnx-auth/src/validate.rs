//! Credential validation helpers. Pure functions, no session state.

/// Minimal email shape check: one `@`, non-empty local part, and a domain
/// containing a dot, with no whitespace anywhere. Deliberately not an RFC
/// validator — the mock backend accepts anything that looks like an address.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let (local, domain) = match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let dot = match domain.find('.') {
        Some(i) => i,
        None => return false,
    };
    // Dot must split the domain into two non-empty halves.
    dot > 0 && dot + 1 < domain.len()
}

/// Password policy: at least 8 characters with upper, lower, and a digit.
/// Returns every violated rule so signup forms can show them all.
pub fn validate_password(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();
    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit");
    }
    errors
}
