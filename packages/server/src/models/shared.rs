use serde::{Deserialize, Deserializer};

use crate::error::FieldErrors;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Lowercased `%term%` pattern for a case-insensitive substring match,
/// or `None` when the term is blank.
pub fn contains_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    Some(format!("%{}%", escape_like(&term.to_lowercase())))
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Username rules: 1-150 characters from letters, digits and `@.+-_`.
pub fn check_username(username: &str, errors: &mut FieldErrors) {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 150 {
        errors.add("username", "Username must be 1-150 characters");
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.add(
            "username",
            "Username may contain only letters, digits and @/./+/-/_",
        );
    }
}

/// Minimal structural email check; delivery is the real test.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn check_email(field: &str, email: &str, errors: &mut FieldErrors) {
    if !is_valid_email(email) {
        errors.add(field, "Enter a valid email address");
    }
}

/// Password rules: 8-128 characters, confirmation must match.
pub fn check_password(password: &str, confirm: &str, errors: &mut FieldErrors) {
    let chars = password.chars().count();
    if !(8..=128).contains(&chars) {
        errors.add("password", "Password must be 8-128 characters");
    }
    if password != confirm {
        errors.add("password_confirm", "Passwords do not match");
    }
}

/// Require a trimmed value of 1..=max characters.
pub fn check_required(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field is required");
    } else if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
}

/// Allow empty values but cap the length.
pub fn check_max_len(field: &str, value: &str, max: usize, errors: &mut FieldErrors) {
    if value.chars().count() > max {
        errors.add(field, format!("Must be at most {max} characters"));
    }
}
