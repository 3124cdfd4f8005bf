use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::{auth::dto::SignupForm, error::AuthError};

pub const MIN_PASSWORD_LEN: usize = 8;

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Password length in UTF-16 code units, the unit browsers count in. An emoji
/// outside the Basic Multilingual Plane counts as two.
fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Checks a signup form in a fixed order and reports only the first failure.
pub fn validate_signup(form: &SignupForm) -> Result<(), AuthError> {
    if !form.agree_terms {
        return Err(AuthError::validation(
            "Please accept the Terms of Service and Privacy Policy.",
        ));
    }
    if form.password != form.confirm_password {
        return Err(AuthError::validation("Passwords do not match."));
    }
    if password_len(&form.password) < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(
            "Password must be at least 8 characters long.",
        ));
    }
    if !is_valid_email(&form.email) {
        return Err(AuthError::validation("Please enter a valid email address."));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthTier {
    Empty,
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthTier {
    pub fn label(&self) -> &'static str {
        match self {
            StrengthTier::Empty => "Enter password",
            StrengthTier::Weak => "Weak",
            StrengthTier::Fair => "Fair",
            StrengthTier::Good => "Good",
            StrengthTier::Strong => "Strong",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            StrengthTier::Empty => "muted",
            StrengthTier::Weak => "danger",
            StrengthTier::Fair => "warning",
            StrengthTier::Good => "info",
            StrengthTier::Strong => "success",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub tier: StrengthTier,
    pub label: &'static str,
    pub color: &'static str,
    pub score: u8,
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let score = strength_score(password);
    let tier = if password.is_empty() {
        StrengthTier::Empty
    } else {
        match score {
            0 | 1 => StrengthTier::Weak,
            2 => StrengthTier::Fair,
            3 => StrengthTier::Good,
            _ => StrengthTier::Strong,
        }
    };
    PasswordStrength {
        tier,
        label: tier.label(),
        color: tier.color(),
        score,
    }
}

fn strength_score(password: &str) -> u8 {
    let checks = [
        password_len(password) >= MIN_PASSWORD_LEN,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| SPECIAL_CHARS.contains(c)),
    ];
    checks.iter().filter(|ok| **ok).count() as u8
}
