//! Field rules for player form submissions.
//!
//! # Responsibility
//! - Decide whether a `PlayerInput` is well-formed.
//! - Report every failing field at once so the form can show all errors.
//!
//! # Invariants
//! - Validation is pure and never panics on malformed input.
//! - At most one message is reported per field: the first failing rule in
//!   declaration order.
//! - Lengths are measured in Unicode scalar values, not bytes.

use crate::model::player::PlayerInput;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const EMAIL_MIN_CHARS: usize = 6;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 12;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

/// Form field addressed by a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayerField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

impl PlayerField {
    /// Returns the field key used by the form layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
        }
    }
}

impl Display for PlayerField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed validation messages for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<PlayerField, String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: PlayerField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: PlayerField) -> bool {
        self.errors.contains_key(&field)
    }

    /// Iterates messages in field declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerField, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: PlayerField, message: Option<&'static str>) {
        if let Some(message) = message {
            self.errors.insert(field, message.to_string());
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid player input: {joined}")
    }
}

impl Error for FieldErrors {}

/// Validates all fields of a player submission.
///
/// Returns `Ok(())` when every rule passes, otherwise the full set of field
/// errors.
pub fn validate_player_input(input: &PlayerInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.insert(PlayerField::Name, check_name(&input.name));
    errors.insert(PlayerField::Email, check_email(&input.email));
    errors.insert(PlayerField::Password, check_password(&input.password));
    errors.insert(
        PlayerField::ConfirmPassword,
        check_confirm_password(&input.password, &input.confirm_password),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_name(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        return Some("Name is required");
    }
    None
}

fn check_email(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("Email is required");
    }
    if email.chars().count() < EMAIL_MIN_CHARS {
        return Some("Enter at least 6 characters");
    }
    if !EMAIL_RE.is_match(email) {
        return Some("Email is invalid");
    }
    None
}

fn check_password(password: &str) -> Option<&'static str> {
    let chars = password.chars().count();
    if chars == 0 {
        return Some("Password is required");
    }
    if chars < PASSWORD_MIN_CHARS {
        return Some("Enter at least 6 characters");
    }
    if chars > PASSWORD_MAX_CHARS {
        return Some("Enter at most 12 characters");
    }
    None
}

fn check_confirm_password(password: &str, confirm_password: &str) -> Option<&'static str> {
    if confirm_password.is_empty() {
        return Some("Confirm password is required");
    }
    if confirm_password != password {
        return Some("Passwords must match");
    }
    None
}
