//! Validation rules.
//!
//! Each rule is a pure function of the [`FormValues`] snapshot. `validate`
//! runs all of them (never stopping at the first failure) and collects the
//! outcomes into a [`ValidationReport`]. Rendering is somebody else's job,
//! see `render.rs`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::field::FieldKey;
use crate::state::FormValues;

pub const NAME_REQUIRED: &str = "Please enter your name.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters.";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match.";
pub const PHONE_INVALID: &str = "Enter a valid phone number (7–15 digits).";

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
}

/// Outcome of a single rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub field: FieldKey,
    pub valid: bool,
    pub message: &'static str,
}

impl ValidationResult {
    fn check(field: FieldKey, valid: bool, message: &'static str) -> Self {
        Self {
            field,
            valid,
            message,
        }
    }
}

/// A rule returns `None` when it does not apply to the current values.
pub type Rule = fn(&FormValues) -> Option<ValidationResult>;

/// The registration rules, in display order.
pub const RULES: [Rule; 5] = [
    name_required,
    email_valid,
    password_length,
    confirmation_matches,
    phone_valid,
];

/// All rule outcomes for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|r| r.valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.valid)
    }

    /// Failure message for a field, if its rule failed.
    pub fn error_for(&self, field: FieldKey) -> Option<&'static str> {
        self.failures()
            .find(|r| r.field == field)
            .map(|r| r.message)
    }
}

/// Run every rule against `values`.
pub fn validate(values: &FormValues) -> ValidationReport {
    ValidationReport {
        results: RULES.iter().filter_map(|rule| rule(values)).collect(),
    }
}

pub fn name_required(values: &FormValues) -> Option<ValidationResult> {
    let valid = values
        .get(FieldKey::Name)
        .is_some_and(|v| !v.trim().is_empty());
    Some(ValidationResult::check(FieldKey::Name, valid, NAME_REQUIRED))
}

pub fn email_valid(values: &FormValues) -> Option<ValidationResult> {
    let valid = values
        .get(FieldKey::Email)
        .map(str::trim)
        .is_some_and(|v| !v.is_empty() && is_valid_email(v));
    Some(ValidationResult::check(FieldKey::Email, valid, EMAIL_INVALID))
}

pub fn password_length(values: &FormValues) -> Option<ValidationResult> {
    // no trimming: surrounding spaces count towards the length
    let valid = values
        .get(FieldKey::Password)
        .is_some_and(|v| v.chars().count() >= MIN_PASSWORD_CHARS);
    Some(ValidationResult::check(
        FieldKey::Password,
        valid,
        PASSWORD_TOO_SHORT,
    ))
}

pub fn confirmation_matches(values: &FormValues) -> Option<ValidationResult> {
    let valid = match (values.get(FieldKey::Confirm), values.get(FieldKey::Password)) {
        (Some(confirm), Some(password)) => confirm == password,
        _ => false,
    };
    Some(ValidationResult::check(
        FieldKey::Confirm,
        valid,
        PASSWORDS_DIFFER,
    ))
}

pub fn phone_valid(values: &FormValues) -> Option<ValidationResult> {
    let phone = values.get(FieldKey::Number).map(str::trim)?;
    if phone.is_empty() {
        return None;
    }
    Some(ValidationResult::check(
        FieldKey::Number,
        is_valid_phone(phone),
        PHONE_INVALID,
    ))
}

/// Permissive shape check: `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Keep ASCII digits only.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_DIGITS.contains(&normalize_phone(phone).len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete() -> FormValues {
        FormValues::builder()
            .set(FieldKey::Name, "Ada Lovelace")
            .set(FieldKey::Email, "ada@example.com")
            .set(FieldKey::Password, "Abc12345")
            .set(FieldKey::Confirm, "Abc12345")
            .set(FieldKey::Number, "")
            .build()
    }

    fn with(key: FieldKey, value: &str) -> FormValues {
        let mut values = complete();
        values.set_value(key, value);
        values
    }

    #[test]
    fn complete_form_is_valid() {
        let report = validate(&complete());
        assert!(report.is_valid());
        // phone is blank, so its rule is skipped
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn blank_name_after_trim_fails() {
        let report = validate(&with(FieldKey::Name, "   \t"));
        assert!(!report.is_valid());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.error_for(FieldKey::Name), Some(NAME_REQUIRED));
    }

    #[test]
    fn email_requires_dot_in_domain() {
        assert!(!is_valid_email("foo@bar"));
        assert!(is_valid_email("foo@bar.com"));
        assert!(!is_valid_email("foo bar@baz.com"));
        assert!(!is_valid_email("foo@@bar.com"));
        assert!(!is_valid_email("@bar.com"));
    }

    #[test]
    fn email_is_trimmed_before_matching() {
        let report = validate(&with(FieldKey::Email, "  foo@bar.com  "));
        assert_eq!(report.error_for(FieldKey::Email), None);

        let report = validate(&with(FieldKey::Email, "foo@bar"));
        assert_eq!(report.error_for(FieldKey::Email), Some(EMAIL_INVALID));
    }

    #[test]
    fn password_length_counts_untrimmed_characters() {
        let short = validate(&with(FieldKey::Password, "short12"));
        assert_eq!(short.error_for(FieldKey::Password), Some(PASSWORD_TOO_SHORT));

        let mut values = with(FieldKey::Password, "longenough1");
        values.set_value(FieldKey::Confirm, "longenough1");
        assert!(validate(&values).is_valid());

        let mut padded = with(FieldKey::Password, " abcdef ");
        padded.set_value(FieldKey::Confirm, " abcdef ");
        assert!(validate(&padded).is_valid());
    }

    #[test]
    fn confirmation_is_exact_comparison() {
        let report = validate(&with(FieldKey::Confirm, "Abc12345 "));
        assert_eq!(report.error_for(FieldKey::Confirm), Some(PASSWORDS_DIFFER));
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn phone_rules() {
        assert!(validate(&with(FieldKey::Number, "   ")).is_valid());

        let short = validate(&with(FieldKey::Number, "123-456"));
        assert_eq!(short.error_for(FieldKey::Number), Some(PHONE_INVALID));

        assert!(validate(&with(FieldKey::Number, "(123) 456-7890")).is_valid());
        assert!(!is_valid_phone("1234567890123456"));
        assert_eq!(normalize_phone("+49 (0) 30-1234"), "490301234");
    }

    #[test]
    fn missing_elements_fail_required_fields_only() {
        let report = validate(&FormValues::default());
        let failed: Vec<_> = report.failures().map(|r| r.field).collect();
        assert_eq!(
            failed,
            vec![
                FieldKey::Name,
                FieldKey::Email,
                FieldKey::Password,
                FieldKey::Confirm
            ]
        );
    }

    #[test]
    fn every_violation_is_reported() {
        let values = FormValues::builder()
            .set(FieldKey::Name, "")
            .set(FieldKey::Email, "nope")
            .set(FieldKey::Password, "short")
            .set(FieldKey::Confirm, "other")
            .set(FieldKey::Number, "12")
            .build();
        let report = validate(&values);
        assert_eq!(report.failures().count(), 5);
    }
}
