use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::api::ApiClient;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex")
});

/// Signed decimal with optional fraction and exponent: `1`, `-2.5`, `.5`, `3.`, `1e3`.
static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid decimal regex")
});

/// Rule
///
/// A single check applied to one form field. Every rule other than `Required` lets an
/// empty value through, so optional fields only need `Required` left out.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    /// At least 8 characters with an uppercase letter, a lowercase letter and a digit.
    Password,
    /// A date (or date-time) strictly later than now.
    FutureDate,
    /// 24-hour `H:MM` / `HH:MM`.
    TimeOfDay,
    Number,
    /// Inclusive numeric bounds. Values that are not numbers are left to `Number`.
    Range(f64, f64),
}

impl Rule {
    /// Returns the error message for `value`, or None when it passes.
    pub fn check(&self, value: &str) -> Option<String> {
        self.check_at(value, Utc::now())
    }

    /// `check` with an explicit clock, for the time-dependent rules.
    pub fn check_at(&self, value: &str, now: DateTime<Utc>) -> Option<String> {
        if !matches!(self, Rule::Required) && value.is_empty() {
            return None;
        }

        match self {
            Rule::Required => value
                .trim()
                .is_empty()
                .then(|| "This field is required".to_string()),
            Rule::Email => (!EMAIL_PATTERN.is_match(value))
                .then(|| "Please enter a valid email address".to_string()),
            Rule::MinLength(min) => (value.chars().count() < *min)
                .then(|| format!("Must be at least {min} characters long")),
            Rule::MaxLength(max) => (value.chars().count() > *max)
                .then(|| format!("Must be no more than {max} characters long")),
            Rule::Password => check_password(value),
            Rule::FutureDate => check_future_date(value, now),
            Rule::TimeOfDay => (!TIME_PATTERN.is_match(value))
                .then(|| "Please enter a valid time (HH:MM)".to_string()),
            Rule::Number => parse_number(value)
                .is_none()
                .then(|| "Please enter a valid number".to_string()),
            Rule::Range(min, max) => parse_number(value)
                .filter(|n| n < min || n > max)
                .map(|_| format!("Value must be between {min} and {max}")),
        }
    }
}

fn check_password(value: &str) -> Option<String> {
    if value.chars().count() < 8 {
        return Some("Password must be at least 8 characters long".to_string());
    }
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Some(
            "Password must contain at least one uppercase letter, one lowercase letter, and one number"
                .to_string(),
        );
    }
    None
}

/// A bare date is taken as midnight UTC, so today's date already counts as past.
fn check_future_date(value: &str, now: DateTime<Utc>) -> Option<String> {
    let Some(when) = parse_instant(value) else {
        return Some("Please enter a valid date".to_string());
    };
    (when < now).then(|| "Quiz date must be in the future".to_string())
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// parse_number
///
/// Reads a numeric form value the way a browser number coercion does. Whitespace-only
/// input counts as zero. Besides plain decimals it accepts `Infinity` with an optional
/// sign and unsigned `0x` / `0o` / `0b` integers. Spellings such as `inf` or `nan`
/// are not numbers.
fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    match trimmed {
        "" => return Some(0.0),
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let prefixed = trimmed.get(..2).zip(trimmed.get(2..));
    if let Some((prefix, digits)) = prefixed {
        let radix = match prefix {
            "0x" | "0X" => Some(16),
            "0o" | "0O" => Some(8),
            "0b" | "0B" => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(digits, radix);
        }
    }

    if !DECIMAL_PATTERN.is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Runs `rules` in order and returns the first failure.
pub fn validate_field(value: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.check(value))
}

/// FormValidation
///
/// Outcome of validating a whole form. `errors` only holds fields that failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormValidation {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

/// Validates every field that has rules. A field absent from `data` is checked as
/// an empty value.
pub fn validate_form(
    data: &BTreeMap<String, String>,
    rules: &[(&str, Vec<Rule>)],
) -> FormValidation {
    let errors: BTreeMap<String, String> = rules
        .iter()
        .filter_map(|(field, field_rules)| {
            let value = data.get(*field).map(String::as_str).unwrap_or("");
            validate_field(value, field_rules).map(|msg| (field.to_string(), msg))
        })
        .collect();

    FormValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// FieldFeedback
///
/// What a form control should display after validation. Rendering is left to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFeedback {
    Valid,
    Invalid(String),
}

impl FieldFeedback {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldFeedback::Valid)
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            FieldFeedback::Valid => "is-valid",
            FieldFeedback::Invalid(_) => "is-invalid",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            FieldFeedback::Valid => None,
            FieldFeedback::Invalid(msg) => Some(msg),
        }
    }
}

pub fn field_feedback(value: &str, rules: &[Rule]) -> FieldFeedback {
    match validate_field(value, rules) {
        None => FieldFeedback::Valid,
        Some(msg) => FieldFeedback::Invalid(msg),
    }
}

/// check_email_uniqueness
///
/// Asks the backend whether `email` is still free. Returns the message to show, or
/// None when the address can be used. Only an explicit `"valid": false` means the
/// address is taken; a response without a `valid` flag (a server error, an empty
/// body) means the check could not be made.
pub async fn check_email_uniqueness(api: &dyn ApiClient, email: &str) -> Option<String> {
    match api
        .post("/api/validate/email", json!({ "email": email }))
        .await
    {
        Ok(response) => match response.body.get("valid").and_then(Value::as_bool) {
            Some(true) => None,
            Some(false) => Some(response.error_message("Email is already registered")),
            None => {
                tracing::warn!(status = response.status, "email check answered without a verdict");
                Some("Unable to validate email".to_string())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "email uniqueness check failed");
            Some("Unable to validate email".to_string())
        }
    }
}
