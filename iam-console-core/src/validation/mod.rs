//! Per-field form validators
//!
//! Each [`Validator`] checks one field of a submitted record and yields a
//! [`Validation`]. Forms compose them with [`validate_all`]; no field is checked
//! against another field or against remote state.

pub mod rich_text;

use chrono::NaiveDateTime;
use iam_console_gateway::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire format of timestamp fields such as `startTime`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of checking one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Invalid(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Field-level message attached to a form after a rejected submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Present, and not empty or whitespace-only
    RequiredText,
    /// Present and not null or an empty string
    Required,
    /// Rich-text content with something visible in it
    RichContent,
    /// Present and parseable with [`TIMESTAMP_FORMAT`]
    Timestamp,
    /// At most `n` characters when present
    MaxLength(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl Validator {
    pub fn new(field: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }

    pub fn required_text(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, Rule::RequiredText, message)
    }

    pub fn required(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, Rule::Required, message)
    }

    pub fn rich_content(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, Rule::RichContent, message)
    }

    pub fn timestamp(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, Rule::Timestamp, message)
    }

    pub fn max_length(field: impl Into<String>, max: usize, message: impl Into<String>) -> Self {
        Self::new(field, Rule::MaxLength(max), message)
    }

    /// Check a single field value (`None` when the field is absent).
    pub fn check(&self, value: Option<&Value>) -> Validation {
        let valid = match &self.rule {
            Rule::RequiredText => match value {
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(Value::Number(_) | Value::Bool(_)) => true,
                _ => false,
            },
            Rule::Required => match value {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Array(items)) => !items.is_empty(),
                Some(_) => true,
            },
            Rule::RichContent => match value {
                Some(Value::String(html)) => !rich_text::is_blank(html),
                _ => false,
            },
            Rule::Timestamp => match value {
                Some(Value::String(s)) if !s.trim().is_empty() => {
                    if parse_timestamp(s).is_none() {
                        return Validation::Invalid(format!(
                            "Invalid time '{s}', expected YYYY-MM-DD HH:MM:SS"
                        ));
                    }
                    true
                }
                _ => false,
            },
            Rule::MaxLength(max) => match value {
                Some(Value::String(s)) => s.chars().count() <= *max,
                _ => true,
            },
        };

        if valid {
            Validation::Valid
        } else {
            Validation::Invalid(self.message.clone())
        }
    }

    pub fn validate(&self, fields: &Record) -> Validation {
        self.check(fields.get(&self.field))
    }
}

/// Parse a timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

/// Run every validator; a field reports only its first failure.
pub fn validate_all(validators: &[Validator], fields: &Record) -> Result<(), Vec<FieldError>> {
    let mut errors: Vec<FieldError> = Vec::new();
    for validator in validators {
        if errors.iter().any(|e| e.field == validator.field) {
            continue;
        }
        if let Validation::Invalid(message) = validator.validate(fields) {
            errors.push(FieldError::new(validator.field.clone(), message));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_text_rejects_whitespace() {
        let v = Validator::required_text("name", "Please enter the name");
        assert!(v.check(Some(&json!("Welcome"))).is_valid());
        assert!(v.check(Some(&json!(42))).is_valid());
        assert_eq!(
            v.check(Some(&json!("   "))),
            Validation::Invalid("Please enter the name".to_string())
        );
        assert!(!v.check(None).is_valid());
        assert!(!v.check(Some(&Value::Null)).is_valid());
    }

    #[test]
    fn rich_content_treats_markup_only_as_empty() {
        let v = Validator::rich_content("content", "Content is required");
        assert!(!v.check(Some(&json!(""))).is_valid());
        assert!(!v.check(Some(&json!("<p>&nbsp;</p>"))).is_valid());
        assert!(!v.check(Some(&json!("   "))).is_valid());
        assert!(v.check(Some(&json!("<p>Hi</p>"))).is_valid());
    }

    #[test]
    fn timestamp_requires_wire_format() {
        let v = Validator::timestamp("date", "Please choose the send time");
        assert!(v.check(Some(&json!("2024-05-01 08:30:00"))).is_valid());
        assert_eq!(
            v.check(None),
            Validation::Invalid("Please choose the send time".to_string())
        );
        let malformed = v.check(Some(&json!("2024/05/01")));
        assert!(matches!(malformed, Validation::Invalid(m) if m.contains("YYYY-MM-DD HH:MM:SS")));
    }

    #[test]
    fn max_length_counts_chars() {
        let v = Validator::max_length("title", 3, "Too long");
        assert!(v.check(Some(&json!("邮件标"))).is_valid());
        assert!(!v.check(Some(&json!("abcd"))).is_valid());
        assert!(v.check(None).is_valid());
    }

    #[test]
    fn first_failure_per_field() {
        let validators = [
            Validator::required_text("title", "Title is required"),
            Validator::max_length("title", 5, "Title is too long"),
            Validator::required("type", "Type is required"),
            Validator::required_text("code", "Code is required"),
        ];
        let fields = Record::new().with("title", " ").with("code", "reset-pw");
        let errors = validate_all(&validators, &fields).unwrap_err();
        assert_eq!(
            errors,
            [
                FieldError::new("title", "Title is required"),
                FieldError::new("type", "Type is required"),
            ]
        );
    }

    #[test]
    fn all_valid() {
        let validators = [Validator::required_text("code", "Code is required")];
        assert!(validate_all(&validators, &Record::new().with("code", "c")).is_ok());
    }
}
