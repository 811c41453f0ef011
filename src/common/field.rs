// src/common/field.rs

use std::fmt;

/// A validation failure attached to a form field.
///
/// A field carries either a single displayable message or an ordered list of
/// them. List order is rule-evaluation order and the rendering layer relies
/// on it, so validators that accumulate messages must push them in the order
/// the rules ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldError {
    pub fn single(message: impl Into<String>) -> Self {
        FieldError::Single(message.into())
    }

    /// Collapse a list of accumulated messages into a `FieldError`.
    /// Returns `None` for an empty list so callers can map straight onto
    /// `Option<FieldError>`.
    pub fn from_messages(mut messages: Vec<String>) -> Option<Self> {
        match messages.len() {
            0 => None,
            1 => Some(FieldError::Single(messages.remove(0))),
            _ => Some(FieldError::Multiple(messages)),
        }
    }

    /// All messages carried by this error, in display order.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            FieldError::Single(message) => vec![message.as_str()],
            FieldError::Multiple(messages) => messages.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::Single(message) => f.write_str(message),
            FieldError::Multiple(messages) => f.write_str(&messages.join("\n")),
        }
    }
}

/// Blank-ness per field value type. A required field with a blank value
/// fails the required check even though the value is technically present.
pub trait FieldValue {
    fn is_blank(&self) -> bool;
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl FieldValue for bool {
    fn is_blank(&self) -> bool {
        !*self
    }
}

/// A single named form field.
///
/// Created fresh per form session; validators read it and report failures,
/// the pipeline records the failure on the field, and the form layer reads
/// `error` to decide whether submission is blocked. Nothing here persists
/// beyond the in-memory form session.
#[derive(Debug, Clone)]
pub struct FormField<T> {
    pub name: String,
    pub value: Option<T>,
    pub is_required: bool,
    pub is_visible: bool,
    pub error: Option<FieldError>,
}

impl<T> FormField<T> {
    pub fn new(name: impl Into<String>, value: Option<T>) -> Self {
        Self {
            name: name.into(),
            value,
            is_required: true,
            is_visible: true,
            error: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn set_error(&mut self, error: FieldError) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// All error messages currently on the field, in display order.
    pub fn error_messages(&self) -> Vec<&str> {
        self.error.as_ref().map(FieldError::messages).unwrap_or_default()
    }
}

impl FormField<String> {
    /// Convenience constructor for the common text-field case.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Some(value.into()))
    }

    /// The field's value with a missing value read as the empty string.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_messages_collapses_by_count() {
        assert_eq!(FieldError::from_messages(vec![]), None);
        assert_eq!(
            FieldError::from_messages(vec!["one".to_string()]),
            Some(FieldError::Single("one".to_string()))
        );
        assert_eq!(
            FieldError::from_messages(vec!["one".to_string(), "two".to_string()]),
            Some(FieldError::Multiple(vec![
                "one".to_string(),
                "two".to_string()
            ]))
        );
    }

    #[test]
    fn test_blankness_for_strings_and_bools() {
        assert!("".to_string().is_blank());
        assert!("   ".to_string().is_blank());
        assert!(!"jane".to_string().is_blank());
        assert!(false.is_blank());
        assert!(!true.is_blank());
    }

    #[test]
    fn test_field_error_display_joins_lines() {
        let error = FieldError::Multiple(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(error.to_string(), "first\nsecond");
    }

    #[test]
    fn test_field_defaults() {
        let field = FormField::text("mailbox", "jane");
        assert!(field.is_required);
        assert!(field.is_visible);
        assert!(!field.has_error());
        assert_eq!(field.value_str(), "jane");
    }
}
