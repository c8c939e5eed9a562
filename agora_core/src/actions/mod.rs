//! Form actions: validate input, check ownership, persist, invalidate views.
//!
//! Every action answers `Ok(payload)` or `Err(FieldErrors)`. Wrapped in an
//! [`ActionResponse`] this serializes to `{"success": true, ...payload}` or
//! `{"error": {"<field>": ["message"], "_form": ["message"]}}`.

use std::{borrow::Cow, collections::BTreeMap, str::FromStr};

use serde::Serialize;
use tracing::debug;
use validator::{ValidationError, ValidationErrors};

use crate::ids::InvalidId;

pub mod comment;
pub mod post;
pub mod topic;

pub use comment::{CommentAction, CommentForm, CommentOutcome};
pub use post::{PostCreated, PostForm};
pub use topic::{TopicCreated, TopicForm};

/// Key for errors that do not belong to a single field.
pub const FORM_ERROR_KEY: &str = "_form";

/// Messages per form field, in the form's own (camelCase) field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single form-level message
    pub fn form(message: impl Into<String>) -> Self {
        Self::field(FORM_ERROR_KEY, message)
    }

    /// A single message for one field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// All messages of a field on one line, `None` for a field without errors
    pub fn message(&self, field: &str) -> Option<String> {
        self.0.get(field).map(|messages| messages.join(", "))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            let key = camel_case(&field);
            for err in errs {
                let message = match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{key} is invalid"),
                };
                fields.push(key.clone(), message);
            }
        }
        fields
    }
}

pub type ActionResult<T> = Result<T, FieldErrors>;

/// Wire shape of an action outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldErrors>,
}

impl<T> From<ActionResult<T>> for ActionResponse<T> {
    fn from(result: ActionResult<T>) -> Self {
        match result {
            Ok(data) => Self {
                success: Some(true),
                data: Some(data),
                error: None,
            },
            Err(error) => Self {
                success: None,
                data: None,
                error: Some(error),
            },
        }
    }
}

// validator reports the Rust field name; forms use camelCase.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parse an id from a form field. A malformed id reads as a missing row.
pub(crate) fn parse_id<T>(raw: &str, not_found: &'static str) -> Result<T, FieldErrors>
where
    T: FromStr<Err = InvalidId>,
{
    raw.parse().map_err(|e: InvalidId| {
        debug!("{e}");
        FieldErrors::form(not_found)
    })
}

/// Length check with separate messages for "empty" and "too long".
pub(crate) fn check_length(
    value: &str,
    max: usize,
    empty: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    let count = value.chars().count();
    if count == 0 {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(empty)));
    }
    if count > max {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(too_long)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("topic_id"), "topicId");
        assert_eq!(camel_case("content"), "content");
        assert_eq!(camel_case("parent_comment_id"), "parentCommentId");
    }

    #[test]
    fn test_error_response_shape() {
        let mut errors = FieldErrors::field("name", "Name must be at least 3 characters");
        errors.push("name", "Name can only contain letters, numbers and underscores");

        let response: ActionResponse<()> = Err(errors).into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": {
                    "name": [
                        "Name must be at least 3 characters",
                        "Name can only contain letters, numbers and underscores"
                    ]
                }
            })
        );
    }

    #[test]
    fn test_success_response_shape() {
        #[derive(Serialize)]
        struct Payload {
            deleted: bool,
        }

        let response: ActionResponse<Payload> = Ok(Payload { deleted: true }).into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "deleted": true}));
    }

    #[test]
    fn test_form_errors() {
        let errors = FieldErrors::form("Failed to create post");
        assert_eq!(errors.get(FORM_ERROR_KEY), ["Failed to create post"]);
        assert!(errors.get("title").is_empty());
        assert_eq!(
            errors.message(FORM_ERROR_KEY).as_deref(),
            Some("Failed to create post")
        );
        assert_eq!(errors.message("title"), None);
    }

    #[test]
    fn test_check_length() {
        let err = check_length("", 5, "empty", "long").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("empty"));
        let err = check_length("toolong", 5, "empty", "long").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("long"));
        assert!(check_length("ok", 5, "empty", "long").is_ok());
    }
}
