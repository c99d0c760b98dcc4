//! Tool domain value objects: validated inputs, results, and error payloads
//!
//! [`ValidatedParams`] is the **input side** of a handler invocation: it can
//! only be obtained from a [`ToolValidator`](super::traits::ToolValidator).
//! [`ToolResult`] is the **output side**. A `success: false` result is a
//! normal outcome (e.g. a policy denial) and carries a [`ToolError`].

use crate::core::error::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single parameter that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name, or `$` for the parameter object itself
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

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error payload of a failed tool result.
///
/// `message` is safe to show to a user; `details` holds lower-level text
/// (already redacted by the collaborator that produced it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl ToolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            field_errors: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(tool_name: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("Tool not found: {}", tool_name.as_ref()),
        )
    }

    pub fn validation(tool_name: impl AsRef<str>, field_errors: Vec<FieldError>) -> Self {
        let summary = field_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            code: ErrorCode::ValidationError,
            message: format!("Invalid parameters for '{}': {}", tool_name.as_ref(), summary),
            details: None,
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn timeout(tool_name: impl AsRef<str>) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("Tool '{}' timed out", tool_name.as_ref()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Structured payload for the caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Create a failed result; the message mirrors the error's message
    pub fn failure(error: ToolError) -> Self {
        Self {
            success: false,
            message: error.message.clone(),
            data: None,
            error: Some(error),
        }
    }

    /// A policy denial, reported as a normal outcome
    pub fn denied(message: impl Into<String>) -> Self {
        Self::failure(ToolError::unauthorized(message))
    }

    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Parameters that passed schema validation, with defaults filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidatedParams(Map<String, Value>);

impl ValidatedParams {
    /// Wrap an already-validated map. Only validators should call this.
    pub fn from_validated(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(|v| v.as_i64())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
