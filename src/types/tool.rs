//! Tool-related types.

use serde::{Deserialize, Serialize};

/// Definition of a remotely callable tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Output from a tool execution
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Successful result payload
    Success(serde_json::Value),
    /// Error payload, already redacted for the caller
    Error(serde_json::Value),
}

impl ToolOutput {
    /// Serialize a success payload.
    pub fn success<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => Self::Success(v),
            Err(e) => Self::from(crate::Error::Json(e)),
        }
    }

    /// Create an error output for malformed tool input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Error(serde_json::json!({
            "error": {
                "kind": "invalid_input",
                "collaborator": "caller",
                "message": message.into(),
                "retryable": false,
            }
        }))
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn payload(&self) -> &serde_json::Value {
        match self {
            Self::Success(v) | Self::Error(v) => v,
        }
    }

    pub fn into_payload(self) -> serde_json::Value {
        match self {
            Self::Success(v) | Self::Error(v) => v,
        }
    }
}

impl From<crate::Error> for ToolOutput {
    fn from(err: crate::Error) -> Self {
        Self::Error(err.to_payload())
    }
}

impl<T, E> From<Result<T, E>> for ToolOutput
where
    T: Serialize,
    E: Into<crate::Error>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::success(&value),
            Err(e) => Self::from(e.into()),
        }
    }
}
