use thiserror::Error;

/// Boundary operation, used to pick the fallback message when a failing
/// response carries no structured error field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Upload,
    Update,
    Delete,
    Ask,
}

impl Operation {
    pub fn default_message(self) -> &'static str {
        match self {
            Operation::List => "Error fetching documents",
            Operation::Upload => "Error uploading document",
            Operation::Update => "Error updating document",
            Operation::Delete => "Error deleting document",
            Operation::Ask => "Error asking document",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The call never produced a response (connection refused, DNS, reset).
    #[error("Network error")]
    Transport { detail: String },
    /// A response arrived but reported failure.
    #[error("{message}")]
    Remote { message: String },
}

impl ApiError {
    pub fn transport(detail: impl ToString) -> Self {
        ApiError::Transport {
            detail: detail.to_string(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        ApiError::Remote {
            message: message.into(),
        }
    }

    /// Remote failure with the operation's default message.
    pub fn remote_default(op: Operation) -> Self {
        Self::remote(op.default_message())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, `error` and `message`, in that order, and only accepts
/// non-empty strings (validation errors that arrive as arrays fall through to
/// the operation default).
pub fn extract_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .filter_map(|key| json.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_renders_generic_message() {
        let err = ApiError::transport("connection refused");
        assert_eq!(err.to_string(), "Network error");
        assert!(err.is_transport());
    }

    #[test]
    fn extract_prefers_detail_then_error() {
        assert_eq!(
            extract_message(r#"{"detail": "Not found", "error": "x"}"#).as_deref(),
            Some("Not found")
        );
        assert_eq!(
            extract_message(r#"{"error": "bad pdf"}"#).as_deref(),
            Some("bad pdf")
        );
    }

    #[test]
    fn extract_ignores_non_string_and_garbage() {
        assert_eq!(extract_message(r#"{"detail": [{"loc": ["body"]}]}"#), None);
        assert_eq!(extract_message(r#"{"detail": "   "}"#), None);
        assert_eq!(extract_message("<html>502</html>"), None);
    }

    #[test]
    fn remote_default_uses_operation_message() {
        assert_eq!(
            ApiError::remote_default(Operation::Ask).to_string(),
            "Error asking document"
        );
    }
}
