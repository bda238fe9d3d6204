use pmflow_core::gateway::GatewayError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("api returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl ApiError {
    /// Text shown to the user for this failure.
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized(detail) | Self::NotFound(detail) => detail.clone(),
            Self::Status { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Http(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Http(_) => "transport",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Status { .. } => "api_status",
            Self::Decode(_) | Self::Shape(_) => "malformed_response",
        }
    }
}

impl From<ApiError> for GatewayError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound(detail) => GatewayError::NotFound(detail),
            ApiError::Decode(detail) | ApiError::Shape(detail) => GatewayError::Malformed(detail),
            other => GatewayError::Unavailable(other.detail()),
        }
    }
}

/// Pulls the `detail` field out of an error body.
///
/// FastAPI-style bodies carry either a string or a list of `{msg}` objects.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
