use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    /// Non-2xx answer; `message` is what the backend said, untouched.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 || status == 403 {
            return ApiError::Unauthorized;
        }

        ApiError::Backend {
            status,
            message: backend_message(status, body),
        }
    }
}

/// Picks the backend's own wording out of an error body: a JSON `error` or
/// `message` string, otherwise the raw text.
pub fn backend_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["error", "message"] {
            if let Some(Value::String(message)) = fields.get(key)
                && !message.trim().is_empty()
            {
                return message.clone();
            }
        }
    }

    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}
