use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{message}")]
    Application { message: String },
    #[error("request to {endpoint} failed (status {status}): {message}")]
    Status { endpoint: String, status: StatusCode, message: String },
    #[error("unexpected response from {endpoint}: {detail}")]
    Decode { endpoint: String, detail: String },
    #[error("file is {size} bytes, the upload limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },
}

impl ApiError {
    pub(crate) fn network(endpoint: &str, source: reqwest::Error) -> Self {
        Self::Network { endpoint: endpoint.to_string(), source }
    }

    pub(crate) fn decode(endpoint: &str, detail: impl std::fmt::Display) -> Self {
        Self::Decode { endpoint: endpoint.to_string(), detail: detail.to_string() }
    }

    /// True for failures where the request never got an answer.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Text suitable for showing to the editor user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "Could not reach the server. Check your connection.".to_string()
            }
            Self::Application { message } => message.clone(),
            Self::Status { message, .. } => message.clone(),
            Self::Decode { .. } => "The server sent an unexpected response.".to_string(),
            Self::FileTooLarge { limit, .. } => {
                format!("File is too large. The limit is {} MB.", limit / (1024 * 1024))
            }
        }
    }
}

pub(crate) fn extract_error_message(payload: &Value) -> String {
    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
    }

    payload
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| payload.get("error").and_then(Value::as_str))
        .unwrap_or("unknown_error")
        .to_string()
}
